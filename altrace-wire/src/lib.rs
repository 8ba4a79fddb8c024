//! Binary wire format shared by the altrace recorder and player.
//!
//! This crate owns only the on-disk representation (§3, §4.1, §6 of the
//! design): primitive little-endian encode/decode, the event tag table,
//! and the small set of OpenAL enum values the format itself needs to
//! interpret. It has no opinion about call stacks, object registries, or
//! visitors — those live in `altrace-record` and `altrace-play`.

mod al_types;
mod codec;
mod error;
mod event;

pub use al_types::{expected_transition, SourceState, SourceTransitionCall};
pub use codec::{Reader, Writer, ABSENT_LEN};
pub use error::{WireError, WireResult};
pub use event::{CallerInfo, EventTag, FORMAT_VERSION, MAGIC, MAX_CALLSTACK_DEPTH};

use std::io::{Read, Write};

/// Writes the file header (`magic`, `format_version`) at the start of a
/// trace, per §3/§6.
pub fn write_header<W: Write>(w: &mut Writer<W>) -> WireResult<()> {
    w.write_u32(MAGIC)?;
    w.write_u32(FORMAT_VERSION)?;
    Ok(())
}

/// Reads and validates the file header. A mismatched magic or an
/// unsupported version is a player-fatal error (§7).
pub fn read_header<R: Read>(r: &mut Reader<R>) -> WireResult<()> {
    let magic = r.read_u32()?;
    if magic != MAGIC {
        return Err(WireError::BadMagic {
            expected: MAGIC,
            got: magic,
        });
    }
    let version = r.read_u32()?;
    if version != FORMAT_VERSION {
        return Err(WireError::UnsupportedVersion(version));
    }
    Ok(())
}

/// Writes a caller-info block ahead of an API-call event's own schema
/// (§3, §6). The event tag itself is written by the caller, since
/// `new-callstack-symbols` may need to be interleaved first (§4.2).
pub fn write_caller_info<W: Write>(w: &mut Writer<W>, info: &CallerInfo) -> WireResult<()> {
    w.write_u32(info.timestamp_ms)?;
    w.write_u64(info.raw_thread_id)?;
    w.write_u32(info.trace_scope)?;
    w.write_u32(info.stack.len() as u32)?;
    for &addr in &info.stack {
        w.write_ptr(addr)?;
    }
    Ok(())
}

pub fn read_caller_info<R: Read>(r: &mut Reader<R>) -> WireResult<CallerInfo> {
    let timestamp_ms = r.read_u32()?;
    let raw_thread_id = r.read_u64()?;
    let trace_scope = r.read_u32()?;
    let depth = r.read_u32()? as usize;
    let mut stack = Vec::with_capacity(depth.min(MAX_CALLSTACK_DEPTH));
    for _ in 0..depth {
        stack.push(r.read_ptr()?);
    }
    Ok(CallerInfo {
        timestamp_ms,
        raw_thread_id,
        stack,
        trace_scope,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn header_roundtrips() {
        let mut buf = Vec::new();
        write_header(&mut Writer::new(&mut buf)).unwrap();
        read_header(&mut Reader::new(Cursor::new(buf))).unwrap();
    }

    #[test]
    fn bad_magic_is_rejected() {
        let mut buf = Vec::new();
        Writer::new(&mut buf).write_u32(0xdead_beef).unwrap();
        Writer::new(&mut buf).write_u32(FORMAT_VERSION).unwrap();
        let err = read_header(&mut Reader::new(Cursor::new(buf))).unwrap_err();
        assert!(matches!(err, WireError::BadMagic { .. }));
    }

    #[test]
    fn caller_info_roundtrips() {
        let mut buf = Vec::new();
        let info = CallerInfo {
            timestamp_ms: 1234,
            raw_thread_id: 0xabc,
            stack: vec![0x1000, 0x2000, 0x3000],
            trace_scope: 2,
        };
        write_caller_info(&mut Writer::new(&mut buf), &info).unwrap();
        let back = read_caller_info(&mut Reader::new(Cursor::new(buf))).unwrap();
        assert_eq!(back.timestamp_ms, info.timestamp_ms);
        assert_eq!(back.raw_thread_id, info.raw_thread_id);
        assert_eq!(back.stack, info.stack);
        assert_eq!(back.trace_scope, info.trace_scope);
    }
}
