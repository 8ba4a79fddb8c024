//! Resolved caller-info: the per-event header every visitor callback for
//! an API-call event receives (§6 "Visitor interface").

/// A caller-info block after thread-id and symbol resolution, handed to
/// every visitor callback for an API-call event.
///
/// The original's `userdata` token has no counterpart here: a `Visitor`
/// implementation is a Rust value with its own fields, so whatever state
/// a front-end would have threaded through a `void *` travels as part of
/// `self` instead (see `DESIGN.md`).
#[derive(Debug, Clone)]
pub struct CallerInfo<'a> {
    pub timestamp_ms: u32,
    pub thread_id: u32,
    pub raw_thread_id: u64,
    /// Resolved symbol per return address, in the same order as the
    /// recorded stack (innermost frame first). `None` for an address the
    /// recorder could not symbolicate.
    pub stack_symbols: &'a [Option<String>],
    pub trace_scope: u32,
    /// Byte offset of this event's tag within the trace file.
    pub file_offset: u64,
}
