//! Primitive little-endian encode/decode, mirroring `IO_UINT32`/`IO_STRING`/
//! etc. from the original C recorder: fixed-width integers, floats and
//! doubles transmitted as their IEEE-754 bit pattern, and length-prefixed
//! strings/blobs with a sentinel length standing in for "absent".

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{WireError, WireResult};

/// Sentinel `u64` length meaning "this string/blob is absent", distinct
/// from a present-but-empty string.
pub const ABSENT_LEN: u64 = u64::MAX;

pub struct Writer<W> {
    inner: W,
}

impl<W: Write> Writer<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    pub fn write_u32(&mut self, v: u32) -> WireResult<()> {
        self.inner.write_u32::<LittleEndian>(v)?;
        Ok(())
    }

    pub fn write_i32(&mut self, v: i32) -> WireResult<()> {
        self.inner.write_i32::<LittleEndian>(v)?;
        Ok(())
    }

    pub fn write_u64(&mut self, v: u64) -> WireResult<()> {
        self.inner.write_u64::<LittleEndian>(v)?;
        Ok(())
    }

    pub fn write_f32(&mut self, v: f32) -> WireResult<()> {
        self.inner.write_u32::<LittleEndian>(v.to_bits())?;
        Ok(())
    }

    pub fn write_f64(&mut self, v: f64) -> WireResult<()> {
        self.inner.write_u64::<LittleEndian>(v.to_bits())?;
        Ok(())
    }

    pub fn write_bool(&mut self, v: bool) -> WireResult<()> {
        self.write_u32(v as u32)
    }

    /// A pointer's identity, transmitted as a raw 64-bit value. Never
    /// dereferenced on the reading side.
    pub fn write_ptr(&mut self, v: u64) -> WireResult<()> {
        self.write_u64(v)
    }

    pub fn write_string(&mut self, s: Option<&str>) -> WireResult<()> {
        match s {
            None => self.write_u64(ABSENT_LEN),
            Some(s) => {
                self.write_u64(s.len() as u64)?;
                if !s.is_empty() {
                    self.inner.write_all(s.as_bytes())?;
                }
                Ok(())
            }
        }
    }

    pub fn write_blob(&mut self, data: Option<&[u8]>) -> WireResult<()> {
        match data {
            None => self.write_u64(ABSENT_LEN),
            Some(data) => {
                self.write_u64(data.len() as u64)?;
                if !data.is_empty() {
                    self.inner.write_all(data)?;
                }
                Ok(())
            }
        }
    }

    /// A 32-bit count prefix followed by `n` floats, for array-shaped
    /// arguments (e.g. `AL_POSITION` triples, orientation sextuples).
    pub fn write_f32_array(&mut self, vals: &[f32]) -> WireResult<()> {
        self.write_u32(vals.len() as u32)?;
        for &v in vals {
            self.write_f32(v)?;
        }
        Ok(())
    }

    pub fn write_i32_array(&mut self, vals: &[i32]) -> WireResult<()> {
        self.write_u32(vals.len() as u32)?;
        for &v in vals {
            self.write_i32(v)?;
        }
        Ok(())
    }

    pub fn write_u32_array(&mut self, vals: &[u32]) -> WireResult<()> {
        self.write_u32(vals.len() as u32)?;
        for &v in vals {
            self.write_u32(v)?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> WireResult<()> {
        self.inner.flush()?;
        Ok(())
    }
}

pub struct Reader<R> {
    inner: R,
}

impl<R: Read> Reader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    fn short_read_to_wire(expected: usize, e: std::io::Error) -> WireError {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            WireError::ShortRead { expected, got: 0 }
        } else {
            WireError::Io(e)
        }
    }

    pub fn read_u32(&mut self) -> WireResult<u32> {
        self.inner
            .read_u32::<LittleEndian>()
            .map_err(|e| Self::short_read_to_wire(4, e))
    }

    pub fn read_i32(&mut self) -> WireResult<i32> {
        self.inner
            .read_i32::<LittleEndian>()
            .map_err(|e| Self::short_read_to_wire(4, e))
    }

    pub fn read_u64(&mut self) -> WireResult<u64> {
        self.inner
            .read_u64::<LittleEndian>()
            .map_err(|e| Self::short_read_to_wire(8, e))
    }

    pub fn read_f32(&mut self) -> WireResult<f32> {
        let bits = self
            .inner
            .read_u32::<LittleEndian>()
            .map_err(|e| Self::short_read_to_wire(4, e))?;
        Ok(f32::from_bits(bits))
    }

    pub fn read_f64(&mut self) -> WireResult<f64> {
        let bits = self
            .inner
            .read_u64::<LittleEndian>()
            .map_err(|e| Self::short_read_to_wire(8, e))?;
        Ok(f64::from_bits(bits))
    }

    pub fn read_bool(&mut self) -> WireResult<bool> {
        Ok(self.read_u32()? != 0)
    }

    pub fn read_ptr(&mut self) -> WireResult<u64> {
        self.read_u64()
    }

    pub fn read_string(&mut self) -> WireResult<Option<String>> {
        let len = self.read_u64()?;
        if len == ABSENT_LEN {
            return Ok(None);
        }
        let len = len as usize;
        let mut buf = vec![0u8; len];
        self.inner
            .read_exact(&mut buf)
            .map_err(|e| Self::short_read_to_wire(len, e))?;
        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    pub fn read_blob(&mut self) -> WireResult<Option<Vec<u8>>> {
        let len = self.read_u64()?;
        if len == ABSENT_LEN {
            return Ok(None);
        }
        let len = len as usize;
        let mut buf = vec![0u8; len];
        self.inner
            .read_exact(&mut buf)
            .map_err(|e| Self::short_read_to_wire(len, e))?;
        Ok(Some(buf))
    }

    pub fn read_f32_array(&mut self) -> WireResult<Vec<f32>> {
        let n = self.read_u32()? as usize;
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.read_f32()?);
        }
        Ok(out)
    }

    pub fn read_i32_array(&mut self) -> WireResult<Vec<i32>> {
        let n = self.read_u32()? as usize;
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.read_i32()?);
        }
        Ok(out)
    }

    pub fn read_u32_array(&mut self) -> WireResult<Vec<u32>> {
        let n = self.read_u32()? as usize;
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            out.push(self.read_u32()?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn string_roundtrip_including_absent() {
        let mut buf = Vec::new();
        {
            let mut w = Writer::new(&mut buf);
            w.write_string(Some("hello")).unwrap();
            w.write_string(Some("")).unwrap();
            w.write_string(None).unwrap();
        }
        let mut r = Reader::new(Cursor::new(buf));
        assert_eq!(r.read_string().unwrap().as_deref(), Some("hello"));
        assert_eq!(r.read_string().unwrap().as_deref(), Some(""));
        assert_eq!(r.read_string().unwrap(), None);
    }

    #[test]
    fn float_roundtrip_is_bit_exact() {
        let mut buf = Vec::new();
        Writer::new(&mut buf).write_f32(-0.0).unwrap();
        let v = Reader::new(Cursor::new(buf)).read_f32().unwrap();
        assert_eq!(v.to_bits(), (-0.0f32).to_bits());
    }

    #[test]
    fn short_read_is_reported() {
        let buf = vec![1u8, 2, 3];
        let err = Reader::new(Cursor::new(buf)).read_u64().unwrap_err();
        assert!(matches!(err, WireError::ShortRead { .. }));
    }
}
