use std::io::{ErrorKind, Read};

use super::{CaptureError, SampleSource};

/// Raw signed 16-bit little-endian mono PCM from any byte stream: stdin, a
/// plain file, or a pre-configured serial character device.
pub struct RawPcmSource<R> {
    inner: R,
}

impl<R: Read> RawPcmSource<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: Read> SampleSource for RawPcmSource<R> {
    /// Reads until `buf` is full or the stream ends; blocking behavior is
    /// inherited from the underlying reader. EOF before the first byte is
    /// `Exhausted`, a trailing partial frame surfaces as a short count.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CaptureError> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(CaptureError::Io(e)),
            }
        }
        if filled == 0 {
            return Err(CaptureError::Exhausted);
        }
        Ok(filled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_fills_whole_buffer() {
        let mut source = RawPcmSource::new(Cursor::new(vec![7u8; 64]));
        let mut buf = [0u8; 16];
        assert_eq!(source.read(&mut buf).unwrap(), 16);
        assert_eq!(buf, [7u8; 16]);
    }

    #[test]
    fn test_trailing_partial_frame_is_short() {
        let mut source = RawPcmSource::new(Cursor::new(vec![1u8; 10]));
        let mut buf = [0u8; 16];
        assert_eq!(source.read(&mut buf).unwrap(), 10);
    }

    #[test]
    fn test_eof_is_exhausted() {
        let mut source = RawPcmSource::new(Cursor::new(Vec::new()));
        let mut buf = [0u8; 16];
        assert!(matches!(
            source.read(&mut buf),
            Err(CaptureError::Exhausted)
        ));
    }
}
