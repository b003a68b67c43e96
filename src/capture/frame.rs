use super::{CaptureError, SampleSource};

/// One analysis cycle's worth of audio, refilled in place every cycle.
pub struct FrameBuffer {
    bytes: Vec<u8>,
    samples: Vec<i16>,
}

impl FrameBuffer {
    pub fn new(frame_len: usize) -> Self {
        Self {
            bytes: vec![0; frame_len * 2],
            samples: vec![0; frame_len],
        }
    }

    /// Pull exactly one frame from the source and decode it. Any other byte
    /// count is an error and the partial data never reaches the analyzer.
    pub fn fill(&mut self, source: &mut dyn SampleSource) -> Result<&[i16], CaptureError> {
        let want = self.bytes.len();
        let got = source.read(&mut self.bytes)?;
        if got != want {
            return Err(CaptureError::ShortRead { got, want });
        }
        for (sample, pair) in self.samples.iter_mut().zip(self.bytes.chunks_exact(2)) {
            *sample = i16::from_le_bytes([pair[0], pair[1]]);
        }
        Ok(&self.samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Serves a fixed script of read results.
    struct ScriptedSource {
        reads: Vec<Result<Vec<u8>, CaptureError>>,
    }

    impl SampleSource for ScriptedSource {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, CaptureError> {
            let data = self.reads.remove(0)?;
            buf[..data.len()].copy_from_slice(&data);
            Ok(data.len())
        }
    }

    #[test]
    fn test_full_frame_decodes_little_endian() {
        let mut source = ScriptedSource {
            reads: vec![Ok(vec![0x34, 0x12, 0xFF, 0xFF])],
        };
        let mut frame = FrameBuffer::new(2);
        let samples = frame.fill(&mut source).unwrap();
        assert_eq!(samples, &[0x1234, -1]);
    }

    #[test]
    fn test_short_read_is_rejected() {
        let mut source = ScriptedSource {
            reads: vec![Ok(vec![0u8; 1000]), Ok(vec![1u8; 2048])],
        };
        let mut frame = FrameBuffer::new(1024);
        match frame.fill(&mut source) {
            Err(CaptureError::ShortRead { got, want }) => {
                assert_eq!(got, 1000);
                assert_eq!(want, 2048);
            }
            other => panic!("expected ShortRead, got {:?}", other),
        }
        // The next full read succeeds with none of the partial data kept
        let samples = frame.fill(&mut source).unwrap();
        assert_eq!(samples.len(), 1024);
        assert!(samples.iter().all(|&s| s == 0x0101));
    }

    #[test]
    fn test_source_errors_pass_through() {
        let mut source = ScriptedSource {
            reads: vec![Err(CaptureError::Exhausted)],
        };
        let mut frame = FrameBuffer::new(4);
        assert!(matches!(
            frame.fill(&mut source),
            Err(CaptureError::Exhausted)
        ));
    }
}
