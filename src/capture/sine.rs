use std::f32::consts::PI;

use super::{CaptureError, SampleSource};

/// Endless synthetic test tone, for verifying the chain end to end: a tone
/// at a known frequency must light up the band containing it.
pub struct SineSource {
    step: f32,
    phase: f32,
    amplitude: f32,
}

impl SineSource {
    pub fn new(freq_hz: f32, sample_rate: u32, amplitude: f32) -> Self {
        Self {
            step: 2.0 * PI * freq_hz / sample_rate as f32,
            phase: 0.0,
            amplitude,
        }
    }
}

impl SampleSource for SineSource {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CaptureError> {
        for pair in buf.chunks_exact_mut(2) {
            let sample = (self.amplitude * self.phase.sin()) as i16;
            pair.copy_from_slice(&sample.to_le_bytes());
            self.phase += self.step;
            if self.phase > 2.0 * PI {
                self.phase -= 2.0 * PI;
            }
        }
        Ok(buf.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn samples(buf: &[u8]) -> Vec<i16> {
        buf.chunks_exact(2)
            .map(|p| i16::from_le_bytes([p[0], p[1]]))
            .collect()
    }

    #[test]
    fn test_phase_continues_across_reads() {
        let mut split = SineSource::new(440.0, 32_000, 10_000.0);
        let mut whole = SineSource::new(440.0, 32_000, 10_000.0);

        let mut buf_a = [0u8; 32];
        let mut buf_b = [0u8; 32];
        split.read(&mut buf_a).unwrap();
        split.read(&mut buf_b).unwrap();

        let mut buf = [0u8; 64];
        whole.read(&mut buf).unwrap();

        let mut joined = samples(&buf_a);
        joined.extend(samples(&buf_b));
        assert_eq!(joined, samples(&buf));
    }

    #[test]
    fn test_quarter_period_hits_peak() {
        // 8 kHz at 32 kHz puts every fourth sample at the amplitude peak
        let mut source = SineSource::new(8000.0, 32_000, 10_000.0);
        let mut buf = [0u8; 8];
        source.read(&mut buf).unwrap();
        let s = samples(&buf);
        assert_eq!(s[0], 0);
        assert!((s[1] - 10_000).abs() <= 1);
    }
}
