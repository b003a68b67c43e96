use std::path::Path;

use anyhow::{Context, Result};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use super::{CaptureError, SampleSource};

/// Replays a decoded audio file through the analyzer: the whole file is
/// decoded to mono i16 up front, then served frame by frame until exhausted.
pub struct FileSource {
    samples: Vec<i16>,
    pos: usize,
}

impl FileSource {
    /// Decode `path` entirely. Returns the source and the file's native
    /// sample rate, which the analysis adopts for this run.
    pub fn open(path: &Path) -> Result<(Self, u32)> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("Failed to open audio file: {}", path.display()))?;

        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .context("Failed to probe audio format")?;

        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != symphonia::core::codecs::CODEC_TYPE_NULL)
            .context("No audio tracks found")?;

        let track_id = track.id;
        let channels = track.codec_params.channels.map_or(1, |c| c.count());
        let sample_rate = track
            .codec_params
            .sample_rate
            .context("Unknown sample rate")?;

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .context("Failed to create audio decoder")?;

        let mut samples: Vec<i16> = Vec::new();

        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(symphonia::core::errors::Error::IoError(ref e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(e) => return Err(e.into()),
            };

            if packet.track_id() != track_id {
                continue;
            }

            let decoded = match decoder.decode(&packet) {
                Ok(d) => d,
                Err(symphonia::core::errors::Error::DecodeError(_)) => continue,
                Err(e) => return Err(e.into()),
            };

            let spec = *decoded.spec();
            let num_frames = decoded.frames();

            let mut sample_buf = SampleBuffer::<f32>::new(num_frames as u64, spec);
            sample_buf.copy_interleaved_ref(decoded);

            // Downmix to mono and rescale to the wire's 16-bit range
            for frame in sample_buf.samples().chunks(channels) {
                let mono: f32 = frame.iter().sum::<f32>() / channels as f32;
                samples.push((mono.clamp(-1.0, 1.0) * i16::MAX as f32) as i16);
            }
        }

        log::info!(
            "Decoded {}: {} samples, {}Hz, {:.1}s",
            path.display(),
            samples.len(),
            sample_rate,
            samples.len() as f32 / sample_rate as f32
        );

        Ok((Self { samples, pos: 0 }, sample_rate))
    }
}

impl SampleSource for FileSource {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CaptureError> {
        let remaining = self.samples.len() - self.pos;
        if remaining == 0 {
            return Err(CaptureError::Exhausted);
        }
        let take = (buf.len() / 2).min(remaining);
        for (pair, &sample) in buf
            .chunks_exact_mut(2)
            .zip(&self.samples[self.pos..self.pos + take])
        {
            pair.copy_from_slice(&sample.to_le_bytes());
        }
        self.pos += take;
        Ok(take * 2)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source_of(samples: Vec<i16>) -> FileSource {
        FileSource { samples, pos: 0 }
    }

    #[test]
    fn test_serves_frames_then_exhausts() {
        let mut source = source_of(vec![1, 2, 3, 4]);
        let mut buf = [0u8; 4];

        assert_eq!(source.read(&mut buf).unwrap(), 4);
        assert_eq!(buf, [1, 0, 2, 0]);
        assert_eq!(source.read(&mut buf).unwrap(), 4);
        assert_eq!(buf, [3, 0, 4, 0]);
        assert!(matches!(
            source.read(&mut buf),
            Err(CaptureError::Exhausted)
        ));
    }

    #[test]
    fn test_trailing_partial_frame_is_short() {
        let mut source = source_of(vec![5, 6, 7]);
        let mut buf = [0u8; 8];
        assert_eq!(source.read(&mut buf).unwrap(), 6);
        assert!(matches!(
            source.read(&mut buf),
            Err(CaptureError::Exhausted)
        ));
    }
}
