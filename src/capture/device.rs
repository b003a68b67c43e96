use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex};

use anyhow::{anyhow, bail, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::SampleFormat;

use super::{CaptureError, SampleSource};

/// Frames of headroom in the capture ring before the oldest audio is
/// dropped.
const RING_FRAMES: usize = 8;

struct Ring {
    buf: VecDeque<u8>,
    capacity: usize,
    frame_bytes: usize,
    failed: Option<String>,
}

struct Shared {
    ring: Mutex<Ring>,
    ready: Condvar,
}

/// Append converted samples to the ring, evicting whole frames when full so
/// the byte stream stays sample-aligned.
fn push_samples(shared: &Shared, samples: impl Iterator<Item = i16>) {
    let mut ring = shared.ring.lock().unwrap();
    for sample in samples {
        ring.buf.extend(sample.to_le_bytes());
    }
    while ring.buf.len() > ring.capacity {
        let excess = ring.frame_bytes.min(ring.buf.len());
        ring.buf.drain(..excess);
    }
    drop(ring);
    shared.ready.notify_all();
}

fn fail(shared: &Shared, err: cpal::StreamError) {
    let mut ring = shared.ring.lock().unwrap();
    ring.failed = Some(err.to_string());
    drop(ring);
    shared.ready.notify_all();
}

/// Live capture from an input device.
///
/// The cpal callback thread downmixes to mono i16 and feeds a bounded byte
/// ring; `read` blocks until a full request can be served. If the callbacks
/// outpace the reader the oldest frames are dropped, the reader always gets
/// the freshest audio.
pub struct DeviceSource {
    shared: Arc<Shared>,
    _stream: cpal::Stream,
}

impl DeviceSource {
    /// One-time bring-up of the capture stream: device lookup, rate check,
    /// stream build and start. Failing here is fatal to the process; no
    /// cycles run without a configured stream.
    pub fn open(name: Option<&str>, sample_rate: u32, frame_len: usize) -> Result<Self> {
        let host = cpal::default_host();
        let device = match name {
            Some(want) => host
                .input_devices()
                .context("Failed to enumerate input devices")?
                .find(|d| d.name().map(|n| n == want).unwrap_or(false))
                .ok_or_else(|| {
                    anyhow!("Input device '{}' not found (try --list-devices)", want)
                })?,
            None => host
                .default_input_device()
                .context("No default input device available")?,
        };
        let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());

        let supported = device
            .supported_input_configs()
            .context("Failed to query input configs")?
            .find(|range| {
                range.min_sample_rate().0 <= sample_rate
                    && sample_rate <= range.max_sample_rate().0
                    && matches!(
                        range.sample_format(),
                        SampleFormat::F32 | SampleFormat::I16 | SampleFormat::U16
                    )
            })
            .ok_or_else(|| {
                anyhow!(
                    "Device '{}' does not support {} Hz capture",
                    device_name,
                    sample_rate
                )
            })?
            .with_sample_rate(cpal::SampleRate(sample_rate));

        let channels = supported.channels() as usize;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        let frame_bytes = frame_len * 2;
        let shared = Arc::new(Shared {
            ring: Mutex::new(Ring {
                buf: VecDeque::with_capacity(frame_bytes * RING_FRAMES),
                capacity: frame_bytes * RING_FRAMES,
                frame_bytes,
                failed: None,
            }),
            ready: Condvar::new(),
        });

        let stream = match sample_format {
            SampleFormat::F32 => {
                let writer = Arc::clone(&shared);
                let on_error = Arc::clone(&shared);
                device.build_input_stream(
                    &config,
                    move |data: &[f32], _: &cpal::InputCallbackInfo| {
                        push_samples(
                            &writer,
                            data.chunks_exact(channels).map(|frame| {
                                let mono: f32 = frame.iter().sum::<f32>() / channels as f32;
                                (mono.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
                            }),
                        );
                    },
                    move |err| fail(&on_error, err),
                    None,
                )
            }
            SampleFormat::I16 => {
                let writer = Arc::clone(&shared);
                let on_error = Arc::clone(&shared);
                device.build_input_stream(
                    &config,
                    move |data: &[i16], _: &cpal::InputCallbackInfo| {
                        push_samples(
                            &writer,
                            data.chunks_exact(channels).map(|frame| {
                                let sum: i32 = frame.iter().map(|&s| s as i32).sum();
                                (sum / channels as i32) as i16
                            }),
                        );
                    },
                    move |err| fail(&on_error, err),
                    None,
                )
            }
            SampleFormat::U16 => {
                let writer = Arc::clone(&shared);
                let on_error = Arc::clone(&shared);
                device.build_input_stream(
                    &config,
                    move |data: &[u16], _: &cpal::InputCallbackInfo| {
                        push_samples(
                            &writer,
                            data.chunks_exact(channels).map(|frame| {
                                let sum: u32 = frame.iter().map(|&s| s as u32).sum();
                                ((sum / channels as u32) as i32 - 32_768) as i16
                            }),
                        );
                    },
                    move |err| fail(&on_error, err),
                    None,
                )
            }
            other => bail!("Unsupported device sample format: {}", other),
        }
        .context("Failed to build input stream")?;

        stream.play().context("Failed to start capture stream")?;

        log::info!(
            "Capturing from '{}': {} Hz, {} channel(s), {}",
            device_name,
            sample_rate,
            channels,
            sample_format
        );

        Ok(Self {
            shared,
            _stream: stream,
        })
    }
}

impl SampleSource for DeviceSource {
    /// Blocks until the ring holds a full request. The blocking read is
    /// what paces the pipeline to real time on live input.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CaptureError> {
        let want = buf.len();
        let mut ring = self.shared.ring.lock().unwrap();
        loop {
            // Sticky: a failed stream keeps reporting instead of blocking
            // on a condvar nothing will signal again.
            if let Some(msg) = &ring.failed {
                return Err(CaptureError::Device(msg.clone()));
            }
            if ring.buf.len() >= want {
                for (dst, src) in buf.iter_mut().zip(ring.buf.drain(..want)) {
                    *dst = src;
                }
                return Ok(want);
            }
            ring = self.shared.ready.wait(ring).unwrap();
        }
    }
}

/// Print the capture devices cpal can see.
pub fn list_devices() -> Result<()> {
    let host = cpal::default_host();
    let default_name = host.default_input_device().and_then(|d| d.name().ok());
    println!("Available input devices:");
    for device in host
        .input_devices()
        .context("Failed to enumerate input devices")?
    {
        let name = device.name().unwrap_or_else(|_| "unknown".to_string());
        let marker = if Some(&name) == default_name.as_ref() {
            " (default)"
        } else {
            ""
        };
        match device.default_input_config() {
            Ok(cfg) => println!(
                "  {:<40} {} Hz, {} ch{}",
                name,
                cfg.sample_rate().0,
                cfg.channels(),
                marker
            ),
            Err(_) => println!("  {:<40} (unavailable){}", name, marker),
        }
    }
    Ok(())
}
