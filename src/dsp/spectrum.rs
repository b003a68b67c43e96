use std::f32::consts::PI;
use std::sync::Arc;

use rustfft::{num_complex::Complex, Fft, FftPlanner};

/// Windowed forward FFT over one fixed-size sample frame.
///
/// The plan, window and working buffers are allocated once; `analyze` runs
/// without touching the heap.
pub struct SpectrumAnalyzer {
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    buf: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    mags: Vec<f32>,
    cutoff_bin: usize,
}

impl SpectrumAnalyzer {
    /// `cutoff_hz` is the top of the frequency range of interest; bins at
    /// and above it are zeroed after the transform so later aggregation
    /// never picks up out-of-range energy (the mirrored upper half
    /// included).
    pub fn new(frame_len: usize, sample_rate: u32, cutoff_hz: f32) -> Self {
        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(frame_len);
        let scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        let bin_width = sample_rate as f32 / frame_len as f32;
        let cutoff_bin = ((cutoff_hz / bin_width) as usize).min(frame_len);
        Self {
            fft,
            window: hamming_window(frame_len),
            buf: vec![Complex::new(0.0, 0.0); frame_len],
            scratch,
            mags: vec![0.0; frame_len],
            cutoff_bin,
        }
    }

    /// Window, transform and reduce one frame to its magnitude spectrum.
    ///
    /// The result has one magnitude per input sample, zero from the cutoff
    /// bin upward. The transform is unnormalized, so a full-scale tone sits
    /// well above the encoder floor.
    pub fn analyze(&mut self, frame: &[i16]) -> &[f32] {
        assert_eq!(frame.len(), self.buf.len(), "frame length mismatch");
        for (slot, (&sample, &coeff)) in self.buf.iter_mut().zip(frame.iter().zip(&self.window)) {
            *slot = Complex::new(sample as f32 * coeff, 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.buf, &mut self.scratch);
        for (mag, bin) in self.mags.iter_mut().zip(&self.buf) {
            *mag = bin.norm();
        }
        for mag in &mut self.mags[self.cutoff_bin..] {
            *mag = 0.0;
        }
        &self.mags
    }
}

/// Hamming window coefficients for a frame of `size` samples.
fn hamming_window(size: usize) -> Vec<f32> {
    (0..size)
        .map(|i| 0.54 - 0.46 * (2.0 * PI * i as f32 / (size - 1) as f32).cos())
        .collect()
}
