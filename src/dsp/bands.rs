/// One band's span of spectrum bins, end-exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct BandSpan {
    start: usize,
    end: usize,
}

/// Fixed mapping from the magnitude spectrum onto perceptually spaced
/// frequency bands.
///
/// A table of B+1 increasing boundary frequencies defines B bands. Each
/// band's bin span is computed once at startup; boundaries, sample rate and
/// frame length never change while the pipeline runs.
pub struct BandTable {
    spans: Vec<BandSpan>,
}

impl BandTable {
    /// Build the bin span for every band. `bin_width` is the spectrum
    /// resolution in Hz (sample rate / frame length), `max_bin` the number
    /// of meaningful bins (frame length / 2).
    ///
    /// Spans are clamped two-sided: start into `[0, max_bin - 1]`, end into
    /// `[start + 1, max_bin]`. Every band therefore covers at least one bin
    /// and never reaches past `max_bin`, whatever the boundary values are.
    pub fn new(boundaries: &[f32], bin_width: f32, max_bin: usize) -> Self {
        assert!(max_bin > 0, "spectrum must have at least one bin");
        let to_bin = |hz: f32| (hz / bin_width).round() as usize;
        let spans = boundaries
            .windows(2)
            .map(|pair| {
                let start = to_bin(pair[0]).min(max_bin - 1);
                let end = to_bin(pair[1]).clamp(start + 1, max_bin);
                BandSpan { start, end }
            })
            .collect();
        Self { spans }
    }

    pub fn band_count(&self) -> usize {
        self.spans.len()
    }

    /// Mean magnitude per band, written into `out` (one slot per band).
    pub fn aggregate_into(&self, mags: &[f32], out: &mut [f32]) {
        assert_eq!(out.len(), self.spans.len(), "band count mismatch");
        for (slot, span) in out.iter_mut().zip(&self.spans) {
            let count = (span.end - span.start) as f32;
            let sum: f32 = mags[span.start..span.end].iter().sum();
            *slot = sum / count;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 32 kHz, 1024-sample frames
    const BIN_WIDTH: f32 = 31.25;
    const MAX_BIN: usize = 512;

    fn default_boundaries() -> Vec<f32> {
        vec![
            60.0, 100.0, 150.0, 200.0, 300.0, 400.0, 500.0, 650.0, 800.0, 1000.0, 1200.0, 1400.0,
            1600.0, 2000.0, 2400.0, 2800.0, 3200.0, 3600.0, 4000.0, 4500.0, 5000.0, 6000.0,
            7000.0, 8000.0,
        ]
    }

    #[test]
    fn test_band_count_is_boundaries_minus_one() {
        let table = BandTable::new(&default_boundaries(), BIN_WIDTH, MAX_BIN);
        assert_eq!(table.band_count(), 23);
    }

    #[test]
    fn test_spans_round_boundaries_to_bins() {
        let table = BandTable::new(&default_boundaries(), BIN_WIDTH, MAX_BIN);
        // 60 Hz / 31.25 = 1.92 -> bin 2, 100 Hz / 31.25 = 3.2 -> bin 3
        assert_eq!(table.spans[0], BandSpan { start: 2, end: 3 });
        // 7000 Hz -> bin 224, 8000 Hz -> bin 256
        assert_eq!(
            table.spans[22],
            BandSpan {
                start: 224,
                end: 256
            }
        );
    }

    #[test]
    fn test_spans_never_empty_or_out_of_range() {
        let table = BandTable::new(&default_boundaries(), BIN_WIDTH, MAX_BIN);
        for span in &table.spans {
            assert!(span.start < span.end);
            assert!(span.end <= MAX_BIN);
        }
    }

    #[test]
    fn test_coincident_boundaries_still_cover_one_bin() {
        let table = BandTable::new(&[100.0, 100.0, 101.0], BIN_WIDTH, MAX_BIN);
        assert_eq!(table.spans[0], BandSpan { start: 3, end: 4 });
        assert_eq!(table.spans[1], BandSpan { start: 3, end: 4 });
    }

    #[test]
    fn test_inverted_boundaries_clamp_forward() {
        let table = BandTable::new(&[200.0, 60.0], BIN_WIDTH, MAX_BIN);
        assert_eq!(table.spans[0], BandSpan { start: 6, end: 7 });
    }

    #[test]
    fn test_boundaries_past_nyquist_clamp_to_top_bin() {
        let table = BandTable::new(&[100_000.0, 200_000.0], BIN_WIDTH, MAX_BIN);
        assert_eq!(
            table.spans[0],
            BandSpan {
                start: 511,
                end: 512
            }
        );
    }

    #[test]
    fn test_aggregate_means_each_span() {
        // Bands [60,100) and [100,150) map to bins [2,3) and [3,5)
        let table = BandTable::new(&[60.0, 100.0, 150.0], BIN_WIDTH, MAX_BIN);
        assert_eq!(table.spans[1], BandSpan { start: 3, end: 5 });
        let mut mags = vec![0.0; MAX_BIN];
        mags[2] = 6.0;
        mags[3] = 1.0;
        mags[4] = 3.0;
        let mut out = vec![0.0; 2];
        table.aggregate_into(&mags, &mut out);
        assert_eq!(out[0], 6.0);
        assert_eq!(out[1], 2.0);
    }

    #[test]
    #[should_panic(expected = "band count mismatch")]
    fn test_aggregate_rejects_wrong_output_length() {
        let table = BandTable::new(&[60.0, 100.0, 150.0], BIN_WIDTH, MAX_BIN);
        let mags = vec![0.0; MAX_BIN];
        let mut out = vec![0.0; 5];
        table.aggregate_into(&mags, &mut out);
    }
}
