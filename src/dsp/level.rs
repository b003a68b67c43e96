/// Linear magnitude to decibel conversion with a fixed dynamic range.
///
/// Magnitudes are floored before the log so silence maps to a finite value,
/// then clamped into `[min_db, max_db]`. With the default range of 0..120 dB
/// a silent band encodes as exactly `min_db`.
#[derive(Clone, Copy, Debug)]
pub struct LevelScale {
    floor: f32,
    min_db: f32,
    max_db: f32,
}

impl LevelScale {
    pub fn new(floor: f32, min_db: f32, max_db: f32) -> Self {
        Self {
            floor,
            min_db,
            max_db,
        }
    }

    /// Encode one band magnitude as clamped decibels.
    pub fn encode(&self, magnitude: f32) -> f32 {
        let mag = magnitude.abs().max(self.floor);
        (20.0 * mag.log10()).clamp(self.min_db, self.max_db)
    }
}
