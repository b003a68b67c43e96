//! Frame analysis: windowed FFT, band aggregation and level encoding.

pub mod bands;
pub mod level;
pub mod spectrum;

pub use bands::BandTable;
pub use level::LevelScale;
pub use spectrum::SpectrumAnalyzer;
