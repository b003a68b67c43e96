use serde::Deserialize;
use std::path::PathBuf;

use anyhow::{bail, Result};

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub analysis: AnalysisConfig,
    #[serde(default)]
    pub bands: BandConfig,
    #[serde(default)]
    pub levels: LevelConfig,
}

#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_frame_len")]
    pub frame_len: usize,
    /// Top of the frequency range of interest; spectrum above it is
    /// discarded before aggregation.
    #[serde(default = "default_max_frequency")]
    pub max_frequency: f32,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

#[derive(Debug, Deserialize)]
pub struct BandConfig {
    /// B+1 increasing boundary frequencies in Hz defining B bands.
    #[serde(default = "default_boundaries")]
    pub boundaries: Vec<f32>,
}

#[derive(Debug, Deserialize)]
pub struct LevelConfig {
    /// Smallest magnitude fed into the dB conversion.
    #[serde(default = "default_floor")]
    pub floor: f32,
    #[serde(default = "default_min_db")]
    pub min_db: f32,
    #[serde(default = "default_max_db")]
    pub max_db: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            sample_rate: default_sample_rate(),
            frame_len: default_frame_len(),
            max_frequency: default_max_frequency(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl Default for BandConfig {
    fn default() -> Self {
        Self {
            boundaries: default_boundaries(),
        }
    }
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            floor: default_floor(),
            min_db: default_min_db(),
            max_db: default_max_db(),
        }
    }
}

fn default_sample_rate() -> u32 { 32_000 }
fn default_frame_len() -> usize { 1024 }
fn default_max_frequency() -> f32 { 8000.0 }
fn default_interval_ms() -> u64 { 10 }
fn default_floor() -> f32 { 1e-6 }
fn default_min_db() -> f32 { 0.0 }
fn default_max_db() -> f32 { 120.0 }

fn default_boundaries() -> Vec<f32> {
    vec![
        60.0, 100.0, 150.0, 200.0, 300.0, 400.0, 500.0, 650.0, 800.0, 1000.0, 1200.0, 1400.0,
        1600.0, 2000.0, 2400.0, 2800.0, 3200.0, 3600.0, 4000.0, 4500.0, 5000.0, 6000.0, 7000.0,
        8000.0,
    ]
}

impl Config {
    /// Reject configurations the pipeline cannot run with. Everything here
    /// is checked once at startup; the pipeline itself assumes a valid
    /// configuration.
    pub fn validate(&self) -> Result<()> {
        let analysis = &self.analysis;
        if analysis.sample_rate == 0 {
            bail!("analysis.sample_rate must be positive");
        }
        if analysis.frame_len < 2 || !analysis.frame_len.is_power_of_two() {
            bail!(
                "analysis.frame_len must be a power of two (got {})",
                analysis.frame_len
            );
        }
        if analysis.interval_ms == 0 {
            bail!("analysis.interval_ms must be positive");
        }
        let nyquist = analysis.sample_rate as f32 / 2.0;
        if analysis.max_frequency <= 0.0 || analysis.max_frequency > nyquist {
            bail!(
                "analysis.max_frequency must be in (0, {}] Hz for a {} Hz sample rate",
                nyquist,
                analysis.sample_rate
            );
        }

        let boundaries = &self.bands.boundaries;
        if boundaries.len() < 2 {
            bail!(
                "bands.boundaries needs at least 2 entries (got {})",
                boundaries.len()
            );
        }
        if boundaries[0] < 0.0 {
            bail!("bands.boundaries must be non-negative");
        }
        if boundaries.windows(2).any(|pair| pair[1] <= pair[0]) {
            bail!("bands.boundaries must be strictly increasing");
        }

        if self.levels.floor <= 0.0 {
            bail!("levels.floor must be positive");
        }
        if self.levels.min_db >= self.levels.max_db {
            bail!("levels.min_db must be below levels.max_db");
        }

        // The cutoff bin truncates while band edges round, so a top
        // boundary can round one bin past the cutoff and the last band then
        // averages in zeroed bins. Tolerated, but worth a warning.
        let bin_width = analysis.sample_rate as f32 / analysis.frame_len as f32;
        let cutoff_bin = (analysis.max_frequency / bin_width) as usize;
        let top = boundaries[boundaries.len() - 1];
        let last_end = (top / bin_width).round() as usize;
        if last_end > cutoff_bin {
            log::warn!(
                "Top band boundary {:.0} Hz reaches bin {} but bins are zeroed from {} up; the last band will read low",
                top,
                last_end,
                cutoff_bin
            );
        }

        Ok(())
    }
}

pub fn load_config(path: &PathBuf) -> Option<Config> {
    let content = std::fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}
