mod capture;
mod cli;
mod config;
mod dsp;
mod output;
mod pipeline;

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;

use capture::{DeviceSource, FileSource, RawPcmSource, SampleSource, SineSource};
use cli::Cli;
use output::FrameSink;
use pipeline::{Pipeline, Tick};

/// Amplitude of the --sine test tone, comfortably inside the i16 range.
const TEST_TONE_AMPLITUDE: f32 = 8000.0;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let cli = Cli::parse();

    // Load config: explicit --config path, or auto-detect melstream.toml / global config
    let config_path = cli.config.clone().or_else(|| {
        let local = std::path::PathBuf::from("melstream.toml");
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let xdg = home.join(".config").join("melstream").join("config.toml");
            if xdg.exists() {
                return Some(xdg);
            }
        }
        if let Some(config_dir) = dirs::config_dir() {
            let platform = config_dir.join("melstream").join("config.toml");
            if platform.exists() {
                return Some(platform);
            }
        }
        None
    });
    let mut cfg = config::Config::default();
    if let Some(ref path) = config_path {
        if let Some(loaded) = config::load_config(path) {
            log::info!("Loaded config from {}", path.display());
            cfg = loaded;
        } else {
            log::warn!("Failed to load config from {}", path.display());
        }
    }
    // Merge: CLI flags apply only when not at their defaults
    if cli.sample_rate != 32_000 {
        cfg.analysis.sample_rate = cli.sample_rate;
    }
    if cli.interval_ms != 10 {
        cfg.analysis.interval_ms = cli.interval_ms;
    }

    // List devices mode
    if cli.list_devices {
        return capture::list_devices();
    }

    // 1. Bring up the sample source; failures here are fatal
    let mut source: Box<dyn SampleSource> = if let Some(freq) = cli.sine {
        log::info!("Generating {} Hz test tone", freq);
        Box::new(SineSource::new(
            freq,
            cfg.analysis.sample_rate,
            TEST_TONE_AMPLITUDE,
        ))
    } else if let Some(ref input) = cli.input {
        if cli.raw {
            if input == Path::new("-") {
                log::info!("Reading raw PCM from stdin");
                Box::new(RawPcmSource::new(io::stdin().lock()))
            } else {
                let file = File::open(input)
                    .with_context(|| format!("Failed to open {}", input.display()))?;
                log::info!("Reading raw PCM from {}", input.display());
                Box::new(RawPcmSource::new(file))
            }
        } else {
            let (file_source, file_rate) = FileSource::open(input)?;
            if file_rate != cfg.analysis.sample_rate {
                log::info!("Using file sample rate {} Hz", file_rate);
                cfg.analysis.sample_rate = file_rate;
            }
            Box::new(file_source)
        }
    } else {
        Box::new(DeviceSource::open(
            cli.device.as_deref(),
            cfg.analysis.sample_rate,
            cfg.analysis.frame_len,
        )?)
    };

    cfg.validate()?;

    // 2. Output sink
    let writer: Box<dyn Write> = if cli.output == Path::new("-") {
        Box::new(io::stdout())
    } else {
        let file = File::create(&cli.output)
            .with_context(|| format!("Failed to open output {}", cli.output.display()))?;
        Box::new(file)
    };
    let mut sink = FrameSink::new(writer);

    // 3. Analysis pipeline
    let mut pipeline = Pipeline::new(&cfg);
    let boundaries = &cfg.bands.boundaries;
    log::info!(
        "Analyzing {} bands over {:.0}-{:.0} Hz, {}-sample frames @ {} Hz, every {} ms",
        boundaries.len() - 1,
        boundaries[0],
        boundaries[boundaries.len() - 1],
        cfg.analysis.frame_len,
        cfg.analysis.sample_rate,
        cfg.analysis.interval_ms
    );

    // 4. Run until the source is exhausted; live capture never is
    loop {
        match pipeline.tick(source.as_mut(), &mut sink)? {
            Tick::Finished => break,
            Tick::Idle => std::thread::yield_now(),
            Tick::Emitted | Tick::Skipped => {}
        }
    }

    log::info!("Sample source exhausted, stopping");
    Ok(())
}
