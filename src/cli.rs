use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "melstream",
    about = "Streams banded spectrum levels from an audio source as text frames"
)]
pub struct Cli {
    /// Input audio file to replay (WAV, MP3, FLAC, OGG). Captures from an
    /// input device when omitted.
    pub input: Option<PathBuf>,

    /// Treat the input as raw signed 16-bit little-endian mono PCM
    /// ("-" reads stdin)
    #[arg(long, requires = "input")]
    pub raw: bool,

    /// Generate a test tone at this frequency instead of capturing
    #[arg(long, value_name = "HZ", conflicts_with = "input")]
    pub sine: Option<f32>,

    /// Capture device name (defaults to the system input device)
    #[arg(short, long)]
    pub device: Option<String>,

    /// List available capture devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Where frames are written: "-" for stdout, or a path such as a
    /// serial character device
    #[arg(short, long, default_value = "-")]
    pub output: PathBuf,

    /// Capture sample rate in Hz
    #[arg(long, default_value_t = 32000)]
    pub sample_rate: u32,

    /// Minimum milliseconds between analysis frames
    #[arg(long, default_value_t = 10)]
    pub interval_ms: u64,

    /// Config file (default: ./melstream.toml or the user config directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
