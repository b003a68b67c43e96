//! Sample acquisition: the sources the analyzer reads from.
//!
//! Sources deal in raw bytes (signed 16-bit little-endian mono samples) and
//! may block until they can serve data. The pipeline requires exactly one
//! full frame per read and abandons the cycle on anything else.

mod device;
mod file;
mod frame;
mod raw;
mod sine;

pub use device::{list_devices, DeviceSource};
pub use file::FileSource;
pub use frame::FrameBuffer;
pub use raw::RawPcmSource;
pub use sine::SineSource;

use thiserror::Error;

/// Why a capture attempt produced no usable frame.
#[derive(Debug, Error)]
pub enum CaptureError {
    /// The source returned a byte count other than one full frame. The
    /// partial data is discarded.
    #[error("short read: got {got} bytes, want {want}")]
    ShortRead { got: usize, want: usize },
    /// A finite source has cleanly run out of data.
    #[error("sample source exhausted")]
    Exhausted,
    #[error("sample source I/O error")]
    Io(#[from] std::io::Error),
    /// The capture stream reported a failure (device lost, overrun, ...).
    #[error("capture device error: {0}")]
    Device(String),
}

/// Blocking byte-oriented sample supply, polled once per analysis cycle.
pub trait SampleSource {
    /// Fill as much of `buf` as the source allows and return the byte
    /// count. Blocking until data is available is the source's own policy;
    /// live sources pace the pipeline through it.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, CaptureError>;
}
