use std::fmt::Write as _;
use std::io::{self, Write};

/// Framed text output: one `BINS:[v1,v2,...]` line per completed cycle,
/// two decimals per value.
///
/// The line is formatted into a reused buffer and written in one call, so a
/// cycle emits either all of its values or nothing. The stream is one-way
/// and unacknowledged; each frame is flushed and forgotten.
pub struct FrameSink<W> {
    inner: W,
    line: String,
}

impl<W: Write> FrameSink<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            line: String::new(),
        }
    }

    pub fn write_frame(&mut self, levels: &[f32]) -> io::Result<()> {
        self.line.clear();
        self.line.push_str("BINS:[");
        for (i, level) in levels.iter().enumerate() {
            if i > 0 {
                self.line.push(',');
            }
            let _ = write!(self.line, "{:.2}", level);
        }
        self.line.push_str("]\n");
        self.inner.write_all(self.line.as_bytes())?;
        self.inner.flush()
    }

    #[cfg(test)]
    pub fn get_ref(&self) -> &W {
        &self.inner
    }
}
