use std::io::Write;

use anyhow::{Context, Result as AnyResult};
use gridcast_rendering::{AsciiFrame, ColumnStrip, DepthBuffer, RenderingBackend, Viewport};

/// Writes each presented frame as text to a byte sink.
pub(crate) struct TerminalBackend<W> {
    out: W,
    viewport: Viewport,
    max_depth: f32,
}

impl<W: Write> TerminalBackend<W> {
    pub(crate) fn new(out: W, viewport: Viewport, max_depth: f32) -> Self {
        Self {
            out,
            viewport,
            max_depth,
        }
    }
}

impl<W: Write> RenderingBackend for TerminalBackend<W> {
    fn present(&mut self, strips: &[ColumnStrip], _depth: &DepthBuffer) -> AnyResult<()> {
        let frame = AsciiFrame::render(strips, self.viewport, self.max_depth);
        write!(self.out, "{frame}").context("failed to write frame")?;
        self.out.flush().context("failed to flush frame")
    }
}
