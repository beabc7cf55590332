use std::io::Write;

use crate::sim::*;

const TREE_GLYPH: &str = "🌲";
const FIRE_GLYPH: &str = "🔥";
const ASH_GLYPH: &str = "  ";

/// Moves the cursor home and clears the terminal.
const CLEAR_SCREEN: &str = "\x1b[H\x1b[2J";

/// Receives a copy of the grid after every completed tick.
///
/// Called on the engine thread; a slow sink delays the next tick.
pub trait RenderSink {
    fn present(&mut self, frame: &SimulationFrame);
}

impl<F: FnMut(&SimulationFrame)> RenderSink for F {
    fn present(&mut self, frame: &SimulationFrame) {
        self(frame)
    }
}

fn glyph(state: CellState) -> &'static str {
    match state {
        CellState::Unburnt => TREE_GLYPH,
        CellState::Burning => FIRE_GLYPH,
        CellState::Burnt => ASH_GLYPH,
    }
}

/// Render a frame as one line of glyphs per grid row.
pub fn render_text(frame: &SimulationFrame) -> String {
    frame
        .grid
        .iter_rows()
        .map(|row| row.iter().map(|c| glyph(*c)).collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Writes each frame as text to `out`.
pub struct TextSink<W: Write> {
    out: W,
    clear_screen: bool,
    status_line: bool,
}

impl<W: Write> TextSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            clear_screen: false,
            status_line: false,
        }
    }

    /// Clear the terminal before every frame so the grid redraws in place.
    pub fn clearing_screen(mut self, clear: bool) -> Self {
        self.clear_screen = clear;
        self
    }

    /// Follow each grid with a `tick N  burning X  burnt Y` line.
    pub fn showing_status(mut self, show: bool) -> Self {
        self.status_line = show;
        self
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_frame(&mut self, frame: &SimulationFrame) -> std::io::Result<()> {
        if self.clear_screen {
            self.out.write_all(CLEAR_SCREEN.as_bytes())?;
        }
        writeln!(self.out, "{}", render_text(frame))?;
        if self.status_line {
            writeln!(
                self.out,
                "tick {}  burning {}  burnt {}",
                frame.tick,
                frame.burning(),
                frame.burnt()
            )?;
        }
        self.out.flush()
    }
}

impl<W: Write> RenderSink for TextSink<W> {
    fn present(&mut self, frame: &SimulationFrame) {
        if let Err(e) = self.write_frame(frame) {
            log::warn!("failed to draw tick {}: {e}", frame.tick);
        }
    }
}
