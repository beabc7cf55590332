//! Probabilistic wildfire spread on a small 2-D grid.
//!
//! Cells start as trees, catch fire from burning neighbors with a fixed
//! per-tick probability, burn for a fixed duration and are left as ash. A run
//! ticks every [`TICK_INTERVAL`] on its own thread until the fire goes out or
//! it is cancelled, handing a copy of the grid to a [`RenderSink`] after every
//! tick.

pub mod error;
pub mod layout;
pub mod rendering;
pub mod sim;

pub use error::{InvalidStart, RunError};
pub use layout::IgnitionLayout;
pub use rendering::{RenderSink, TextSink, render_text};
pub use sim::{
    CancelToken, CellState, Position, RunHandle, RunOutcome, RunReport, SimulationFrame,
    SimulationParameters, StartConfig, TICK_INTERVAL,
};

/// Start a run. See [`sim::spawn_simulation`].
pub fn start<S>(config: &StartConfig, sink: S) -> Result<RunHandle, InvalidStart>
where
    S: RenderSink + Send + 'static,
{
    sim::spawn_simulation(config, sink)
}
