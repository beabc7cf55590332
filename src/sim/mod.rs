use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
    time::{Duration, Instant},
};

use arc_swap::ArcSwap;

use crate::{
    error::{InvalidStart, RunError},
    rendering::RenderSink,
};

mod grid;
mod params;
mod state;

pub use grid::{CellState, Grid, Position, SimulationFrame};
pub use params::{MAX_COLS, MAX_ROWS, SimulationParameters, StartConfig, TICK_INTERVAL};
pub use state::{EngineState, TickSummary};

/// How a run ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every cell that caught fire has burnt out.
    BurnedOut,
    /// The run was cancelled before the fire went out.
    Cancelled,
}

#[non_exhaustive]
#[derive(Default, Debug)]
pub struct SimulationStatistics {
    pub average_step_exec_time: Duration,
    pub segments: Vec<(&'static str, Duration)>,
}

/// Time spent in each part of the tick loop, summed over all ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct SegmentTimes {
    scan: Duration,
    publish: Duration,
}

impl SegmentTimes {
    /// Per-tick averages, named the way they are reported.
    fn averaged(self, iter_count: u32) -> Vec<(&'static str, Duration)> {
        let avg = |total: Duration| total.checked_div(iter_count).unwrap_or_default();
        vec![("scan", avg(self.scan)), ("publish", avg(self.publish))]
    }
}

/// Summary returned once the engine thread has exited.
#[derive(Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub ticks: u64,
    /// Number of cells left as ash.
    pub burnt: usize,
    pub statistics: SimulationStatistics,
}

/// A cloneable handle that can stop a run from anywhere.
#[derive(Clone, Debug)]
pub struct CancelToken {
    stop: Arc<AtomicBool>,
}

impl CancelToken {
    /// Ask the engine to stop at the next tick boundary. Calling this more
    /// than once has no further effect.
    pub fn cancel(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }
}

/// A running simulation. Dropping the handle lets the fire run to completion
/// in the background.
pub struct RunHandle {
    stop: CancelToken,
    latest_frame: Arc<ArcSwap<SimulationFrame>>,
    join_handle: thread::JoinHandle<RunReport>,
}

/// Validate `config` and start ticking on a dedicated engine thread.
///
/// Nothing is spawned and `sink` never sees a frame if the configuration is
/// rejected.
pub fn spawn_simulation<S>(config: &StartConfig, sink: S) -> Result<RunHandle, InvalidStart>
where
    S: RenderSink + Send + 'static,
{
    let state = EngineState::new(config, Instant::now())?;
    let parameters = config.parameters;
    let stop = CancelToken {
        stop: Arc::new(AtomicBool::new(false)),
    };
    let latest_frame = Arc::new(ArcSwap::from_pointee(state.snapshot()));

    log::info!(
        "starting {}x{} simulation with {} ignition point(s), p = {}, burn = {:?}",
        config.rows,
        config.cols,
        state.burning_count(),
        parameters.ignition_probability(),
        parameters.burn_duration(),
    );

    let s = stop.clone();
    let l = Arc::clone(&latest_frame);
    let handle = thread::spawn(move || sim_thread(state, parameters, s, l, sink));
    Ok(RunHandle {
        stop,
        latest_frame,
        join_handle: handle,
    })
}

impl RunHandle {
    /// Stop at the next tick boundary. Idempotent.
    pub fn cancel(&self) {
        self.stop.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.stop.clone()
    }

    /// The most recently completed tick, or the ignition layout if no tick
    /// has finished yet.
    pub fn latest_frame(&self) -> Arc<SimulationFrame> {
        self.latest_frame.load_full()
    }

    pub fn is_finished(&self) -> bool {
        self.join_handle.is_finished()
    }

    /// Block until the engine thread exits.
    pub fn join(self) -> Result<RunReport, RunError> {
        self.join_handle
            .join()
            .map_err(|_| RunError::EnginePanicked)
    }
}

fn sim_thread<S: RenderSink>(
    mut state: EngineState,
    parameters: SimulationParameters,
    stop: CancelToken,
    latest_frame: Arc<ArcSwap<SimulationFrame>>,
    mut sink: S,
) -> RunReport {
    let mut rng = fastrand::Rng::new();
    let mut segments = SegmentTimes::default();
    let mut total_time = Duration::ZERO;
    let mut iter_count: u32 = 0;

    // Cancellation is only observed here, before any of the tick's mutations.
    while !stop.is_cancelled() && !state.is_extinguished() {
        let tick_start = Instant::now();

        let summary = state.tick(&parameters, tick_start, &mut rng);
        let scanned = tick_start.elapsed();

        let frame = Arc::new(state.snapshot());
        sink.present(&frame);
        latest_frame.store(frame);
        let published = tick_start.elapsed();

        log::debug!(
            "tick {}: {} ignited, {} burnt out, {} burning, {} burnt",
            state.ticks(),
            summary.ignited,
            summary.burnt_out,
            state.burning_count(),
            state.burnt_count(),
        );

        segments.scan += scanned;
        segments.publish += published - scanned;
        total_time += published;
        iter_count += 1;

        if state.is_extinguished() {
            break;
        }
        if let Some(to_wait) = TICK_INTERVAL.checked_sub(tick_start.elapsed()) {
            thread::sleep(to_wait);
        }
    }

    let outcome = if state.is_extinguished() {
        RunOutcome::BurnedOut
    } else {
        RunOutcome::Cancelled
    };
    match outcome {
        RunOutcome::BurnedOut => log::info!(
            "fire burned out after {} tick(s), {} cell(s) burnt",
            state.ticks(),
            state.burnt_count()
        ),
        RunOutcome::Cancelled => log::info!(
            "simulation cancelled after {} tick(s) with {} cell(s) still burning",
            state.ticks(),
            state.burning_count()
        ),
    }

    RunReport {
        outcome,
        ticks: state.ticks(),
        burnt: state.burnt_count(),
        statistics: SimulationStatistics {
            average_step_exec_time: total_time.checked_div(iter_count).unwrap_or_default(),
            segments: segments.averaged(iter_count),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segment_times_average_by_name() {
        let totals = SegmentTimes {
            scan: Duration::from_millis(30),
            publish: Duration::from_millis(9),
        };
        assert_eq!(
            totals.averaged(3),
            vec![
                ("scan", Duration::from_millis(10)),
                ("publish", Duration::from_millis(3))
            ]
        );
    }

    #[test]
    fn segment_times_without_ticks_are_zero() {
        let averaged = SegmentTimes::default().averaged(0);
        assert_eq!(
            averaged,
            vec![("scan", Duration::ZERO), ("publish", Duration::ZERO)]
        );
    }
}
