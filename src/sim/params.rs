use std::time::Duration;

use crate::error::InvalidStart;

use super::Position;

/// Wall time between two ticks.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

pub const MAX_ROWS: usize = 30;
pub const MAX_COLS: usize = 70;

/// The parameters controlling the simulation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationParameters {
    /// The chance (0 - 1] that an unburnt cell next to a burning one catches
    /// fire on a given tick. Rolled again on every tick the neighbor burns.
    ignition_probability: f64,
    /// How long a cell burns before it turns to ash
    burn_duration: Duration,
}

impl SimulationParameters {
    pub fn new(
        ignition_probability: f64,
        burn_duration: Duration,
    ) -> Result<SimulationParameters, InvalidStart> {
        // Written so that NaN fails too.
        if !(ignition_probability > 0.0 && ignition_probability <= 1.0) {
            return Err(InvalidStart::IgnitionProbabilityOutOfRange(
                ignition_probability,
            ));
        }
        if burn_duration.is_zero() {
            return Err(InvalidStart::BurnDurationOutOfRange(0.0));
        }
        Ok(Self {
            ignition_probability,
            burn_duration,
        })
    }

    /// Build parameters from the form a person types them in: ignition chance
    /// as a percentage and burn time in seconds.
    pub fn from_percent(
        ignition_percent: f64,
        burn_seconds: f64,
    ) -> Result<SimulationParameters, InvalidStart> {
        let burn_duration = Duration::try_from_secs_f64(burn_seconds)
            .map_err(|_| InvalidStart::BurnDurationOutOfRange(burn_seconds))?;
        if burn_duration.is_zero() {
            return Err(InvalidStart::BurnDurationOutOfRange(burn_seconds));
        }
        Self::new(ignition_percent / 100.0, burn_duration)
    }

    pub fn ignition_probability(&self) -> f64 {
        self.ignition_probability
    }

    pub fn burn_duration(&self) -> Duration {
        self.burn_duration
    }
}

/// Everything needed to begin a run: the grid shape, where the fire starts,
/// and how it behaves.
#[derive(Clone, Debug, PartialEq)]
pub struct StartConfig {
    pub rows: usize,
    pub cols: usize,
    pub initial_burning: Vec<Position>,
    pub parameters: SimulationParameters,
}

impl StartConfig {
    pub fn new(
        rows: usize,
        cols: usize,
        initial_burning: impl IntoIterator<Item = Position>,
        parameters: SimulationParameters,
    ) -> StartConfig {
        StartConfig {
            rows,
            cols,
            initial_burning: initial_burning.into_iter().collect(),
            parameters,
        }
    }

    pub fn validate(&self) -> Result<(), InvalidStart> {
        if !(1..=MAX_ROWS).contains(&self.rows) {
            return Err(InvalidStart::RowsOutOfRange {
                rows: self.rows,
                max: MAX_ROWS,
            });
        }
        if !(1..=MAX_COLS).contains(&self.cols) {
            return Err(InvalidStart::ColsOutOfRange {
                cols: self.cols,
                max: MAX_COLS,
            });
        }
        if self.initial_burning.is_empty() {
            return Err(InvalidStart::NoIgnitionPoints);
        }
        if let Some(&position) = self
            .initial_burning
            .iter()
            .find(|p| p.row >= self.rows || p.col >= self.cols)
        {
            return Err(InvalidStart::PositionOutOfBounds {
                position,
                rows: self.rows,
                cols: self.cols,
            });
        }
        // Re-check in case the fields were assembled by hand.
        SimulationParameters::new(
            self.parameters.ignition_probability,
            self.parameters.burn_duration,
        )?;
        Ok(())
    }
}
