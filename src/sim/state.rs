use std::time::Instant;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::InvalidStart;

use super::{CellState, Grid, Position, SimulationFrame, SimulationParameters, StartConfig};

/// What a single tick changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub ignited: usize,
    pub burnt_out: usize,
}

/// The mutable state of one run.
///
/// `burning` holds exactly the cells whose grid state is `Burning`, keyed to
/// the instant they caught fire. `excluded` holds exactly the `Burnt` cells.
/// The two never overlap and nothing leaves `excluded`.
pub struct EngineState {
    grid: Grid,
    burning: FxHashMap<Position, Instant>,
    excluded: FxHashSet<Position>,
    ticks: u64,
}

impl EngineState {
    /// Validate `config` and light its ignition points at `now`.
    pub fn new(config: &StartConfig, now: Instant) -> Result<EngineState, InvalidStart> {
        config.validate()?;
        let mut state = EngineState {
            grid: Grid::new(config.rows, config.cols),
            burning: FxHashMap::default(),
            excluded: FxHashSet::default(),
            ticks: 0,
        };
        for &position in &config.initial_burning {
            state.ignite(position, now);
        }
        Ok(state)
    }

    /// Advance the fire by one tick as of `now`.
    ///
    /// Every cell that was burning when the tick began scans its 9-cell
    /// neighborhood. Burning cells in that neighborhood are checked for
    /// burnout, every other cell gets one ignition roll. The scan reads and
    /// writes the live burning set, so a cell lit earlier in the tick is not
    /// lit again by a later neighbor.
    pub fn tick(
        &mut self,
        parameters: &SimulationParameters,
        now: Instant,
        rng: &mut fastrand::Rng,
    ) -> TickSummary {
        let mut summary = TickSummary::default();
        let basis: Vec<Position> = self.burning.keys().copied().collect();

        for origin in basis {
            for target in self.grid.neighborhood(origin).collect::<Vec<_>>() {
                if let Some(&ignited_at) = self.burning.get(&target) {
                    if now.saturating_duration_since(ignited_at) >= parameters.burn_duration() {
                        self.burn_out(target);
                        summary.burnt_out += 1;
                    }
                    continue;
                }
                if rng.f64() < parameters.ignition_probability()
                    && !self.excluded.contains(&target)
                {
                    self.ignite(target, now);
                    summary.ignited += 1;
                }
            }
        }

        self.ticks += 1;
        summary
    }

    fn ignite(&mut self, position: Position, now: Instant) {
        if self.burning.contains_key(&position) || self.excluded.contains(&position) {
            return;
        }
        log::trace!("{position} caught fire");
        self.burning.insert(position, now);
        self.grid.set(position, CellState::Burning);
    }

    fn burn_out(&mut self, position: Position) {
        if self.burning.remove(&position).is_some() {
            log::trace!("{position} burnt out");
            self.excluded.insert(position);
            self.grid.set(position, CellState::Burnt);
        }
    }

    /// True once every cell that ever caught fire has burnt out.
    pub fn is_extinguished(&self) -> bool {
        self.burning.is_empty()
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn ignition_time(&self, position: Position) -> Option<Instant> {
        self.burning.get(&position).copied()
    }

    pub fn is_burning(&self, position: Position) -> bool {
        self.burning.contains_key(&position)
    }

    pub fn is_excluded(&self, position: Position) -> bool {
        self.excluded.contains(&position)
    }

    pub fn burning_count(&self) -> usize {
        self.burning.len()
    }

    pub fn burnt_count(&self) -> usize {
        self.excluded.len()
    }

    /// Copy the grid out for consumers.
    pub fn snapshot(&self) -> SimulationFrame {
        SimulationFrame {
            tick: self.ticks,
            grid: self.grid.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn config(
        rows: usize,
        cols: usize,
        burning: &[(usize, usize)],
        probability: f64,
        burn_millis: u64,
    ) -> StartConfig {
        StartConfig::new(
            rows,
            cols,
            burning.iter().map(|&p| Position::from(p)),
            SimulationParameters::new(probability, Duration::from_millis(burn_millis)).unwrap(),
        )
    }

    /// Checks the relationships between the grid and the two position sets.
    fn assert_consistent(state: &EngineState) {
        for (row, cells) in state.grid().iter_rows().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                let p = Position::new(row, col);
                assert_eq!(*cell == CellState::Burning, state.is_burning(p), "{p}");
                assert_eq!(*cell == CellState::Burnt, state.is_excluded(p), "{p}");
                assert!(!(state.is_burning(p) && state.is_excluded(p)), "{p}");
            }
        }
    }

    #[test]
    fn empty_start_is_rejected() {
        let result = EngineState::new(&config(2, 2, &[], 0.5, 1000), Instant::now());
        assert!(matches!(result, Err(InvalidStart::NoIgnitionPoints)));
    }

    #[test]
    fn initial_points_are_burning_with_start_timestamp() {
        let start = Instant::now();
        let state = EngineState::new(&config(4, 4, &[(0, 0), (3, 2), (0, 0)], 0.5, 1000), start)
            .unwrap();
        assert_eq!(state.burning_count(), 2);
        assert_eq!(state.ignition_time(Position::new(3, 2)), Some(start));
        assert_eq!(state.snapshot().tick, 0);
        assert_consistent(&state);
    }

    #[test]
    fn single_cell_burns_out_after_its_duration() {
        let start = Instant::now();
        let mut rng = fastrand::Rng::with_seed(1);
        let cfg = config(1, 1, &[(0, 0)], 1.0, 200);
        let mut state = EngineState::new(&cfg, start).unwrap();

        state.tick(&cfg.parameters, start + Duration::from_millis(100), &mut rng);
        assert!(state.is_burning(Position::new(0, 0)));

        let summary = state.tick(&cfg.parameters, start + Duration::from_millis(200), &mut rng);
        assert_eq!(summary.burnt_out, 1);
        assert!(state.is_extinguished());
        assert_eq!(state.grid().get(Position::new(0, 0)), Some(CellState::Burnt));
        assert_eq!(state.ticks(), 2);
        assert_consistent(&state);
    }

    #[test]
    fn certain_ignition_lights_every_neighbor_in_one_tick() {
        let start = Instant::now();
        let mut rng = fastrand::Rng::with_seed(7);
        let cfg = config(3, 3, &[(1, 1)], 1.0, 10_000);
        let mut state = EngineState::new(&cfg, start).unwrap();

        let summary = state.tick(&cfg.parameters, start + Duration::from_millis(100), &mut rng);

        assert_eq!(summary.ignited, 8);
        assert_eq!(state.grid().count(CellState::Burning), 9);
        assert_eq!(state.ignition_time(Position::new(1, 1)), Some(start));
        assert_consistent(&state);
    }

    #[test]
    fn cells_lit_this_tick_keep_their_first_timestamp() {
        let start = Instant::now();
        let first = start + Duration::from_millis(100);
        let second = start + Duration::from_millis(200);
        let mut rng = fastrand::Rng::with_seed(3);
        // Two sources share neighbors; the shared ones must be lit once.
        let cfg = config(3, 4, &[(1, 1), (1, 2)], 1.0, 10_000);
        let mut state = EngineState::new(&cfg, start).unwrap();

        let summary = state.tick(&cfg.parameters, first, &mut rng);
        assert_eq!(summary.ignited, 10);
        assert_eq!(state.ignition_time(Position::new(0, 0)), Some(first));

        state.tick(&cfg.parameters, second, &mut rng);
        assert_eq!(state.ignition_time(Position::new(0, 0)), Some(first));
        assert_eq!(state.ignition_time(Position::new(1, 1)), Some(start));
    }

    #[test]
    fn ash_never_reignites() {
        let start = Instant::now();
        let mut rng = fastrand::Rng::with_seed(11);
        let cfg = config(1, 3, &[(0, 0)], 1.0, 150);
        let mut state = EngineState::new(&cfg, start).unwrap();

        // (0, 1) catches at 100ms, (0, 0) burns out at 200ms.
        state.tick(&cfg.parameters, start + Duration::from_millis(100), &mut rng);
        state.tick(&cfg.parameters, start + Duration::from_millis(200), &mut rng);
        assert!(state.is_excluded(Position::new(0, 0)));
        assert!(state.is_burning(Position::new(0, 1)));

        // (0, 1) keeps rolling against its burnt neighbor with certainty.
        for step in 3..10 {
            state.tick(&cfg.parameters, start + Duration::from_millis(100 * step), &mut rng);
            assert_ne!(
                state.grid().get(Position::new(0, 0)),
                Some(CellState::Burning)
            );
            assert_consistent(&state);
        }
        assert!(state.is_extinguished());
        assert_eq!(state.burnt_count(), 3);
    }

    #[test]
    fn fire_spreads_only_to_neighbors_of_burning_cells() {
        let start = Instant::now();
        let mut rng = fastrand::Rng::with_seed(2024);
        let cfg = config(12, 20, &[(5, 5), (0, 19)], 0.3, 300);
        let mut state = EngineState::new(&cfg, start).unwrap();
        let mut burnt_so_far: Vec<Position> = Vec::new();

        let mut step = 1;
        while !state.is_extinguished() {
            let was_burning: Vec<Position> = (0..cfg.rows)
                .flat_map(|row| (0..cfg.cols).map(move |col| Position::new(row, col)))
                .filter(|p| state.is_burning(*p))
                .collect();
            let timestamps: Vec<_> = was_burning
                .iter()
                .map(|p| (*p, state.ignition_time(*p)))
                .collect();

            let now = start + Duration::from_millis(100 * step);
            state.tick(&cfg.parameters, now, &mut rng);
            assert_consistent(&state);

            for (p, ignited_at) in timestamps {
                if state.is_burning(p) {
                    assert_eq!(state.ignition_time(p), ignited_at, "{p} was re-stamped");
                } else {
                    // Only a timed-out cell may leave the burning set.
                    let ignited_at = ignited_at.unwrap();
                    assert!(now - ignited_at >= cfg.parameters.burn_duration(), "{p}");
                }
            }
            for row in 0..cfg.rows {
                for col in 0..cfg.cols {
                    let p = Position::new(row, col);
                    if state.ignition_time(p) == Some(now) {
                        assert!(was_burning.iter().any(|b| b.touches(&p)), "{p} jumped");
                    }
                }
            }
            for p in &burnt_so_far {
                assert_eq!(state.grid().get(*p), Some(CellState::Burnt));
            }
            burnt_so_far = (0..cfg.rows)
                .flat_map(|row| (0..cfg.cols).map(move |col| Position::new(row, col)))
                .filter(|p| state.is_excluded(*p))
                .collect();

            step += 1;
            assert!(step < 10_000, "fire never went out");
        }
        assert_eq!(state.burning_count(), 0);
        assert_eq!(state.snapshot().burnt(), state.burnt_count());
    }

    #[test]
    fn lowest_probability_still_terminates() {
        let start = Instant::now();
        let mut rng = fastrand::Rng::with_seed(5);
        let cfg = config(30, 70, &[(15, 35)], f64::MIN_POSITIVE, 100);
        let mut state = EngineState::new(&cfg, start).unwrap();

        state.tick(&cfg.parameters, start + Duration::from_millis(100), &mut rng);

        assert!(state.is_extinguished());
        assert_eq!(state.burnt_count(), 1);
    }
}
