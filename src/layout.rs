//! Editable starting layout for a run: the grid shape and which cells are lit
//! when the simulation begins.

use crate::sim::{CellState, Grid, Position, SimulationFrame, SimulationParameters, StartConfig};

pub const DEFAULT_ROWS: usize = 10;
pub const DEFAULT_COLS: usize = 10;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IgnitionLayout {
    rows: usize,
    cols: usize,
    ignition_points: Vec<Position>,
}

impl Default for IgnitionLayout {
    fn default() -> Self {
        Self::new(DEFAULT_ROWS, DEFAULT_COLS)
    }
}

impl IgnitionLayout {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            ignition_points: Vec::new(),
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Resizing rebuilds the grid, so any ignition points are dropped.
    pub fn set_rows(&mut self, rows: usize) {
        self.rows = rows;
        self.reset();
    }

    pub fn set_cols(&mut self, cols: usize) {
        self.cols = cols;
        self.reset();
    }

    /// Light `position` if it is dark, put it out if it is lit. Returns
    /// whether the cell is lit afterwards. Positions off the grid are ignored.
    pub fn toggle(&mut self, position: Position) -> bool {
        if position.row >= self.rows || position.col >= self.cols {
            return false;
        }
        match self.ignition_points.iter().position(|p| *p == position) {
            Some(idx) => {
                self.ignition_points.remove(idx);
                false
            }
            None => {
                self.ignition_points.push(position);
                true
            }
        }
    }

    pub fn is_lit(&self, position: Position) -> bool {
        self.ignition_points.contains(&position)
    }

    /// Ignition points in the order they were lit.
    pub fn ignition_points(&self) -> &[Position] {
        &self.ignition_points
    }

    pub fn reset(&mut self) {
        self.ignition_points.clear();
    }

    /// The grid as it will look before the first tick.
    pub fn preview(&self) -> SimulationFrame {
        let mut grid = Grid::new(self.rows, self.cols);
        for p in &self.ignition_points {
            grid.set(*p, CellState::Burning);
        }
        SimulationFrame { tick: 0, grid }
    }

    pub fn into_start_config(self, parameters: SimulationParameters) -> StartConfig {
        StartConfig::new(self.rows, self.cols, self.ignition_points, parameters)
    }
}
