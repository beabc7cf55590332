use std::fmt;

/// The burn state of a single cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum CellState {
    #[default]
    Unburnt,
    Burning,
    /// Terminal. A burnt cell never changes state again.
    Burnt,
}

/// A `(row, col)` coordinate on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Whether `other` is this position or one of its 8 Moore neighbors.
    pub fn touches(&self, other: &Position) -> bool {
        self.row.abs_diff(other.row) <= 1 && self.col.abs_diff(other.col) <= 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Self { row, col }
    }
}

/// The 8 Moore offsets followed by the cell itself. The trailing `(0, 0)` is
/// what lets a burning cell check its own burn time.
const NEIGHBORHOOD: [(isize, isize); 9] = [
    (-1, 0),
    (-1, -1),
    (0, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (1, -1),
    (0, 0),
];

/// Row-major matrix of cell states with fixed dimensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<CellState>,
}

impl Grid {
    pub fn new(rows: usize, cols: usize) -> Grid {
        Grid {
            rows,
            cols,
            cells: vec![CellState::Unburnt; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn contains(&self, position: Position) -> bool {
        position.row < self.rows && position.col < self.cols
    }

    pub fn get(&self, position: Position) -> Option<CellState> {
        self.contains(position)
            .then(|| self.cells[position.row * self.cols + position.col])
    }

    pub(crate) fn set(&mut self, position: Position, state: CellState) {
        debug_assert!(self.contains(position), "{position} is off the grid");
        self.cells[position.row * self.cols + position.col] = state;
    }

    /// Rows of the grid, top to bottom.
    pub fn iter_rows(&self) -> impl Iterator<Item = &[CellState]> {
        // `max(1)` keeps `chunks` happy on a degenerate zero-column grid.
        self.cells.chunks(self.cols.max(1))
    }

    pub fn count(&self, state: CellState) -> usize {
        self.cells.iter().filter(|c| **c == state).count()
    }

    /// The in-bounds part of the 9-cell neighborhood around `center`,
    /// ending with `center` itself.
    pub fn neighborhood(&self, center: Position) -> impl Iterator<Item = Position> + '_ {
        NEIGHBORHOOD.into_iter().filter_map(move |(dr, dc)| {
            let row = center.row.checked_add_signed(dr)?;
            let col = center.col.checked_add_signed(dc)?;
            let position = Position::new(row, col);
            self.contains(position).then_some(position)
        })
    }
}

/// An immutable copy of the grid taken after a completed tick.
///
/// Frames are handed to renderers and never mutated by the engine, so they can
/// be read from any thread while the next tick is being computed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationFrame {
    /// Number of completed ticks when this frame was taken; 0 is the initial
    /// ignition layout.
    pub tick: u64,
    pub grid: Grid,
}

impl SimulationFrame {
    pub fn new(rows: usize, cols: usize) -> SimulationFrame {
        SimulationFrame {
            tick: 0,
            grid: Grid::new(rows, cols),
        }
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn state(&self, position: Position) -> Option<CellState> {
        self.grid.get(position)
    }

    pub fn burning(&self) -> usize {
        self.grid.count(CellState::Burning)
    }

    pub fn burnt(&self) -> usize {
        self.grid.count(CellState::Burnt)
    }
}
