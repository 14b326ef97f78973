use crate::constants::{LATTICE_COL_PERIOD, LATTICE_ROW_PERIOD, POWER_PICKUP_CHANCE, WALL_CHANCE};
use crate::rng::Rng;
use crate::types::{Cell, GridInit, GridPos, PickupKind, Vec2};

/// Tile maze for one level. Owns every cell code; nothing else writes cells.
#[derive(Clone, Debug)]
pub struct Grid {
    cols: i32,
    rows: i32,
    tile_size: f32,
    cells: Vec<Cell>,
    total_pickups: u32,
}

/// Builds a level maze: wall border, a fixed lattice of pillars, random
/// wall noise, pickups everywhere else and an empty 3x3 pad around the spawn.
pub fn generate_grid(
    cols: i32,
    rows: i32,
    spawn_col: i32,
    spawn_row: i32,
    tile_size: f32,
    rng: &mut Rng,
) -> Grid {
    let cols = cols.max(0);
    let rows = rows.max(0);
    let mut cells = Vec::with_capacity(cols as usize * rows as usize);

    for row in 0..rows {
        for col in 0..cols {
            let cell = if is_border(cols, rows, col, row) || is_lattice(col, row) {
                Cell::Wall
            } else if rng.bool(WALL_CHANCE) {
                Cell::Wall
            } else if rng.bool(POWER_PICKUP_CHANCE) {
                Cell::PowerPickup
            } else {
                Cell::Pickup
            };
            cells.push(cell);
        }
    }

    let mut grid = Grid {
        cols,
        rows,
        tile_size,
        cells,
        total_pickups: 0,
    };

    // The border wins over the spawn pad when the spawn hugs an edge.
    for row in (spawn_row - 1)..=(spawn_row + 1) {
        for col in (spawn_col - 1)..=(spawn_col + 1) {
            if is_border(cols, rows, col, row) {
                continue;
            }
            if let Some(idx) = grid.index(col, row) {
                grid.cells[idx] = Cell::Empty;
            }
        }
    }

    grid.total_pickups = grid.count_pickups();
    grid
}

fn is_border(cols: i32, rows: i32, col: i32, row: i32) -> bool {
    row == 0 || col == 0 || row == rows - 1 || col == cols - 1
}

fn is_lattice(col: i32, row: i32) -> bool {
    row % LATTICE_ROW_PERIOD == 0
        && (col % LATTICE_COL_PERIOD == 0 || col % LATTICE_COL_PERIOD == LATTICE_COL_PERIOD / 2)
}

impl Grid {
    /// Parses an ASCII layout (`#` wall, `.` pickup, `o` power pickup,
    /// space empty). Returns `None` for ragged rows or unknown glyphs.
    pub fn from_rows(rows: &[&str], tile_size: f32) -> Option<Self> {
        let cols = rows.first().map(|row| row.chars().count()).unwrap_or(0);
        let mut cells = Vec::with_capacity(cols * rows.len());
        for row in rows {
            if row.chars().count() != cols {
                return None;
            }
            for glyph in row.chars() {
                cells.push(Cell::from_glyph(glyph)?);
            }
        }
        let mut grid = Self {
            cols: cols as i32,
            rows: rows.len() as i32,
            tile_size,
            cells,
            total_pickups: 0,
        };
        grid.total_pickups = grid.count_pickups();
        Some(grid)
    }

    pub fn cols(&self) -> i32 {
        self.cols
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// Pickups present when the level was built; fixed for the level.
    pub fn total_pickups(&self) -> u32 {
        self.total_pickups
    }

    /// Pickups still on the board.
    pub fn count_pickups(&self) -> u32 {
        self.cells.iter().filter(|cell| **cell == Cell::Pickup).count() as u32
    }

    /// Out-of-bounds reads as `Wall`.
    pub fn cell(&self, col: i32, row: i32) -> Cell {
        self.index(col, row)
            .map(|idx| self.cells[idx])
            .unwrap_or(Cell::Wall)
    }

    pub fn is_wall(&self, x: f32, y: f32) -> bool {
        let col = (x / self.tile_size).floor();
        let row = (y / self.tile_size).floor();
        if !col.is_finite() || !row.is_finite() {
            return true;
        }
        self.is_wall_at_grid(col as i32, row as i32)
    }

    pub fn is_wall_at_grid(&self, col: i32, row: i32) -> bool {
        self.cell(col, row) == Cell::Wall
    }

    pub fn consume_cell_if_pickup(&mut self, col: i32, row: i32) -> Option<PickupKind> {
        let idx = self.index(col, row)?;
        let kind = match self.cells[idx] {
            Cell::Pickup => PickupKind::Pickup,
            Cell::PowerPickup => PickupKind::PowerPickup,
            Cell::Empty | Cell::Wall => return None,
        };
        self.cells[idx] = Cell::Empty;
        Some(kind)
    }

    pub fn tile_center(&self, pos: GridPos) -> Vec2 {
        Vec2::new(
            pos.col as f32 * self.tile_size + self.tile_size / 2.0,
            pos.row as f32 * self.tile_size + self.tile_size / 2.0,
        )
    }

    pub fn tiles(&self) -> Vec<String> {
        (0..self.rows)
            .map(|row| (0..self.cols).map(|col| self.cell(col, row).glyph()).collect())
            .collect()
    }

    pub fn to_grid_init(&self) -> GridInit {
        GridInit {
            cols: self.cols,
            rows: self.rows,
            tile_size: self.tile_size,
            tiles: self.tiles(),
            total_pickups: self.total_pickups,
        }
    }

    fn index(&self, col: i32, row: i32) -> Option<usize> {
        if col < 0 || row < 0 || col >= self.cols || row >= self.rows {
            return None;
        }
        Some((row * self.cols + col) as usize)
    }
}
