use glam::IVec2;

use super::{Rect, WallMap};

pub const TILE_SIZE: i32 = 30;

const BATTLEFIELD: [&str; 30] = [
    "########################################",
    "#......................................#",
    "#......................................#",
    "#......................................#",
    "#...............########...............#",
    "#......................................#",
    "#.......##....................##.......#",
    "#.......##....................##.......#",
    "#.......##....................##.......#",
    "#.......##....................##.......#",
    "#.......##....................##.......#",
    "#.......##....................##.......#",
    "#.................####.................#",
    "#.................####.................#",
    "#...........###...####...###...........#",
    "#.................####.................#",
    "#.................####.................#",
    "#.................####.................#",
    "#......................................#",
    "#......................................#",
    "#.......##....................##.......#",
    "#.......##....................##.......#",
    "#.......##....................##.......#",
    "#.......##....................##.......#",
    "#.......##....................##.......#",
    "#...............########...............#",
    "#......................................#",
    "#......................................#",
    "#......................................#",
    "########################################",
];

/// Grid of square wall tiles. Everything outside the grid counts as wall.
#[derive(Debug, Clone)]
pub struct TileMap {
    columns: usize,
    rows: usize,
    tile_size: i32,
    walls: Vec<bool>,
}

impl TileMap {
    /// Builds a map from text rows where `#` marks a wall tile.
    /// Short rows are padded with open tiles.
    pub fn from_rows(rows: &[&str], tile_size: i32) -> Self {
        let columns = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
        let mut walls = vec![false; columns * rows.len()];

        for (row, line) in rows.iter().enumerate() {
            for (column, ch) in line.chars().enumerate() {
                walls[row * columns + column] = ch == '#';
            }
        }

        Self {
            columns,
            rows: rows.len(),
            tile_size: tile_size.max(1),
            walls,
        }
    }

    pub fn battlefield() -> Self {
        Self::from_rows(&BATTLEFIELD, TILE_SIZE)
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn tile_size(&self) -> i32 {
        self.tile_size
    }

    pub fn pixel_size(&self) -> IVec2 {
        IVec2::new(
            self.columns as i32 * self.tile_size,
            self.rows as i32 * self.tile_size,
        )
    }

    pub fn is_wall(&self, column: i32, row: i32) -> bool {
        if column < 0 || row < 0 {
            return true;
        }
        let (column, row) = (column as usize, row as usize);
        if column >= self.columns || row >= self.rows {
            return true;
        }
        self.walls[row * self.columns + column]
    }

    pub fn wall_count(&self) -> usize {
        self.walls.iter().filter(|&&wall| wall).count()
    }
}

impl WallMap for TileMap {
    fn is_colliding_with_wall(&self, rect: Rect) -> bool {
        if rect.is_empty() {
            return false;
        }

        let first_column = rect.x.div_euclid(self.tile_size);
        let last_column = (rect.right() - 1).div_euclid(self.tile_size);
        let first_row = rect.y.div_euclid(self.tile_size);
        let last_row = (rect.bottom() - 1).div_euclid(self.tile_size);

        (first_row..=last_row)
            .any(|row| (first_column..=last_column).any(|column| self.is_wall(column, row)))
    }
}
