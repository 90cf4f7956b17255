/// Tile types and grid lookup.
/// Properties are queried via methods, not stored as flags,
/// so tile semantics are centralized here.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Tile {
    Empty, // void outside the playfield
    Floor,
    Wall,
}

impl Tile {
    /// Does this tile block movement by itself?
    pub fn is_wall(self) -> bool {
        matches!(self, Tile::Wall)
    }

    /// Can an entity stand here (terrain-wise)?
    pub fn is_floor(self) -> bool {
        matches!(self, Tile::Floor)
    }
}

impl Default for Tile {
    fn default() -> Self {
        Tile::Empty
    }
}

/// A tile coordinate: x = column, y = row.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub const fn new(x: usize, y: usize) -> Self {
        Pos { x, y }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn opposite(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }
}

/// Row-major tile grid.
///
/// `neighbor` is **clamped** to the grid bounds, never wrapped.
/// Levels are expected to wall off their interior; clamping is only
/// the edge policy for the outermost ring.
#[derive(Clone, Debug)]
pub struct Tilemap {
    tiles: Vec<Tile>,
    tiles_per_row: usize,
}

impl Tilemap {
    pub fn new(tiles: Vec<Tile>, tiles_per_row: usize) -> Self {
        Tilemap { tiles, tiles_per_row }
    }

    pub fn cols(&self) -> usize {
        self.tiles_per_row
    }

    pub fn rows(&self) -> usize {
        if self.tiles_per_row == 0 {
            0
        } else {
            self.tiles.len().div_ceil(self.tiles_per_row)
        }
    }

    /// Tile at `pos`. Out of bounds reads as Wall.
    pub fn tile_at(&self, pos: Pos) -> Tile {
        if pos.x >= self.cols() || pos.y >= self.rows() {
            return Tile::Wall;
        }
        self.tiles
            .get(pos.y * self.tiles_per_row + pos.x)
            .copied()
            .unwrap_or(Tile::Wall)
    }

    /// One step from `pos` in `direction`, clamped to the grid.
    pub fn neighbor(&self, pos: Pos, direction: Direction) -> Pos {
        match direction {
            Direction::Up => Pos::new(pos.x, pos.y.saturating_sub(1)),
            Direction::Down => Pos::new(pos.x, (pos.y + 1).min(self.rows().saturating_sub(1))),
            Direction::Left => Pos::new(pos.x.saturating_sub(1), pos.y),
            Direction::Right => Pos::new((pos.x + 1).min(self.cols().saturating_sub(1)), pos.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_3x2() -> Tilemap {
        // row 0: Floor Wall Floor
        // row 1: Empty Floor Wall
        Tilemap::new(
            vec![
                Tile::Floor, Tile::Wall, Tile::Floor,
                Tile::Empty, Tile::Floor, Tile::Wall,
            ],
            3,
        )
    }

    #[test]
    fn row_major_lookup() {
        let map = map_3x2();
        assert_eq!(map.rows(), 2);
        assert_eq!(map.cols(), 3);
        assert_eq!(map.tile_at(Pos::new(0, 0)), Tile::Floor);
        assert_eq!(map.tile_at(Pos::new(1, 0)), Tile::Wall);
        assert_eq!(map.tile_at(Pos::new(1, 1)), Tile::Floor);
        assert_eq!(map.tile_at(Pos::new(2, 1)), Tile::Wall);
    }

    #[test]
    fn out_of_bounds_reads_as_wall() {
        let map = map_3x2();
        assert_eq!(map.tile_at(Pos::new(3, 0)), Tile::Wall);
        assert_eq!(map.tile_at(Pos::new(0, 2)), Tile::Wall);
    }

    #[test]
    fn neighbor_steps() {
        let map = map_3x2();
        let p = Pos::new(1, 1);
        assert_eq!(map.neighbor(p, Direction::Up), Pos::new(1, 0));
        assert_eq!(map.neighbor(p, Direction::Left), Pos::new(0, 1));
        assert_eq!(map.neighbor(p, Direction::Right), Pos::new(2, 1));
    }

    #[test]
    fn neighbor_clamps_at_edges() {
        let map = map_3x2();
        assert_eq!(map.neighbor(Pos::new(0, 0), Direction::Left), Pos::new(0, 0));
        assert_eq!(map.neighbor(Pos::new(0, 0), Direction::Up), Pos::new(0, 0));
        assert_eq!(map.neighbor(Pos::new(2, 1), Direction::Right), Pos::new(2, 1));
        assert_eq!(map.neighbor(Pos::new(2, 1), Direction::Down), Pos::new(2, 1));
    }

    #[test]
    fn opposite_directions() {
        assert_eq!(Direction::Up.opposite(), Direction::Down);
        assert_eq!(Direction::Left.opposite(), Direction::Right);
    }
}
