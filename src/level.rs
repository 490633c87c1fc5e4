/// The fixed level layout.  There is no level-file format: a level is a
/// literal list of placements handed to `compute::init_state`.

use crate::entities::Coords;

/// Ground width used by the built-in level; fireballs die outside `[0, this)`.
pub const GROUND_WIDTH: i32 = 80;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Level {
    pub ground_width: i32,
    pub ground_anchor: Coords,
    pub player_start: Coords,
    pub coins: Vec<Coords>,
    pub powerups: Vec<Coords>,
    pub bricks: Vec<Coords>,
    pub enemies: Vec<Coords>,
}

impl Level {
    /// A bare strip of ground with nothing on it; handy for tests.
    pub fn empty(ground_width: i32, ground_y: i32, player_start: Coords) -> Self {
        Self {
            ground_width,
            ground_anchor: Coords::new(0, ground_y),
            player_start,
            coins: Vec::new(),
            powerups: Vec::new(),
            bricks: Vec::new(),
            enemies: Vec::new(),
        }
    }
}

impl Default for Level {
    fn default() -> Self {
        Self {
            ground_width: GROUND_WIDTH,
            ground_anchor: Coords::new(0, 10),
            player_start: Coords::new(10, 2),
            coins: vec![Coords::new(10, 7), Coords::new(15, 7)],
            powerups: vec![Coords::new(20, 6), Coords::new(24, 6)],
            bricks: vec![
                Coords::new(30, 6),
                Coords::new(19, 6),
                Coords::new(21, 6),
                Coords::new(22, 6),
                Coords::new(23, 6),
                Coords::new(25, 6),
            ],
            enemies: vec![Coords::new(35, 9)],
        }
    }
}
