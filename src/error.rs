/// Error taxonomy.
///
/// Game over and quit are not errors: they are reported as `game_loop::Exit`.
/// Everything here is fatal to the loop and is propagated with `?`.

use thiserror::Error;

/// Bad data at the display-buffer boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisplayError {
    #[error("cell ({x}, {y}) is outside the drawable grid")]
    OffGrid { x: i32, y: i32 },

    #[error("glyph {0:?} is not printable")]
    NonPrintable(char),
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("terminal i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("display buffer rejected a cell: {0}")]
    Display(#[from] DisplayError),
}
