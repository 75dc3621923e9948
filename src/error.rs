use thiserror::Error;

/// Failures reported by the grid model and the step machines.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MazeError {
    #[error("Invalid maze dimensions {width}x{height}, both must be at least 1")]
    InvalidDimensions { width: i32, height: i32 },
    #[error("Coordinate ({x}, {y}) is outside the grid")]
    OutOfBoundsAccess { x: i32, y: i32 },
    #[error("Direction index {0} is not in 0..4")]
    InvalidDirection(usize),
    #[error("The machine has already completed")]
    AlreadyComplete,
    #[error("Break wall chance {0} is outside 0..=100")]
    InvalidBreakWallChance(u8),
}

impl From<MazeError> for std::io::Error {
    fn from(error: MazeError) -> Self {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, error)
    }
}
