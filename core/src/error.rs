use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Too many bombs")]
    TooManyBombs,
}

pub type Result<T> = core::result::Result<T, GameError>;
