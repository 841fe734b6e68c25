use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Unknown game status: {0}")]
    UnknownStatus(String),

    #[error("Unknown genre: {0}")]
    UnknownGenre(String),

    #[error("Rating must be between {min} and {max}, got {value}")]
    InvalidRating { value: i64, min: i16, max: i16 },
}
