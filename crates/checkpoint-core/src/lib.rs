//! Domain logic for the Checkpoint game backlog.
//!
//! The centrepiece is [`resolver::resolve`], which turns inconsistent provider
//! metadata into one label from the closed [`Genre`] vocabulary. Nothing in
//! this crate performs I/O.

pub mod buckets;
pub mod error;
pub mod game;
pub mod genre;
pub mod metadata;
pub mod resolver;

pub use buckets::DisplayBucket;
pub use error::Error;
pub use game::{GameStatus, Rating};
pub use genre::Genre;
pub use resolver::{resolve, GenreInput};
