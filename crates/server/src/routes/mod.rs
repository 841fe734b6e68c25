use std::sync::Arc;

use crate::clients::igdb::{IgdbClient, IgdbError};

pub mod games;
pub mod genres;
pub mod health;
pub mod igdb;
pub mod stats;

/// Shared IGDB client; `None` when credentials are not configured.
pub type SharedIgdb = Option<Arc<IgdbClient>>;

pub(crate) fn require_igdb(igdb: &SharedIgdb) -> Result<&IgdbClient, IgdbError> {
    igdb.as_deref().ok_or(IgdbError::NotConfigured)
}
