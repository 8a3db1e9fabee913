use async_trait::async_trait;

use crate::{domain::Cursor, Result};

/// Hexagonal port for the homework review API.
///
/// Implementations issue a single request per call and never retry; the poll
/// loop owns the retry cadence.
#[async_trait]
pub trait ReviewApi: Send + Sync {
    /// Fetch status changes since `from_date` (now when `None`), decoded as JSON.
    ///
    /// Fails with `Error::HttpStatus` on a non-200 reply, `Error::Transport`
    /// on network failure and `Error::Decode` on a malformed body.
    async fn fetch(&self, from_date: Option<Cursor>) -> Result<serde_json::Value>;
}
