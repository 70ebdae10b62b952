pub mod mock;
pub mod ytmusic;
pub mod ytmusic_auth;

use crate::models::CandidateResult;
use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Restricts a search to one result category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchFilter {
    Songs,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PrivacyStatus {
    #[default]
    Private,
    Public,
    Unlisted,
}

impl PrivacyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrivacyStatus::Private => "PRIVATE",
            PrivacyStatus::Public => "PUBLIC",
            PrivacyStatus::Unlisted => "UNLISTED",
        }
    }
}

/// Provider trait: the remote operations the importer needs.
/// Implementations: ytmusic::YtMusicProvider and mock::MockProvider.
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Search the remote catalog; results are returned in ranking order,
    /// at most `limit` of them.
    async fn search(&self, query: &str, filter: Option<SearchFilter>, limit: usize) -> Result<Vec<CandidateResult>>;

    /// Create a new playlist and return its remote id.
    async fn create_playlist(&self, title: &str, description: &str, privacy: PrivacyStatus) -> Result<String>;

    /// Append a single item to a playlist. Errors caused by an HTTP status
    /// must mention it as `HTTP <code>`.
    async fn add_playlist_item(&self, playlist_id: &str, item_id: &str) -> Result<()>;

    /// Return the provider's name (for logging)
    fn name(&self) -> &str;

    /// Return true if the provider holds credentials it can send
    fn is_authenticated(&self) -> bool;
}
