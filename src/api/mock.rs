use super::{PrivacyStatus, Provider, SearchFilter};
use crate::models::CandidateResult;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::info;

/// A call made against the mock, in the order it happened.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Search { query: String, filter: Option<SearchFilter>, limit: usize },
    CreatePlaylist { title: String, description: String, privacy: PrivacyStatus },
    AddItem { playlist_id: String, item_id: String },
}

/// A scripted in-memory provider used in tests and dry runs.
/// Unscripted searches return no results; unscripted adds succeed.
#[derive(Default)]
pub struct MockProvider {
    song_results: HashMap<String, Result<Vec<CandidateResult>, String>>,
    all_results: HashMap<String, Result<Vec<CandidateResult>, String>>,
    add_errors: HashMap<String, String>,
    create_error: Option<String>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Results returned for a song-filtered search of `query`.
    pub fn with_songs(mut self, query: &str, results: Vec<CandidateResult>) -> Self {
        self.song_results.insert(query.to_string(), Ok(results));
        self
    }

    /// Results returned for an unfiltered search of `query`.
    pub fn with_all(mut self, query: &str, results: Vec<CandidateResult>) -> Self {
        self.all_results.insert(query.to_string(), Ok(results));
        self
    }

    pub fn with_search_error(mut self, query: &str, message: &str) -> Self {
        self.song_results.insert(query.to_string(), Err(message.to_string()));
        self.all_results.insert(query.to_string(), Err(message.to_string()));
        self
    }

    pub fn with_add_error(mut self, item_id: &str, message: &str) -> Self {
        self.add_errors.insert(item_id.to_string(), message.to_string());
        self
    }

    pub fn with_create_error(mut self, message: &str) -> Self {
        self.create_error = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Item ids passed to `add_playlist_item`, in call order.
    pub fn added_items(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                MockCall::AddItem { item_id, .. } => Some(item_id),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: MockCall) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }
    fn is_authenticated(&self) -> bool {
        true
    }

    async fn search(&self, query: &str, filter: Option<SearchFilter>, limit: usize) -> Result<Vec<CandidateResult>> {
        info!("MockProvider: search {:?} filter={:?}", query, filter);
        self.record(MockCall::Search { query: query.to_string(), filter, limit });
        let table = match filter {
            Some(SearchFilter::Songs) => &self.song_results,
            None => &self.all_results,
        };
        match table.get(query) {
            Some(Ok(results)) => Ok(results.iter().take(limit).cloned().collect()),
            Some(Err(msg)) => Err(anyhow!("{}", msg)),
            None => Ok(Vec::new()),
        }
    }

    async fn create_playlist(&self, title: &str, description: &str, privacy: PrivacyStatus) -> Result<String> {
        info!("MockProvider: create_playlist {}", title);
        self.record(MockCall::CreatePlaylist {
            title: title.to_string(),
            description: description.to_string(),
            privacy,
        });
        match &self.create_error {
            Some(msg) => Err(anyhow!("{}", msg)),
            None => Ok(format!("mock-playlist-{}", title)),
        }
    }

    async fn add_playlist_item(&self, playlist_id: &str, item_id: &str) -> Result<()> {
        info!("MockProvider: add_playlist_item {} -> {}", playlist_id, item_id);
        self.record(MockCall::AddItem {
            playlist_id: playlist_id.to_string(),
            item_id: item_id.to_string(),
        });
        match self.add_errors.get(item_id) {
            Some(msg) => Err(anyhow!("{}", msg)),
            None => Ok(()),
        }
    }
}
