use super::ytmusic_auth::{self, BrowserHeaders, ORIGIN};
use super::{PrivacyStatus, Provider, SearchFilter};
use crate::models::{CandidateKind, CandidateResult};
use crate::util::parse_clock_duration_ms;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use serde_json::{json, Value};
use std::env;
use std::path::Path;

// search params for the "Songs" tab
const SONGS_PARAMS: &str = "EgWKAQIIAWoMEA4QChADEAQQCRAF";

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0";

static DURATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+(:\d{2}){1,2}$").unwrap());
static COUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^[\d.,]+\s*[KMB]?\s+(views|plays)$").unwrap());
static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").unwrap());

/// YouTube Music provider backed by the web client's internal JSON API.
/// Requests are signed with the SAPISID cookie from the browser capture.
/// The API base may be overridden by the YTMUSIC_API_BASE env var (useful for tests).
pub struct YtMusicProvider {
    client: Client,
    headers: BrowserHeaders,
    api_base: String,
    language: String,
}

impl YtMusicProvider {
    pub fn new(headers: BrowserHeaders, api_base: Option<String>, language: &str) -> Self {
        Self {
            client: Client::new(),
            headers,
            api_base: api_base.unwrap_or_else(Self::default_api_base),
            language: language.to_string(),
        }
    }

    /// Build a provider from the credential file; any problem here is fatal to the run.
    pub fn from_headers_file(path: &Path, language: &str) -> Result<Self> {
        let headers = ytmusic_auth::load_headers_file(path)?;
        Ok(Self::new(headers, None, language))
    }

    fn default_api_base() -> String {
        env::var("YTMUSIC_API_BASE").unwrap_or_else(|_| "https://music.youtube.com/youtubei/v1".into())
    }

    fn is_authenticated(&self) -> bool {
        self.headers
            .get("cookie")
            .and_then(|c| ytmusic_auth::sapisid_from_cookie(c))
            .is_some()
    }
    fn name(&self) -> &str {
        "ytmusic"
    }

    fn context(&self) -> Value {
        json!({
            "client": {
                "clientName": "WEB_REMIX",
                "clientVersion": format!("1.{}.01.00", Utc::now().format("%Y%m%d")),
                "hl": self.language,
            },
            "user": {}
        })
    }

    fn request_headers(&self) -> Result<HeaderMap> {
        let mut map = HeaderMap::new();
        for (k, v) in &self.headers {
            match (HeaderName::from_bytes(k.as_bytes()), HeaderValue::from_str(v)) {
                (Ok(name), Ok(value)) => {
                    map.insert(name, value);
                }
                _ => warn!("skipping credential header {:?}: not a valid HTTP header", k),
            }
        }
        let origin = self
            .headers
            .get("x-origin")
            .or_else(|| self.headers.get("origin"))
            .map(String::as_str)
            .unwrap_or(ORIGIN);
        let sapisid = self
            .headers
            .get("cookie")
            .and_then(|c| ytmusic_auth::sapisid_from_cookie(c))
            .ok_or_else(|| anyhow!("no SAPISID in cookie"))?;
        let auth = ytmusic_auth::sapisid_hash(&sapisid, origin, Utc::now().timestamp());
        map.insert(AUTHORIZATION, HeaderValue::from_str(&auth)?);
        map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if !map.contains_key(USER_AGENT) {
            map.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));
        }
        if !map.contains_key("x-origin") {
            map.insert("x-origin", HeaderValue::from_str(origin)?);
        }
        Ok(map)
    }

    async fn post(&self, endpoint: &str, mut body: Value) -> Result<Value> {
        body["context"] = self.context();
        let url = format!("{}/{}", self.api_base, endpoint);
        let resp = self
            .client
            .post(&url)
            .query(&[("alt", "json"), ("prettyPrint", "false")])
            .headers(self.request_headers()?)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            return Err(anyhow!("{} failed: HTTP {} => {}", endpoint, status.as_u16(), txt));
        }
        Ok(resp.json().await?)
    }
}

fn page_type(run: &Value) -> Option<&str> {
    run["navigationEndpoint"]["browseEndpoint"]["browseEndpointContextSupportedConfigs"]
        ["browseEndpointContextMusicConfig"]["pageType"]
        .as_str()
}

fn music_video_type(watch_endpoint: &Value) -> Option<&str> {
    watch_endpoint["watchEndpointMusicSupportedConfigs"]["watchEndpointMusicConfig"]["musicVideoType"].as_str()
}

fn kind_from_video_type(video_type: &str) -> Option<CandidateKind> {
    match video_type {
        "MUSIC_VIDEO_TYPE_ATV" => Some(CandidateKind::Song),
        t if t.contains("PODCAST") => None,
        _ => Some(CandidateKind::Video),
    }
}

#[derive(Default)]
struct RunFields {
    label: Option<String>,
    artists: Vec<String>,
    album: Option<String>,
    duration_ms: Option<u64>,
}

/// Classify the subtitle runs of a result ("Song • Artist & Artist • Album • 3:45").
fn parse_runs(runs: &[Value]) -> RunFields {
    let mut out = RunFields::default();
    for (i, run) in runs.iter().enumerate() {
        let text = run["text"].as_str().unwrap_or("").trim();
        if text.is_empty() || matches!(text, "•" | "&" | ",") {
            continue;
        }
        match page_type(run) {
            Some("MUSIC_PAGE_TYPE_ARTIST") | Some("MUSIC_PAGE_TYPE_USER_CHANNEL") => {
                out.artists.push(text.to_string());
                continue;
            }
            Some("MUSIC_PAGE_TYPE_ALBUM") => {
                out.album = Some(text.to_string());
                continue;
            }
            Some(_) => continue,
            None => {}
        }
        if DURATION_RE.is_match(text) {
            out.duration_ms = parse_clock_duration_ms(text);
        } else if i == 0 && matches!(text, "Song" | "Video") {
            out.label = Some(text.to_string());
        } else if COUNT_RE.is_match(text) || YEAR_RE.is_match(text) {
            continue;
        } else {
            out.artists.push(text.to_string());
        }
    }
    out
}

fn build_candidate(
    id: &str,
    title: &str,
    video_type: Option<&str>,
    runs: &[Value],
    default_kind: Option<CandidateKind>,
) -> Option<CandidateResult> {
    let fields = parse_runs(runs);
    let kind = match video_type {
        Some(t) => kind_from_video_type(t)?,
        None => match fields.label.as_deref() {
            Some("Song") => CandidateKind::Song,
            Some("Video") => CandidateKind::Video,
            _ => default_kind?,
        },
    };
    Some(CandidateResult {
        id: id.to_string(),
        kind,
        title: title.to_string(),
        artists: fields.artists,
        album: fields.album,
        duration_ms: fields.duration_ms.unwrap_or(0),
    })
}

fn parse_list_item(item: &Value, default_kind: Option<CandidateKind>) -> Option<CandidateResult> {
    let columns = item["flexColumns"].as_array()?;
    let column_runs = |c: &Value| {
        c["musicResponsiveListItemFlexColumnRenderer"]["text"]["runs"]
            .as_array()
            .cloned()
            .unwrap_or_default()
    };
    let title_runs = column_runs(columns.first()?);
    let title_run = title_runs.first()?;
    let title = title_run["text"].as_str()?;

    let play_endpoint = &item["overlay"]["musicItemThumbnailOverlayRenderer"]["content"]
        ["musicPlayButtonRenderer"]["playNavigationEndpoint"]["watchEndpoint"];
    let title_endpoint = &title_run["navigationEndpoint"]["watchEndpoint"];
    let id = item["playlistItemData"]["videoId"]
        .as_str()
        .or_else(|| title_endpoint["videoId"].as_str())
        .or_else(|| play_endpoint["videoId"].as_str())?;
    let video_type = music_video_type(play_endpoint).or_else(|| music_video_type(title_endpoint));

    let runs: Vec<Value> = columns.iter().skip(1).flat_map(column_runs).collect();
    build_candidate(id, title, video_type, &runs, default_kind)
}

fn parse_card(card: &Value) -> Option<CandidateResult> {
    let title_run = card["title"]["runs"].as_array()?.first()?;
    let title = title_run["text"].as_str()?;
    let endpoint = &title_run["navigationEndpoint"]["watchEndpoint"];
    let id = endpoint["videoId"].as_str()?;
    let runs = card["subtitle"]["runs"].as_array().cloned().unwrap_or_default();
    build_candidate(id, title, music_video_type(endpoint), &runs, None)
}

/// Extract playable results from a search response, in ranking order.
/// Albums, artists, playlists and podcast episodes are skipped.
pub fn parse_search_response(resp: &Value, filter: Option<SearchFilter>, limit: usize) -> Vec<CandidateResult> {
    let default_kind = match filter {
        Some(SearchFilter::Songs) => Some(CandidateKind::Song),
        None => None,
    };
    let tabs = &resp["contents"]["tabbedSearchResultsRenderer"]["tabs"];
    let sections = tabs[0]["tabRenderer"]["content"]["sectionListRenderer"]["contents"]
        .as_array()
        .or_else(|| resp["contents"]["sectionListRenderer"]["contents"].as_array());
    let Some(sections) = sections else {
        debug!("search response carried no result sections");
        return Vec::new();
    };

    let mut out = Vec::new();
    for section in sections {
        if let Some(card) = section.get("musicCardShelfRenderer") {
            out.extend(parse_card(card));
        }
        if let Some(items) = section["musicShelfRenderer"]["contents"].as_array() {
            out.extend(
                items
                    .iter()
                    .filter_map(|it| it.get("musicResponsiveListItemRenderer"))
                    .filter_map(|it| parse_list_item(it, default_kind)),
            );
        }
    }
    out.truncate(limit);
    out
}

#[async_trait]
impl Provider for YtMusicProvider {
    fn name(&self) -> &str {
        YtMusicProvider::name(self)
    }
    fn is_authenticated(&self) -> bool {
        YtMusicProvider::is_authenticated(self)
    }

    async fn search(&self, query: &str, filter: Option<SearchFilter>, limit: usize) -> Result<Vec<CandidateResult>> {
        let mut body = json!({ "query": query });
        if filter == Some(SearchFilter::Songs) {
            body["params"] = json!(SONGS_PARAMS);
        }
        let resp = self.post("search", body).await?;
        let results = parse_search_response(&resp, filter, limit);
        debug!("search {:?} ({:?}) -> {} result(s)", query, filter, results.len());
        Ok(results)
    }

    async fn create_playlist(&self, title: &str, description: &str, privacy: PrivacyStatus) -> Result<String> {
        let body = json!({
            "title": title,
            "description": description,
            "privacyStatus": privacy.as_str(),
        });
        let j = self.post("playlist/create", body).await?;
        let id = j["playlistId"]
            .as_str()
            .ok_or_else(|| anyhow!("no playlistId in response"))?
            .to_string();
        Ok(id)
    }

    async fn add_playlist_item(&self, playlist_id: &str, item_id: &str) -> Result<()> {
        let body = json!({
            "playlistId": playlist_id.strip_prefix("VL").unwrap_or(playlist_id),
            "actions": [{ "action": "ACTION_ADD_VIDEO", "addedVideoId": item_id }],
        });
        let j = self.post("browse/edit_playlist", body).await?;
        match j["status"].as_str() {
            Some("STATUS_SUCCEEDED") => Ok(()),
            other => Err(anyhow!("edit_playlist not applied: status {:?}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artist_run(name: &str) -> Value {
        json!({
            "text": name,
            "navigationEndpoint": { "browseEndpoint": {
                "browseEndpointContextSupportedConfigs": {
                    "browseEndpointContextMusicConfig": { "pageType": "MUSIC_PAGE_TYPE_ARTIST" }
                }
            }}
        })
    }

    #[test]
    fn runs_are_classified() {
        let runs = vec![
            json!({"text": "Video"}),
            json!({"text": " • "}),
            artist_run("Queen"),
            json!({"text": " & "}),
            json!({"text": "David Bowie"}),
            json!({"text": " • "}),
            json!({"text": "1.2B views"}),
            json!({"text": " • "}),
            json!({"text": "4:08"}),
        ];
        let f = parse_runs(&runs);
        assert_eq!(f.label.as_deref(), Some("Video"));
        assert_eq!(f.artists, vec!["Queen", "David Bowie"]);
        assert_eq!(f.duration_ms, Some(248_000));
        assert!(f.album.is_none());
    }

    #[test]
    fn podcast_episodes_are_not_candidates() {
        assert_eq!(kind_from_video_type("MUSIC_VIDEO_TYPE_PODCAST_EPISODE"), None);
        assert_eq!(kind_from_video_type("MUSIC_VIDEO_TYPE_ATV"), Some(CandidateKind::Song));
        assert_eq!(kind_from_video_type("MUSIC_VIDEO_TYPE_OMV"), Some(CandidateKind::Video));
    }
}
