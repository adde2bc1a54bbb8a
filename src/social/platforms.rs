//! Platform clients
//!
//! Thin submission clients, one per supported platform. The pipeline
//! treats them uniformly: hand over track, final text, facets, and the
//! image flag; get back an optional external post id. Auth refresh,
//! media upload, and richer wire features are deliberately out of
//! scope here.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::{PlatformConfig, SocialConfig};
use crate::social::facets::Facet;
use crate::types::{PlatformKind, TrackInfo};

const USER_AGENT: &str = "nowcast/0.1.0";

/// Submission failure. Never retried; the post is skipped for this
/// track and the next track gets a fresh attempt.
#[derive(Debug, Error)]
pub enum PlatformError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error {0}: {1}")]
    Api(u16, String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Misconfigured: {0}")]
    Misconfigured(String),
}

/// One platform's submission transport.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    fn kind(&self) -> PlatformKind;

    /// Submits a post. `Ok(Some(id))` carries the platform's external
    /// post id when it returns one.
    async fn submit(
        &self,
        track: &TrackInfo,
        text: &str,
        facets: &[Facet],
        has_image: bool,
    ) -> Result<Option<String>, PlatformError>;
}

/// A configured, enabled platform with its posting cadence.
pub struct Platform {
    pub kind: PlatformKind,
    pub min_interval: Duration,
    pub client: Box<dyn PlatformClient>,
}

/// Builds clients for every enabled platform. A platform that is
/// enabled but missing credentials is logged and left out; one bad
/// config section must not take down the others.
pub fn build_platforms(social: &SocialConfig) -> Vec<Platform> {
    let mut platforms = Vec::new();
    for kind in PlatformKind::ALL {
        let cfg = social.platform(kind);
        if !cfg.enabled {
            continue;
        }
        let client: Result<Box<dyn PlatformClient>, PlatformError> = match kind {
            PlatformKind::Bluesky => BlueskyClient::new(cfg).map(boxed),
            PlatformKind::Facebook => FacebookClient::new(cfg).map(boxed),
            PlatformKind::LastFm => LastFmClient::new(cfg).map(boxed),
            PlatformKind::ListenBrainz => ListenBrainzClient::new(cfg).map(boxed),
        };
        match client {
            Ok(client) => {
                info!(platform = %kind, "social platform enabled");
                platforms.push(Platform {
                    kind,
                    min_interval: cfg.min_interval(),
                    client,
                });
            }
            Err(e) => warn!(platform = %kind, error = %e, "social platform not usable"),
        }
    }
    platforms
}

fn boxed<C: PlatformClient + 'static>(client: C) -> Box<dyn PlatformClient> {
    Box::new(client)
}

fn http_client() -> Result<reqwest::Client, PlatformError> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(15))
        .build()
        .map_err(|e| PlatformError::Network(e.to_string()))
}

fn required(value: &Option<String>, what: &str) -> Result<String, PlatformError> {
    value
        .clone()
        .ok_or_else(|| PlatformError::Misconfigured(format!("missing {what}")))
}

/// Bluesky (AT Protocol). The only platform that consumes facets.
pub struct BlueskyClient {
    http: reqwest::Client,
    endpoint: String,
    identity: String,
    token: String,
}

impl BlueskyClient {
    const DEFAULT_ENDPOINT: &'static str = "https://bsky.social";

    pub fn new(cfg: &PlatformConfig) -> Result<Self, PlatformError> {
        Ok(Self {
            http: http_client()?,
            endpoint: cfg
                .endpoint
                .clone()
                .unwrap_or_else(|| Self::DEFAULT_ENDPOINT.to_string()),
            identity: required(&cfg.identity, "identity (handle or DID)")?,
            token: required(&cfg.token, "token")?,
        })
    }
}

#[async_trait]
impl PlatformClient for BlueskyClient {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Bluesky
    }

    async fn submit(
        &self,
        _track: &TrackInfo,
        text: &str,
        facets: &[Facet],
        _has_image: bool,
    ) -> Result<Option<String>, PlatformError> {
        let mut record = json!({
            "$type": "app.bsky.feed.post",
            "text": text,
            "createdAt": Utc::now().to_rfc3339(),
        });
        if !facets.is_empty() {
            let spans: Vec<serde_json::Value> = facets
                .iter()
                .map(|f| {
                    json!({
                        "index": { "byteStart": f.start, "byteEnd": f.end },
                        "features": [
                            { "$type": "app.bsky.richtext.facet#tag", "tag": f.tag }
                        ]
                    })
                })
                .collect();
            record["facets"] = json!(spans);
        }

        let url = format!("{}/xrpc/com.atproto.repo.createRecord", self.endpoint);
        debug!(url = %url, "posting to Bluesky");
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .json(&json!({
                "repo": self.identity,
                "collection": "app.bsky.feed.post",
                "record": record,
            }))
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Api(status.as_u16(), body));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PlatformError::Parse(e.to_string()))?;
        Ok(body["uri"].as_str().map(str::to_owned))
    }
}

/// Facebook page feed via the Graph API.
pub struct FacebookClient {
    http: reqwest::Client,
    endpoint: String,
    page_id: String,
    token: String,
}

impl FacebookClient {
    const DEFAULT_ENDPOINT: &'static str = "https://graph.facebook.com/v19.0";

    pub fn new(cfg: &PlatformConfig) -> Result<Self, PlatformError> {
        Ok(Self {
            http: http_client()?,
            endpoint: cfg
                .endpoint
                .clone()
                .unwrap_or_else(|| Self::DEFAULT_ENDPOINT.to_string()),
            page_id: required(&cfg.identity, "identity (page id)")?,
            token: required(&cfg.token, "token")?,
        })
    }
}

#[async_trait]
impl PlatformClient for FacebookClient {
    fn kind(&self) -> PlatformKind {
        PlatformKind::Facebook
    }

    async fn submit(
        &self,
        _track: &TrackInfo,
        text: &str,
        _facets: &[Facet],
        _has_image: bool,
    ) -> Result<Option<String>, PlatformError> {
        let url = format!("{}/{}/feed", self.endpoint, self.page_id);
        debug!(url = %url, "posting to Facebook");
        let response = self
            .http
            .post(&url)
            .form(&[("message", text), ("access_token", &self.token)])
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Api(status.as_u16(), body));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| PlatformError::Parse(e.to_string()))?;
        Ok(body["id"].as_str().map(str::to_owned))
    }
}

/// Last.fm scrobbling. Submits the track fields, not the post text.
pub struct LastFmClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    session_key: String,
}

impl LastFmClient {
    const DEFAULT_ENDPOINT: &'static str = "https://ws.audioscrobbler.com/2.0/";

    pub fn new(cfg: &PlatformConfig) -> Result<Self, PlatformError> {
        Ok(Self {
            http: http_client()?,
            endpoint: cfg
                .endpoint
                .clone()
                .unwrap_or_else(|| Self::DEFAULT_ENDPOINT.to_string()),
            api_key: required(&cfg.identity, "identity (API key)")?,
            session_key: required(&cfg.token, "token (session key)")?,
        })
    }
}

#[async_trait]
impl PlatformClient for LastFmClient {
    fn kind(&self) -> PlatformKind {
        PlatformKind::LastFm
    }

    async fn submit(
        &self,
        track: &TrackInfo,
        _text: &str,
        _facets: &[Facet],
        _has_image: bool,
    ) -> Result<Option<String>, PlatformError> {
        let timestamp = track.timestamp.timestamp().to_string();
        let mut form = vec![
            ("method", "track.scrobble".to_string()),
            ("artist[0]", track.artist.clone()),
            ("track[0]", track.title.clone()),
            ("timestamp[0]", timestamp),
            ("api_key", self.api_key.clone()),
            ("sk", self.session_key.clone()),
            ("format", "json".to_string()),
        ];
        if let Some(album) = &track.album {
            form.push(("album[0]", album.clone()));
        }

        debug!(artist = %track.artist, title = %track.title, "scrobbling to Last.fm");
        let response = self
            .http
            .post(&self.endpoint)
            .form(&form)
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Api(status.as_u16(), body));
        }
        // scrobbles have no addressable post id
        Ok(None)
    }
}

/// ListenBrainz listen submission.
pub struct ListenBrainzClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl ListenBrainzClient {
    const DEFAULT_ENDPOINT: &'static str = "https://api.listenbrainz.org";

    pub fn new(cfg: &PlatformConfig) -> Result<Self, PlatformError> {
        Ok(Self {
            http: http_client()?,
            endpoint: cfg
                .endpoint
                .clone()
                .unwrap_or_else(|| Self::DEFAULT_ENDPOINT.to_string()),
            token: required(&cfg.token, "token")?,
        })
    }
}

#[async_trait]
impl PlatformClient for ListenBrainzClient {
    fn kind(&self) -> PlatformKind {
        PlatformKind::ListenBrainz
    }

    async fn submit(
        &self,
        track: &TrackInfo,
        _text: &str,
        _facets: &[Facet],
        _has_image: bool,
    ) -> Result<Option<String>, PlatformError> {
        let mut metadata = json!({
            "artist_name": track.artist,
            "track_name": track.title,
        });
        if let Some(album) = &track.album {
            metadata["release_name"] = json!(album);
        }

        let url = format!("{}/1/submit-listens", self.endpoint);
        debug!(url = %url, "submitting listen to ListenBrainz");
        let response = self
            .http
            .post(&url)
            .header("Authorization", format!("Token {}", self.token))
            .json(&json!({
                "listen_type": "single",
                "payload": [{
                    "listened_at": track.timestamp.timestamp(),
                    "track_metadata": metadata,
                }],
            }))
            .send()
            .await
            .map_err(|e| PlatformError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::Api(status.as_u16(), body));
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enabled(endpoint: Option<&str>, token: Option<&str>, identity: Option<&str>) -> PlatformConfig {
        PlatformConfig {
            enabled: true,
            min_interval_secs: 60,
            endpoint: endpoint.map(str::to_owned),
            token: token.map(str::to_owned),
            identity: identity.map(str::to_owned),
        }
    }

    #[test]
    fn clients_require_credentials() {
        assert!(BlueskyClient::new(&enabled(None, Some("t"), Some("h"))).is_ok());
        assert!(BlueskyClient::new(&enabled(None, None, Some("h"))).is_err());
        assert!(BlueskyClient::new(&enabled(None, Some("t"), None)).is_err());
        assert!(ListenBrainzClient::new(&enabled(None, Some("t"), None)).is_ok());
    }

    #[test]
    fn build_skips_disabled_and_broken_platforms() {
        let mut social = SocialConfig::default();
        social.listenbrainz = enabled(None, Some("token"), None);
        // enabled but missing its token: skipped with a warning
        social.bluesky = enabled(None, None, Some("handle"));

        let platforms = build_platforms(&social);
        assert_eq!(platforms.len(), 1);
        assert_eq!(platforms[0].kind, PlatformKind::ListenBrainz);
        assert_eq!(platforms[0].min_interval, Duration::from_secs(60));
    }
}
