//! Social Test Doubles
//!
//! A platform client that records submissions instead of making HTTP
//! calls, and a content source with deterministic output.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use nowcast::db::playout_log::PlayStats;
use nowcast::social::{
    ContentSource, Facet, Platform, PlatformClient, PlatformError, PostContent, Provenance,
};
use nowcast::types::{PlatformKind, TrackInfo};

/// One submission captured by [`RecordingClient`].
#[derive(Debug, Clone)]
pub struct RecordedPost {
    pub text: String,
    pub facets: Vec<Facet>,
    pub has_image: bool,
}

/// Records every submission; optionally fails them all.
pub struct RecordingClient {
    kind: PlatformKind,
    posts: Arc<Mutex<Vec<RecordedPost>>>,
    fail: bool,
    counter: AtomicU64,
}

impl RecordingClient {
    pub fn new(kind: PlatformKind) -> (Self, Arc<Mutex<Vec<RecordedPost>>>) {
        let posts = Arc::new(Mutex::new(Vec::new()));
        let client = Self {
            kind,
            posts: Arc::clone(&posts),
            fail: false,
            counter: AtomicU64::new(0),
        };
        (client, posts)
    }

    pub fn failing(kind: PlatformKind) -> Self {
        Self {
            kind,
            posts: Arc::new(Mutex::new(Vec::new())),
            fail: true,
            counter: AtomicU64::new(0),
        }
    }
}

#[async_trait]
impl PlatformClient for RecordingClient {
    fn kind(&self) -> PlatformKind {
        self.kind
    }

    async fn submit(
        &self,
        _track: &TrackInfo,
        text: &str,
        facets: &[Facet],
        has_image: bool,
    ) -> Result<Option<String>, PlatformError> {
        if self.fail {
            return Err(PlatformError::Api(500, "induced failure".into()));
        }
        self.posts.lock().unwrap().push(RecordedPost {
            text: text.to_owned(),
            facets: facets.to_vec(),
            has_image,
        });
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(Some(format!("rec-{n}")))
    }
}

/// Builds an enabled platform around a recording client.
pub fn recording_platform(
    kind: PlatformKind,
    min_interval: Duration,
) -> (Platform, Arc<Mutex<Vec<RecordedPost>>>) {
    let (client, posts) = RecordingClient::new(kind);
    let platform = Platform {
        kind,
        min_interval,
        client: Box::new(client),
    };
    (platform, posts)
}

/// Returns the same text for every track.
pub struct FixedContent {
    text: String,
    provenance: Provenance,
}

impl FixedContent {
    pub fn template(text: &str) -> Box<Self> {
        Box::new(Self {
            text: text.to_owned(),
            provenance: Provenance::Template { name: "fixed" },
        })
    }

    pub fn ai(text: &str) -> Box<Self> {
        Box::new(Self {
            text: text.to_owned(),
            provenance: Provenance::Ai {
                prompt: "fixed".into(),
            },
        })
    }
}

#[async_trait]
impl ContentSource for FixedContent {
    async fn describe(&self, _track: &TrackInfo, _stats: &PlayStats) -> PostContent {
        PostContent {
            text: self.text.clone(),
            provenance: self.provenance.clone(),
        }
    }
}
