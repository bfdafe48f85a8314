// Copyright 2026 Scenehunt Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Media catalog lookups with time-bounded memoization.

use std::time::Duration;

use log::debug;
use log::warn;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;

use crate::cache::TtlCache;
use crate::config::Config;
use crate::error::ClientError;
use crate::error::Result;
use crate::model::MediaMetadata;

const MEDIA_QUERY: &str = r#"
query ($id: Int) {
  Media (id: $id, type: ANIME) {
    title {
      romaji
      english
      native
    }
    coverImage {
      large
      medium
    }
    format
    episodes
    isAdult
  }
}
"#;

/// Fetches catalog metadata for one source identifier.
///
/// `Ok(None)` means the catalog has no entry for the id.
pub trait MetadataSource {
    fn fetch(&self, id: i64) -> Result<Option<MediaMetadata>>;
}

#[derive(Debug, Deserialize)]
struct GraphQlBody {
    data: Option<MediaData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct MediaData {
    media: Option<MediaMetadata>,
}

/// Blocking client for the AniList GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct AniListClient {
    url: String,
    http: Client,
}

impl AniListClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            http,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.metadata_url.clone(),
            Duration::from_secs(config.metadata_timeout_secs),
        )
    }
}

impl MetadataSource for AniListClient {
    fn fetch(&self, id: i64) -> Result<Option<MediaMetadata>> {
        debug!("fetching metadata for {id} from {}", self.url);
        let payload = json!({
            "query": MEDIA_QUERY,
            "variables": { "id": id },
        });
        let response = self.http.post(&self.url).json(&payload).send()?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(ClientError::Transport(format!(
                "metadata service returned {status}"
            )));
        }
        let text = response.text()?;
        parse_media_body(&text)
    }
}

pub fn parse_media_body(text: &str) -> Result<Option<MediaMetadata>> {
    let body: GraphQlBody = serde_json::from_str(text)?;
    Ok(body.data.and_then(|data| data.media))
}

/// Memoizing front for a [`MetadataSource`].
///
/// Faults are logged and degrade to `None`; callers never see an error.
#[derive(Debug)]
pub struct MetadataLookup<S> {
    source: S,
    cache: TtlCache<i64, Option<MediaMetadata>>,
}

impl<S: MetadataSource> MetadataLookup<S> {
    /// Hits live for `ttl`, misses and failures for `miss_ttl`.
    pub fn new(source: S, ttl: Duration, miss_ttl: Duration) -> Self {
        let cache = TtlCache::with_expiry(move |value: &Option<MediaMetadata>| {
            if value.is_some() { ttl } else { miss_ttl }
        });
        Self { source, cache }
    }

    pub fn from_config(source: S, config: &Config) -> Self {
        Self::new(
            source,
            Duration::from_secs(config.metadata_ttl_secs),
            Duration::from_secs(config.metadata_miss_ttl_secs),
        )
    }

    pub fn lookup(&self, id: Option<i64>) -> Option<MediaMetadata> {
        let id = id?;
        self.cache
            .get_or_compute(id, || match self.source.fetch(id) {
                Ok(found) => found,
                Err(err) => {
                    warn!("metadata lookup for {id} failed: {err}");
                    None
                }
            })
    }
}
