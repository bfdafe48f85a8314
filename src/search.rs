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

//! Client for the anime frame search service.

use std::path::Path;
use std::time::Duration;

use log::debug;
use log::warn;
use reqwest::blocking::Client;
use reqwest::blocking::multipart;
use serde::Deserialize;

use crate::config::Config;
use crate::error::ClientError;
use crate::error::Result;
use crate::model::Candidate;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Only JPG and PNG screenshots are uploaded.
pub fn check_image_path(path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some(ext) if IMAGE_EXTENSIONS.contains(&ext) => Ok(()),
        _ => Err(ClientError::InvalidInput(format!(
            "{} is not a JPG or PNG image",
            path.display()
        ))),
    }
}

/// Anything that can turn an image into ranked match candidates.
pub trait FrameSearch {
    fn search(&self, image: &[u8]) -> Result<Vec<Candidate>>;
}

#[derive(Debug, Deserialize)]
struct SearchBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    result: Vec<Candidate>,
}

/// Blocking client for the trace.moe `/search` endpoint.
#[derive(Debug, Clone)]
pub struct TraceMoeClient {
    url: String,
    cut_borders: bool,
    http: Client,
}

impl TraceMoeClient {
    pub fn new(url: impl Into<String>, cut_borders: bool, timeout: Option<Duration>) -> Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            url: url.into(),
            cut_borders,
            http,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.search_url.clone(),
            config.cut_borders,
            config.search_timeout_secs.map(Duration::from_secs),
        )
    }

    pub fn with_cut_borders(mut self, cut_borders: bool) -> Self {
        self.cut_borders = cut_borders;
        self
    }
}

impl FrameSearch for TraceMoeClient {
    fn search(&self, image: &[u8]) -> Result<Vec<Candidate>> {
        if image.is_empty() {
            return Err(ClientError::InvalidInput("image is empty".to_string()));
        }

        let part = multipart::Part::bytes(image.to_vec()).file_name("image");
        let form = multipart::Form::new().part("image", part);

        let mut request = self.http.post(&self.url).multipart(form);
        if self.cut_borders {
            request = request.query(&[("cutBorders", "")]);
        }

        debug!("searching {} ({} bytes)", self.url, image.len());
        let response = request.send()?;
        let status = response.status();
        let text = response.text()?;

        if !status.is_success() {
            warn!("search service returned {status}");
            let message = match error_detail(&text) {
                Some(detail) => format!("search service returned {status}: {detail}"),
                None => format!("search service returned {status}"),
            };
            return Err(ClientError::Transport(message));
        }

        parse_search_body(&text)
    }
}

/// Decodes a 2xx search response body.
pub fn parse_search_body(text: &str) -> Result<Vec<Candidate>> {
    let body: SearchBody = serde_json::from_str(text)?;
    match body.error {
        Some(message) if !message.is_empty() => Err(ClientError::Remote(message)),
        _ => Ok(body.result),
    }
}

fn error_detail(text: &str) -> Option<String> {
    let body: SearchBody = serde_json::from_str(text).ok()?;
    body.error.filter(|message| !message.is_empty())
}
