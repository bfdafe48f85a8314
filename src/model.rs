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

//! Shared domain types used across the search client, metadata lookup, and
//! the result pipeline.

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Value;

/// One raw match returned by the frame search service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub similarity: f64,
    #[serde(default, rename(deserialize = "anilist"))]
    pub source_id: Option<i64>,
    #[serde(default, deserialize_with = "episode_label")]
    pub episode: Option<String>,
    #[serde(default, rename(deserialize = "from"), deserialize_with = "offset_secs")]
    pub from_secs: f64,
    #[serde(default, rename(deserialize = "to"))]
    pub to_secs: Option<f64>,
    #[serde(default)]
    pub filename: String,
    #[serde(default, rename(deserialize = "video"))]
    pub video_url: Option<String>,
    #[serde(default, rename(deserialize = "image"))]
    pub image_url: Option<String>,
}

/// The service sends episodes as a number, a string, a list of numbers, or
/// null. Everything is normalized to a label.
fn episode_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| label_from_value(&v)))
}

fn label_from_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().filter_map(label_from_value).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.join("|"))
            }
        }
        Value::Bool(_) | Value::Object(_) => None,
    }
}

fn offset_secs<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?;
    Ok(value.unwrap_or(0.0))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MediaTitle {
    pub native: Option<String>,
    pub romaji: Option<String>,
    pub english: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverImage {
    pub large: Option<String>,
    pub medium: Option<String>,
}

/// Catalog entry for a source identifier, as returned by the metadata service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: MediaTitle,
    #[serde(default, deserialize_with = "null_as_default")]
    pub cover_image: CoverImage,
    pub format: Option<String>,
    pub episodes: Option<i64>,
    #[serde(default, deserialize_with = "null_as_false")]
    pub is_adult: bool,
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// The catalog sends `null` for absent nested objects.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Display-ready form of an accepted candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub english_title: Option<String>,
    pub cover_url: Option<String>,
    pub is_adult: bool,
    pub episode: String,
    pub timestamp: String,
    pub similarity_pct: f64,
    pub video_url: Option<String>,
    pub filename: String,
}

/// Result of one pipeline run. "Never ran" is the absence of a `ViewOutcome`.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewOutcome {
    Matches(Vec<ViewItem>),
    NoMatches,
}

impl ViewOutcome {
    pub fn items(&self) -> &[ViewItem] {
        match self {
            ViewOutcome::Matches(items) => items,
            ViewOutcome::NoMatches => &[],
        }
    }
}
