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

//! Turns raw search candidates into the filtered, enriched view model.

use log::debug;

use crate::metadata::MetadataLookup;
use crate::metadata::MetadataSource;
use crate::model::Candidate;
use crate::model::MediaMetadata;
use crate::model::ViewItem;
use crate::model::ViewOutcome;

pub const MIN_SIMILARITY: f64 = 0.50;
pub const MAX_RESULTS: usize = 3;
pub const UNKNOWN_TITLE: &str = "Unknown title";
pub const UNKNOWN_FILE: &str = "Unknown file";
pub const UNKNOWN_EPISODE: &str = "?";

/// Single pass over `candidates` in service order.
///
/// Metadata is resolved lazily and sequentially, so candidates past the cap
/// or below the similarity floor never trigger a lookup.
pub fn build_view<S: MetadataSource>(
    candidates: &[Candidate],
    allow_adult: bool,
    lookup: &MetadataLookup<S>,
) -> ViewOutcome {
    let mut items = Vec::new();

    for candidate in candidates {
        if items.len() >= MAX_RESULTS {
            break;
        }
        if candidate.similarity < MIN_SIMILARITY {
            debug!(
                "skipping {} (similarity {:.3})",
                candidate.filename, candidate.similarity
            );
            continue;
        }

        let metadata = lookup.lookup(candidate.source_id);
        let is_adult = metadata.as_ref().is_some_and(|meta| meta.is_adult);
        if is_adult && !allow_adult {
            debug!("skipping {} (adult content)", candidate.filename);
            continue;
        }

        items.push(view_item(candidate, metadata.as_ref(), is_adult));
    }

    if items.is_empty() {
        ViewOutcome::NoMatches
    } else {
        ViewOutcome::Matches(items)
    }
}

fn view_item(candidate: &Candidate, metadata: Option<&MediaMetadata>, is_adult: bool) -> ViewItem {
    let title = match metadata {
        Some(meta) => non_empty(&meta.title.native)
            .or_else(|| non_empty(&meta.title.romaji))
            .unwrap_or(UNKNOWN_TITLE)
            .to_string(),
        None if candidate.filename.is_empty() => UNKNOWN_FILE.to_string(),
        None => candidate.filename.clone(),
    };

    ViewItem {
        title,
        english_title: metadata
            .and_then(|meta| non_empty(&meta.title.english))
            .map(str::to_string),
        cover_url: metadata
            .and_then(|meta| non_empty(&meta.cover_image.large))
            .map(str::to_string),
        is_adult,
        episode: candidate
            .episode
            .clone()
            .unwrap_or_else(|| UNKNOWN_EPISODE.to_string()),
        timestamp: format_timestamp(candidate.from_secs),
        similarity_pct: candidate.similarity * 100.0,
        video_url: candidate.video_url.clone(),
        filename: candidate.filename.clone(),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Zero-padded `mm:ss` from floored seconds. Negative or NaN offsets read as
/// zero; minutes keep counting past an hour.
pub fn format_timestamp(seconds: f64) -> String {
    let whole = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{:02}:{:02}", whole / 60, whole % 60)
}
