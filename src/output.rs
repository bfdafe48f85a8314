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

use std::io;
use std::io::Write;

use anyhow::Result;
use serde::Serialize;
use serde_json::Value;

use crate::model::Candidate;
use crate::model::MediaMetadata;
use crate::model::ViewItem;
use crate::model::ViewOutcome;
use crate::pipeline::format_timestamp;

pub const COVER_PLACEHOLDER: &str = "https://placehold.co/200x300?text=No+Cover";
pub const NO_MATCHES: &str = "No matches found (or all results were filtered).";
pub const RAW_LIMIT: usize = 3;

#[derive(Debug, Clone, Serialize, Default)]
pub struct StatsOut {
    pub took_ms: i64,
    pub total_candidates: i64,
    pub shown: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct QueryOut {
    pub image: String,
    pub allow_adult: bool,
    pub cut_borders: bool,
    pub raw: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorOut {
    pub code: String,
    pub message: String,
    pub details: Option<String>,
    pub hint: Option<String>,
}

#[derive(Debug, Clone, Serialize, Default)]
pub struct JsonResponse {
    pub ok: bool,
    pub schema_version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<QueryOut>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StatsOut>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorOut>,
}

impl JsonResponse {
    pub fn ok() -> Self {
        Self {
            ok: true,
            schema_version: "1".to_string(),
            ..Default::default()
        }
    }

    pub fn error(code: &str, message: &str) -> Self {
        Self {
            ok: false,
            schema_version: "1".to_string(),
            error: Some(ErrorOut {
                code: code.to_string(),
                message: message.to_string(),
                details: None,
                hint: None,
            }),
            ..Default::default()
        }
    }

    pub fn with_hint(mut self, hint: &str) -> Self {
        if let Some(error) = &mut self.error {
            error.hint = Some(hint.to_string());
        }
        self
    }

    pub fn with_query(mut self, query: QueryOut) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_results<T: Serialize>(mut self, results: &[T]) -> Result<Self> {
        let values = results
            .iter()
            .map(serde_json::to_value)
            .collect::<serde_json::Result<Vec<_>>>()?;
        self.results = Some(values);
        Ok(self)
    }

    pub fn with_media(mut self, media: &MediaMetadata) -> Result<Self> {
        self.media = Some(serde_json::to_value(media)?);
        Ok(self)
    }

    pub fn with_stats(mut self, stats: StatsOut) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

pub fn print_json(resp: &JsonResponse) -> Result<()> {
    let text = serde_json::to_string_pretty(resp)?;
    println!("{text}");
    Ok(())
}

pub fn render_outcome(out: &mut impl Write, outcome: &ViewOutcome) -> io::Result<()> {
    match outcome {
        ViewOutcome::NoMatches => writeln!(out, "{NO_MATCHES}"),
        ViewOutcome::Matches(items) => {
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    writeln!(out)?;
                }
                render_item(out, idx + 1, item)?;
            }
            Ok(())
        }
    }
}

fn render_item(out: &mut impl Write, rank: usize, item: &ViewItem) -> io::Result<()> {
    writeln!(out, "[{rank}] {}", item.title)?;
    if let Some(english) = &item.english_title {
        writeln!(out, "    {english}")?;
    }
    if item.is_adult {
        writeln!(out, "    R-18")?;
    }
    writeln!(
        out,
        "    episode: {}  |  time: {}",
        item.episode, item.timestamp
    )?;
    writeln!(out, "    similarity: {:.2}%", item.similarity_pct)?;
    writeln!(
        out,
        "    cover: {}",
        item.cover_url.as_deref().unwrap_or(COVER_PLACEHOLDER)
    )?;
    writeln!(
        out,
        "    preview: {}",
        item.video_url.as_deref().unwrap_or("no preview")
    )?;
    writeln!(out, "    file: {}", item.filename)
}

/// Unfiltered view of the first few candidates, without catalog lookups.
pub fn render_raw(out: &mut impl Write, candidates: &[Candidate]) -> io::Result<()> {
    if candidates.is_empty() {
        return writeln!(out, "No candidates returned.");
    }
    writeln!(
        out,
        "{} candidates, showing the first {}:",
        candidates.len(),
        candidates.len().min(RAW_LIMIT)
    )?;
    for (idx, candidate) in candidates.iter().take(RAW_LIMIT).enumerate() {
        writeln!(out)?;
        writeln!(
            out,
            "[{}] similarity: {:.2}%",
            idx + 1,
            candidate.similarity * 100.0
        )?;
        writeln!(out, "    file: {}", candidate.filename)?;
        writeln!(
            out,
            "    episode: {}",
            candidate.episode.as_deref().unwrap_or("?")
        )?;
        writeln!(out, "    time: {}", format_timestamp(candidate.from_secs))?;
        writeln!(
            out,
            "    preview video: {}",
            candidate.video_url.as_deref().unwrap_or("-")
        )?;
        writeln!(
            out,
            "    preview image: {}",
            candidate.image_url.as_deref().unwrap_or("-")
        )?;
    }
    Ok(())
}

pub fn render_media(out: &mut impl Write, id: i64, media: Option<&MediaMetadata>) -> io::Result<()> {
    let Some(media) = media else {
        return writeln!(out, "No metadata for {id}.");
    };
    let title = &media.title;
    writeln!(out, "id: {id}")?;
    for (label, value) in [
        ("native", &title.native),
        ("romaji", &title.romaji),
        ("english", &title.english),
    ] {
        if let Some(value) = value {
            writeln!(out, "{label}: {value}")?;
        }
    }
    if let Some(format) = &media.format {
        writeln!(out, "format: {format}")?;
    }
    if let Some(episodes) = media.episodes {
        writeln!(out, "episodes: {episodes}")?;
    }
    writeln!(out, "adult: {}", media.is_adult)?;
    writeln!(
        out,
        "cover: {}",
        media.cover_image.large.as_deref().unwrap_or(COVER_PLACEHOLDER)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item() -> ViewItem {
        ViewItem {
            title: "進撃の巨人".to_string(),
            english_title: Some("Attack on Titan".to_string()),
            cover_url: None,
            is_adult: true,
            episode: "3".to_string(),
            timestamp: "02:05".to_string(),
            similarity_pct: 92.3456,
            video_url: None,
            filename: "aot-03.mkv".to_string(),
        }
    }

    fn rendered(outcome: &ViewOutcome) -> String {
        let mut buf = Vec::new();
        render_outcome(&mut buf, outcome).expect("render");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn card_lists_every_field() {
        let text = rendered(&ViewOutcome::Matches(vec![item()]));
        assert_eq!(
            text,
            "[1] 進撃の巨人\n    Attack on Titan\n    R-18\n    episode: 3  |  time: 02:05\n    \
             similarity: 92.35%\n    cover: https://placehold.co/200x300?text=No+Cover\n    \
             preview: no preview\n    file: aot-03.mkv\n"
        );
    }

    #[test]
    fn no_matches_has_its_own_message() {
        assert_eq!(rendered(&ViewOutcome::NoMatches), format!("{NO_MATCHES}\n"));
    }

    #[test]
    fn raw_listing_is_capped() {
        let candidates: Vec<Candidate> = (0..5)
            .map(|i| Candidate {
                similarity: 0.5,
                source_id: None,
                episode: None,
                from_secs: 0.0,
                to_secs: None,
                filename: format!("{i}.mp4"),
                video_url: None,
                image_url: Some(format!("https://media/{i}.jpg")),
            })
            .collect();
        let mut buf = Vec::new();
        render_raw(&mut buf, &candidates).expect("render");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.starts_with("5 candidates, showing the first 3:"));
        assert!(text.contains("preview image: https://media/2.jpg"));
        assert!(!text.contains("3.mp4"));
    }

    #[test]
    fn error_response_carries_code_and_hint() {
        let resp = JsonResponse::error("transport_error", "request failed").with_hint("retry later");
        let value = serde_json::to_value(&resp).expect("json");
        assert_eq!(value["ok"], false);
        assert_eq!(value["error"]["code"], "transport_error");
        assert_eq!(value["error"]["hint"], "retry later");
        assert!(value.get("results").is_none());
    }
}
