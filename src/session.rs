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

use log::info;

use crate::error::Result;
use crate::metadata::MetadataLookup;
use crate::metadata::MetadataSource;
use crate::model::Candidate;
use crate::model::ViewOutcome;
use crate::pipeline;
use crate::search::FrameSearch;

/// Front-end state for one user: the last successful search and the content
/// preference. The pipeline itself is stateless.
#[derive(Debug, Clone, Default)]
pub struct Session {
    candidates: Option<Vec<Candidate>>,
    allow_adult: bool,
}

impl Session {
    pub fn new(allow_adult: bool) -> Self {
        Self {
            candidates: None,
            allow_adult,
        }
    }

    pub fn allow_adult(&self) -> bool {
        self.allow_adult
    }

    pub fn set_allow_adult(&mut self, allow_adult: bool) {
        self.allow_adult = allow_adult;
    }

    /// Runs a search and keeps its candidates. On failure the previous
    /// candidates stay in place.
    pub fn search(&mut self, client: &impl FrameSearch, image: &[u8]) -> Result<usize> {
        let candidates = client.search(image)?;
        info!("search returned {} candidates", candidates.len());
        let count = candidates.len();
        self.candidates = Some(candidates);
        Ok(count)
    }

    /// `None` until a search has succeeded.
    pub fn view<S: MetadataSource>(&self, lookup: &MetadataLookup<S>) -> Option<ViewOutcome> {
        self.candidates
            .as_deref()
            .map(|candidates| pipeline::build_view(candidates, self.allow_adult, lookup))
    }
}
