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

use std::path::PathBuf;

use clap::Args;
use clap::Parser;
use clap::Subcommand;

#[derive(Parser, Debug)]
#[command(
    name = "scenehunt",
    version,
    about = "Find the anime a screenshot came from"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write the default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Search for the scene in an image
    Search(SearchArgs),

    /// Look up catalog metadata for a source id
    Lookup(LookupArgs),

    /// Interactive session
    Shell {
        /// Start with adult content shown
        #[arg(long)]
        allow_adult: bool,

        /// Start with adult content hidden, even if the config shows it
        #[arg(long, conflicts_with = "allow_adult")]
        no_allow_adult: bool,
    },
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// JPG or PNG screenshot
    pub image: PathBuf,

    /// Show adult content
    #[arg(long)]
    pub allow_adult: bool,

    /// Hide adult content, even if the config shows it
    #[arg(long, conflicts_with = "allow_adult")]
    pub no_allow_adult: bool,

    /// Do not ask the service to crop black borders
    #[arg(long)]
    pub no_cut_borders: bool,

    /// Print raw candidates without filtering or metadata
    #[arg(long)]
    pub raw: bool,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// Catalog id of the media
    pub id: i64,

    /// Output JSON
    #[arg(long)]
    pub json: bool,
}

/// Explicit flags override the configured default in either direction.
pub fn adult_preference(configured: bool, allow: bool, deny: bool) -> bool {
    if allow {
        true
    } else if deny {
        false
    } else {
        configured
    }
}
