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

mod cache;
mod cli;
mod config;
mod error;
mod metadata;
mod model;
mod output;
mod pipeline;
mod search;
mod session;
mod shell;

use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context as _;
use anyhow::Result;
use clap::Parser;
use log::debug;

use crate::cli::Cli;
use crate::cli::Commands;
use crate::cli::LookupArgs;
use crate::cli::SearchArgs;
use crate::config::Config;
use crate::error::ClientError;
use crate::metadata::AniListClient;
use crate::metadata::MetadataLookup;
use crate::model::ViewOutcome;
use crate::output::JsonResponse;
use crate::output::NO_MATCHES;
use crate::output::QueryOut;
use crate::output::RAW_LIMIT;
use crate::output::StatsOut;
use crate::output::print_json;
use crate::search::FrameSearch;
use crate::search::TraceMoeClient;
use crate::session::Session;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Init { force } => cmd_init(force),
        Commands::Search(args) => {
            let json = args.json;
            handle_result(cmd_search(args), json)
        }
        Commands::Lookup(args) => {
            let json = args.json;
            handle_result(cmd_lookup(args), json)
        }
        Commands::Shell {
            allow_adult,
            no_allow_adult,
        } => cmd_shell(allow_adult, no_allow_adult),
    }
}

fn handle_result(result: Result<()>, json: bool) -> Result<()> {
    match result {
        Ok(()) => Ok(()),
        Err(err) => {
            if json {
                let resp = match err.downcast_ref::<ClientError>() {
                    Some(client_err) => {
                        let resp = JsonResponse::error(client_err.code(), &client_err.to_string());
                        if matches!(client_err, ClientError::Transport(_)) {
                            resp.with_hint("check the network connection and try again")
                        } else {
                            resp
                        }
                    }
                    None => JsonResponse::error("error", &format!("{err:#}")),
                };
                print_json(&resp)?;
                Ok(())
            } else {
                Err(err)
            }
        }
    }
}

fn config_path() -> Result<PathBuf> {
    config::global_config_path().ok_or_else(|| anyhow::anyhow!("config directory unavailable"))
}

fn cmd_init(force: bool) -> Result<()> {
    let path = config_path()?;
    if path.exists() && !force {
        anyhow::bail!(
            "config already exists at {} (use --force to overwrite)",
            path.display()
        );
    }
    config::write_config(&path, &Config::default())?;
    println!("Wrote default config to {}", path.display());
    Ok(())
}

fn cmd_search(args: SearchArgs) -> Result<()> {
    let config = config::load_global_config()?;
    search::check_image_path(&args.image)?;
    let image = std::fs::read(&args.image)
        .with_context(|| format!("read image {}", args.image.display()))?;

    let cut_borders = config.cut_borders && !args.no_cut_borders;
    let allow_adult =
        cli::adult_preference(config.allow_adult, args.allow_adult, args.no_allow_adult);
    let client = TraceMoeClient::from_config(&config)?.with_cut_borders(cut_borders);

    let start = Instant::now();
    let candidates = client.search(&image)?;
    debug!("search took {:?}", start.elapsed());

    let query = QueryOut {
        image: args.image.display().to_string(),
        allow_adult,
        cut_borders,
        raw: args.raw,
    };

    if args.raw {
        let shown = &candidates[..candidates.len().min(RAW_LIMIT)];
        if args.json {
            let resp = JsonResponse::ok()
                .with_query(query)
                .with_results(shown)?
                .with_stats(StatsOut {
                    took_ms: start.elapsed().as_millis() as i64,
                    total_candidates: candidates.len() as i64,
                    shown: shown.len() as i64,
                });
            print_json(&resp)?;
        } else {
            output::render_raw(&mut std::io::stdout().lock(), &candidates)?;
        }
        return Ok(());
    }

    let lookup = MetadataLookup::from_config(AniListClient::from_config(&config)?, &config);
    let outcome = pipeline::build_view(&candidates, allow_adult, &lookup);

    if args.json {
        let items = outcome.items();
        let mut resp = JsonResponse::ok()
            .with_query(query)
            .with_results(items)?
            .with_stats(StatsOut {
                took_ms: start.elapsed().as_millis() as i64,
                total_candidates: candidates.len() as i64,
                shown: items.len() as i64,
            });
        if outcome == ViewOutcome::NoMatches {
            resp = resp.with_warnings(vec![NO_MATCHES.to_string()]);
        }
        print_json(&resp)?;
    } else {
        output::render_outcome(&mut std::io::stdout().lock(), &outcome)?;
    }

    Ok(())
}

fn cmd_lookup(args: LookupArgs) -> Result<()> {
    let config = config::load_global_config()?;
    let lookup = MetadataLookup::from_config(AniListClient::from_config(&config)?, &config);
    let media = lookup.lookup(Some(args.id));

    if args.json {
        let resp = match &media {
            Some(media) => JsonResponse::ok().with_media(media)?,
            None => JsonResponse::ok().with_warnings(vec![format!("no metadata for {}", args.id)]),
        };
        print_json(&resp)?;
    } else {
        output::render_media(&mut std::io::stdout().lock(), args.id, media.as_ref())?;
    }
    Ok(())
}

fn cmd_shell(allow_adult: bool, no_allow_adult: bool) -> Result<()> {
    let config = config::load_global_config()?;
    let search = TraceMoeClient::from_config(&config)?;
    let lookup = MetadataLookup::from_config(AniListClient::from_config(&config)?, &config);
    let mut session = Session::new(cli::adult_preference(
        config.allow_adult,
        allow_adult,
        no_allow_adult,
    ));

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    shell::run_shell(stdin.lock(), &mut stdout, &mut session, &search, &lookup)?;
    writeln!(stdout)?;
    Ok(())
}
