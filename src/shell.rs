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

//! Line-oriented interactive front end over a [`Session`].

use std::io::BufRead;
use std::io::Write;
use std::path::Path;

use anyhow::Context as _;
use anyhow::Result;
use log::warn;

use crate::metadata::MetadataLookup;
use crate::metadata::MetadataSource;
use crate::output::render_outcome;
use crate::search::FrameSearch;
use crate::search::check_image_path;
use crate::session::Session;

const HELP: &str = "commands:
  search <path>   search for the scene in an image file
  adult on|off    show or hide adult content
  show            render the last results again
  help            show this message
  quit            leave the shell";

#[derive(Debug, PartialEq)]
enum Command<'a> {
    Search(&'a str),
    Adult(bool),
    Show,
    Help,
    Quit,
    Empty,
    Unknown(&'a str),
}

fn parse_command(line: &str) -> Command<'_> {
    let line = line.trim();
    let (head, rest) = match line.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (line, ""),
    };
    match (head, rest) {
        ("", _) => Command::Empty,
        ("search", path) if !path.is_empty() => Command::Search(path),
        ("adult", "on") => Command::Adult(true),
        ("adult", "off") => Command::Adult(false),
        ("show", "") => Command::Show,
        ("help", "") => Command::Help,
        ("quit" | "exit", "") => Command::Quit,
        _ => Command::Unknown(line),
    }
}

pub fn run_shell<S: MetadataSource>(
    input: impl BufRead,
    out: &mut impl Write,
    session: &mut Session,
    search: &impl FrameSearch,
    lookup: &MetadataLookup<S>,
) -> Result<()> {
    writeln!(out, "scenehunt shell; type `help` for commands")?;
    prompt(out)?;
    for line in input.lines() {
        let line = line?;
        match parse_command(&line) {
            Command::Empty => {}
            Command::Quit => return Ok(()),
            Command::Help => writeln!(out, "{HELP}")?,
            Command::Unknown(text) => writeln!(out, "unknown command: {text} (try `help`)")?,
            Command::Adult(allow) => {
                session.set_allow_adult(allow);
                writeln!(
                    out,
                    "adult content {}",
                    if session.allow_adult() { "shown" } else { "hidden" }
                )?;
                show(out, session, lookup)?;
            }
            Command::Show => show(out, session, lookup)?,
            Command::Search(path) => match read_image(Path::new(path)) {
                Ok(image) => match session.search(search, &image) {
                    Ok(_) => show(out, session, lookup)?,
                    Err(err) => {
                        warn!("search failed: {err}");
                        writeln!(out, "error: {err}")?;
                    }
                },
                Err(err) => writeln!(out, "error: {err:#}")?,
            },
        }
        prompt(out)?;
    }
    Ok(())
}

fn read_image(path: &Path) -> Result<Vec<u8>> {
    check_image_path(path)?;
    std::fs::read(path).with_context(|| format!("read {}", path.display()))
}

fn prompt(out: &mut impl Write) -> Result<()> {
    write!(out, "> ")?;
    out.flush()?;
    Ok(())
}

fn show<S: MetadataSource>(
    out: &mut impl Write,
    session: &Session,
    lookup: &MetadataLookup<S>,
) -> Result<()> {
    match session.view(lookup) {
        Some(outcome) => render_outcome(out, &outcome)?,
        None => writeln!(out, "no search yet; upload an image with `search <path>`")?,
    }
    Ok(())
}
