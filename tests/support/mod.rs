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

//! Loopback stand-ins for the search and catalog services.

#![allow(dead_code)]

use std::fs;
use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;
use std::net::TcpListener;
use std::net::TcpStream;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::thread;

use assert_cmd::Command;
use serde_json::Value;
use serde_json::json;
use tempfile::TempDir;

#[derive(Debug, Clone)]
pub struct Request {
    pub target: String,
    pub body: String,
}

type Handler = Box<dyn Fn(&Request) -> (u16, String) + Send + Sync>;

pub struct FakeServer {
    pub base: String,
    requests: Arc<Mutex<Vec<Request>>>,
}

impl FakeServer {
    pub fn start(handler: Handler) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let base = format!("http://{}", listener.local_addr().expect("local addr"));
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else {
                    continue;
                };
                let Some(request) = read_request(&stream) else {
                    continue;
                };
                let (status, body) = handler(&request);
                recorded.lock().expect("requests lock").push(request);
                let response = format!(
                    "HTTP/1.1 {status} OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(response.as_bytes());
                let _ = stream.flush();
            }
        });
        Self { base, requests }
    }

    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().expect("requests lock").clone()
    }

    pub fn requests_to(&self, prefix: &str) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(|req| req.target.starts_with(prefix))
            .collect()
    }

    /// Ids asked of the catalog, in request order.
    pub fn catalog_ids(&self) -> Vec<i64> {
        self.requests_to("/graphql")
            .iter()
            .filter_map(|req| {
                let payload: Value = serde_json::from_str(&req.body).ok()?;
                payload["variables"]["id"].as_i64()
            })
            .collect()
    }
}

fn read_request(stream: &TcpStream) -> Option<Request> {
    let mut reader = BufReader::new(stream.try_clone().ok()?);
    let mut line = String::new();
    reader.read_line(&mut line).ok()?;
    let target = line.split_whitespace().nth(1)?.to_string();

    let mut content_length = 0usize;
    let mut chunked = false;
    loop {
        let mut header = String::new();
        reader.read_line(&mut header).ok()?;
        let header = header.trim_end();
        if header.is_empty() {
            break;
        }
        if let Some((name, value)) = header.split_once(':') {
            let name = name.trim().to_ascii_lowercase();
            if name == "content-length" {
                content_length = value.trim().parse().ok()?;
            } else if name == "transfer-encoding" && value.to_ascii_lowercase().contains("chunked")
            {
                chunked = true;
            }
        }
    }

    let mut body = Vec::new();
    if chunked {
        loop {
            let mut size_line = String::new();
            reader.read_line(&mut size_line).ok()?;
            let size = usize::from_str_radix(size_line.trim(), 16).ok()?;
            let mut chunk = vec![0; size + 2];
            reader.read_exact(&mut chunk).ok()?;
            if size == 0 {
                break;
            }
            body.extend_from_slice(&chunk[..size]);
        }
    } else {
        body.resize(content_length, 0);
        reader.read_exact(&mut body).ok()?;
    }

    Some(Request {
        target,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

/// Serves `search_body` on `/search` and a small catalog on `/graphql`.
pub fn services(search_status: u16, search_body: Value) -> FakeServer {
    let search_body = search_body.to_string();
    FakeServer::start(Box::new(move |req: &Request| {
        if req.target.starts_with("/search") {
            (search_status, search_body.clone())
        } else if req.target.starts_with("/graphql") {
            (200, catalog_response(&req.body))
        } else {
            (404, "{}".to_string())
        }
    }))
}

fn catalog_response(body: &str) -> String {
    let payload: Value = serde_json::from_str(body).unwrap_or(Value::Null);
    let media = match payload["variables"]["id"].as_i64() {
        Some(1) => json!({
            "title": {
                "romaji": "Shingeki no Kyojin",
                "english": "Attack on Titan",
                "native": "進撃の巨人"
            },
            "coverImage": {
                "large": "https://img.example/1-large.jpg",
                "medium": "https://img.example/1-medium.jpg"
            },
            "format": "TV",
            "episodes": 25,
            "isAdult": false
        }),
        Some(2) => json!({
            "title": { "romaji": "Otona no Jikan", "english": null, "native": "大人の時間" },
            "coverImage": { "large": "https://img.example/2-large.jpg", "medium": null },
            "format": "OVA",
            "episodes": 2,
            "isAdult": true
        }),
        Some(5) => json!({
            "title": { "romaji": "Kite", "english": null, "native": null },
            "coverImage": null,
            "format": "OVA",
            "episodes": null,
            "isAdult": true
        }),
        _ => Value::Null,
    };
    json!({ "data": { "Media": media } }).to_string()
}

pub fn hit(source_id: i64, similarity: f64, filename: &str) -> Value {
    json!({
        "anilist": source_id,
        "filename": filename,
        "episode": 1,
        "from": 10.0,
        "to": 12.0,
        "similarity": similarity,
        "video": format!("https://media.example/{source_id}.mp4"),
        "image": format!("https://media.example/{source_id}.jpg")
    })
}

/// Isolated config dir plus a working dir holding `shot.png`.
pub struct Fixture {
    config: TempDir,
    work: TempDir,
    pub server: FakeServer,
}

impl Fixture {
    pub fn new(server: FakeServer) -> Self {
        Self::with_config(server, "")
    }

    /// Like [`Fixture::new`] with extra TOML lines appended to the config.
    pub fn with_config(server: FakeServer, extra: &str) -> Self {
        let fixture = Self {
            config: TempDir::new().expect("config tempdir"),
            work: TempDir::new().expect("work tempdir"),
            server,
        };
        fs::write(fixture.work.path().join("shot.png"), b"\x89PNG fake frame").expect("write image");
        let path = global_config_path(fixture.config.path());
        fs::create_dir_all(path.parent().expect("config parent")).expect("config dir");
        fs::write(
            &path,
            format!(
                "search_url = \"{base}/search\"\nmetadata_url = \"{base}/graphql\"\n{extra}",
                base = fixture.server.base
            ),
        )
        .expect("write config");
        fixture
    }

    pub fn work_dir(&self) -> &Path {
        self.work.path()
    }

    pub fn config_root(&self) -> &Path {
        self.config.path()
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = scenehunt_cmd(self.config.path());
        cmd.current_dir(self.work.path());
        cmd
    }

    pub fn run_json(&self, args: &[&str]) -> Value {
        let output = self.cmd().args(args).output().expect("run command");
        assert!(
            output.status.success(),
            "stderr: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        let stdout = String::from_utf8_lossy(&output.stdout);
        serde_json::from_str(&stdout).expect("parse json")
    }
}

pub fn scenehunt_cmd(config_root: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("scenehunt"));
    cmd.env("XDG_CONFIG_HOME", config_root);
    cmd.env("HOME", config_root);
    cmd.env("APPDATA", config_root);
    cmd.env("NO_PROXY", "*");
    for var in [
        "HTTP_PROXY",
        "http_proxy",
        "HTTPS_PROXY",
        "https_proxy",
        "ALL_PROXY",
        "all_proxy",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

pub fn global_config_path(config_root: &Path) -> PathBuf {
    let base = if cfg!(target_os = "macos") {
        config_root.join("Library").join("Application Support")
    } else {
        config_root.to_path_buf()
    };
    base.join("scenehunt").join("scenehunt.toml")
}

pub fn normalize_json(mut value: Value) -> Value {
    if let Some(stats) = value.get_mut("stats")
        && let Some(obj) = stats.as_object_mut()
    {
        obj.insert("took_ms".to_string(), json!(0));
    }
    value
}
