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

use thiserror::Error;

/// Failures surfaced by the remote service clients.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Network fault, timeout, unexpected status, or undecodable body.
    #[error("request failed: {0}")]
    Transport(String),

    /// The search service reported an error in its response body.
    #[error("{0}")]
    Remote(String),

    /// The request was rejected before anything was sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ClientError {
    /// Stable code used in JSON error output.
    pub fn code(&self) -> &'static str {
        match self {
            ClientError::Transport(_) => "transport_error",
            ClientError::Remote(_) => "remote_error",
            ClientError::InvalidInput(_) => "invalid_input",
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Transport(format!("malformed response: {err}"))
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
