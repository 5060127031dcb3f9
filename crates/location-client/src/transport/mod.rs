// Copyright 2025 Chris Custine
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

//! Transport layer for the backend endpoint.
//!
//! Requests are blocking and expected to run on a worker thread; the
//! workflow controller owns that dispatch. The [`Transport`] trait exists so
//! the state machine can be tested against a fake backend.

use log::debug;

use crate::protocol::{decode_reply, ProtocolError, Request, ServerReply};

/// Errors raised while talking to the backend.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}

/// A synchronous channel to the backend.
pub trait Transport: Send + Sync {
    /// Post one request and decode the reply envelope.
    fn post(&self, request: &Request) -> Result<ServerReply, TransportError>;
}

/// HTTP transport posting form-encoded requests to a single endpoint.
#[derive(Debug)]
pub struct HttpTransport {
    endpoint: String,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Create a transport for the given endpoint URL.
    #[must_use]
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// The endpoint URL this transport posts to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    fn post(&self, request: &Request) -> Result<ServerReply, TransportError> {
        debug!("posting {} to {}", request.action(), self.endpoint);
        let response = self
            .client
            .post(&self.endpoint)
            .form(&request.form_fields())
            .send()?
            .error_for_status()?;
        let body = response.text()?;
        Ok(decode_reply(&body)?)
    }
}
