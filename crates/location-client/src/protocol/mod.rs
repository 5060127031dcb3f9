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

//! Wire protocol for the location review backend.
//!
//! The backend exposes a single endpoint taking a form-encoded POST with an
//! `action` field plus action-specific fields, and answers with a JSON
//! envelope: `{"result": "success", "type": ..., "data": ...}` on success,
//! `{"result": <other>, "reason": <string>}` on failure.
//!
//! Map-shaped fields (`surs`, `tags`, `ways`) keep the payload's key order,
//! which is also the display order in the client.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while decoding a reply envelope.
///
/// These indicate a malformed or unexpected payload, not a failure the
/// server reported; server-reported failures decode to
/// [`ServerReply::Failure`].
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed reply: {0}")]
    Json(#[from] serde_json::Error),

    #[error("reply is missing field: {0}")]
    MissingField(&'static str),

    #[error("reply has unexpected payload type: {0:?}")]
    UnexpectedPayload(String),
}

/// A named polygon with descriptive tags, as carried on the wire.
///
/// `polygon` is an ordered ring of `[latitude, longitude]` pairs. Ring
/// closure is not guaranteed; consumers must tolerate open rings and rings
/// with fewer than three points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Way {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub tags: IndexMap<String, String>,
    #[serde(default)]
    pub polygon: Vec<[f64; 2]>,
}

/// The authoritative payload describing one reviewed location.
///
/// A response is immutable once accepted; a new one fully replaces it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationResponse {
    /// Display name of the location.
    pub name: String,
    /// `[latitude, longitude]` of the location point.
    pub point: [f64; 2],
    /// Server-relative path to the location photo, if one exists.
    #[serde(default)]
    pub image_file_path: Option<String>,
    /// Structured reference annotations, in payload order.
    #[serde(default)]
    pub surs: IndexMap<String, String>,
    /// Ground-truth boundary, when the backend has one.
    #[serde(default)]
    pub truth: Option<Way>,
    /// Boundary the backend computed for this location.
    #[serde(default)]
    pub computed: Option<Way>,
    /// Candidate polygons near the location, keyed by way name.
    #[serde(default)]
    pub ways: IndexMap<String, Way>,
    /// Raw KML text for export.
    pub kml: String,
    /// Suggested filename for the exported KML.
    pub kml_name: String,
}

/// A decoded reply from the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerReply {
    /// Sorted list of known location names.
    LocationNames(Vec<String>),
    /// A full location record.
    Location(Box<LocationResponse>),
    /// The server rejected the request; `reason` is shown verbatim.
    Failure { reason: String },
}

#[derive(Debug, Deserialize)]
struct RawEnvelope {
    result: String,
    #[serde(default)]
    reason: Option<String>,
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    data: Option<Value>,
}

/// Decode a reply body into a [`ServerReply`].
///
/// Any `result` other than `"success"` is a server-side failure and decodes
/// to [`ServerReply::Failure`]. A success envelope with a missing or
/// unrecognized payload is a protocol error: better to fail loudly than to
/// render garbage.
pub fn decode_reply(body: &str) -> Result<ServerReply, ProtocolError> {
    let raw: RawEnvelope = serde_json::from_str(body)?;

    if raw.result != "success" {
        let reason = raw
            .reason
            .unwrap_or_else(|| format!("server returned result {:?}", raw.result));
        return Ok(ServerReply::Failure { reason });
    }

    let kind = raw.kind.ok_or(ProtocolError::MissingField("type"))?;
    let data = raw.data.ok_or(ProtocolError::MissingField("data"))?;

    match kind.as_str() {
        "location" => Ok(ServerReply::Location(Box::new(serde_json::from_value(
            data,
        )?))),
        "location_names" => Ok(ServerReply::LocationNames(serde_json::from_value(data)?)),
        _ => Err(ProtocolError::UnexpectedPayload(kind)),
    }
}

/// A request to the backend, one variant per server action.
///
/// Numeric fields are carried as the strings the operator typed; the server
/// owns validation and reports failures through the reply envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    /// Fetch the list of known location names.
    QueryLocationNames,
    /// Fetch the full record for one known location.
    QueryLocation { location_name: String },
    /// Submit a new location for processing.
    ProcessLocation {
        lat: String,
        lon: String,
        radius: String,
        surs: String,
        /// Image re-encoded as a `data:<mime>;base64,…` string.
        image_base_64: Option<String>,
    },
}

impl Request {
    /// The server action identifier for this request.
    #[must_use]
    pub fn action(&self) -> &'static str {
        match self {
            Self::QueryLocationNames => "query_location_names",
            Self::QueryLocation { .. } => "query_location",
            Self::ProcessLocation { .. } => "process_location",
        }
    }

    /// Form fields for the POST body, including the `action` field.
    #[must_use]
    pub fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![("action", self.action().to_string())];
        match self {
            Self::QueryLocationNames => {}
            Self::QueryLocation { location_name } => {
                fields.push(("location_name", location_name.clone()));
            }
            Self::ProcessLocation {
                lat,
                lon,
                radius,
                surs,
                image_base_64,
            } => {
                fields.push(("lat", lat.clone()));
                fields.push(("lon", lon.clone()));
                fields.push(("radius", radius.clone()));
                fields.push(("surs", surs.clone()));
                if let Some(image) = image_base_64 {
                    fields.push(("image_base_64", image.clone()));
                }
            }
        }
        fields
    }
}
