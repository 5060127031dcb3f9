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

//! KML export.
//!
//! The response carries its KML as opaque text; the exporter turns it into a
//! saveable artifact once per response and hands the same artifact back on
//! every trigger until the next [`KmlExporter::prepare`].

use std::fs;
use std::path::{Path, PathBuf};

use crate::capability::HostCapabilities;
use crate::protocol::LocationResponse;

/// MIME type of the exported artifact.
pub const KML_MIME_TYPE: &str = "application/vnd.google-earth.kml";

/// A prepared, downloadable KML artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KmlArtifact {
    pub content: Vec<u8>,
    pub file_name: String,
    pub mime_type: &'static str,
}

/// Errors raised while exporting.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("KML export is not available")]
    Unavailable,

    #[error("failed to write KML file: {0}")]
    Io(#[from] std::io::Error),
}

/// Builds and hands out the KML artifact for the current response.
#[derive(Debug)]
pub struct KmlExporter {
    can_save: bool,
    artifact: Option<KmlArtifact>,
}

impl KmlExporter {
    /// Create an exporter for the probed host capabilities.
    ///
    /// When the host has no way to save files the exporter never prepares an
    /// artifact and the info panel shows the export as unavailable.
    #[must_use]
    pub fn new(capabilities: &HostCapabilities) -> Self {
        Self {
            can_save: capabilities.can_save_files(),
            artifact: None,
        }
    }

    /// Build the artifact for a freshly accepted response.
    pub fn prepare(&mut self, response: &LocationResponse) {
        self.artifact = self.can_save.then(|| KmlArtifact {
            content: response.kml.clone().into_bytes(),
            file_name: response.kml_name.clone(),
            mime_type: KML_MIME_TYPE,
        });
    }

    /// Drop the prepared artifact.
    pub fn clear(&mut self) {
        self.artifact = None;
    }

    /// Whether a download can currently be offered.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.artifact.is_some()
    }

    /// Hand out the prepared artifact.
    ///
    /// Idempotent: repeated triggers return the identical artifact until the
    /// next [`prepare`](Self::prepare) call.
    pub fn trigger(&self) -> Result<&KmlArtifact, ExportError> {
        self.artifact.as_ref().ok_or(ExportError::Unavailable)
    }

    /// Write the artifact into `dir`, named by its suggested filename.
    ///
    /// This is the save path for hosts without a native save dialog.
    pub fn save_into(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let artifact = self.trigger()?;
        let path = dir.join(&artifact.file_name);
        fs::write(&path, &artifact.content)?;
        Ok(path)
    }
}
