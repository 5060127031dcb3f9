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

//! Client library for the location review backend.
//!
//! This library holds everything in the reviewer client that can be exercised
//! without a window: the wire protocol and its envelope decoding, the HTTP
//! transport, the current-response store and overlay toggles, the dialog
//! state machine driving the two remote workflows, and the pure view models
//! (map scene, info panel, KML artifact) that the desktop frontend renders.
//!
//! The layers compose but are usable on their own:
//!
//! - **Protocol layer**: typed [`LocationResponse`]/[`Way`] records and
//!   [`decode_reply`] for the `{result, type, data}` reply envelope.
//! - **Transport layer**: the [`Transport`] trait plus [`HttpTransport`],
//!   a blocking form-encoded POST client. Workflow tests drive the state
//!   machine with a fake transport instead.
//! - **State layer**: [`ResponseStore`] (the single authoritative response)
//!   and [`LayerConfig`] (overlay visibility toggles).
//! - **Workflow layer**: [`Dialog`] (the `input → working → failure` state
//!   machine) and [`WorkflowController`] (request dispatch on worker threads,
//!   stale-reply discarding, the single-open-dialog invariant).
//! - **View models**: [`build_scene`] and [`build_info`] translate the store
//!   contents into render-ready data; [`KmlExporter`] turns the embedded KML
//!   text into a saveable artifact.
//!
//! # Quick start
//!
//! ```no_run
//! use std::sync::Arc;
//! use location_client::{
//!     build_scene, HttpTransport, LayerConfig, ResponseStore, WorkflowController, WorkflowKind,
//! };
//!
//! let transport = Arc::new(HttpTransport::new("http://localhost:8080/"));
//! let mut controller = WorkflowController::new(transport);
//! let mut store = ResponseStore::new();
//! let layers = LayerConfig::default();
//!
//! controller.open(WorkflowKind::Query);
//! // ...user fills the form, frontend calls controller.submit()...
//! if let Some(response) = controller.poll(None) {
//!     store.set(response);
//! }
//! let scene = build_scene(store.get(), &layers);
//! assert!(scene.show_tiles);
//! ```

pub mod capability;
pub mod info;
pub mod kml;
pub mod protocol;
pub mod scene;
pub mod store;
pub mod transport;
pub mod workflow;

pub use capability::{HostCapabilities, Support};
pub use info::{build_info, InfoView, NO_INFORMATION};
pub use kml::{ExportError, KmlArtifact, KmlExporter, KML_MIME_TYPE};
pub use protocol::{decode_reply, LocationResponse, ProtocolError, Request, ServerReply, Way};
pub use scene::{build_scene, MapScene, Overlay, OverlayKind, DEFAULT_CENTER};
pub use store::{LayerConfig, ResponseStore};
pub use transport::{HttpTransport, Transport, TransportError};
pub use workflow::{
    Dialog, DialogState, ImageAttachment, ProcessForm, QueryForm, WorkflowController,
    WorkflowForm, WorkflowKind,
};
