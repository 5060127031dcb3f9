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

//! Client-side state: the current response and the overlay toggles.

use crate::protocol::LocationResponse;

/// Holds the single authoritative server response.
///
/// Renderers read the held value but never mutate it; the only way the value
/// changes is a full replacement through [`ResponseStore::set`]. Callers are
/// responsible for re-rendering dependents after a replacement.
#[derive(Debug, Default)]
pub struct ResponseStore {
    current: Option<LocationResponse>,
}

impl ResponseStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current response, if any.
    #[must_use]
    pub fn get(&self) -> Option<&LocationResponse> {
        self.current.as_ref()
    }

    /// Replace the held response atomically. There is no partial merge.
    pub fn set(&mut self, response: LocationResponse) {
        self.current = Some(response);
    }
}

/// Overlay visibility toggles.
///
/// Purely client-local; the backend never sees these. They are applied as a
/// visibility filter at scene-build time, so flipping a toggle never causes
/// a network round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerConfig {
    pub map_tiles: bool,
    pub buildings: bool,
    pub generated_polygons: bool,
    pub computed_polygon: bool,
    pub truth_polygon: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            map_tiles: true,
            buildings: false,
            generated_polygons: false,
            computed_polygon: true,
            truth_polygon: true,
        }
    }
}
