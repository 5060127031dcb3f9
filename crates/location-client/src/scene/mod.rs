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

//! Map scene construction.
//!
//! [`build_scene`] deterministically derives the full render state from the
//! current response and the layer toggles. The frontend discards its drawn
//! surface and redraws from the scene whenever either input changes, so the
//! overlay set on screen is always exactly the set computed here.

use crate::protocol::{LocationResponse, Way};
use crate::store::LayerConfig;

/// Idle-state map center, used while no response is held.
pub const DEFAULT_CENTER: [f64; 2] = [53.598192, 9.932419];
/// Idle-state zoom level.
pub const DEFAULT_ZOOM: f32 = 16.0;
/// Zoom level applied when centering on a response point.
pub const LOCATION_ZOOM: f32 = 17.0;

/// Which fixed style an overlay is drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    Truth,
    Computed,
    Candidate,
}

/// One polygon to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub name: String,
    /// Ring of `[latitude, longitude]` pairs; may be open or degenerate.
    pub points: Vec<[f64; 2]>,
    pub kind: OverlayKind,
    /// Tag rows for the click popup; only candidates are clickable.
    pub tag_rows: Vec<(String, String)>,
    pub clickable: bool,
}

/// Full render state for the map surface.
#[derive(Debug, Clone, PartialEq)]
pub struct MapScene {
    pub center: [f64; 2],
    pub zoom: f32,
    pub show_tiles: bool,
    pub marker: Option<[f64; 2]>,
    pub overlays: Vec<Overlay>,
}

fn overlay(name: &str, way: &Way, kind: OverlayKind, clickable: bool) -> Overlay {
    Overlay {
        name: name.to_string(),
        points: way.polygon.clone(),
        kind,
        tag_rows: way
            .tags
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
        clickable,
    }
}

/// Whether a nearby way is visible under the current toggles.
fn way_visible(way: &Way, layers: &LayerConfig) -> bool {
    (layers.buildings && way.tags.contains_key("building"))
        || (layers.generated_polygons
            && way.tags.get("source").map(String::as_str) == Some("gen_from_osm_node"))
}

/// Build the scene for the current response and layer toggles.
#[must_use]
pub fn build_scene(response: Option<&LocationResponse>, layers: &LayerConfig) -> MapScene {
    let Some(location) = response else {
        return MapScene {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
            show_tiles: layers.map_tiles,
            marker: None,
            overlays: Vec::new(),
        };
    };

    let mut overlays = Vec::new();

    if layers.truth_polygon {
        if let Some(truth) = &location.truth {
            overlays.push(overlay("Truth polygon", truth, OverlayKind::Truth, false));
        }
    }

    if layers.computed_polygon {
        if let Some(computed) = &location.computed {
            overlays.push(overlay(
                "Computed polygon",
                computed,
                OverlayKind::Computed,
                false,
            ));
        }
    }

    for (name, way) in &location.ways {
        if way_visible(way, layers) {
            overlays.push(overlay(name, way, OverlayKind::Candidate, true));
        }
    }

    MapScene {
        center: location.point,
        zoom: LOCATION_ZOOM,
        show_tiles: layers.map_tiles,
        marker: Some(location.point),
        overlays,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn way(tags: &[(&str, &str)]) -> Way {
        Way {
            name: String::new(),
            tags: tags
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
            polygon: vec![[53.5, 9.9], [53.6, 9.9], [53.6, 10.0]],
        }
    }

    fn response() -> LocationResponse {
        let mut ways = IndexMap::new();
        ways.insert("osm_1".to_string(), way(&[("building", "yes")]));
        ways.insert("gen_2".to_string(), way(&[("source", "gen_from_osm_node")]));
        ways.insert("osm_3".to_string(), way(&[("highway", "path")]));
        LocationResponse {
            name: "Dammtor".to_string(),
            point: [53.5605, 9.9898],
            image_file_path: None,
            surs: IndexMap::new(),
            truth: Some(way(&[])),
            computed: Some(way(&[("building", "yes")])),
            ways,
            kml: String::new(),
            kml_name: "x.kml".to_string(),
        }
    }

    #[test]
    fn test_idle_scene_uses_fixed_view() {
        let scene = build_scene(None, &LayerConfig::default());
        assert_eq!(scene.center, DEFAULT_CENTER);
        assert_eq!(scene.zoom, DEFAULT_ZOOM);
        assert!(scene.show_tiles);
        assert!(scene.marker.is_none());
        assert!(scene.overlays.is_empty());
    }

    #[test]
    fn test_tiles_toggle_off_means_no_tiles() {
        let layers = LayerConfig {
            map_tiles: false,
            ..LayerConfig::default()
        };
        assert!(!build_scene(None, &layers).show_tiles);
        assert!(!build_scene(Some(&response()), &layers).show_tiles);
    }

    #[test]
    fn test_response_scene_centers_and_marks_point() {
        let location = response();
        let scene = build_scene(Some(&location), &LayerConfig::default());
        assert_eq!(scene.center, location.point);
        assert_eq!(scene.zoom, LOCATION_ZOOM);
        assert_eq!(scene.marker, Some(location.point));
    }

    #[test]
    fn test_truth_without_computed() {
        // truth on, computed off, computed present: exactly the truth polygon.
        let layers = LayerConfig {
            computed_polygon: false,
            ..LayerConfig::default()
        };
        let location = response();
        let scene = build_scene(Some(&location), &layers);
        assert_eq!(scene.overlays.len(), 1);
        assert_eq!(scene.overlays[0].kind, OverlayKind::Truth);
    }

    #[test]
    fn test_absent_truth_draws_nothing_for_truth() {
        let mut location = response();
        location.truth = None;
        let scene = build_scene(Some(&location), &LayerConfig::default());
        assert!(scene
            .overlays
            .iter()
            .all(|overlay| overlay.kind != OverlayKind::Truth));
    }

    #[test]
    fn test_candidate_visibility_predicate() {
        let layers = LayerConfig {
            buildings: true,
            generated_polygons: true,
            ..LayerConfig::default()
        };
        let location = response();
        let scene = build_scene(Some(&location), &layers);
        let candidates: Vec<_> = scene
            .overlays
            .iter()
            .filter(|overlay| overlay.kind == OverlayKind::Candidate)
            .map(|overlay| overlay.name.clone())
            .collect();
        // osm_3 matches neither predicate and stays hidden.
        assert_eq!(candidates, ["osm_1", "gen_2"]);
    }

    #[test]
    fn test_candidates_hidden_by_default() {
        let scene = build_scene(Some(&response()), &LayerConfig::default());
        assert!(scene
            .overlays
            .iter()
            .all(|overlay| overlay.kind != OverlayKind::Candidate));
    }

    #[test]
    fn test_only_candidates_are_clickable() {
        let layers = LayerConfig {
            buildings: true,
            generated_polygons: true,
            ..LayerConfig::default()
        };
        let scene = build_scene(Some(&response()), &layers);
        for overlay in &scene.overlays {
            assert_eq!(overlay.clickable, overlay.kind == OverlayKind::Candidate);
        }
    }

    #[test]
    fn test_way_with_empty_tags_is_tolerated() {
        let mut location = response();
        location.ways.insert("bare".to_string(), way(&[]));
        let layers = LayerConfig {
            buildings: true,
            generated_polygons: true,
            ..LayerConfig::default()
        };
        let scene = build_scene(Some(&location), &layers);
        // An empty tag mapping matches neither predicate; the way stays
        // hidden rather than breaking the build.
        assert!(scene.overlays.iter().all(|overlay| overlay.name != "bare"));
    }

    #[test]
    fn test_popup_rows_carry_all_tags_in_order() {
        let mut location = response();
        location.ways.insert(
            "gen_4".to_string(),
            way(&[("source", "gen_from_osm_node"), ("note", "synthetic")]),
        );
        let layers = LayerConfig {
            generated_polygons: true,
            ..LayerConfig::default()
        };
        let scene = build_scene(Some(&location), &layers);
        let candidate = scene
            .overlays
            .iter()
            .find(|overlay| overlay.name == "gen_4")
            .unwrap();
        assert_eq!(
            candidate.tag_rows,
            [
                ("source".to_string(), "gen_from_osm_node".to_string()),
                ("note".to_string(), "synthetic".to_string()),
            ]
        );
    }

    #[test]
    fn test_degenerate_polygon_is_carried_through() {
        let mut location = response();
        location.truth = Some(Way {
            name: String::new(),
            tags: IndexMap::new(),
            polygon: vec![[53.5, 9.9]],
        });
        let scene = build_scene(Some(&location), &LayerConfig::default());
        let truth = scene
            .overlays
            .iter()
            .find(|overlay| overlay.kind == OverlayKind::Truth)
            .unwrap();
        assert_eq!(truth.points.len(), 1);
    }
}
