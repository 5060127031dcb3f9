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

//! Info panel view model.
//!
//! Translates the current response into render-ready data so the panel's
//! content is testable without a UI. Expansion state is owned by the
//! frontend; it is passed in per build.

use crate::protocol::LocationResponse;

/// Message shown when no response is held.
pub const NO_INFORMATION: &str = "No information available.";

/// Render-ready content for the info panel.
#[derive(Debug, Clone, PartialEq)]
pub enum InfoView {
    /// No response held; rendered the same whether expanded or not.
    NoData,
    /// One-line summary with a download affordance.
    Collapsed { name: String, coordinates: String },
    /// Full table view.
    Expanded {
        name: String,
        coordinates: String,
        /// SUR pairs in payload order, rendered as "key → value" rows.
        surs: Vec<(String, String)>,
        /// Whether the KML link reads "Download" or "Not available".
        kml_available: bool,
        /// Server-relative image path, when the location has a photo.
        image_path: Option<String>,
    },
}

fn coordinates(point: [f64; 2]) -> String {
    format!("{}, {}", point[0], point[1])
}

/// Build the panel content for the current response and expansion state.
#[must_use]
pub fn build_info(
    response: Option<&LocationResponse>,
    expanded: bool,
    kml_available: bool,
) -> InfoView {
    let Some(location) = response else {
        return InfoView::NoData;
    };

    if expanded {
        InfoView::Expanded {
            name: location.name.clone(),
            coordinates: coordinates(location.point),
            surs: location
                .surs
                .iter()
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect(),
            kml_available,
            image_path: location.image_file_path.clone(),
        }
    } else {
        InfoView::Collapsed {
            name: location.name.clone(),
            coordinates: coordinates(location.point),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    fn response() -> LocationResponse {
        let mut surs = IndexMap::new();
        surs.insert("smoking".to_string(), "no".to_string());
        surs.insert("opening_hours".to_string(), "24/7".to_string());
        LocationResponse {
            name: "Dammtor".to_string(),
            point: [53.5605, 9.9898],
            image_file_path: Some("./images/ab12.png".to_string()),
            surs,
            truth: None,
            computed: None,
            ways: IndexMap::new(),
            kml: "<kml/>".to_string(),
            kml_name: "Dammtor.computed.kml".to_string(),
        }
    }

    #[test]
    fn test_no_response_regardless_of_expansion() {
        assert_eq!(build_info(None, false, false), InfoView::NoData);
        assert_eq!(build_info(None, true, true), InfoView::NoData);
    }

    #[test]
    fn test_collapsed_summary() {
        let view = build_info(Some(&response()), false, true);
        assert_eq!(
            view,
            InfoView::Collapsed {
                name: "Dammtor".to_string(),
                coordinates: "53.5605, 9.9898".to_string(),
            }
        );
    }

    #[test]
    fn test_expanded_lists_surs_in_order() {
        let view = build_info(Some(&response()), true, true);
        let InfoView::Expanded { surs, .. } = view else {
            panic!("expected expanded view");
        };
        assert_eq!(
            surs,
            vec![
                ("smoking".to_string(), "no".to_string()),
                ("opening_hours".to_string(), "24/7".to_string()),
            ]
        );
    }

    #[test]
    fn test_expanded_reflects_missing_image_and_kml() {
        let mut location = response();
        location.image_file_path = None;
        let view = build_info(Some(&location), true, false);
        let InfoView::Expanded {
            kml_available,
            image_path,
            ..
        } = view
        else {
            panic!("expected expanded view");
        };
        assert!(!kml_available);
        assert!(image_path.is_none());
    }
}
