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

//! Info panel window.
//!
//! Renders the [`InfoView`] built by the client library. Clicking the panel
//! body toggles between the collapsed summary and the expanded table;
//! the download affordance saves the prepared KML artifact.

use egui::{Align2, Context};
use log::{info, warn};

use location_client::{
    build_info, HostCapabilities, InfoView, KmlExporter, LocationResponse, NO_INFORMATION,
};

use crate::media::photo::{PhotoLoader, PhotoState};

#[allow(clippy::too_many_arguments)]
pub fn show(
    ctx: &Context,
    expanded: &mut bool,
    response: Option<&LocationResponse>,
    exporter: &KmlExporter,
    capabilities: &HostCapabilities,
    photos: &PhotoLoader,
    server_base: &str,
) {
    let view = build_info(response, *expanded, exporter.is_available());

    egui::Window::new("Information")
        .title_bar(false)
        .resizable(false)
        .anchor(Align2::LEFT_BOTTOM, egui::vec2(10.0, -10.0))
        .show(ctx, |ui| {
            let inner = ui.scope_builder(
                egui::UiBuilder::new().sense(egui::Sense::click()),
                |ui| render_view(ui, &view, photos, server_base),
            );

            if inner.response.clicked() {
                *expanded = !*expanded;
            }
            if inner.inner {
                save_kml(exporter, capabilities);
            }
        });
}

/// Render the view; returns true when the download affordance was clicked
fn render_view(
    ui: &mut egui::Ui,
    view: &InfoView,
    photos: &PhotoLoader,
    server_base: &str,
) -> bool {
    let mut download_clicked = false;

    match view {
        InfoView::NoData => {
            ui.label(NO_INFORMATION);
        }
        InfoView::Collapsed { name, coordinates } => {
            ui.horizontal(|ui| {
                ui.label("Location");
                ui.strong(name);
                ui.label(format!("@ {coordinates}"));
                if ui.button("⬇ KML").clicked() {
                    download_clicked = true;
                }
            });
        }
        InfoView::Expanded {
            name,
            coordinates,
            surs,
            kml_available,
            image_path,
        } => {
            ui.strong("Location");
            egui::Grid::new("info_table").num_columns(2).show(ui, |ui| {
                ui.label("Name");
                ui.label(name);
                ui.end_row();

                ui.label("Coordinates");
                ui.label(coordinates);
                ui.end_row();

                ui.label("SURs");
                ui.vertical(|ui| {
                    for (key, value) in surs {
                        ui.label(format!("{key} → {value}"));
                    }
                });
                ui.end_row();

                ui.label("KML");
                if *kml_available {
                    if ui.link("Download").clicked() {
                        download_clicked = true;
                    }
                } else {
                    ui.label("Not available");
                }
                ui.end_row();

                ui.label("Image");
                match image_path {
                    Some(path) => {
                        let url = PhotoLoader::resolve_url(server_base, path);
                        match photos.texture_for(ui.ctx(), &url) {
                            PhotoState::Ready(texture) => {
                                ui.add(egui::Image::new(&texture).max_width(300.0));
                            }
                            PhotoState::Loading => {
                                ui.add(egui::Spinner::new());
                            }
                            PhotoState::Failed => {
                                ui.label("Not available");
                            }
                        }
                    }
                    None => {
                        ui.label("Not available");
                    }
                }
                ui.end_row();
            });
        }
    }

    download_clicked
}

/// Save the prepared artifact through the supported save path
fn save_kml(exporter: &KmlExporter, capabilities: &HostCapabilities) {
    let artifact = match exporter.trigger() {
        Ok(artifact) => artifact,
        Err(e) => {
            warn!("KML download unavailable: {}", e);
            return;
        }
    };

    if capabilities.save_dialog.is_supported() {
        let Some(path) = rfd::FileDialog::new()
            .set_file_name(&artifact.file_name)
            .save_file()
        else {
            return;
        };
        match std::fs::write(&path, &artifact.content) {
            Ok(()) => info!("Saved KML to {:?}", path),
            Err(e) => warn!("Failed to write KML file: {}", e),
        }
    } else if let Some(dir) = &capabilities.fallback_save_dir {
        match exporter.save_into(dir) {
            Ok(path) => info!("Saved KML to {:?}", path),
            Err(e) => warn!("Failed to save KML: {}", e),
        }
    } else {
        warn!("Saving files is not supported in this environment");
    }
}
