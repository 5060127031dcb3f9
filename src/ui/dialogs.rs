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

//! Workflow and layer dialogs.
//!
//! The workflow windows are thin shells over the dialog state machine in
//! `location-client`: they render the current state and translate button
//! clicks into controller transitions. All decisions about what a click is
//! allowed to do live in the state machine.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use egui::{Align2, Context};
use log::warn;

use location_client::{
    DialogState, HostCapabilities, ImageAttachment, LayerConfig, ProcessForm, QueryForm,
    WorkflowController, WorkflowForm,
};

enum DialogAction {
    None,
    Submit,
    Cancel,
    Retry,
    Acknowledge,
}

/// Render the open workflow dialog, if any
pub fn show_workflow(
    ctx: &Context,
    controller: &mut WorkflowController,
    capabilities: &HostCapabilities,
) {
    let mut action = DialogAction::None;

    {
        let Some(dialog) = controller.dialog_mut() else {
            return;
        };
        let kind = dialog.kind();
        let state = dialog.state().clone();

        egui::Window::new(kind.title())
            .collapsible(false)
            .resizable(false)
            .anchor(Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
            .show(ctx, |ui| match state {
                DialogState::Input => {
                    action = input_ui(ui, dialog.form_mut(), capabilities);
                }
                DialogState::Working => {
                    ui.horizontal(|ui| {
                        ui.add(egui::Spinner::new());
                        ui.label(kind.working_message());
                    });
                }
                DialogState::Failure { reason } => {
                    ui.label(kind.failure_headline());
                    ui.label(format!("Reason: {reason}"));
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        if ui.button("OK").clicked() {
                            action = DialogAction::Acknowledge;
                        }
                        if ui.button("Retry").clicked() {
                            action = DialogAction::Retry;
                        }
                    });
                }
            });
    }

    match action {
        DialogAction::None => {}
        DialogAction::Submit => controller.submit(),
        DialogAction::Cancel => controller.cancel(),
        DialogAction::Retry => controller.retry(),
        DialogAction::Acknowledge => controller.acknowledge(),
    }
}

fn input_ui(
    ui: &mut egui::Ui,
    form: &mut WorkflowForm,
    capabilities: &HostCapabilities,
) -> DialogAction {
    match form {
        WorkflowForm::Query(form) => query_input_ui(ui, form),
        WorkflowForm::Process(form) => process_input_ui(ui, form, capabilities),
    }
}

fn query_input_ui(ui: &mut egui::Ui, form: &mut QueryForm) -> DialogAction {
    let mut action = DialogAction::None;

    ui.horizontal(|ui| {
        ui.label("Name:");
        match &form.names {
            // Disabled until the server-supplied list arrives
            None => {
                ui.add_enabled(false, egui::Button::new("Loading names..."));
            }
            Some(names) => {
                let selected_text = names
                    .get(form.selected)
                    .cloned()
                    .unwrap_or_default();
                egui::ComboBox::from_id_salt("location_name")
                    .width(220.0)
                    .selected_text(selected_text)
                    .show_ui(ui, |ui| {
                        for (index, name) in names.iter().enumerate() {
                            ui.selectable_value(&mut form.selected, index, name);
                        }
                    });
            }
        }
    });

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        if ui
            .add_enabled(form.is_ready(), egui::Button::new("Query"))
            .clicked()
        {
            action = DialogAction::Submit;
        }
        if ui.button("Cancel").clicked() {
            action = DialogAction::Cancel;
        }
    });

    action
}

fn process_input_ui(
    ui: &mut egui::Ui,
    form: &mut ProcessForm,
    capabilities: &HostCapabilities,
) -> DialogAction {
    let mut action = DialogAction::None;

    egui::Grid::new("process_form").num_columns(2).show(ui, |ui| {
        ui.label("Latitude:");
        ui.text_edit_singleline(&mut form.lat);
        ui.end_row();

        ui.label("Longitude:");
        ui.text_edit_singleline(&mut form.lon);
        ui.end_row();

        ui.label("Radius:");
        ui.text_edit_singleline(&mut form.radius);
        ui.end_row();

        ui.label("SURs:");
        ui.vertical(|ui| {
            ui.text_edit_multiline(&mut form.surs);
            ui.small("One reference per line, e.g. smoking=\"no\"");
        });
        ui.end_row();

        ui.label("Image:");
        ui.horizontal(|ui| {
            let can_pick = capabilities.can_pick_files();
            if ui
                .add_enabled(can_pick, egui::Button::new("Attach..."))
                .clicked()
            {
                if let Some(image) = pick_image() {
                    form.image = Some(image);
                }
            }
            match &form.image {
                Some(image) => {
                    ui.label(&image.file_name);
                    if ui.button("✕").clicked() {
                        form.image = None;
                    }
                }
                None if can_pick => {
                    ui.weak("none");
                }
                None => {
                    ui.weak("not supported");
                }
            }
        });
        ui.end_row();
    });

    ui.add_space(8.0);
    ui.horizontal(|ui| {
        if ui.button("Process").clicked() {
            action = DialogAction::Submit;
        }
        if ui.button("Cancel").clicked() {
            action = DialogAction::Cancel;
        }
    });

    action
}

/// Pick an image file and encode it as a data URL for transport
fn pick_image() -> Option<ImageAttachment> {
    let path = rfd::FileDialog::new()
        .add_filter("Images", &["png", "jpg", "jpeg", "gif", "bmp"])
        .pick_file()?;

    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to read image {:?}: {}", path, e);
            return None;
        }
    };

    let mime = match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        _ => "image/png",
    };

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    // The server splits on "base64," so the data URL prefix is load-bearing
    Some(ImageAttachment {
        file_name,
        data_url: format!("data:{};base64,{}", mime, STANDARD.encode(&bytes)),
    })
}

/// Render the set-layers dialog; returns true when new toggles were applied
pub fn show_layers(
    ctx: &Context,
    draft: &mut Option<LayerConfig>,
    layers: &mut LayerConfig,
) -> bool {
    let Some(working) = draft.as_mut() else {
        return false;
    };

    let mut applied = false;
    let mut close = false;

    egui::Window::new("Set layers")
        .collapsible(false)
        .resizable(false)
        .anchor(Align2::CENTER_CENTER, egui::vec2(0.0, 0.0))
        .show(ctx, |ui| {
            ui.checkbox(&mut working.map_tiles, "Map tiles");
            ui.checkbox(&mut working.buildings, "Buildings");
            ui.checkbox(&mut working.generated_polygons, "Generated polygons");
            ui.checkbox(&mut working.computed_polygon, "Computed polygon");
            ui.checkbox(&mut working.truth_polygon, "Truth polygon");

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                if ui.button("Set layers").clicked() {
                    *layers = *working;
                    applied = true;
                    close = true;
                }
                if ui.button("Cancel").clicked() {
                    close = true;
                }
            });
        });

    if close {
        *draft = None;
    }
    applied
}
