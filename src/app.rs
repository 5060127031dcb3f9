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

//! Application shell.
//!
//! Owns the stores, the workflow controller, and the renderers, and wires
//! them together: a successful workflow replaces the response store and then
//! refreshes the exporter and the map scene in that order, before the next
//! frame renders the info panel from the store. Layer changes refresh only
//! the scene; no network traffic is involved.

use std::sync::Arc;

use location_client::{
    build_scene, HostCapabilities, HttpTransport, KmlExporter, LayerConfig, LocationResponse,
    MapScene, ResponseStore, WorkflowController, WorkflowKind,
};

use crate::map::MapRenderer;
use crate::media::PhotoLoader;
use crate::ui;

pub struct SurveyorApp {
    store: ResponseStore,
    layers: LayerConfig,
    controller: WorkflowController,
    exporter: KmlExporter,
    capabilities: HostCapabilities,
    scene: MapScene,
    /// Bumped on every scene rebuild; tells the renderer to discard its
    /// surface state and restart from the scene.
    scene_epoch: u64,
    renderer: MapRenderer,
    photos: PhotoLoader,
    info_expanded: bool,
    /// Working copy of the toggles while the set-layers dialog is open.
    layers_draft: Option<LayerConfig>,
    server_base: String,
    waker_installed: bool,
}

impl std::fmt::Debug for SurveyorApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SurveyorApp")
            .field("scene_epoch", &self.scene_epoch)
            .field("server_base", &self.server_base)
            .finish_non_exhaustive()
    }
}

impl SurveyorApp {
    pub fn new(server_url: String) -> Self {
        let capabilities = HostCapabilities::detect(dirs::download_dir());
        let transport = Arc::new(HttpTransport::new(server_url.clone()));
        let controller = WorkflowController::new(transport);
        let exporter = KmlExporter::new(&capabilities);
        let layers = LayerConfig::default();
        let scene = build_scene(None, &layers);
        let renderer = MapRenderer::new(&scene);

        Self {
            store: ResponseStore::new(),
            layers,
            controller,
            exporter,
            capabilities,
            scene,
            scene_epoch: 0,
            renderer,
            photos: PhotoLoader::new(),
            info_expanded: false,
            layers_draft: None,
            server_base: server_url,
            waker_installed: false,
        }
    }

    /// Ordered refresh fan-out after a successful workflow: replace the
    /// store, re-prepare the exporter, rebuild the scene.
    fn on_response_changed(&mut self, response: LocationResponse) {
        self.store.set(response);
        if let Some(current) = self.store.get() {
            self.exporter.prepare(current);
        }
        self.photos.reset_failures();
        self.refresh_scene();
    }

    fn refresh_scene(&mut self) {
        self.scene = build_scene(self.store.get(), &self.layers);
        self.scene_epoch += 1;
    }

    fn modal_open(&self) -> bool {
        self.controller.is_open() || self.layers_draft.is_some()
    }
}

impl eframe::App for SurveyorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.waker_installed {
            let waker_ctx = ctx.clone();
            self.controller
                .set_waker(Arc::new(move || waker_ctx.request_repaint()));
            self.waker_installed = true;
        }

        // Route finished workflow replies before drawing anything
        let current_name = self.store.get().map(|response| response.name.clone());
        if let Some(response) = self.controller.poll(current_name.as_deref()) {
            self.on_response_changed(response);
        }

        // Enter opens the query workflow, suppressed while any modal is open
        if !self.modal_open() && ctx.input(|i| i.key_pressed(egui::Key::Enter)) {
            self.controller.open(WorkflowKind::Query);
        }

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                ui.add_enabled_ui(!self.modal_open(), |ui| {
                    if ui.button("Query location").clicked() {
                        self.controller.open(WorkflowKind::Query);
                    }
                    if ui.button("Process location").clicked() {
                        self.controller.open(WorkflowKind::Process);
                    }
                    if ui.button("Set layers").clicked() {
                        self.layers_draft = Some(self.layers);
                    }
                });
            });
        });

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                self.renderer.draw(ui, &self.scene, self.scene_epoch);
            });

        ui::info_panel::show(
            ctx,
            &mut self.info_expanded,
            self.store.get(),
            &self.exporter,
            &self.capabilities,
            &self.photos,
            &self.server_base,
        );

        ui::dialogs::show_workflow(ctx, &mut self.controller, &self.capabilities);

        if ui::dialogs::show_layers(ctx, &mut self.layers_draft, &mut self.layers) {
            self.refresh_scene();
        }
    }
}
