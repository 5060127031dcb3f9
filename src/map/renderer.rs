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

//! Map surface drawing.
//!
//! Draws the [`MapScene`] built by the client library. The scene carries an
//! epoch counter; when it changes the previous surface state (view, popup)
//! is discarded and rebuilt from the scene, so stale overlays can never
//! survive a response replacement or a layer toggle.

use egui::{Align2, Color32, FontId, Pos2, Sense, Shape, Stroke};
use log::warn;

use location_client::{MapScene, OverlayKind};

use super::tiles::{TileCache, WebMercator, TILE_SIZE};

const MIN_ZOOM: f32 = 2.0;
const MAX_ZOOM: f32 = 19.0;
const POPUP_MAX_WIDTH: f32 = 400.0;
const OSM_COPYRIGHT_URL: &str = "https://www.openstreetmap.org/copyright";

/// Fixed stroke style per overlay kind
fn overlay_stroke(kind: OverlayKind) -> Stroke {
    match kind {
        OverlayKind::Truth => Stroke::new(5.0, Color32::from_rgb(0, 255, 0)),
        OverlayKind::Computed => Stroke::new(5.0, Color32::from_rgb(255, 0, 0)),
        OverlayKind::Candidate => Stroke::new(1.0, Color32::BLACK),
    }
}

/// Ray-casting point-in-polygon test on screen coordinates
fn polygon_contains(points: &[Pos2], p: Pos2) -> bool {
    if points.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = points.len() - 1;
    for i in 0..points.len() {
        let (a, b) = (points[i], points[j]);
        if (a.y > p.y) != (b.y > p.y)
            && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Find the topmost clickable overlay containing the click position
fn hit_test(
    scene: &MapScene,
    screen_overlays: &[(usize, Vec<Pos2>)],
    click_pos: Pos2,
    unproject: impl Fn(f32, f32) -> (f64, f64),
) -> Option<WayPopup> {
    for (index, points) in screen_overlays.iter().rev() {
        let overlay = &scene.overlays[*index];
        if overlay.clickable && polygon_contains(points, click_pos) {
            let (lat, lon) = unproject(click_pos.x, click_pos.y);
            return Some(WayPopup {
                lat,
                lon,
                title: overlay.name.clone(),
                rows: overlay.tag_rows.clone(),
            });
        }
    }
    None
}

/// Popup anchored to the clicked map position
struct WayPopup {
    lat: f64,
    lon: f64,
    title: String,
    rows: Vec<(String, String)>,
}

/// Draws the map scene into the central panel
pub struct MapRenderer {
    tiles: TileCache,
    center_lat: f64,
    center_lon: f64,
    zoom: f32,
    epoch: u64,
    popup: Option<WayPopup>,
    notice: Option<String>,
}

impl std::fmt::Debug for MapRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapRenderer")
            .field("center", &(self.center_lat, self.center_lon))
            .field("zoom", &self.zoom)
            .field("epoch", &self.epoch)
            .finish_non_exhaustive()
    }
}

impl MapRenderer {
    pub fn new(scene: &MapScene) -> Self {
        Self {
            tiles: TileCache::new(),
            center_lat: scene.center[0],
            center_lon: scene.center[1],
            zoom: scene.zoom,
            epoch: 0,
            popup: None,
            notice: None,
        }
    }

    /// Discard the drawn surface state and restart from the scene
    fn rebuild(&mut self, scene: &MapScene, epoch: u64) {
        self.epoch = epoch;
        self.center_lat = scene.center[0];
        self.center_lon = scene.center[1];
        self.zoom = scene.zoom;
        self.popup = None;
    }

    pub fn draw(&mut self, ui: &mut egui::Ui, scene: &MapScene, epoch: u64) {
        if self.epoch != epoch {
            self.rebuild(scene, epoch);
        }

        let (response, painter) = ui.allocate_painter(
            egui::vec2(ui.available_width(), ui.available_height()),
            Sense::click_and_drag(),
        );

        let rect = response.rect;
        let center = rect.center();

        painter.rect_filled(rect, 0.0, Color32::from_rgb(200, 220, 240));

        // Pinch/scroll zoom
        let zoom_delta = ui.ctx().input(|i| i.zoom_delta());
        if (zoom_delta - 1.0).abs() > 0.001 {
            self.zoom = (self.zoom + zoom_delta.log2()).clamp(MIN_ZOOM, MAX_ZOOM);
        }

        let tile_zoom = self.zoom.round() as u8;
        let scale = 2.0_f64.powf(f64::from(self.zoom));

        // Drag pan
        if response.dragged() {
            let delta = response.drag_delta();
            let degrees_per_pixel = 360.0 / (f64::from(TILE_SIZE) * scale);
            let cos_lat = self.center_lat.to_radians().cos().max(0.1);

            self.center_lat += f64::from(delta.y) * degrees_per_pixel * cos_lat;
            self.center_lon -= f64::from(delta.x) * degrees_per_pixel;
            self.center_lat = self.center_lat.clamp(-85.0, 85.0);
        }

        if scene.show_tiles {
            let visible = TileCache::visible_tiles(
                self.center_lat,
                self.center_lon,
                tile_zoom,
                rect.width(),
                rect.height(),
            );

            let mut rendered = 0;
            for (coord, offset_x, offset_y) in visible {
                if let Some(texture) = self.tiles.get_tile(coord, ui.ctx()) {
                    let tile_rect = egui::Rect::from_min_size(
                        egui::pos2(center.x + offset_x, center.y + offset_y),
                        egui::vec2(TILE_SIZE as f32, TILE_SIZE as f32),
                    );
                    painter.image(
                        texture.id(),
                        tile_rect,
                        egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                        Color32::WHITE,
                    );
                    rendered += 1;
                }
            }

            if self.tiles.error_count() > 0 {
                self.notice = Some(format!("Failed to load {} tiles", self.tiles.error_count()));
            } else if self.tiles.has_loading_tiles() {
                self.notice = Some("Loading map tiles...".to_string());
            } else if rendered > 0 {
                self.notice = None;
            }
        } else {
            self.notice = None;
        }

        let center_tile_x = WebMercator::lon_to_x(self.center_lon, tile_zoom);
        let center_tile_y = WebMercator::lat_to_y(self.center_lat, tile_zoom);

        let to_screen = |lat: f64, lon: f64| -> Pos2 {
            let dx = (WebMercator::lon_to_x(lon, tile_zoom) - center_tile_x)
                * f64::from(TILE_SIZE);
            let dy = (WebMercator::lat_to_y(lat, tile_zoom) - center_tile_y)
                * f64::from(TILE_SIZE);
            egui::pos2(center.x + dx as f32, center.y + dy as f32)
        };

        // Overlay polygons; degenerate rings draw as degenerate shapes
        let screen_overlays: Vec<(usize, Vec<Pos2>)> = scene
            .overlays
            .iter()
            .enumerate()
            .map(|(index, overlay)| {
                let points = overlay
                    .points
                    .iter()
                    .map(|point| to_screen(point[0], point[1]))
                    .collect();
                (index, points)
            })
            .collect();

        for (index, points) in &screen_overlays {
            let stroke = overlay_stroke(scene.overlays[*index].kind);
            painter.add(Shape::closed_line(points.clone(), stroke));
        }

        // Location marker
        if let Some(marker) = scene.marker {
            let pos = to_screen(marker[0], marker[1]);
            painter.circle_filled(pos, 7.0, Color32::from_rgb(51, 136, 255));
            painter.circle_stroke(pos, 7.0, Stroke::new(2.0, Color32::WHITE));
        }

        // Attribution (required by OSM); clicking it opens the license page
        let attribution_galley = painter.layout_no_wrap(
            "Maps: © OpenStreetMap contributors".to_string(),
            FontId::proportional(10.0),
            Color32::from_black_alpha(180),
        );
        let attribution_pos = rect.right_bottom()
            - egui::vec2(attribution_galley.size().x + 10.0, attribution_galley.size().y + 10.0);
        let attribution_rect =
            egui::Rect::from_min_size(attribution_pos, attribution_galley.size());
        painter.galley(attribution_pos, attribution_galley, Color32::from_black_alpha(180));

        if response.clicked() {
            if let Some(click_pos) = response.interact_pointer_pos() {
                if attribution_rect.contains(click_pos) {
                    if let Err(e) = webbrowser::open(OSM_COPYRIGHT_URL) {
                        warn!("Failed to open attribution link: {}", e);
                    }
                } else {
                    self.popup = hit_test(scene, &screen_overlays, click_pos, |x, y| {
                        let tile_x = center_tile_x + f64::from(x - center.x) / f64::from(TILE_SIZE);
                        let tile_y = center_tile_y + f64::from(y - center.y) / f64::from(TILE_SIZE);
                        (
                            WebMercator::tile_to_lat(tile_y, tile_zoom),
                            WebMercator::tile_to_lon(tile_x, tile_zoom),
                        )
                    });
                }
            }
        }

        self.draw_popup(ui, &to_screen);
        self.draw_notice(&painter, rect);
    }

    fn draw_popup(&self, ui: &egui::Ui, to_screen: &impl Fn(f64, f64) -> Pos2) {
        let Some(popup) = &self.popup else {
            return;
        };
        let anchor = to_screen(popup.lat, popup.lon);

        egui::Area::new(egui::Id::new("way_popup"))
            .order(egui::Order::Foreground)
            .fixed_pos(anchor)
            .show(ui.ctx(), |ui| {
                egui::Frame::popup(ui.style()).show(ui, |ui| {
                    ui.set_max_width(POPUP_MAX_WIDTH);
                    ui.strong(&popup.title);
                    egui::Grid::new("way_popup_tags").num_columns(2).show(ui, |ui| {
                        for (key, value) in &popup.rows {
                            ui.label(key);
                            ui.label(value);
                            ui.end_row();
                        }
                    });
                });
            });
    }

    fn draw_notice(&self, painter: &egui::Painter, rect: egui::Rect) {
        let Some(notice) = &self.notice else {
            return;
        };
        let is_error = notice.contains("Failed");
        let bg_color = if is_error {
            Color32::from_rgb(220, 50, 50)
        } else {
            Color32::from_rgb(255, 200, 100)
        };

        let pos = rect.center_top() + egui::vec2(0.0, 20.0);
        let galley = painter.layout_no_wrap(
            notice.clone(),
            FontId::proportional(12.0),
            Color32::WHITE,
        );
        let padding = egui::vec2(12.0, 6.0);
        let bubble = egui::Rect::from_center_size(pos, galley.size() + padding * 2.0);

        painter.rect_filled(bubble, 5.0, bg_color);
        painter.text(
            pos,
            Align2::CENTER_CENTER,
            notice,
            FontId::proportional(12.0),
            Color32::WHITE,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polygon_contains_square() {
        let square = vec![
            egui::pos2(0.0, 0.0),
            egui::pos2(10.0, 0.0),
            egui::pos2(10.0, 10.0),
            egui::pos2(0.0, 10.0),
        ];
        assert!(polygon_contains(&square, egui::pos2(5.0, 5.0)));
        assert!(!polygon_contains(&square, egui::pos2(15.0, 5.0)));
    }

    #[test]
    fn test_degenerate_polygon_contains_nothing() {
        let line = vec![egui::pos2(0.0, 0.0), egui::pos2(10.0, 10.0)];
        assert!(!polygon_contains(&line, egui::pos2(5.0, 5.0)));
        assert!(!polygon_contains(&[], egui::pos2(0.0, 0.0)));
    }

    #[test]
    fn test_overlay_strokes_are_fixed() {
        assert_eq!(overlay_stroke(OverlayKind::Truth).width, 5.0);
        assert_eq!(overlay_stroke(OverlayKind::Computed).width, 5.0);
        assert_eq!(overlay_stroke(OverlayKind::Candidate).width, 1.0);
    }
}
