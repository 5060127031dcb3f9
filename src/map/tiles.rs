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

//! OpenStreetMap tile fetching and caching.
//!
//! Tiles are cached on disk keyed by a SHA-256 of their URL and loaded into
//! egui textures on demand; missing tiles are downloaded on worker threads.

use egui::{ColorImage, TextureHandle};
use log::{debug, warn};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

/// Tile edge length in pixels.
pub const TILE_SIZE: u32 = 256;
const CACHE_DURATION_DAYS: u64 = 7;
const SUBDOMAINS: [char; 3] = ['a', 'b', 'c'];

/// Web Mercator projection utilities
#[derive(Debug)]
pub struct WebMercator;

impl WebMercator {
    /// Convert latitude to a fractional tile Y coordinate
    pub fn lat_to_y(lat: f64, zoom: u8) -> f64 {
        let lat_rad = lat.to_radians();
        let n = 2_f64.powi(i32::from(zoom));
        let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / std::f64::consts::PI) / 2.0;
        y * n
    }

    /// Convert longitude to a fractional tile X coordinate
    pub fn lon_to_x(lon: f64, zoom: u8) -> f64 {
        let n = 2_f64.powi(i32::from(zoom));
        ((lon + 180.0) / 360.0) * n
    }

    /// Convert a fractional tile Y coordinate back to latitude
    pub fn tile_to_lat(y: f64, zoom: u8) -> f64 {
        let n = 2_f64.powi(i32::from(zoom));
        let lat_rad = ((std::f64::consts::PI * (1.0 - 2.0 * y / n)).sinh()).atan();
        lat_rad.to_degrees()
    }

    /// Convert a fractional tile X coordinate back to longitude
    pub fn tile_to_lon(x: f64, zoom: u8) -> f64 {
        let n = 2_f64.powi(i32::from(zoom));
        x / n * 360.0 - 180.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TileCoord {
    pub x: u32,
    pub y: u32,
    pub zoom: u8,
}

impl TileCoord {
    pub fn new(x: u32, y: u32, zoom: u8) -> Self {
        Self { x, y, zoom }
    }

    /// OSM tile URL, with the subdomain picked from the coordinate
    pub fn url(&self) -> String {
        let subdomain = SUBDOMAINS[((self.x + self.y) % 3) as usize];
        format!(
            "https://{}.tile.openstreetmap.org/{}/{}/{}.png",
            subdomain, self.zoom, self.x, self.y
        )
    }

    fn cache_filename(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.url().as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

enum TileState {
    Loading,
    Loaded(TextureHandle),
    Failed,
}

/// Disk-backed tile cache with background downloads
pub struct TileCache {
    cache_dir: PathBuf,
    tiles: Arc<Mutex<HashMap<TileCoord, TileState>>>,
}

impl std::fmt::Debug for TileCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileCache")
            .field("cache_dir", &self.cache_dir)
            .finish_non_exhaustive()
    }
}

impl Default for TileCache {
    fn default() -> Self {
        Self::new()
    }
}

impl TileCache {
    pub fn new() -> Self {
        let cache_dir = Self::cache_dir();

        if let Err(e) = fs::create_dir_all(&cache_dir) {
            warn!("Failed to create tile cache directory: {}", e);
        }

        Self::cleanup_old_tiles(&cache_dir);

        Self {
            cache_dir,
            tiles: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn cache_dir() -> PathBuf {
        let mut path = dirs::cache_dir().unwrap_or_else(|| PathBuf::from(".cache"));
        path.push("surveyor-desktop");
        path.push("tiles");
        path
    }

    fn cleanup_old_tiles(cache_dir: &Path) {
        let now = SystemTime::now();
        let max_age = Duration::from_secs(CACHE_DURATION_DAYS * 24 * 60 * 60);

        if let Ok(entries) = fs::read_dir(cache_dir) {
            for entry in entries.flatten() {
                let expired = entry
                    .metadata()
                    .and_then(|metadata| metadata.modified())
                    .ok()
                    .and_then(|modified| now.duration_since(modified).ok())
                    .is_some_and(|age| age > max_age);
                if expired {
                    debug!("Removing expired tile cache entry: {:?}", entry.path());
                    let _ = fs::remove_file(entry.path());
                }
            }
        }
    }

    /// Get a tile texture, loading from disk or queueing a download
    pub fn get_tile(&self, coord: TileCoord, ctx: &egui::Context) -> Option<TextureHandle> {
        let mut tiles = self.tiles.lock().unwrap();

        match tiles.get(&coord) {
            Some(TileState::Loaded(texture)) => Some(texture.clone()),
            Some(TileState::Loading | TileState::Failed) => None,
            None => {
                let cache_path = self
                    .cache_dir
                    .join(format!("{}.png", coord.cache_filename()));

                if cache_path.exists() {
                    match load_texture_from_disk(&cache_path, ctx, coord) {
                        Ok(texture) => {
                            tiles.insert(coord, TileState::Loaded(texture.clone()));
                            Some(texture)
                        }
                        Err(e) => {
                            warn!("Failed to load cached tile: {}", e);
                            tiles.insert(coord, TileState::Loading);
                            self.spawn_download(coord, ctx.clone());
                            None
                        }
                    }
                } else {
                    tiles.insert(coord, TileState::Loading);
                    self.spawn_download(coord, ctx.clone());
                    None
                }
            }
        }
    }

    fn spawn_download(&self, coord: TileCoord, ctx: egui::Context) {
        let tiles = Arc::clone(&self.tiles);
        let cache_dir = self.cache_dir.clone();

        std::thread::spawn(move || {
            let state = match download_tile(coord, &cache_dir, &ctx) {
                Ok(texture) => TileState::Loaded(texture),
                Err(e) => {
                    warn!("Failed to fetch tile {}: {}", coord.url(), e);
                    TileState::Failed
                }
            };
            tiles.lock().unwrap().insert(coord, state);
            ctx.request_repaint();
        });
    }

    /// Enumerate the tiles covering a viewport, with pixel offsets from the
    /// viewport center
    pub fn visible_tiles(
        center_lat: f64,
        center_lon: f64,
        zoom: u8,
        viewport_width: f32,
        viewport_height: f32,
    ) -> Vec<(TileCoord, f32, f32)> {
        let mut tiles = Vec::new();

        let center_tile_x = WebMercator::lon_to_x(center_lon, zoom);
        let center_tile_y = WebMercator::lat_to_y(center_lat, zoom);

        let tiles_wide = (viewport_width / TILE_SIZE as f32).ceil() as i32 + 2;
        let tiles_high = (viewport_height / TILE_SIZE as f32).ceil() as i32 + 2;

        let start_x = center_tile_x.floor() as i32 - tiles_wide / 2;
        let start_y = center_tile_y.floor() as i32 - tiles_high / 2;

        let max_tile = 2_i32.pow(u32::from(zoom));

        for dy in 0..tiles_high {
            for dx in 0..tiles_wide {
                let tile_x = start_x + dx;
                let tile_y = start_y + dy;

                // Longitude wraps, latitude does not
                let wrapped_x = ((tile_x % max_tile) + max_tile) % max_tile;

                if tile_y >= 0 && tile_y < max_tile {
                    let coord = TileCoord::new(wrapped_x as u32, tile_y as u32, zoom);

                    let offset_x = (f64::from(tile_x) - center_tile_x) * f64::from(TILE_SIZE);
                    let offset_y = (f64::from(tile_y) - center_tile_y) * f64::from(TILE_SIZE);

                    tiles.push((coord, offset_x as f32, offset_y as f32));
                }
            }
        }

        tiles
    }

    pub fn has_loading_tiles(&self) -> bool {
        let tiles = self.tiles.lock().unwrap();
        tiles
            .values()
            .any(|state| matches!(state, TileState::Loading))
    }

    pub fn error_count(&self) -> usize {
        let tiles = self.tiles.lock().unwrap();
        tiles
            .values()
            .filter(|state| matches!(state, TileState::Failed))
            .count()
    }
}

fn color_image_from_bytes(bytes: &[u8]) -> Result<ColorImage, String> {
    let img = image::load_from_memory(bytes).map_err(|e| e.to_string())?;
    let rgba = img.to_rgba8();
    Ok(ColorImage::from_rgba_unmultiplied(
        [TILE_SIZE as usize, TILE_SIZE as usize],
        &rgba.into_raw(),
    ))
}

fn load_texture_from_disk(
    path: &Path,
    ctx: &egui::Context,
    coord: TileCoord,
) -> Result<TextureHandle, String> {
    let bytes = fs::read(path).map_err(|e| e.to_string())?;
    let color_image = color_image_from_bytes(&bytes)?;
    Ok(ctx.load_texture(
        format!("tile_{}_{}/{}", coord.zoom, coord.x, coord.y),
        color_image,
        Default::default(),
    ))
}

fn download_tile(
    coord: TileCoord,
    cache_dir: &Path,
    ctx: &egui::Context,
) -> Result<TextureHandle, String> {
    let url = coord.url();
    debug!("Downloading tile: {}", url);

    let response = reqwest::blocking::get(&url).map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("HTTP {}", response.status()));
    }
    let bytes = response.bytes().map_err(|e| e.to_string())?;

    let cache_path = cache_dir.join(format!("{}.png", coord.cache_filename()));
    if let Err(e) = fs::write(&cache_path, &bytes) {
        warn!("Failed to save tile to cache: {}", e);
    }

    let color_image = color_image_from_bytes(&bytes)?;
    Ok(ctx.load_texture(
        format!("tile_{}_{}/{}", coord.zoom, coord.x, coord.y),
        color_image,
        Default::default(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_round_trip() {
        let lat = 53.5605;
        let lon = 9.9898;
        let zoom = 17;
        let back_lat = WebMercator::tile_to_lat(WebMercator::lat_to_y(lat, zoom), zoom);
        let back_lon = WebMercator::tile_to_lon(WebMercator::lon_to_x(lon, zoom), zoom);
        assert!((back_lat - lat).abs() < 1e-9);
        assert!((back_lon - lon).abs() < 1e-9);
    }

    #[test]
    fn test_tile_url_uses_osm_subdomains() {
        let url = TileCoord::new(68_000, 42_000, 17).url();
        assert!(url.contains(".tile.openstreetmap.org/17/68000/42000.png"));
        let subdomain = url.split("//").nth(1).unwrap().chars().next().unwrap();
        assert!(SUBDOMAINS.contains(&subdomain));
    }

    #[test]
    fn test_visible_tiles_cover_viewport() {
        let tiles = TileCache::visible_tiles(53.5605, 9.9898, 10, 800.0, 600.0);
        assert!(!tiles.is_empty());
        // Every coordinate stays inside the tile grid for the zoom level.
        for (coord, _, _) in &tiles {
            assert!(coord.x < 1024);
            assert!(coord.y < 1024);
        }
    }
}
