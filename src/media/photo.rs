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

//! Location photo texture cache and loading.
//!
//! The response carries a server-relative image path; this loader resolves
//! it against the backend base URL, fetches it on a worker thread, caches
//! the bytes on disk keyed by a SHA-256 of the URL, and hands out the egui
//! texture once decoded.

use log::warn;
use sha2::{Digest, Sha256};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// State of one requested photo
#[derive(Clone)]
pub enum PhotoState {
    Loading,
    Ready(egui::TextureHandle),
    Failed,
}

impl std::fmt::Debug for PhotoState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhotoState::Loading => f.write_str("Loading"),
            PhotoState::Ready(_) => f.write_str("Ready(..)"),
            PhotoState::Failed => f.write_str("Failed"),
        }
    }
}

/// Photo fetcher and texture cache
pub struct PhotoLoader {
    cache_dir: PathBuf,
    textures: Arc<Mutex<HashMap<String, egui::TextureHandle>>>,
    loading: Arc<Mutex<HashSet<String>>>,
    failed: Arc<Mutex<HashSet<String>>>,
}

impl std::fmt::Debug for PhotoLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoLoader")
            .field("cache_dir", &self.cache_dir)
            .finish_non_exhaustive()
    }
}

impl Default for PhotoLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl PhotoLoader {
    pub fn new() -> Self {
        let cache_dir = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from(".cache"))
            .join("surveyor-desktop")
            .join("photos");

        if let Err(e) = fs::create_dir_all(&cache_dir) {
            warn!("Failed to create photo cache directory: {}", e);
        }

        Self {
            cache_dir,
            textures: Arc::new(Mutex::new(HashMap::new())),
            loading: Arc::new(Mutex::new(HashSet::new())),
            failed: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// Resolve a server-relative image path against the backend base URL
    pub fn resolve_url(server_base: &str, image_path: &str) -> String {
        let base = server_base.trim_end_matches('/');
        let path = image_path.trim_start_matches("./").trim_start_matches('/');
        format!("{base}/{path}")
    }

    fn cache_path(&self, url: &str) -> PathBuf {
        let mut hasher = Sha256::new();
        hasher.update(url.as_bytes());
        self.cache_dir.join(format!("{:x}.img", hasher.finalize()))
    }

    /// Get the photo texture, starting a background fetch if needed
    pub fn texture_for(&self, ctx: &egui::Context, url: &str) -> PhotoState {
        if let Some(texture) = self.textures.lock().unwrap().get(url) {
            return PhotoState::Ready(texture.clone());
        }
        if self.failed.lock().unwrap().contains(url) {
            return PhotoState::Failed;
        }

        // Disk cache hit avoids the network round trip
        if let Ok(bytes) = fs::read(self.cache_path(url)) {
            if let Some(texture) = load_texture(ctx, &bytes, url) {
                self.textures
                    .lock()
                    .unwrap()
                    .insert(url.to_string(), texture.clone());
                return PhotoState::Ready(texture);
            }
        }

        {
            let mut loading = self.loading.lock().unwrap();
            if loading.contains(url) {
                return PhotoState::Loading;
            }
            loading.insert(url.to_string());
        }

        let url = url.to_string();
        let cache_path = self.cache_path(&url);
        let textures = Arc::clone(&self.textures);
        let loading = Arc::clone(&self.loading);
        let failed = Arc::clone(&self.failed);
        let ctx = ctx.clone();

        std::thread::spawn(move || {
            match fetch_photo(&url) {
                Ok(bytes) => {
                    if let Err(e) = fs::write(&cache_path, &bytes) {
                        warn!("Failed to cache photo: {}", e);
                    }
                    match load_texture(&ctx, &bytes, &url) {
                        Some(texture) => {
                            textures.lock().unwrap().insert(url.clone(), texture);
                        }
                        None => {
                            failed.lock().unwrap().insert(url.clone());
                        }
                    }
                }
                Err(e) => {
                    warn!("Failed to fetch photo {}: {}", url, e);
                    failed.lock().unwrap().insert(url.clone());
                }
            }
            loading.lock().unwrap().remove(&url);
            ctx.request_repaint();
        });

        PhotoState::Loading
    }

    /// Forget failed fetches so a new response can retry them
    pub fn reset_failures(&self) {
        self.failed.lock().unwrap().clear();
    }
}

fn fetch_photo(url: &str) -> Result<Vec<u8>, String> {
    let response = reqwest::blocking::get(url).map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("HTTP {}", response.status()));
    }
    let bytes = response.bytes().map_err(|e| e.to_string())?;
    Ok(bytes.to_vec())
}

fn load_texture(ctx: &egui::Context, bytes: &[u8], url: &str) -> Option<egui::TextureHandle> {
    let img = match image::load_from_memory(bytes) {
        Ok(img) => img,
        Err(e) => {
            warn!("Failed to decode photo {}: {}", url, e);
            return None;
        }
    };
    let rgba = img.to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    let color_image = egui::ColorImage::from_rgba_unmultiplied(size, &rgba.into_raw());

    Some(ctx.load_texture(
        format!("location_photo_{url}"),
        color_image,
        egui::TextureOptions::LINEAR,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url_strips_relative_prefix() {
        assert_eq!(
            PhotoLoader::resolve_url("http://localhost:8080/", "./images/ab12.png"),
            "http://localhost:8080/images/ab12.png"
        );
    }

    #[test]
    fn test_resolve_url_without_trailing_slash() {
        assert_eq!(
            PhotoLoader::resolve_url("http://example.org", "images/x.png"),
            "http://example.org/images/x.png"
        );
    }
}
