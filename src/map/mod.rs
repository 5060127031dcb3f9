//! Map rendering and tile management.
//!
//! This module draws the map scene produced by the client library: base
//! tiles, the location marker, and the overlay polygons, with Web Mercator
//! projection utilities and a disk-backed tile cache.

pub mod renderer;
pub mod tiles;

pub use renderer::MapRenderer;
pub use tiles::WebMercator;
