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

mod app;
mod config;
mod map;
mod media;
mod ui;

use clap::Parser;
use log::{info, warn};

/// Reviewer client for processed location records
#[derive(Parser, Debug)]
#[command(name = "surveyor-desktop", version, about)]
struct Args {
    /// Backend endpoint URL (overrides the configured value)
    #[arg(long)]
    server: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), eframe::Error> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let config = config::AppConfig::load().unwrap_or_else(|e| {
        warn!("Failed to load configuration, using defaults: {}", e);
        config::AppConfig::default()
    });
    let server_url = args.server.unwrap_or_else(|| config.server_url.clone());
    info!("Using backend endpoint {}", server_url);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_title("Surveyor Desktop"),
        ..Default::default()
    };

    eframe::run_native(
        "Surveyor Desktop",
        options,
        Box::new(move |_cc| Ok(Box::new(app::SurveyorApp::new(server_url)))),
    )
}
