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

//! Host capability probing.
//!
//! Capabilities are probed once at startup and handed to the features that
//! depend on them: the KML exporter needs a way to save files, the image
//! attach control needs a way to pick them. A missing capability degrades
//! the feature in the UI instead of failing a workflow.

use std::path::PathBuf;

/// Whether one host capability is usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Support {
    Supported,
    Unsupported,
}

impl Support {
    #[must_use]
    pub fn is_supported(self) -> bool {
        matches!(self, Self::Supported)
    }
}

/// Capabilities of the host environment, probed once at startup.
#[derive(Debug, Clone)]
pub struct HostCapabilities {
    /// Native save dialog availability.
    pub save_dialog: Support,
    /// Native file picker availability (image attach).
    pub file_picker: Support,
    /// Directory for direct writes when no save dialog exists.
    pub fallback_save_dir: Option<PathBuf>,
}

impl HostCapabilities {
    /// Probe the environment.
    ///
    /// Native dialogs need a display session; on Linux that means one of the
    /// X11/Wayland environment variables is set. `fallback_save_dir` is
    /// supplied by the caller (typically the user's download directory).
    #[must_use]
    pub fn detect(fallback_save_dir: Option<PathBuf>) -> Self {
        let dialogs = if cfg!(any(target_os = "windows", target_os = "macos")) {
            Support::Supported
        } else if std::env::var_os("DISPLAY").is_some()
            || std::env::var_os("WAYLAND_DISPLAY").is_some()
        {
            Support::Supported
        } else {
            Support::Unsupported
        };

        Self {
            save_dialog: dialogs,
            file_picker: dialogs,
            fallback_save_dir,
        }
    }

    /// Whether files can be saved at all, through either save path.
    #[must_use]
    pub fn can_save_files(&self) -> bool {
        self.save_dialog.is_supported() || self.fallback_save_dir.is_some()
    }

    /// Whether files can be picked from disk.
    #[must_use]
    pub fn can_pick_files(&self) -> bool {
        self.file_picker.is_supported()
    }

    /// A fully supported environment. Used by tests.
    #[must_use]
    pub fn all_supported() -> Self {
        Self {
            save_dialog: Support::Supported,
            file_picker: Support::Supported,
            fallback_save_dir: None,
        }
    }

    /// An environment with no save or pick capability. Used by tests.
    #[must_use]
    pub fn none_supported() -> Self {
        Self {
            save_dialog: Support::Unsupported,
            file_picker: Support::Unsupported,
            fallback_save_dir: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_dir_counts_as_save_support() {
        let capabilities = HostCapabilities {
            save_dialog: Support::Unsupported,
            file_picker: Support::Unsupported,
            fallback_save_dir: Some(PathBuf::from("/tmp")),
        };
        assert!(capabilities.can_save_files());
        assert!(!capabilities.can_pick_files());
    }

    #[test]
    fn test_none_supported_cannot_save() {
        assert!(!HostCapabilities::none_supported().can_save_files());
    }
}
