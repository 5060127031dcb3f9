//! UI components for Surveyor Desktop.
//!
//! This module contains the workflow dialogs and the info panel.

pub mod dialogs;
pub mod info_panel;
