//! # User Interface Module
//!
//! Dear ImGui overlay for the viewer.
//!
//! - [`UiManager`] - ImGui integration with winit and wgpu, input capture
//! - [`inspector_panel`] - Controls help, node list, selected node editor and scene statistics
//!
//! While a widget has keyboard focus, editor keys are not forwarded to the
//! scene. While the pointer is over the overlay, camera drags are not.

pub mod manager;
pub mod panel;

pub use manager::{InputCapture, UiManager};
pub use panel::{inspector_panel, InspectorInfo};
