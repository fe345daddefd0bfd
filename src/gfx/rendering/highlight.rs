use crate::config::HighlightStyle;

/// Tint of nodes that are not selected
pub const WHITE: [f32; 4] = [1.0, 1.0, 1.0, 1.0];

const SOLID_HIGHLIGHT: [f32; 4] = [1.0, 1.0, 0.0, 1.0];

/// Tint for the selected node `elapsed_secs` after startup
///
/// The pulse swings between 0.8 and 1.2 on red and green with blue held at 0.5.
pub fn highlight_tint(elapsed_secs: f32, style: HighlightStyle) -> [f32; 4] {
    match style {
        HighlightStyle::Pulse => {
            let millis = elapsed_secs * 1000.0;
            let pulse = ((millis * 0.005).sin() + 1.0) * 0.2 + 0.8;
            [pulse, pulse, 0.5, 1.0]
        }
        HighlightStyle::Solid => SOLID_HIGHLIGHT,
    }
}
