//! UI rendering module for the IPO terminal
//!
//! This module contains all the rendering logic for the terminal user
//! interface, using the ratatui library for TUI components.

pub mod academy;
pub mod help_overlay;
pub mod tools;
pub mod tracker;

pub use academy::render as render_academy;
pub use help_overlay::render as render_help_overlay;
pub use tools::render as render_tools;
pub use tracker::render as render_tracker;

use ratatui::style::Color;

use crate::app::Theme;

/// Resolved colors for the active theme
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    /// Primary text
    pub text: Color,
    /// De-emphasized text
    pub dim: Color,
    /// Brand accent (gains, live markers, highlights)
    pub accent: Color,
    /// Warnings and the degradation banner
    pub warn: Color,
    /// Losses and errors
    pub danger: Color,
    /// Secondary highlight (selection, borders)
    pub info: Color,
}

/// Returns the color palette for the given theme.
pub fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            text: Color::White,
            dim: Color::DarkGray,
            accent: Color::Green,
            warn: Color::Yellow,
            danger: Color::Red,
            info: Color::Cyan,
        },
        Theme::Light => Palette {
            text: Color::Black,
            dim: Color::Gray,
            accent: Color::Green,
            warn: Color::Magenta,
            danger: Color::Red,
            info: Color::Blue,
        },
    }
}
