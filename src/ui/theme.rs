//! Purple-to-blue theme for reeltimer
//!
//! Palette and style helpers for the TUI.

use ratatui::style::{Color, Modifier, Style};

use crate::models::Severity;

/// Color palette
pub struct Theme;

impl Theme {
    // ═══════════════════════════════════════════════════════════════════════
    // CORE PALETTE
    // ═══════════════════════════════════════════════════════════════════════

    /// Background: #100c1f (night indigo)
    pub const BACKGROUND: Color = Color::Rgb(0x10, 0x0c, 0x1f);

    /// Card background: #1c1633
    pub const CARD: Color = Color::Rgb(0x1c, 0x16, 0x33);

    /// Primary: #a78bfa (violet)
    pub const PRIMARY: Color = Color::Rgb(0xa7, 0x8b, 0xfa);

    /// Secondary: #60a5fa (sky blue)
    pub const SECONDARY: Color = Color::Rgb(0x60, 0xa5, 0xfa);

    /// Text: #ede9fe (lavender white)
    pub const TEXT: Color = Color::Rgb(0xed, 0xe9, 0xfe);

    /// Dim: #8b84a8 (muted)
    pub const DIM: Color = Color::Rgb(0x8b, 0x84, 0xa8);

    /// Success: #4ade80
    pub const SUCCESS: Color = Color::Rgb(0x4a, 0xde, 0x80);

    /// Warning: #fbbf24
    pub const WARNING: Color = Color::Rgb(0xfb, 0xbf, 0x24);

    /// Destructive: #f87171
    pub const DESTRUCTIVE: Color = Color::Rgb(0xf8, 0x71, 0x71);

    /// Border: #4c3f8f
    pub const BORDER: Color = Color::Rgb(0x4c, 0x3f, 0x8f);

    // ═══════════════════════════════════════════════════════════════════════
    // STYLE HELPERS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn text() -> Style {
        Style::default().fg(Self::TEXT)
    }

    pub fn dimmed() -> Style {
        Style::default().fg(Self::DIM)
    }

    pub fn title() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Movie title on the card
    pub fn movie_title() -> Style {
        Style::default()
            .fg(Self::TEXT)
            .add_modifier(Modifier::BOLD)
    }

    pub fn border() -> Style {
        Style::default().fg(Self::BORDER)
    }

    pub fn card() -> Style {
        Style::default().bg(Self::CARD)
    }

    /// Text-only poster fallback banner
    pub fn banner() -> Style {
        Style::default()
            .fg(Self::TEXT)
            .bg(Self::BORDER)
            .add_modifier(Modifier::BOLD)
    }

    /// Countdown digits
    pub fn clock(running: bool) -> Style {
        let fg = if running { Self::SECONDARY } else { Self::DIM };
        Style::default().fg(fg).add_modifier(Modifier::BOLD)
    }

    /// Gauge color follows remaining time
    pub fn progress_bar(percent: f64) -> Style {
        let fg = if percent > 50.0 {
            Self::SUCCESS
        } else if percent > 20.0 {
            Self::WARNING
        } else {
            Self::DESTRUCTIVE
        };
        Style::default().fg(fg).bg(Self::BACKGROUND)
    }

    pub fn keybind() -> Style {
        Style::default()
            .fg(Self::SECONDARY)
            .add_modifier(Modifier::BOLD)
    }

    /// Main action button
    pub fn button(enabled: bool) -> Style {
        if enabled {
            Style::default()
                .fg(Self::BACKGROUND)
                .bg(Self::PRIMARY)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Self::DIM).bg(Self::CARD)
        }
    }

    pub fn loading() -> Style {
        Style::default()
            .fg(Self::PRIMARY)
            .add_modifier(Modifier::BOLD)
    }

    pub fn status_bar() -> Style {
        Style::default().fg(Self::TEXT).bg(Self::CARD)
    }

    /// Toast border and title by severity
    pub fn toast(severity: Severity) -> Style {
        let fg = match severity {
            Severity::Destructive => Self::DESTRUCTIVE,
        };
        Style::default().fg(fg).add_modifier(Modifier::BOLD)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// COLOR UTILITIES
// ═══════════════════════════════════════════════════════════════════════════

/// Relative luminance, https://www.w3.org/TR/WCAG20/#relativeluminancedef
pub fn relative_luminance(r: u8, g: u8, b: u8) -> f64 {
    fn channel(c: u8) -> f64 {
        let c = c as f64 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    }

    0.2126 * channel(r) + 0.7152 * channel(g) + 0.0722 * channel(b)
}

/// Contrast ratio between 1 (same color) and 21 (black on white)
pub fn contrast_ratio(fg: (u8, u8, u8), bg: (u8, u8, u8)) -> f64 {
    let l1 = relative_luminance(fg.0, fg.1, fg.2);
    let l2 = relative_luminance(bg.0, bg.1, bg.2);
    let (lighter, darker) = if l1 > l2 { (l1, l2) } else { (l2, l1) };
    (lighter + 0.05) / (darker + 0.05)
}

/// WCAG AA for normal text (4.5:1)
pub fn meets_wcag_aa(fg: (u8, u8, u8), bg: (u8, u8, u8)) -> bool {
    contrast_ratio(fg, bg) >= 4.5
}

/// Extract RGB tuple from ratatui Color (only works for Rgb variant)
pub fn color_to_rgb(color: Color) -> Option<(u8, u8, u8)> {
    match color {
        Color::Rgb(r, g, b) => Some((r, g, b)),
        _ => None,
    }
}
