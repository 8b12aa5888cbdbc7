//! UI Theme Module - Arc Blueberry palette and style helpers
//!
//! Provides:
//! - Palette tokens (not hard-coded colors)
//! - StyleKit helpers for tiles, badges and telemetry values

use ratatui::style::{Color, Modifier, Style};

/// Color palette tokens for the theme
#[derive(Clone, Debug)]
pub struct Palette {
    /// Panels and stats bar
    pub bg_secondary: Color,
    pub tile_bg: Color,
    pub tile_bg_selected: Color,
    pub fg: Color,
    pub fg_dim: Color,
    pub accent: Color,
    /// Focus ring
    pub pink: Color,
    pub green: Color,
    pub yellow: Color,
    pub red: Color,
    pub orange: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self::arc_blueberry()
    }
}

impl Palette {
    pub fn arc_blueberry() -> Self {
        Self {
            bg_secondary: Color::Rgb(0x1A, 0x1E, 0x33),
            tile_bg: Color::Rgb(0x1E, 0x23, 0x37),
            tile_bg_selected: Color::Rgb(0x2D, 0x34, 0x50),
            fg: Color::Rgb(0xBC, 0xC1, 0xDC),
            fg_dim: Color::Rgb(0x42, 0x47, 0x61),
            accent: Color::Rgb(0x8E, 0xB0, 0xE6),
            pink: Color::Rgb(0xF3, 0x8C, 0xEC),
            green: Color::Rgb(0x3C, 0xEC, 0x85),
            yellow: Color::Rgb(0xEA, 0xCD, 0x61),
            red: Color::Rgb(0xE3, 0x55, 0x35),
            orange: Color::Rgb(0xFF, 0x95, 0x5C),
        }
    }
}

/// Which telemetry figure a value belongs to; temperatures use their own
/// thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatKind {
    Percent,
    Temperature,
}

/// Theme configuration
#[derive(Clone, Debug, Default)]
pub struct Theme {
    pub palette: Palette,
}

impl Theme {
    // ========== StyleKit Helper Functions ==========

    /// Traffic-light color for a telemetry value
    pub fn stat_color(&self, value: i32, kind: StatKind) -> Color {
        let p = &self.palette;
        match kind {
            StatKind::Temperature => match value {
                v if v >= 70 => p.red,
                v if v >= 55 => p.orange,
                v if v >= 45 => p.yellow,
                _ => p.green,
            },
            StatKind::Percent => match value {
                v if v >= 80 => p.red,
                v if v >= 60 => p.yellow,
                _ => p.green,
            },
        }
    }

    pub fn stat_value_style(&self, value: i32, kind: StatKind) -> Style {
        Style::default()
            .fg(self.stat_color(value, kind))
            .bg(self.palette.bg_secondary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn tile_style(&self, selected: bool) -> Style {
        let bg = if selected {
            self.palette.tile_bg_selected
        } else {
            self.palette.tile_bg
        };
        Style::default().fg(self.palette.fg).bg(bg)
    }

    pub fn tile_border_style(&self, selected: bool) -> Style {
        if selected {
            Style::default()
                .fg(self.palette.pink)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.palette.fg_dim)
        }
    }

    /// Icons are dimmed unless their tile has focus
    pub fn icon_style(&self, selected: bool) -> Style {
        let fg = if selected {
            self.palette.fg
        } else {
            self.palette.fg_dim
        };
        Style::default().fg(fg)
    }

    pub fn panel_style(&self) -> Style {
        Style::default()
            .fg(self.palette.fg)
            .bg(self.palette.bg_secondary)
    }

    pub fn panel_border_style(&self) -> Style {
        Style::default()
            .fg(self.palette.fg_dim)
            .bg(self.palette.bg_secondary)
    }

    pub fn dialog_border_style(&self) -> Style {
        Style::default()
            .fg(self.palette.accent)
            .bg(self.palette.bg_secondary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn clock_style(&self) -> Style {
        Style::default()
            .fg(self.palette.fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn date_style(&self) -> Style {
        Style::default().fg(self.palette.fg)
    }

    pub fn label_dim_style(&self) -> Style {
        Style::default().fg(self.palette.fg_dim)
    }

    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.palette.fg)
            .add_modifier(Modifier::BOLD)
    }
}
