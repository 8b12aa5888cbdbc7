//! Presentation cache
//!
//! Everything static the renderer needs, built once at startup from the
//! config and theme: the backdrop, tile labels and glyphs, stat slots.

use std::path::Path;

use image::RgbImage;
use image::imageops::FilterType;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::Color;
use ratatui::widgets::Widget;

use tvdeck_core::config::LauncherConfig;
use tvdeck_core::model::{Icon, TelemetrySnapshot};

use super::theme::{StatKind, Theme};

const GRADIENT_TOP: (u8, u8, u8) = (17, 20, 34);
const GRADIENT_BOTTOM: (u8, u8, u8) = (26, 30, 51);

/// Upper half block: foreground paints the top pixel, background the bottom
const HALF_BLOCK: &str = "\u{2580}";

/// Glyph for an icon, as a Nerd Font code point or a plain Unicode stand-in
pub fn glyph(icon: Icon, nerd_font: bool) -> &'static str {
    if nerd_font {
        match icon {
            Icon::Tv => "\u{f26c}",
            Icon::Play => "\u{f04b}",
            Icon::Video => "\u{f03d}",
            Icon::Music => "\u{f001}",
            Icon::Bluetooth => "\u{f293}",
            Icon::Settings => "\u{f013}",
            Icon::Cpu => "\u{f4bc}",
            Icon::Memory => "\u{efc5}",
            Icon::Temperature => "\u{f2c9}",
            Icon::Disk => "\u{f0a0}",
            Icon::Generic => "\u{f135}",
        }
    } else {
        match icon {
            Icon::Tv => "▣",
            Icon::Play => "▶",
            Icon::Video => "◉",
            Icon::Music => "♪",
            Icon::Bluetooth => "ᛒ",
            Icon::Settings => "⚙",
            Icon::Cpu => "▦",
            Icon::Memory => "▤",
            Icon::Temperature => "♨",
            Icon::Disk => "◍",
            Icon::Generic => "◆",
        }
    }
}

enum Source {
    Wallpaper(RgbImage),
    Gradient,
}

/// Full-screen background, drawn two pixel rows per terminal cell.
pub struct Backdrop {
    source: Source,
    /// Wallpaper resized to the last fitted surface
    scaled: Option<RgbImage>,
}

impl Backdrop {
    /// Decode the wallpaper, or fall back to the generated gradient when it
    /// is missing or unreadable.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::gradient();
        };
        match image::open(path) {
            Ok(img) => {
                tracing::info!(path = %path.display(), "wallpaper loaded");
                Self {
                    source: Source::Wallpaper(img.to_rgb8()),
                    scaled: None,
                }
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "wallpaper unavailable, using gradient");
                Self::gradient()
            }
        }
    }

    pub fn gradient() -> Self {
        Self {
            source: Source::Gradient,
            scaled: None,
        }
    }

    pub fn is_gradient(&self) -> bool {
        matches!(self.source, Source::Gradient)
    }

    /// Resample the wallpaper for a surface of `width` x `height` cells.
    pub fn fit(&mut self, width: u16, height: u16) {
        let Source::Wallpaper(img) = &self.source else {
            return;
        };
        let (w, h) = (u32::from(width.max(1)), u32::from(height.max(1)) * 2);
        if self
            .scaled
            .as_ref()
            .is_some_and(|s| s.width() == w && s.height() == h)
        {
            return;
        }
        self.scaled = Some(image::imageops::resize(img, w, h, FilterType::Triangle));
    }

    fn pixel(&self, x: u16, y_px: u32, area: Rect) -> (u8, u8, u8) {
        let height_px = u32::from(area.height) * 2;
        match (&self.source, &self.scaled) {
            (Source::Wallpaper(_), Some(img)) => {
                // Nearest neighbour in case the surface changed since fit()
                let ix = u32::from(x) * img.width() / u32::from(area.width.max(1));
                let iy = y_px * img.height() / height_px.max(1);
                let p = img.get_pixel(ix.min(img.width() - 1), iy.min(img.height() - 1));
                (p[0], p[1], p[2])
            }
            _ => gradient_at(y_px, height_px),
        }
    }
}

/// Vertical gradient color for pixel row `y` of `height`
fn gradient_at(y: u32, height: u32) -> (u8, u8, u8) {
    let lerp = |a: u8, b: u8| -> u8 {
        let span = i32::from(b) - i32::from(a);
        (i32::from(a) + span * y as i32 / height.max(1) as i32) as u8
    };
    (
        lerp(GRADIENT_TOP.0, GRADIENT_BOTTOM.0),
        lerp(GRADIENT_TOP.1, GRADIENT_BOTTOM.1),
        lerp(GRADIENT_TOP.2, GRADIENT_BOTTOM.2),
    )
}

impl Widget for &Backdrop {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }
        for row in 0..area.height {
            let top_px = u32::from(row) * 2;
            for col in 0..area.width {
                let (tr, tg, tb) = self.pixel(col, top_px, area);
                let (br, bg, bb) = self.pixel(col, top_px + 1, area);
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_symbol(HALF_BLOCK)
                        .set_fg(Color::Rgb(tr, tg, tb))
                        .set_bg(Color::Rgb(br, bg, bb));
                }
            }
        }
    }
}

pub struct TileAsset {
    pub label: String,
    pub icon: &'static str,
}

pub struct StatSlot {
    pub label: &'static str,
    pub icon: &'static str,
    pub unit: &'static str,
    pub kind: StatKind,
}

impl StatSlot {
    fn new(label: &'static str, icon: Icon, unit: &'static str, kind: StatKind, nerd: bool) -> Self {
        Self {
            label,
            icon: glyph(icon, nerd),
            unit,
            kind,
        }
    }
}

/// Values in stat slot order
pub fn stat_values(s: &TelemetrySnapshot) -> [i32; 4] {
    [
        i32::from(s.cpu_percent),
        i32::from(s.mem_percent),
        s.temp_celsius,
        i32::from(s.disk_percent),
    ]
}

pub struct Assets {
    pub theme: Theme,
    pub backdrop: Backdrop,
    pub tiles: Vec<TileAsset>,
    pub settings_icon: &'static str,
    pub stats: [StatSlot; 4],
    pub help: &'static str,
}

impl Assets {
    pub fn build(config: &LauncherConfig, theme: Theme) -> Self {
        let nerd = config.nerd_font;
        let tiles = config
            .apps
            .iter()
            .map(|app| TileAsset {
                label: app.name.clone(),
                icon: glyph(app.icon, nerd),
            })
            .collect();

        Self {
            theme,
            backdrop: Backdrop::load(config.wallpaper.as_deref()),
            tiles,
            settings_icon: glyph(Icon::Settings, nerd),
            stats: [
                StatSlot::new("CPU", Icon::Cpu, "%", StatKind::Percent, nerd),
                StatSlot::new("RAM", Icon::Memory, "%", StatKind::Percent, nerd),
                StatSlot::new("TEMP", Icon::Temperature, "°C", StatKind::Temperature, nerd),
                StatSlot::new("DISK", Icon::Disk, "%", StatKind::Percent, nerd),
            ],
            help: "?",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_no_wallpaper_uses_gradient() {
        let config = LauncherConfig::default();
        let assets = Assets::build(&config, Theme::default());
        assert!(assets.backdrop.is_gradient());
        assert_eq!(assets.tiles.len(), 5);
        assert_eq!(assets.tiles[0].label, "Kodi");
    }

    #[test]
    fn test_missing_wallpaper_file_uses_gradient() {
        let config = LauncherConfig {
            wallpaper: Some(PathBuf::from("/nonexistent/wallpapers/1.png")),
            ..LauncherConfig::default()
        };
        let assets = Assets::build(&config, Theme::default());
        assert!(assets.backdrop.is_gradient());
    }

    #[test]
    fn test_plain_glyph_fallback() {
        let config = LauncherConfig {
            nerd_font: false,
            ..LauncherConfig::default()
        };
        let assets = Assets::build(&config, Theme::default());
        assert_eq!(assets.tiles[1].icon, "▶");
        assert_eq!(assets.settings_icon, "⚙");
        assert_eq!(assets.stats[2].icon, "♨");
    }

    #[test]
    fn test_gradient_endpoints() {
        assert_eq!(gradient_at(0, 100), GRADIENT_TOP);
        assert_eq!(gradient_at(100, 100), GRADIENT_BOTTOM);
        assert_eq!(gradient_at(50, 100), (21, 25, 42));
    }

    #[test]
    fn test_gradient_fills_buffer() {
        let area = Rect::new(0, 0, 4, 3);
        let mut buf = Buffer::empty(area);
        Backdrop::gradient().render(area, &mut buf);

        let top = &buf[(0, 0)];
        assert_eq!(top.symbol(), HALF_BLOCK);
        assert_eq!(top.fg, Color::Rgb(17, 20, 34));
        let bottom = &buf[(3, 2)];
        assert_ne!(bottom.bg, Color::Rgb(17, 20, 34));
    }

    #[test]
    fn test_stat_values_order() {
        let s = TelemetrySnapshot {
            cpu_percent: 1,
            mem_percent: 2,
            temp_celsius: 3,
            disk_percent: 4,
        };
        assert_eq!(stat_values(&s), [1, 2, 3, 4]);
    }
}
