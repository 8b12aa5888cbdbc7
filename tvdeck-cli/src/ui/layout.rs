use ratatui::layout::Rect;

pub const TILE_WIDTH: u16 = 16;
pub const TILE_HEIGHT: u16 = 7;
pub const TILE_SPACING: u16 = 2;
pub const STATS_WIDTH: u16 = 60;
pub const STATS_HEIGHT: u16 = 5;
const STATS_MARGIN_BOTTOM: u16 = 2;
const SETTINGS_WIDTH: u16 = 7;
const SETTINGS_HEIGHT: u16 = 3;
const DIALOG_WIDTH: u16 = 40;
const DIALOG_HEIGHT: u16 = 7;

/// Screen regions for one surface size
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    pub area: Rect,
    pub clock: Rect,
    pub date: Rect,
    pub settings: Rect,
    pub tiles: Vec<Rect>,
    pub stats_bar: Rect,
    pub help: Rect,
}

fn percent_of(value: u16, pct: u16) -> u16 {
    (u32::from(value) * u32::from(pct) / 100) as u16
}

impl Layout {
    pub fn compute(area: Rect, tile_count: usize) -> Self {
        let n = tile_count.max(1) as u16;

        // Shrink tiles when the row would not fit
        let gaps = TILE_SPACING * (n - 1);
        let tile_w = TILE_WIDTH.min(area.width.saturating_sub(gaps) / n).max(1);
        let row_w = tile_w * n + gaps;
        let grid_x = area.x + area.width.saturating_sub(row_w) / 2;
        let grid_y = area.y + percent_of(area.height, 48);

        let tiles = (0..tile_count as u16)
            .map(|i| {
                Rect::new(
                    grid_x + i * (tile_w + TILE_SPACING),
                    grid_y,
                    tile_w,
                    TILE_HEIGHT,
                )
                .intersection(area)
            })
            .collect();

        let clock_y = area.y + percent_of(area.height, 12);
        let clock = Rect::new(area.x, clock_y, area.width, 1).intersection(area);
        let date = Rect::new(area.x, clock_y + 2, area.width, 1).intersection(area);

        let settings = Rect::new(
            (area.x + area.width).saturating_sub(SETTINGS_WIDTH + 2),
            area.y + 1,
            SETTINGS_WIDTH,
            SETTINGS_HEIGHT,
        )
        .intersection(area);

        let stats_w = STATS_WIDTH.min(area.width);
        let stats_bar = Rect::new(
            area.x + (area.width - stats_w) / 2,
            (area.y + area.height).saturating_sub(STATS_HEIGHT + STATS_MARGIN_BOTTOM),
            stats_w,
            STATS_HEIGHT,
        )
        .intersection(area);

        let help = Rect::new(
            (area.x + area.width).saturating_sub(3),
            (area.y + area.height).saturating_sub(2),
            1,
            1,
        )
        .intersection(area);

        Self {
            area,
            clock,
            date,
            settings,
            tiles,
            stats_bar,
            help,
        }
    }

    /// Centered confirmation panel
    pub fn dialog(&self) -> Rect {
        let w = DIALOG_WIDTH.min(self.area.width);
        let h = DIALOG_HEIGHT.min(self.area.height);
        Rect::new(
            self.area.x + (self.area.width - w) / 2,
            self.area.y + (self.area.height - h) / 2,
            w,
            h,
        )
    }
}
