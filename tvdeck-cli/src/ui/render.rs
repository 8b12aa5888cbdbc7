use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, Paragraph},
};

use tvdeck_core::model::PowerAction;
use tvdeck_core::scheduler::View;

use super::assets::{Assets, stat_values};
use super::layout::Layout;

/// Full repaint of the menu.
pub fn draw(f: &mut Frame, assets: &Assets, layout: &Layout, view: &View<'_>) {
    f.render_widget(&assets.backdrop, layout.area);

    draw_clock(f, assets, layout, view);
    draw_settings(f, assets, layout.settings, view.nav.settings_selected());

    let highlighted = view.nav.highlighted_tile();
    for (i, (rect, tile)) in layout.tiles.iter().zip(&assets.tiles).enumerate() {
        draw_tile(f, assets, *rect, &tile.label, tile.icon, highlighted == Some(i));
    }

    draw_stats(f, assets, layout.stats_bar, view);

    if !layout.help.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled(assets.help, assets.theme.label_dim_style())),
            layout.help,
        );
    }
}

fn draw_clock(f: &mut Frame, assets: &Assets, layout: &Layout, view: &View<'_>) {
    let theme = &assets.theme;
    let clock = view.now.format("%H:%M").to_string();
    let date = view.now.format("%A, %B %d").to_string();

    f.render_widget(
        Paragraph::new(Line::styled(clock, theme.clock_style())).alignment(Alignment::Center),
        layout.clock,
    );
    f.render_widget(
        Paragraph::new(Line::styled(date, theme.date_style())).alignment(Alignment::Center),
        layout.date,
    );
}

fn draw_settings(f: &mut Frame, assets: &Assets, rect: Rect, selected: bool) {
    if rect.is_empty() {
        return;
    }
    let theme = &assets.theme;
    let block = Block::bordered()
        .border_type(if selected {
            BorderType::Thick
        } else {
            BorderType::Rounded
        })
        .border_style(theme.tile_border_style(selected))
        .style(theme.panel_style());
    let inner = block.inner(rect);
    f.render_widget(block, rect);
    f.render_widget(
        Paragraph::new(Span::styled(assets.settings_icon, theme.icon_style(selected)))
            .alignment(Alignment::Center),
        inner,
    );
}

fn draw_tile(f: &mut Frame, assets: &Assets, rect: Rect, label: &str, icon: &str, selected: bool) {
    if rect.is_empty() {
        return;
    }
    let theme = &assets.theme;
    let block = Block::bordered()
        .border_type(if selected {
            BorderType::Thick
        } else {
            BorderType::Rounded
        })
        .border_style(theme.tile_border_style(selected))
        .style(theme.tile_style(selected));
    let inner = block.inner(rect);
    f.render_widget(block, rect);
    if inner.is_empty() {
        return;
    }

    // Icon slightly above center, label on the bottom row
    let icon_row = Rect {
        y: inner.y + inner.height.saturating_sub(1) / 2 - u16::from(inner.height > 2),
        height: 1,
        ..inner
    };
    let label_row = Rect {
        y: inner.y + inner.height - 1,
        height: 1,
        ..inner
    };

    f.render_widget(
        Paragraph::new(Span::styled(icon, theme.icon_style(selected))).alignment(Alignment::Center),
        icon_row,
    );
    f.render_widget(
        Paragraph::new(Span::styled(label, theme.title_style())).alignment(Alignment::Center),
        label_row,
    );
}

fn draw_stats(f: &mut Frame, assets: &Assets, rect: Rect, view: &View<'_>) {
    if rect.is_empty() {
        return;
    }
    let theme = &assets.theme;
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(theme.panel_border_style())
        .style(theme.panel_style());
    let inner = block.inner(rect);
    f.render_widget(block, rect);

    let col_w = inner.width / 4;
    if col_w == 0 || inner.height == 0 {
        return;
    }
    let top = inner.y + inner.height.saturating_sub(2) / 2;
    let values = stat_values(&view.telemetry);

    for (i, (slot, value)) in assets.stats.iter().zip(values).enumerate() {
        let column = Rect::new(
            inner.x + col_w * i as u16,
            top,
            col_w,
            inner.height.min(2),
        );
        let lines = vec![
            Line::from(vec![
                Span::styled(slot.icon, theme.panel_style()),
                Span::styled(" ", theme.panel_style()),
                Span::styled(
                    format!("{}{}", value, slot.unit),
                    theme.stat_value_style(value, slot.kind),
                ),
            ]),
            Line::styled(slot.label, theme.label_dim_style()),
        ];
        f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), column);
    }
}

/// Modal confirmation panel drawn over the current frame.
pub fn draw_confirm(f: &mut Frame, assets: &Assets, layout: &Layout, action: PowerAction) {
    let theme = &assets.theme;
    f.buffer_mut()
        .set_style(layout.area, Style::default().add_modifier(Modifier::DIM));

    let rect = layout.dialog();
    if rect.is_empty() {
        return;
    }
    let block = Block::bordered()
        .border_type(BorderType::Rounded)
        .border_style(theme.dialog_border_style())
        .style(theme.panel_style());
    let inner = block.inner(rect);
    f.render_widget(Clear, rect);
    f.render_widget(block, rect);

    let lines = vec![
        Line::default(),
        Line::styled(format!("{}?", action.label()), theme.title_style()),
        Line::default(),
        Line::styled("Enter = Yes    Esc = No", theme.label_dim_style()),
    ];
    f.render_widget(Paragraph::new(lines).alignment(Alignment::Center), inner);
}
