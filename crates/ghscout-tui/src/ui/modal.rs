use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::Clear;

use crate::theme;
use crate::ui::text::{legend, legend_height, wrapping};

const DISMISS_KEYS: &str = "Enter/Esc: continue";

/// Draws `message` in a box over the middle of the screen with the dismiss
/// keys folded into its bottom rows.
pub(crate) fn render_error_modal(frame: &mut Frame<'_>, message: &str) {
    let area = centered(frame.area(), 80, 50);
    let legend_rows = legend_height(area.width, DISMISS_KEYS);
    let [body_area, keys_area] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(legend_rows)])
        .areas(area);

    let title = Line::from(Span::styled("Error", theme::error_prompt()));
    frame.render_widget(Clear, area);
    frame.render_widget(
        wrapping(error_text(message)).block(theme::chrome(title)),
        body_area,
    );
    frame.render_widget(legend(DISMISS_KEYS).block(theme::key_block()), keys_area);
}

fn centered(area: Rect, width_pct: u16, height_pct: u16) -> Rect {
    let scale = |length: u16, pct: u16| {
        let scaled = u32::from(length) * u32::from(pct.min(100)) / 100;
        u16::try_from(scaled).unwrap_or(length)
    };
    let width = scale(area.width, width_pct);
    let height = scale(area.height, height_pct);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

fn error_text(message: &str) -> Text<'static> {
    let body = format!("Something went wrong.\n\n{}", message.trim_end());
    Text::from(
        body.lines()
            .map(|line| Line::from(line.to_string()))
            .collect::<Vec<_>>(),
    )
}
