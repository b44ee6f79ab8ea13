use ratatui::layout::Alignment;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Paragraph, Wrap};

use crate::theme;

/// The same key legend at three widths, widest first.
#[derive(Debug, Clone, Copy)]
pub(crate) struct KeyHint {
    pub(crate) wide: &'static str,
    pub(crate) narrow: &'static str,
    pub(crate) tiny: &'static str,
}

impl KeyHint {
    pub(crate) fn fit(&self, width: u16) -> &'static str {
        match width {
            110.. => self.wide,
            78..=109 => self.narrow,
            _ => self.tiny,
        }
    }
}

pub(crate) fn wrapping<'a>(text: impl Into<Text<'a>>) -> Paragraph<'a> {
    Paragraph::new(text).wrap(Wrap { trim: false })
}

pub(crate) fn legend(text: &str) -> Paragraph<'_> {
    wrapping(text).alignment(Alignment::Center)
}

/// Rows a bordered legend needs at `width`, never less than one text row.
pub(crate) fn legend_height(width: u16, text: &str) -> u16 {
    let inner = usize::from(width.saturating_sub(2).max(1));
    let rows: usize = text
        .split('\n')
        .map(|row| row.chars().count().div_ceil(inner).max(1))
        .sum();
    u16::try_from(rows).unwrap_or(u16::MAX).saturating_add(2)
}

pub(crate) fn highlighted_title(title: impl Into<String>) -> Line<'static> {
    Line::from(Span::styled(title.into(), theme::focus_prompt()))
}
