use ratatui::text::{Line, Span};

use crate::theme;

const FRAMES: [&str; 8] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧"];

#[derive(Debug, Clone, Default)]
pub(crate) struct LoadingState {
    frame_index: usize,
}

impl LoadingState {
    pub(crate) fn next_frame(&mut self) {
        self.frame_index = (self.frame_index + 1) % FRAMES.len();
    }

    pub(crate) fn current_frame(&self) -> &'static str {
        FRAMES[self.frame_index]
    }
}

pub(crate) fn spinner_line(loading: &LoadingState, message: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{} ", loading.current_frame()), theme::focus_prompt()),
        Span::raw(message.to_string()),
    ])
}
