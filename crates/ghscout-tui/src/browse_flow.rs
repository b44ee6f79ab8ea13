use anyhow::{Context, Result};
use crossterm::event::{Event, KeyEvent};
use ghscout_app::{Browser, RequestClass, SessionPhase};
use ghscout_core::github::{ReadmeContent, ReadmeStatus, Repository};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Color;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{List, ListItem, ListState, Paragraph};
use tui_input::Input;
use tui_input::backend::crossterm::EventHandler;

use crate::UiExit;
use crate::keymap;
use crate::theme;
use crate::ui::loading::{LoadingState, spinner_line};
use crate::ui::text::{KeyHint, highlighted_title, legend, legend_height, wrapping};

const README_PAGE: u16 = 10;

const QUERY_KEYS: KeyHint = KeyHint {
    wide: "Type: edit query    Enter: search    Tab: results    Ctrl-C: quit",
    narrow: "Enter: search    Tab: results    Ctrl-C: quit",
    tiny: "Enter search | Tab results | ^C quit",
};

const RESULTS_KEYS: KeyHint = KeyHint {
    wide: "Enter: open    Up/Down or j/k: move    PgUp/PgDn: scroll README    Esc: search    q: quit",
    narrow: "Enter: open    j/k: move    PgUp/PgDn: scroll    Esc: search    q: quit",
    tiny: "Enter open | j/k move | Esc search | q quit",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Query,
    Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ResultsView {
    Empty,
    Accounts,
    Repositories,
}

impl ResultsView {
    fn of(phase: &SessionPhase) -> Self {
        match phase {
            SessionPhase::Idle => Self::Empty,
            SessionPhase::Searching | SessionPhase::ShowingSuggestions => Self::Accounts,
            SessionPhase::LoadingRepos
            | SessionPhase::ShowingRepos
            | SessionPhase::ReadmeExpanded { .. } => Self::Repositories,
        }
    }
}

/// The single browsing screen: query box on top, results below, README
/// panel beside the results while a repository is expanded.
#[derive(Debug)]
pub(crate) struct BrowseScreen {
    query: Input,
    focus: Focus,
    selected: usize,
    readme_scroll: u16,
    loading: LoadingState,
}

impl BrowseScreen {
    pub(crate) fn new() -> Self {
        Self {
            query: Input::default(),
            focus: Focus::Query,
            selected: 0,
            readme_scroll: 0,
            loading: LoadingState::default(),
        }
    }

    pub(crate) fn on_tick(&mut self, browser: &mut Browser) {
        if RequestClass::ALL
            .iter()
            .any(|class| browser.is_loading(*class))
        {
            self.loading.next_frame();
        }

        browser.drain();
        self.clamp_selection(browser);
    }

    pub(crate) fn on_key(&mut self, key: KeyEvent, browser: &mut Browser) -> Result<Option<UiExit>> {
        if keymap::is_focus_switch(key) {
            self.focus = match self.focus {
                Focus::Query => Focus::Results,
                Focus::Results => Focus::Query,
            };
            return Ok(None);
        }

        match self.focus {
            Focus::Query => {
                self.on_query_key(key, browser);
                Ok(None)
            }
            Focus::Results => self.on_results_key(key, browser),
        }
    }

    fn on_query_key(&mut self, key: KeyEvent, browser: &mut Browser) {
        if keymap::is_confirm(key) {
            if browser.submit_text(self.query.value()) {
                self.selected = 0;
                self.readme_scroll = 0;
                self.focus = Focus::Results;
            }
            return;
        }

        self.query.handle_event(&Event::Key(key));
    }

    fn on_results_key(&mut self, key: KeyEvent, browser: &mut Browser) -> Result<Option<UiExit>> {
        if keymap::is_quit(key) {
            return Ok(Some(UiExit::Completed));
        }

        if keymap::is_back(key) {
            self.focus = Focus::Query;
            return Ok(None);
        }

        if keymap::is_up(key) {
            self.selected = self.selected.saturating_sub(1);
            return Ok(None);
        }

        if keymap::is_down(key) {
            if self.selected + 1 < results_len(browser) {
                self.selected += 1;
            }
            return Ok(None);
        }

        if keymap::is_page_down(key) {
            self.readme_scroll = self.readme_scroll.saturating_add(README_PAGE);
            return Ok(None);
        }

        if keymap::is_page_up(key) {
            self.readme_scroll = self.readme_scroll.saturating_sub(README_PAGE);
            return Ok(None);
        }

        if keymap::is_confirm(key) {
            self.open_selected(browser)?;
        }

        Ok(None)
    }

    fn open_selected(&mut self, browser: &mut Browser) -> Result<()> {
        let state = browser.state();
        match ResultsView::of(state.phase()) {
            ResultsView::Accounts => {
                let Some(account) = state.suggested_accounts().get(self.selected) else {
                    return Ok(());
                };
                let handle = account.handle.clone();
                browser
                    .select_account(&handle)
                    .with_context(|| format!("failed to open account {handle}"))?;
                self.selected = 0;
            }
            ResultsView::Repositories => {
                let Some(repository) = state.repositories().get(self.selected) else {
                    return Ok(());
                };
                let name = repository.name.clone();
                browser
                    .toggle_readme(&name)
                    .with_context(|| format!("failed to open README of {name}"))?;
                self.readme_scroll = 0;
            }
            ResultsView::Empty => {}
        }
        Ok(())
    }

    fn clamp_selection(&mut self, browser: &Browser) {
        let len = results_len(browser);
        self.selected = if len == 0 {
            0
        } else {
            self.selected.min(len - 1)
        };
    }

    pub(crate) fn render(&self, frame: &mut Frame<'_>, browser: &Browser) {
        let area = frame.area();
        let key_text = self.key_hint(area.width);
        let footer_height = legend_height(area.width, key_text);
        let [query_area, body, footer] = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(footer_height),
            ])
            .areas(area);

        self.render_query(frame, query_area);

        let state = browser.state();
        match (state.expanded_repo(), state.readme()) {
            (Some(repository), Some(content)) => {
                let [list_area, readme_area] = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                    .areas(body);
                self.render_results(frame, list_area, browser);
                self.render_readme(frame, readme_area, repository, content);
            }
            _ => self.render_results(frame, body, browser),
        }

        let keys = legend(key_text).block(theme::key_block());
        frame.render_widget(keys, footer);
    }

    fn key_hint(&self, width: u16) -> &'static str {
        match self.focus {
            Focus::Query => QUERY_KEYS.fit(width),
            Focus::Results => RESULTS_KEYS.fit(width),
        }
    }

    fn render_query(&self, frame: &mut Frame<'_>, area: Rect) {
        let focused = self.focus == Focus::Query;
        let title = if focused {
            highlighted_title("Search accounts")
        } else {
            Line::from("Search accounts (Tab to focus)")
        };

        let width = area.width.saturating_sub(2) as usize;
        let scroll = self.query.visual_scroll(width);
        let paragraph = Paragraph::new(self.query.value())
            .scroll((0, scroll as u16))
            .block(theme::chrome(title));
        frame.render_widget(paragraph, area);

        if !focused || width == 0 {
            return;
        }

        let visual = self.query.visual_cursor();
        let relative = visual.saturating_sub(scroll).min(width.saturating_sub(1));
        frame.set_cursor_position((area.x + 1 + relative as u16, area.y + 1));
    }

    fn render_results(&self, frame: &mut Frame<'_>, area: Rect, browser: &Browser) {
        let state = browser.state();
        let focused = self.focus == Focus::Results;
        let titled = |title: String| {
            if focused {
                highlighted_title(title)
            } else {
                Line::from(title)
            }
        };

        let (title, items, placeholder) = match ResultsView::of(state.phase()) {
            ResultsView::Empty => {
                let hint = Line::from("Type a GitHub handle and press Enter.");
                frame.render_widget(
                    wrapping(hint).block(theme::chrome(titled("Results".to_string()))),
                    area,
                );
                return;
            }
            ResultsView::Accounts => {
                let items: Vec<ListItem<'_>> = state
                    .suggested_accounts()
                    .iter()
                    .map(|account| ListItem::new(account.handle.as_str()))
                    .collect();
                let placeholder = if browser.is_loading(RequestClass::AccountSearch) {
                    spinner_line(&self.loading, "Searching accounts…")
                } else {
                    Line::from("No accounts found.")
                };
                ("Accounts".to_string(), items, placeholder)
            }
            ResultsView::Repositories => {
                let expanded = state.expanded_repo();
                let items: Vec<ListItem<'_>> = state
                    .repositories()
                    .iter()
                    .map(|repository| {
                        repository_card(repository, expanded == Some(repository.name.as_str()))
                    })
                    .collect();
                let placeholder = if browser.is_loading(RequestClass::RepositoryList) {
                    spinner_line(&self.loading, "Loading repositories…")
                } else {
                    Line::from("No repositories found.")
                };
                let owner = state.active_account().unwrap_or_default();
                (format!("Repositories of {owner}"), items, placeholder)
            }
        };

        if items.is_empty() {
            frame.render_widget(
                wrapping(placeholder).block(theme::chrome(titled(title))),
                area,
            );
            return;
        }

        let highlight = if focused { Color::Cyan } else { Color::DarkGray };
        let list = List::new(items)
            .block(theme::chrome(titled(title)))
            .highlight_style(theme::list_highlight(highlight));

        let mut list_state = ListState::default();
        list_state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut list_state);
    }

    fn render_readme(
        &self,
        frame: &mut Frame<'_>,
        area: Rect,
        repository: &str,
        content: &ReadmeContent,
    ) {
        let body = match content.status {
            ReadmeStatus::Loading => Text::from(spinner_line(&self.loading, content.display_text())),
            ReadmeStatus::Loaded => Text::from(content.display_text().to_string()),
            ReadmeStatus::NotFound => {
                Text::styled(content.display_text().to_string(), theme::secondary_text())
            }
            ReadmeStatus::Error => {
                Text::styled(content.display_text().to_string(), theme::error_prompt())
            }
        };

        let paragraph = wrapping(body)
            .scroll((self.readme_scroll, 0))
            .block(theme::chrome(format!("README: {repository}")));
        frame.render_widget(paragraph, area);
    }
}

fn results_len(browser: &Browser) -> usize {
    let state = browser.state();
    match ResultsView::of(state.phase()) {
        ResultsView::Empty => 0,
        ResultsView::Accounts => state.suggested_accounts().len(),
        ResultsView::Repositories => state.repositories().len(),
    }
}

fn repository_card(repository: &Repository, expanded: bool) -> ListItem<'static> {
    let marker = if expanded { "▾ " } else { "▸ " };
    let mut lines = vec![Line::from(vec![
        Span::raw(marker),
        Span::styled(repository.name.clone(), theme::card_title()),
    ])];

    if let Some(description) = repository
        .description
        .as_deref()
        .filter(|description| !description.trim().is_empty())
    {
        lines.push(Line::from(Span::styled(
            format!("  {description}"),
            theme::secondary_text(),
        )));
    }

    ListItem::new(Text::from(lines))
}
