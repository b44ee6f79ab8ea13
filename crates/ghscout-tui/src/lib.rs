mod browse_flow;
mod keymap;
mod theme;
mod ui;

use std::io::{Stdout, stdout};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use browse_flow::BrowseScreen;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ghscout_app::Browser;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::debug;

use crate::ui::modal::render_error_modal;

const TICK_RATE: Duration = Duration::from_millis(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiExit {
    Completed,
    Canceled,
}

type Undo<'a> = Box<dyn FnMut() -> Result<()> + 'a>;

/// Terminal changes applied so far, each with the action that reverts it.
#[derive(Default)]
struct ScreenSetup<'a> {
    applied: Vec<(&'static str, Undo<'a>)>,
}

impl<'a> ScreenSetup<'a> {
    fn apply(
        &mut self,
        name: &'static str,
        change: impl FnOnce() -> Result<()>,
        undo: impl FnMut() -> Result<()> + 'a,
    ) -> Result<()> {
        match change() {
            Ok(()) => {
                self.applied.push((name, Box::new(undo)));
                Ok(())
            }
            Err(error) => Err(self.revert(error)),
        }
    }

    /// Builds the value that takes ownership of the screen. The recorded
    /// changes are reverted if that fails and forgotten otherwise.
    fn finish<T>(mut self, build: impl FnOnce() -> Result<T>) -> Result<T> {
        build().map_err(|error| self.revert(error))
    }

    fn revert(&mut self, cause: anyhow::Error) -> anyhow::Error {
        let failed: Vec<String> = self
            .applied
            .drain(..)
            .rev()
            .filter_map(|(name, mut undo)| {
                undo()
                    .err()
                    .map(|error| format!("could not undo {name}: {error:#}"))
            })
            .collect();

        if failed.is_empty() {
            cause
        } else {
            anyhow!("{cause:#}\n{}", failed.join("\n"))
        }
    }
}

struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalSession {
    fn enter() -> Result<Self> {
        let mut setup = ScreenSetup::default();
        setup.apply(
            "raw mode",
            || enable_raw_mode().context("failed to enable raw mode"),
            || disable_raw_mode().context("failed to disable raw mode"),
        )?;
        setup.apply(
            "alternate screen",
            || {
                let mut out = stdout();
                execute!(out, EnterAlternateScreen, Hide)
                    .context("failed to enter alternate screen")
            },
            || {
                let mut out = stdout();
                execute!(out, Show, LeaveAlternateScreen)
                    .context("failed to leave alternate screen")
            },
        )?;

        let terminal = setup.finish(|| {
            Terminal::new(CrosstermBackend::new(stdout()))
                .context("failed to create terminal backend")
        })?;
        Ok(Self { terminal })
    }

    fn draw(
        &mut self,
        browser: &Browser,
        screen: &BrowseScreen,
        error: Option<&str>,
    ) -> Result<()> {
        self.terminal
            .draw(|frame| {
                screen.render(frame, browser);
                if let Some(message) = error {
                    render_error_modal(frame, message);
                }
            })
            .context("failed to render terminal")?;
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = execute!(self.terminal.backend_mut(), Show, LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Waits up to one tick for a key press. Resizes are handled here.
fn next_key(session: &mut TerminalSession) -> Result<Option<KeyEvent>> {
    if !event::poll(TICK_RATE).context("failed to poll terminal event")? {
        return Ok(None);
    }

    match event::read().context("failed to read terminal event")? {
        Event::Key(key) if key.kind == KeyEventKind::Press => Ok(Some(key)),
        Event::Resize(_, _) => {
            session
                .terminal
                .autoresize()
                .context("failed to autoresize terminal")?;
            Ok(None)
        }
        _ => Ok(None),
    }
}

/// Owns the terminal until the user quits. Lookups finish on worker threads;
/// their completions are drained on every tick and after every input.
pub fn run_browser(browser: &mut Browser) -> Result<UiExit> {
    let mut session = TerminalSession::enter()?;
    let mut screen = BrowseScreen::new();
    let mut error: Option<String> = None;

    loop {
        session.draw(browser, &screen, error.as_deref())?;

        let Some(key) = next_key(&mut session)? else {
            screen.on_tick(browser);
            continue;
        };

        if keymap::is_cancel(key) {
            debug!("browser canceled");
            return Ok(UiExit::Canceled);
        }

        if error.is_some() {
            if keymap::is_confirm(key) || keymap::is_back(key) {
                error = None;
            }
            continue;
        }

        match screen.on_key(key, browser) {
            Ok(Some(exit)) => return Ok(exit),
            Ok(None) => {}
            Err(failure) => error = Some(format!("{failure:#}")),
        }
        screen.on_tick(browser);
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use anyhow::{Result, anyhow};

    use super::ScreenSetup;

    type Log = RefCell<Vec<&'static str>>;

    fn record<'a>(log: &'a Log, entry: &'static str) -> impl FnMut() -> Result<()> + 'a {
        move || {
            log.borrow_mut().push(entry);
            Ok(())
        }
    }

    #[test]
    fn failed_alternate_screen_only_undoes_raw_mode() {
        let log = Log::default();
        let mut setup = ScreenSetup::default();
        setup
            .apply(
                "raw mode",
                record(&log, "enable raw"),
                record(&log, "disable raw"),
            )
            .expect("raw mode");

        let error = setup
            .apply(
                "alternate screen",
                || Err(anyhow!("not a tty")),
                record(&log, "leave alternate"),
            )
            .expect_err("alternate screen fails");

        assert_eq!(log.take(), vec!["enable raw", "disable raw"]);
        assert_eq!(format!("{error:#}"), "not a tty");
    }

    #[test]
    fn failed_backend_undoes_every_change_newest_first() {
        let log = Log::default();
        let mut setup = ScreenSetup::default();
        setup
            .apply("raw mode", || Ok(()), record(&log, "disable raw"))
            .expect("raw mode");
        setup
            .apply(
                "alternate screen",
                || Ok(()),
                || {
                    log.borrow_mut().push("leave alternate");
                    Err(anyhow!("stdout closed"))
                },
            )
            .expect("alternate screen");

        let error = setup
            .finish(|| Err::<(), _>(anyhow!("failed to create terminal backend")))
            .expect_err("backend fails");

        assert_eq!(log.take(), vec!["leave alternate", "disable raw"]);
        let message = format!("{error:#}");
        assert!(message.starts_with("failed to create terminal backend"));
        assert!(message.contains("could not undo alternate screen: stdout closed"));
        assert!(!message.contains("could not undo raw mode"));
    }

    #[test]
    fn successful_setup_keeps_the_screen_changes() {
        let log = Log::default();
        let mut setup = ScreenSetup::default();
        setup
            .apply("raw mode", || Ok(()), record(&log, "disable raw"))
            .expect("raw mode");

        let terminal = setup.finish(|| Ok("terminal")).expect("backend");

        assert_eq!(terminal, "terminal");
        assert!(log.take().is_empty());
    }
}
