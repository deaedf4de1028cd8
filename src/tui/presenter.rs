//! Terminal implementation of the presentation layer.

use super::ui::{self, CELL_HEIGHT, CELL_WIDTH};
use crate::controller::{BoardView, InputEvent, Presenter};
use anyhow::Result;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseButton, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend, layout::Rect};
use std::io::{self, Stdout};
use std::time::Duration;
use tracing::{debug, instrument, trace, warn};

/// How long `poll_events` waits for the first event.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Draws into the terminal's alternate screen and reads mouse and keyboard.
///
/// The terminal is restored when the presenter is dropped.
pub struct TerminalPresenter {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    board: Rect,
    last_view: Option<BoardView>,
    restored: bool,
}

impl TerminalPresenter {
    /// Switches the terminal into raw mode with mouse capture.
    #[instrument]
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        debug!("Terminal ready");

        Ok(Self {
            terminal,
            board: Rect::default(),
            last_view: None,
            restored: false,
        })
    }

    /// Leaves the alternate screen and raw mode. Idempotent.
    pub fn restore(&mut self) -> Result<()> {
        if self.restored {
            return Ok(());
        }
        self.restored = true;
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        self.terminal.show_cursor()?;
        debug!("Terminal restored");
        Ok(())
    }

    fn draw(&mut self, view: &BoardView, message: Option<&str>) -> Result<()> {
        let mut board = self.board;
        self.terminal.draw(|f| {
            board = ui::draw(f, view, message);
        })?;
        self.board = board;
        Ok(())
    }

    fn translate(&self, event: Event) -> Option<InputEvent> {
        match event {
            Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => Some(InputEvent::Quit),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    Some(InputEvent::Quit)
                }
                _ => None,
            },
            Event::Mouse(mouse) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                let x = mouse.column.checked_sub(self.board.x)?;
                let y = mouse.row.checked_sub(self.board.y)?;
                Some(InputEvent::Click {
                    x: u32::from(x),
                    y: u32::from(y),
                })
            }
            _ => None,
        }
    }
}

impl Presenter for TerminalPresenter {
    fn board_size(&self) -> (u32, u32) {
        (u32::from(CELL_WIDTH) * 8, u32::from(CELL_HEIGHT) * 8)
    }

    fn poll_events(&mut self) -> Result<Vec<InputEvent>> {
        let mut events = Vec::new();
        let mut wait = POLL_INTERVAL;
        while event::poll(wait)? {
            wait = Duration::ZERO;
            let raw = event::read()?;
            trace!(?raw, "Terminal event");
            if let Some(input) = self.translate(raw) {
                events.push(input);
            }
        }
        Ok(events)
    }

    fn render(&mut self, board: &BoardView) -> Result<()> {
        self.draw(board, None)?;
        self.last_view = Some(board.clone());
        Ok(())
    }

    fn show_message(&mut self, text: &str) -> Result<()> {
        match self.last_view.clone() {
            Some(view) => self.draw(&view, Some(text)),
            None => {
                warn!("Message shown before the first render");
                Ok(())
            }
        }
    }
}

impl Drop for TerminalPresenter {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            warn!(error = %e, "Failed to restore terminal");
        }
    }
}
