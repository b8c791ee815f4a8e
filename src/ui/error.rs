//! Full-screen error display.
//!
//! Used when capture cannot start or an export fails: shows the message on
//! a red screen and waits for a key press, so the failure is visible even
//! though logs go to a file.

use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::Paragraph};
use std::io::{self, Stdout};

/// Error screen for displaying human-readable error messages.
pub struct ErrorScreen {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl ErrorScreen {
    /// Creates a new error screen and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    pub fn new() -> anyhow::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        Ok(ErrorScreen { terminal })
    }

    /// Displays an error message centered on a red screen.
    ///
    /// Blocks until any key is pressed.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn show_error(&mut self, error_message: &str) -> anyhow::Result<()> {
        loop {
            self.terminal.draw(|frame| {
                let area = frame.area();

                for y in area.y..area.y + area.height {
                    for x in area.x..area.x + area.width {
                        frame.buffer_mut().set_string(
                            x,
                            y,
                            " ",
                            Style::default().bg(Color::Rgb(180, 30, 30)),
                        );
                    }
                }

                let text = ratatui::text::Line::from(ratatui::text::Span::styled(
                    error_message,
                    Style::default()
                        .fg(Color::White)
                        .bg(Color::Rgb(180, 30, 30)),
                ));

                let paragraph = Paragraph::new(text)
                    .alignment(Alignment::Center)
                    .wrap(ratatui::widgets::Wrap { trim: true });

                let centered = Rect {
                    x: area.x + area.width / 10,
                    y: area.y + area.height / 2,
                    width: (area.width * 80) / 100,
                    height: area.height / 2,
                };

                frame.render_widget(paragraph, centered);
            })?;

            if event::poll(std::time::Duration::from_millis(100))? {
                if let Event::Key(_) = event::read()? {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Cleans up terminal state and exits alternate screen mode.
    pub fn cleanup(&mut self) -> anyhow::Result<()> {
        disable_raw_mode()?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

impl Drop for ErrorScreen {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}
