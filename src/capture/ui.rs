//! Terminal user interface for the live waveform display.
//!
//! Plots the sliding window against a fixed x-axis: the left edge is the
//! oldest retained sample and the axis always spans the full window
//! capacity, so the trace grows rightward until the window fills and then
//! scrolls in place.

use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    prelude::*,
    style::{Color, Style},
    widgets::Sparkline,
};
use std::error::Error;
use std::io::{stdout, Stdout};

use super::WaveformFrame;

/// User input command while monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorCommand {
    /// Keep monitoring (no key pressed)
    Continue,
    /// Stop capture and export the window (Enter or 's')
    StopAndExport,
    /// Stop capture without exporting (Escape or 'q')
    Cancel,
}

/// Terminal UI for the live waveform.
pub struct WaveformTui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    columns: Vec<u64>,
    terminal_width: usize,
    sample_rate: u32,
    window_fill: f32,
    start_time: std::time::Instant,
}

impl WaveformTui {
    /// Creates a new TUI instance and enters alternate screen mode.
    ///
    /// # Errors
    /// - If terminal cannot be initialized
    /// - If raw mode cannot be enabled
    pub fn new(sample_rate: u32) -> Result<Self, Box<dyn Error>> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;

        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;

        let size = terminal.size()?;
        let terminal_width = size.width as usize;

        Ok(WaveformTui {
            terminal,
            columns: vec![0u64; terminal_width],
            terminal_width,
            sample_rate,
            window_fill: 0.0,
            start_time: std::time::Instant::now(),
        })
    }

    /// Renders the latest window snapshot.
    ///
    /// # Errors
    /// - If terminal rendering fails
    pub fn render(&mut self, frame: &WaveformFrame) -> Result<(), Box<dyn Error>> {
        let size = self.terminal.size()?;
        let current_width = size.width as usize;
        if current_width != self.terminal_width {
            self.terminal_width = current_width;
        }

        self.columns = bucket_amplitudes(&frame.samples, frame.capacity, self.terminal_width);
        self.window_fill = if frame.capacity > 0 {
            frame.samples.len() as f32 / frame.capacity as f32
        } else {
            0.0
        };

        let elapsed = self.start_time.elapsed();
        let sample_rate = self.sample_rate;
        let window_fill = self.window_fill;

        self.terminal.draw(|frame| {
            let area = frame.area();

            let footer_height = 1;
            let content_area = Rect {
                x: area.x,
                y: area.y,
                width: area.width,
                height: area.height.saturating_sub(footer_height),
            };

            let top_area_height = content_area.height / 2;
            let top_area = Rect {
                x: content_area.x,
                y: content_area.y,
                width: content_area.width,
                height: top_area_height,
            };

            let top_sparkline = Sparkline::default()
                .data(&self.columns)
                .max(100)
                .style(
                    Style::default()
                        .bg(Color::Rgb(0, 0, 0))
                        .fg(Color::Rgb(120, 190, 255)),
                );
            frame.render_widget(top_sparkline, top_area);

            // Mirror the trace below the midline for a scope-like look
            let inverted: Vec<u64> = self
                .columns
                .iter()
                .map(|&v| 100_u64.saturating_sub(v))
                .collect();

            let bottom_area = Rect {
                x: content_area.x,
                y: content_area.y + top_area_height,
                width: content_area.width,
                height: content_area.height.saturating_sub(top_area_height),
            };

            let bottom_sparkline = Sparkline::default().data(&inverted).max(100).style(
                Style::default()
                    .bg(Color::Rgb(120, 190, 255))
                    .fg(Color::Rgb(0, 0, 0)),
            );
            frame.render_widget(bottom_sparkline, bottom_area);

            let footer_area = Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(footer_height),
                width: area.width,
                height: footer_height,
            };

            let elapsed_secs = elapsed.as_secs();
            let minutes = elapsed_secs / 60;
            let secs = elapsed_secs % 60;

            let help_text = ratatui::text::Line::from(vec![
                ratatui::text::Span::styled("● ", Style::default().fg(Color::Red)),
                ratatui::text::Span::raw(format!("{minutes}:{secs:02}")),
                ratatui::text::Span::raw(format!(" / {}Hz", sample_rate)),
                ratatui::text::Span::raw(format!(" / window {:>3.0}%", window_fill * 100.0)),
                ratatui::text::Span::raw("   [Enter] save  [q] quit"),
            ]);

            let footer = ratatui::widgets::Paragraph::new(help_text).style(
                Style::default()
                    .fg(Color::Rgb(185, 207, 212))
                    .bg(Color::Rgb(0, 0, 0)),
            );
            frame.render_widget(footer, footer_area);
        })?;

        Ok(())
    }

    /// Processes user input and returns the appropriate monitor command.
    ///
    /// # Errors
    /// - If event polling fails
    pub fn handle_input(&mut self) -> Result<MonitorCommand, Box<dyn Error>> {
        if event::poll(std::time::Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                return Ok(match key.code {
                    KeyCode::Enter | KeyCode::Char('s') => {
                        tracing::debug!("Enter pressed: stopping and exporting");
                        MonitorCommand::StopAndExport
                    }
                    KeyCode::Char('q') | KeyCode::Esc => {
                        tracing::debug!("Escape or 'q' pressed: canceling");
                        MonitorCommand::Cancel
                    }
                    KeyCode::Char('c')
                        if key
                            .modifiers
                            .contains(crossterm::event::KeyModifiers::CONTROL) =>
                    {
                        tracing::debug!("Ctrl+C pressed: canceling");
                        MonitorCommand::Cancel
                    }
                    _ => MonitorCommand::Continue,
                });
            }
        }
        Ok(MonitorCommand::Continue)
    }

    /// Cleans up terminal state and exits alternate screen mode.
    ///
    /// # Errors
    /// - If terminal mode cannot be disabled
    pub fn cleanup(&mut self) -> Result<(), Box<dyn Error>> {
        disable_raw_mode()?;
        execute!(
            self.terminal.backend_mut(),
            crossterm::terminal::LeaveAlternateScreen
        )?;
        self.terminal.show_cursor()?;
        Ok(())
    }
}

/// Buckets window samples into per-column peak amplitudes (0-100).
///
/// The x-axis is the full window capacity, not the current fill, so a
/// half-full window occupies only the left half of the screen.
fn bucket_amplitudes(samples: &[f32], capacity: usize, width: usize) -> Vec<u64> {
    let mut columns = vec![0u64; width];
    if width == 0 || capacity == 0 {
        return columns;
    }

    for (i, &sample) in samples.iter().enumerate() {
        let col = i * width / capacity;
        let col = col.min(width - 1);
        let level = (sample.abs().min(1.0) * 100.0) as u64;
        if level > columns[col] {
            columns[col] = level;
        }
    }

    columns
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_amplitudes_fixed_axis() {
        // Half-full window only fills the left half of the columns
        let samples = vec![1.0f32; 50];
        let columns = bucket_amplitudes(&samples, 100, 10);

        assert_eq!(&columns[..5], &[100, 100, 100, 100, 100]);
        assert_eq!(&columns[5..], &[0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_bucket_amplitudes_takes_peak_per_column() {
        let samples = vec![0.1f32, -0.9, 0.2, 0.3];
        let columns = bucket_amplitudes(&samples, 4, 2);

        assert_eq!(columns, vec![90, 30]);
    }

    #[test]
    fn test_bucket_amplitudes_empty_input() {
        assert_eq!(bucket_amplitudes(&[], 100, 4), vec![0, 0, 0, 0]);
        assert_eq!(bucket_amplitudes(&[1.0], 0, 4), vec![0, 0, 0, 0]);
        assert!(bucket_amplitudes(&[1.0], 4, 0).is_empty());
    }
}
