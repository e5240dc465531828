pub mod screen;
pub mod terminal;

use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::Span,
    widgets::{Paragraph, Widget, Wrap},
};

use crate::format::SolveTime;

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const LEGEND: &str = "(space) start / skip countdown / stop   (esc) quit   (ctrl+c) abort";

/// What the live screen shows: the timer line and the session so far
#[derive(Debug, Clone, PartialEq)]
pub struct TimerView {
    pub timer: String,
    pub solves: Vec<SolveTime>,
}

impl Default for TimerView {
    fn default() -> Self {
        Self {
            timer: SolveTime::default().to_string(),
            solves: Vec::new(),
        }
    }
}

impl TimerView {
    pub fn session_line(&self) -> String {
        if self.solves.is_empty() {
            "No solves yet this session".to_string()
        } else {
            format!(
                "Your solves for this session: {}",
                self.solves.iter().join(", ")
            )
        }
    }
}

impl Widget for &TimerView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold_style = Style::default().add_modifier(Modifier::BOLD);
        let timer_style = Style::default().patch(bold_style).fg(Color::Green);
        let dim_style = Style::default().add_modifier(Modifier::DIM);
        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Min(0),    // padding
                Constraint::Length(1), // timer
                Constraint::Length(1), // padding
                Constraint::Length(3), // session solves
                Constraint::Min(0),    // padding
                Constraint::Length(1), // legend
            ])
            .split(area);

        Paragraph::new(Span::styled(self.timer.as_str(), timer_style))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        Paragraph::new(Span::styled(self.session_line(), italic_style))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(chunks[3], buf);

        Paragraph::new(Span::styled(LEGEND, dim_style))
            .alignment(Alignment::Center)
            .render(chunks[5], buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(view: &TimerView, width: u16, height: u16) -> String {
        let area = Rect::new(0, 0, width, height);
        let mut buffer = Buffer::empty(area);
        view.render(area, &mut buffer);
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    #[test]
    fn test_default_view_shows_zero() {
        let view = TimerView::default();
        let out = rendered(&view, 80, 24);
        assert!(out.contains("0.00"));
        assert!(out.contains("No solves yet"));
        assert!(out.contains("(esc) quit"));
    }

    #[test]
    fn test_view_shows_timer_and_session() {
        let view = TimerView {
            timer: "1:05.32".to_string(),
            solves: vec![SolveTime::from_centis(953), SolveTime::from_centis(1020)],
        };
        let out = rendered(&view, 80, 24);
        assert!(out.contains("1:05.32"));
        assert!(out.contains("Your solves for this session: 9.53, 10.20"));
    }

    #[test]
    fn test_view_survives_tiny_areas() {
        let view = TimerView {
            timer: "07".to_string(),
            solves: vec![SolveTime::from_centis(100); 40],
        };
        for (w, h) in [(1, 1), (10, 3), (20, 5), (200, 60)] {
            let _ = rendered(&view, w, h);
        }
    }
}
