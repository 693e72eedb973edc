//! Draws the related-sessions strip on a terminal with crossterm colours.
//!
//! Points are mapped to character columns at a fixed scale; only cards inside
//! the panel's viewport are drawn.

use crate::adapters::ui::related_sessions::{Metrics, RelatedSessionsPanel};
use crate::domain::SessionViewModel;
use crossterm::QueueableCommand;
use crossterm::style::{Attribute, Color, Print, ResetColor, SetAttribute, SetForegroundColor};
use std::io::{self, Write};

/// Horizontal points per terminal column.
const POINTS_PER_COLUMN: f64 = 10.0;

const TITLE_COLOR: Color = Color::Grey;
const CARD_COLOR: Color = Color::Rgb {
    r: 0x0f,
    g: 0xf0,
    b: 0xfc,
};

#[derive(Debug, Default)]
pub struct TerminalSurface;

impl TerminalSurface {
    pub fn new() -> Self {
        Self
    }

    fn card_columns() -> usize {
        (Metrics::ITEM_WIDTH / POINTS_PER_COLUMN) as usize
    }

    fn gutter_columns() -> usize {
        (Metrics::PADDING / POINTS_PER_COLUMN).round() as usize
    }

    /// Render the panel. Hidden panels produce no output.
    pub fn render<W: Write>(&self, out: &mut W, panel: &RelatedSessionsPanel) -> io::Result<()> {
        if panel.is_hidden() {
            return Ok(());
        }

        let title = panel.title();
        if !title.is_empty() {
            out.queue(SetForegroundColor(TITLE_COLOR))?
                .queue(SetAttribute(Attribute::Bold))?
                .queue(Print(truncate(&title, panel_columns(panel))))?
                .queue(SetAttribute(Attribute::Reset))?
                .queue(ResetColor)?
                .queue(Print("\r\n"))?;
        }

        let collection = panel.collection();
        let cards: Vec<&SessionViewModel> = collection.items()[collection.visible_items()]
            .iter()
            .filter_map(|card| card.view_model())
            .collect();
        if cards.is_empty() {
            return out.flush();
        }

        let inner = Self::card_columns().saturating_sub(4);
        let gutter = " ".repeat(Self::gutter_columns());
        let border = format!("+{}+", "-".repeat(Self::card_columns().saturating_sub(2)));
        let rows: [Vec<String>; 5] = [
            cards.iter().map(|_| border.clone()).collect(),
            cards.iter().map(|vm| boxed(&vm.title, inner)).collect(),
            cards.iter().map(|vm| boxed(&vm.subtitle, inner)).collect(),
            cards.iter().map(|vm| boxed(&vm.duration, inner)).collect(),
            cards.iter().map(|_| border.clone()).collect(),
        ];

        out.queue(SetForegroundColor(CARD_COLOR))?;
        for row in rows {
            out.queue(Print(row.join(&gutter)))?.queue(Print("\r\n"))?;
        }
        out.queue(ResetColor)?;
        out.flush()
    }
}

fn panel_columns(panel: &RelatedSessionsPanel) -> usize {
    (panel.frame().width / POINTS_PER_COLUMN) as usize
}

fn boxed(text: &str, width: usize) -> String {
    format!("| {:<width$} |", truncate(text, width), width = width)
}

/// Single line, truncated at the tail with an ellipsis.
fn truncate(text: &str, width: usize) -> String {
    let line = text.lines().next().unwrap_or_default();
    if line.chars().count() <= width {
        return line.to_string();
    }
    let kept: String = line.chars().take(width.saturating_sub(1)).collect();
    format!("{}…", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vm(id: &str, title: &str) -> SessionViewModel {
        SessionViewModel {
            session_id: id.to_string(),
            title: title.to_string(),
            subtitle: "WWDC24 · Swift".to_string(),
            summary: String::new(),
            duration: "26 min".to_string(),
        }
    }

    fn render(panel: &RelatedSessionsPanel) -> String {
        let mut out = Vec::new();
        TerminalSurface::new().render(&mut out, panel).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_hidden_panel_renders_nothing() {
        let panel = RelatedSessionsPanel::new();
        panel.set_title(Some("Related"));
        panel.set_sessions(Vec::new());
        assert!(render(&panel).is_empty());
    }

    #[test]
    fn test_renders_title_and_visible_cards_only() {
        let panel = RelatedSessionsPanel::new();
        panel.set_title(Some("Related Sessions"));
        panel.set_sessions(vec![
            vm("1", "What's new in Swift"),
            vm("2", "Migrate your app to Swift 6"),
            vm("3", "Off screen"),
        ]);

        let text = render(&panel);
        assert!(text.contains("Related Sessions"));
        assert!(text.contains("What's new in Swift"));
        assert!(text.contains("Migrate your app to Swift 6"));
        assert!(!text.contains("Off screen"));

        panel.scroll_by(800.0);
        let text = render(&panel);
        assert!(text.contains("Off screen"));
    }

    #[test]
    fn test_truncate_tail() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("exactly-10", 10), "exactly-10");
        assert_eq!(truncate("much too long", 5), "much…");
        assert_eq!(truncate("first\nsecond", 20), "first");
    }
}
