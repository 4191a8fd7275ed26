//! Category pane — the closed category list on the left.
//!
//! The list comes from `categorias` in the config file; it is presentation
//! data only. Navigating with `↑`/`↓` moves the highlight; `Enter` (handled
//! by the App shell) copies the highlighted category into the query form and
//! submits it.

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Paragraph, Widget},
};

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct CategoryListState {
    /// Category labels, in config order.
    pub items: Vec<String>,
    /// Index of the highlighted category.
    pub selected: usize,
}

impl CategoryListState {
    pub fn new(items: Vec<String>) -> Self {
        Self { items, selected: 0 }
    }

    /// The currently highlighted category, if the list is non-empty.
    pub fn selected_item(&self) -> Option<&str> {
        self.items.get(self.selected).map(String::as_str)
    }

    /// Handle a navigation event from the app shell.
    pub fn handle(&mut self, event: &AppEvent) {
        if self.items.is_empty() {
            return;
        }
        match event {
            AppEvent::Nav(Direction::Up) => {
                self.selected = self.selected.saturating_sub(1);
            }
            AppEvent::Nav(Direction::Down) => {
                if self.selected + 1 < self.items.len() {
                    self.selected += 1;
                }
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct CategoryList<'a> {
    state: &'a CategoryListState,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> CategoryList<'a> {
    pub fn new(state: &'a CategoryListState, focused: bool, theme: &'a Theme) -> Self {
        Self { state, focused, theme }
    }
}

impl Widget for CategoryList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            self.theme.border_focused
        } else {
            self.theme.border_unfocused
        };

        let block = Block::bordered()
            .title("Categorías")
            .border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        if self.state.items.is_empty() {
            Paragraph::new(Line::styled("(sin categorías)", self.theme.status_hint))
                .render(inner, buf);
            return;
        }

        let lines: Vec<Line> = self
            .state
            .items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let line = Line::from(format!(" {item}"));
                if self.focused && i == self.state.selected {
                    line.patch_style(Style::default().add_modifier(Modifier::REVERSED))
                } else {
                    line
                }
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
