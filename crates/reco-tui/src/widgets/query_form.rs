//! Query form widget — the product text input at the bottom of the screen.
//!
//! # Editing
//!
//! - `Char(c)` inserts at the cursor.
//! - `Backspace` deletes the character before the cursor.
//! - `Nav(Left)` / `Nav(Right)` move the cursor (arrow keys while this pane
//!   is focused, re-mapped by the App shell).
//!
//! Every keystroke only updates the pending query string; nothing is sent
//! until the App shell sees `Enter`.

use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Paragraph, Widget},
};

const PLACEHOLDER: &str = "Ejemplo: Computadora portátil";

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct QueryFormState {
    /// The product/category text typed or selected by the user.
    pub text: String,
    /// Byte offset of the cursor within `text`.
    pub cursor: usize,
}

impl QueryFormState {
    /// Handle a key event from the app shell.
    ///
    /// Text-editing events (`Char`, `Backspace`, arrow keys) update the query
    /// string; all other events are ignored.
    pub fn handle(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Char(c) => {
                self.text.insert(self.cursor, *c);
                self.cursor += c.len_utf8();
                tracing::debug!(text = %self.text, cursor = self.cursor, "query: char inserted");
            }
            AppEvent::Backspace => {
                if self.cursor > 0 {
                    // Walk back one char boundary
                    let prev = self.text[..self.cursor]
                        .char_indices()
                        .last()
                        .map(|(i, _)| i)
                        .unwrap_or(0);
                    self.text.remove(prev);
                    self.cursor = prev;
                    tracing::debug!(text = %self.text, cursor = self.cursor, "query: backspace");
                }
            }
            // Left/right arrows re-mapped from Nav by the App shell
            AppEvent::Nav(Direction::Left) => {
                if self.cursor > 0 {
                    self.cursor = self.text[..self.cursor]
                        .char_indices()
                        .last()
                        .map(|(i, _)| i)
                        .unwrap_or(0);
                }
            }
            AppEvent::Nav(Direction::Right) => {
                if self.cursor < self.text.len() {
                    let next = self.text[self.cursor..]
                        .char_indices()
                        .nth(1)
                        .map(|(i, _)| self.cursor + i)
                        .unwrap_or(self.text.len());
                    self.cursor = next;
                }
            }
            _ => {}
        }
    }

    /// Replace the whole text (category selection) and put the cursor at the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.cursor = self.text.len();
    }

    /// The query that would be submitted: trimmed text, `None` when empty.
    pub fn pending_query(&self) -> Option<&str> {
        let trimmed = self.text.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct QueryForm<'a> {
    state: &'a QueryFormState,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> QueryForm<'a> {
    pub fn new(state: &'a QueryFormState, focused: bool, theme: &'a Theme) -> Self {
        Self { state, focused, theme }
    }

    /// Absolute terminal position of the text cursor within this widget's
    /// rendered area. Pass to `frame.set_cursor_position()` after rendering.
    pub fn cursor_position(&self, area: Rect) -> (u16, u16) {
        // The block adds 1-cell borders; text starts at (area.x+1, area.y+1).
        let col = self.state.text[..self.state.cursor].chars().count() as u16;
        let x = (area.x + 1 + col).min(area.right().saturating_sub(1));
        let y = area.y + 1;
        (x, y)
    }
}

impl Widget for QueryForm<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            self.theme.border_focused
        } else {
            self.theme.border_unfocused
        };

        let block = Block::bordered().title("Producto").border_style(border_style);

        let inner = block.inner(area);
        block.render(area, buf);

        let line = if self.state.text.is_empty() {
            let placeholder = if self.focused {
                PLACEHOLDER.to_string()
            } else {
                format!("{PLACEHOLDER}  (/ para escribir)")
            };
            Line::from(Span::styled(placeholder, self.theme.status_hint))
        } else {
            Line::from(self.state.text.as_str())
        };
        Paragraph::new(line).render(inner, buf);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
