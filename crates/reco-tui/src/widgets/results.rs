//! Results pane — the ranked entity list on the right.
//!
//! The body depends on the current [`Phase`](crate::app::Phase):
//!
//! - `Idle` — a hint telling the user how to start.
//! - `Loading` — the in-flight indicator.
//! - `Success` — one row per recommendation, in backend order, rank-numbered,
//!   with the score rendered as a fixed-point percentage (`87.00%`).
//! - `Failure` — the static error message; the list is empty.
//!
//! # Scroll semantics
//!
//! `scroll_offset` = number of entries hidden at the top (0 = rank 1 visible).
//! `cursor` = absolute index into the result list. The cursor is always kept
//! within the visible window; moving it past the edge auto-scrolls.

use std::cell::Cell;

use crate::app::Phase;
use crate::event::{AppEvent, Direction};
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget,
    },
};
use reco_core::format_score;

const PAGE_STEP: usize = 10;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

pub struct ResultsState {
    /// Number of entries hidden at the top of the pane.
    pub scroll_offset: usize,
    /// Absolute index of the highlighted row.
    pub cursor: usize,
    /// Cached from the last render so `handle()` can do cursor-aware scrolling.
    last_height: Cell<usize>,
}

impl Default for ResultsState {
    fn default() -> Self {
        Self {
            scroll_offset: 0,
            cursor: 0,
            last_height: Cell::new(40),
        }
    }
}

impl ResultsState {
    /// Reset to the top. Called whenever a new result list replaces the old.
    pub fn reset(&mut self) {
        self.scroll_offset = 0;
        self.cursor = 0;
    }

    fn height(&self) -> usize {
        self.last_height.get().max(1)
    }

    /// Handle a navigation event against a list of `total` entries.
    pub fn handle(&mut self, event: &AppEvent, total: usize) {
        if total == 0 {
            return;
        }

        match event {
            AppEvent::Nav(Direction::Up) => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                }
                if self.cursor < self.scroll_offset {
                    self.scroll_offset = self.cursor;
                }
            }
            AppEvent::Nav(Direction::Down) => {
                if self.cursor + 1 < total {
                    self.cursor += 1;
                }
                let bottom = self.scroll_offset + self.height();
                if self.cursor >= bottom {
                    self.scroll_offset = self.cursor + 1 - self.height();
                }
            }
            AppEvent::ScrollUp => {
                self.scroll_offset = self.scroll_offset.saturating_sub(PAGE_STEP);
                self.cursor = self.cursor.saturating_sub(PAGE_STEP);
            }
            AppEvent::ScrollDown => {
                let max_offset = total.saturating_sub(self.height());
                self.scroll_offset = (self.scroll_offset + PAGE_STEP).min(max_offset);
                self.cursor = (self.cursor + PAGE_STEP).min(total - 1);
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Widget
// ---------------------------------------------------------------------------

pub struct Results<'a> {
    state: &'a ResultsState,
    phase: &'a Phase,
    focused: bool,
    theme: &'a Theme,
}

impl<'a> Results<'a> {
    pub fn new(state: &'a ResultsState, phase: &'a Phase, focused: bool, theme: &'a Theme) -> Self {
        Self { state, phase, focused, theme }
    }
}

impl Widget for Results<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            self.theme.border_focused
        } else {
            self.theme.border_unfocused
        };

        let block = Block::bordered()
            .title("Entidades sugeridas")
            .border_style(border_style);
        let inner = block.inner(area);
        block.render(area, buf);

        let height = inner.height as usize;
        // Cache for handle() — safe because draw always runs before handle()
        self.state.last_height.set(height);

        let recommendations = match self.phase {
            Phase::Idle => {
                Paragraph::new(Line::styled(
                    "Escribe un producto (o elige una categoría) y presiona Enter.",
                    self.theme.status_hint,
                ))
                .render(inner, buf);
                return;
            }
            Phase::Loading => {
                Paragraph::new(Line::styled("Consultando…", self.theme.status_loading))
                    .render(inner, buf);
                return;
            }
            Phase::Failure(message) => {
                Paragraph::new(Line::styled(message.as_str(), self.theme.status_error))
                    .render(inner, buf);
                return;
            }
            Phase::Success(recommendations) => recommendations,
        };

        if recommendations.is_empty() {
            Paragraph::new(Line::styled("Sin resultados.", self.theme.status_hint))
                .render(inner, buf);
            return;
        }

        let total = recommendations.len();
        let start = self.state.scroll_offset.min(total.saturating_sub(1));
        let end = (start + height).min(total);

        let lines: Vec<Line<'static>> = recommendations[start..end]
            .iter()
            .enumerate()
            .map(|(row, rec)| {
                let rank = start + row + 1;
                let mut line = Line::from(vec![
                    Span::styled(
                        format!("{rank:>3}. "),
                        Style::default().add_modifier(Modifier::DIM),
                    ),
                    Span::raw(rec.entidad.clone()),
                    Span::raw("  "),
                    Span::styled(format_score(rec.score), self.theme.score_style(rec.score)),
                ]);
                if self.focused && start + row == self.state.cursor {
                    line = line.patch_style(Style::default().add_modifier(Modifier::REVERSED));
                }
                line
            })
            .collect();

        // Split inner into text (fill) + 1-column scrollbar strip inside the
        // borders so the track height matches the visible content rows.
        let text_area = Rect { width: inner.width.saturating_sub(1), ..inner };
        let sb_area = Rect {
            x: inner.right().saturating_sub(1),
            width: 1,
            ..inner
        };

        Paragraph::new(lines).render(text_area, buf);

        let mut sb_state = ScrollbarState::new(total)
            .position(start)
            .viewport_content_length(height);
        StatefulWidget::render(
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None),
            sb_area,
            buf,
            &mut sb_state,
        );
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
