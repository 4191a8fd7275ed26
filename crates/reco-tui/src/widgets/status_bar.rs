//! Status bar — the single top row: application title on the left, the
//! current phase summary on the right.

use crate::app::Phase;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Widget,
};
use std::time::Duration;

pub struct StatusBar<'a> {
    phase: &'a Phase,
    /// Duration of the last completed request, if any.
    elapsed: Option<Duration>,
    theme: &'a Theme,
}

impl<'a> StatusBar<'a> {
    pub fn new(phase: &'a Phase, elapsed: Option<Duration>, theme: &'a Theme) -> Self {
        Self { phase, elapsed, theme }
    }

    fn status_span(&self) -> Span<'static> {
        match self.phase {
            Phase::Idle => Span::styled("listo — ? para ayuda", self.theme.status_hint),
            Phase::Loading => Span::styled("Consultando…", self.theme.status_loading),
            Phase::Failure(message) => Span::styled(message.clone(), self.theme.status_error),
            Phase::Success(recommendations) => {
                let mut text = format!("{} entidades", recommendations.len());
                if let Some(elapsed) = self.elapsed {
                    text.push_str(&format!(" · {} ms", elapsed.as_millis()));
                }
                Span::raw(text)
            }
        }
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = Span::styled(
            " reco — Recomendador de Entidades Estatales ",
            Style::default().add_modifier(Modifier::BOLD),
        );
        let status = self.status_span();

        // Right-align the status by padding between title and status.
        let used = title.content.chars().count() + status.content.chars().count();
        let pad = (area.width as usize).saturating_sub(used + 1);
        let line = Line::from(vec![title, Span::raw(" ".repeat(pad)), status]);

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
