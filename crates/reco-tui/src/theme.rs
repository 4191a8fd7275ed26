//! Colour theme for the reco TUI.
//!
//! Themes are defined as TOML files. The default theme is embedded in the
//! binary via [`include_str!`] so the application works without any files on
//! disk. Call [`Theme::load_default`] at startup and pass the result through
//! the application as a shared reference.
//!
//! # Score bands
//!
//! Result rows are styled by confidence band: a score of 0.75 or more is
//! "high", 0.40 or more is "mid", anything below is "low". The thresholds are
//! presentation only — the data itself is never reordered or filtered.

use config::{Config, File, FileFormat};
use ratatui::style::{Color, Modifier, Style};
use serde::Deserialize;

const DEFAULT_THEME_SRC: &str = include_str!("themes/default.toml");
const GRUVBOX_DARK_THEME_SRC: &str = include_str!("themes/gruvbox_dark.toml");

const SCORE_HIGH_THRESHOLD: f64 = 0.75;
const SCORE_MID_THRESHOLD: f64 = 0.40;

// ---------------------------------------------------------------------------
// Raw (serde) types — mirror the TOML structure
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RawStyle {
    fg: Option<String>,
    bg: Option<String>,
    #[serde(default)]
    bold: bool,
    #[serde(default)]
    dim: bool,
    #[serde(default)]
    italic: bool,
    #[serde(default)]
    underlined: bool,
}

impl RawStyle {
    fn into_style(self) -> Style {
        let mut style = Style::default();
        if let Some(ref s) = self.fg {
            if let Some(c) = parse_color(s) {
                style = style.fg(c);
            }
        }
        if let Some(ref s) = self.bg {
            if let Some(c) = parse_color(s) {
                style = style.bg(c);
            }
        }
        if self.bold {
            style = style.add_modifier(Modifier::BOLD);
        }
        if self.dim {
            style = style.add_modifier(Modifier::DIM);
        }
        if self.italic {
            style = style.add_modifier(Modifier::ITALIC);
        }
        if self.underlined {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        style
    }
}

#[derive(Debug, Deserialize)]
struct RawScores {
    high: RawStyle,
    mid: RawStyle,
    low: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawBorders {
    focused: RawStyle,
    unfocused: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawStatus {
    error: RawStyle,
    loading: RawStyle,
    hint: RawStyle,
}

#[derive(Debug, Deserialize)]
struct RawTheme {
    scores: RawScores,
    borders: RawBorders,
    status: RawStatus,
}

// ---------------------------------------------------------------------------
// Public Theme type
// ---------------------------------------------------------------------------

/// Application colour theme.
///
/// Load once at startup with [`Theme::load_default`] and pass as a shared
/// reference throughout the TUI. All styles are pre-resolved ratatui [`Style`]
/// values — no allocation at render time.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Style for high-confidence scores (≥ 0.75).
    pub score_high: Style,
    /// Style for mid-confidence scores (≥ 0.40).
    pub score_mid: Style,
    /// Style for low-confidence scores.
    pub score_low: Style,

    /// Border style for the currently focused pane.
    pub border_focused: Style,
    /// Border style for unfocused panes.
    pub border_unfocused: Style,

    /// Style for the static error message.
    pub status_error: Style,
    /// Style for the in-flight ("Consultando…") indicator.
    pub status_loading: Style,
    /// Style for idle hints and placeholders.
    pub status_hint: Style,
}

impl Theme {
    /// Load and parse the embedded default theme.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed. The default theme ships
    /// inside the binary, so this should never happen in practice.
    pub fn load_default() -> Self {
        Self::from_toml_str(DEFAULT_THEME_SRC).expect("embedded default theme must be valid TOML")
    }

    /// Load and parse the embedded Gruvbox Dark theme.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed.
    pub fn load_gruvbox_dark() -> Self {
        Self::from_toml_str(GRUVBOX_DARK_THEME_SRC)
            .expect("embedded gruvbox dark theme must be valid TOML")
    }

    /// Parse a theme from a TOML string.
    ///
    /// Returns an error if the string cannot be deserialised into a valid
    /// theme. Unknown keys are ignored so user themes can be forward-compatible
    /// with future theme additions.
    pub fn from_toml_str(src: &str) -> anyhow::Result<Self> {
        let raw: RawTheme = Config::builder()
            .add_source(File::from_str(src, FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        Ok(Self {
            score_high: raw.scores.high.into_style(),
            score_mid: raw.scores.mid.into_style(),
            score_low: raw.scores.low.into_style(),
            border_focused: raw.borders.focused.into_style(),
            border_unfocused: raw.borders.unfocused.into_style(),
            status_error: raw.status.error.into_style(),
            status_loading: raw.status.loading.into_style(),
            status_hint: raw.status.hint.into_style(),
        })
    }

    /// Return the [`Style`] for a confidence score by band.
    pub fn score_style(&self, score: f64) -> Style {
        if score >= SCORE_HIGH_THRESHOLD {
            self.score_high
        } else if score >= SCORE_MID_THRESHOLD {
            self.score_mid
        } else {
            self.score_low
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a colour name into a ratatui [`Color`].
///
/// Accepts:
/// - Named terminal colours (case-insensitive): `red`, `dark_gray`, etc.
/// - Hex RGB: `#rrggbb`
/// - 256-colour indexed: `indexed:N`
fn parse_color(s: &str) -> Option<Color> {
    match s.to_ascii_lowercase().as_str() {
        "black" => Some(Color::Black),
        "red" => Some(Color::Red),
        "green" => Some(Color::Green),
        "yellow" => Some(Color::Yellow),
        "blue" => Some(Color::Blue),
        "magenta" => Some(Color::Magenta),
        "cyan" => Some(Color::Cyan),
        "gray" | "grey" => Some(Color::Gray),
        "dark_gray" | "darkgray" | "dark_grey" | "darkgrey" => Some(Color::DarkGray),
        "light_red" => Some(Color::LightRed),
        "light_green" => Some(Color::LightGreen),
        "light_yellow" => Some(Color::LightYellow),
        "light_blue" => Some(Color::LightBlue),
        "light_magenta" => Some(Color::LightMagenta),
        "light_cyan" => Some(Color::LightCyan),
        "white" => Some(Color::White),
        s if s.starts_with('#') && s.len() == 7 => {
            let r = u8::from_str_radix(&s[1..3], 16).ok()?;
            let g = u8::from_str_radix(&s[3..5], 16).ok()?;
            let b = u8::from_str_radix(&s[5..7], 16).ok()?;
            Some(Color::Rgb(r, g, b))
        }
        s if s.starts_with("indexed:") => {
            let n: u8 = s["indexed:".len()..].parse().ok()?;
            Some(Color::Indexed(n))
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
