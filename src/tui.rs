use ratatui::style::{Color, Modifier, Style};
use ratatui::symbols::Marker;
use ratatui::text::Span;

use crate::charts::{IndicatorSpec, Reading};

pub const HEADER_STYLE: Style = Style::new()
    .fg(Color::Rgb(255, 255, 224))
    .bg(Color::Rgb(85, 107, 47))
    .add_modifier(Modifier::BOLD);

pub const FOOTER_STYLE: Style = Style::new().fg(Color::DarkGray);

pub const TITLE_STYLE: Style = Style::new().add_modifier(Modifier::BOLD);

pub const VALUE_STYLE: Style = Style::new()
    .fg(Color::Rgb(255, 255, 224))
    .add_modifier(Modifier::BOLD);

pub const NO_DATA_STYLE: Style = Style::new()
    .fg(Color::DarkGray)
    .add_modifier(Modifier::ITALIC);

pub const SELECTED_STYLE: Style = Style::new()
    .bg(Color::Rgb(40, 40, 60))
    .add_modifier(Modifier::BOLD);

pub const PANEL_BORDER: Style = Style::new().fg(Color::Rgb(85, 107, 47));

/// `#RRGGBB` -> terminal color. Anything unparseable renders gray.
pub fn hex_color(hex: &str) -> Color {
    let digits = hex.trim_start_matches('#');
    if digits.len() != 6 {
        return Color::Gray;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    match (channel(0), channel(2), channel(4)) {
        (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
        _ => Color::Gray,
    }
}

/// Terminal stand-in for a fill pattern: each gender gets a different
/// glyph density.
pub fn pattern_marker(pattern: &str) -> Marker {
    match pattern {
        "" => Marker::Block,
        "/" => Marker::HalfBlock,
        "\\" => Marker::Braille,
        _ => Marker::Dot,
    }
}

/// One-character legend glyph matching `pattern_marker`.
pub fn pattern_glyph(pattern: &str) -> &'static str {
    match pattern {
        "" => "█",
        "/" => "▀",
        "\\" => "⣿",
        _ => "•",
    }
}

pub fn reading_span(spec: &IndicatorSpec) -> Span<'static> {
    let style = match spec.reading {
        Reading::Value(_) => VALUE_STYLE,
        Reading::NoData => NO_DATA_STYLE,
    };
    Span::styled(spec.display.clone(), style)
}

/// Restore the terminal before the default panic output is printed.
pub fn restore_on_panic() {
    let hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        ratatui::restore();
        hook(info);
    }));
}
