use std::fmt;

use crate::view::{ButtonView, CHECKMARK, CHECKMARK_COLOR, RADIUS};

/// Class set on the overlay once revealed. Hosts attach the fade animation to it.
pub const FADE_IN_CLASS: &str = "longpresser-fade-in";

/// Stylesheet for [`FADE_IN_CLASS`].
pub const FADE_IN_STYLE: &str = ".longpresser-fade-in { animation: longpresser-fade-in 0.25s ease-in; }\n\
@keyframes longpresser-fade-in { from { opacity: 0; } to { opacity: 1; } }";

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

/// A button as a standalone SVG document.
pub struct Document<'a>(pub &'a ButtonView);

impl fmt::Display for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let view = self.0;
        let size = RADIUS * 2.0;
        let overlay = &view.overlay;
        let class = if overlay.is_revealed() {
            format!(" class=\"{FADE_IN_CLASS}\"")
        } else {
            String::new()
        };

        writeln!(
            f,
            "<svg viewBox=\"0 0 {size} {size}\" version=\"1.1\" xmlns=\"http://www.w3.org/2000/svg\" style=\"cursor: {}\">",
            view.cursor
        )?;
        writeln!(f, "  <style>{FADE_IN_STYLE}</style>")?;
        writeln!(
            f,
            "  <circle cx=\"{RADIUS}\" cy=\"{RADIUS}\" r=\"{}\" style=\"fill: {}; stroke: {}; stroke-width: {}\"/>",
            view.background.radius, view.background.fill, view.background.stroke, view.background.stroke_width
        )?;
        writeln!(
            f,
            "  <path d=\"{}\" style=\"fill: transparent; stroke: {}; stroke-width: {}\"/>",
            view.arc.path, view.arc.stroke, view.background.stroke_width
        )?;
        writeln!(
            f,
            "  <text x=\"{RADIUS}\" y=\"{RADIUS}\" style=\"text-anchor: middle; dominant-baseline: middle; font-size: 0.95em; fill: {}\">{}</text>",
            view.text_color,
            escape(&view.label)
        )?;
        writeln!(
            f,
            "  <circle{class} cx=\"{RADIUS}\" cy=\"{RADIUS}\" r=\"{}\" style=\"fill: {}; stroke: {}; stroke-width: {}; opacity: {}\"/>",
            overlay.circle.radius,
            overlay.circle.fill,
            overlay.circle.stroke,
            overlay.circle.stroke_width,
            overlay.opacity
        )?;
        writeln!(
            f,
            "  <text{class} x=\"{RADIUS}\" y=\"{RADIUS}\" style=\"text-anchor: middle; dominant-baseline: middle; font-size: 1.5em; fill: {CHECKMARK_COLOR}; opacity: {}\">{CHECKMARK}</text>",
            overlay.opacity
        )?;
        writeln!(f, "</svg>")
    }
}

/// Render a button as a standalone SVG element.
pub fn render(view: &ButtonView) -> String {
    Document(view).to_string()
}
