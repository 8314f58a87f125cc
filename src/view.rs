use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::arc::{arc_path, ArcPath, PathTarget};
use crate::error::Error;
use crate::widget::PresserAttrs;

pub const RADIUS: f64 = 50.0;
pub const STROKE_WIDTH: f64 = 8.0;
pub const OVERLAY_STROKE_WIDTH: f64 = 1.0;
pub const OVERLAY_FILL: Rgb = Rgb::new(0xEE, 0xEE, 0xEE);
pub const OVERLAY_STROKE: Rgb = Rgb::new(0xCC, 0xCC, 0xCC);
pub const CHECKMARK_COLOR: Rgb = Rgb::new(0, 0, 0);
pub const CHECKMARK: &str = "\u{2714}";

/// 24-bit colour, written as `#RGB` or `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl FromStr for Rgb {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || Error::Color(s.to_string());
        let hex = s.trim().strip_prefix('#').ok_or_else(bad)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(bad());
        }

        let channel = |digits: &str| u8::from_str_radix(digits, 16).map_err(|_| bad());
        match hex.len() {
            3 => {
                // #F80 is shorthand for #FF8800
                let expand = |i: usize| channel(&hex[i..=i].repeat(2));
                Ok(Rgb::new(expand(0)?, expand(1)?, expand(2)?))
            }
            6 => Ok(Rgb::new(
                channel(&hex[0..2])?,
                channel(&hex[2..4])?,
                channel(&hex[4..6])?,
            )),
            _ => Err(bad()),
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Rgb> for String {
    fn from(c: Rgb) -> Self {
        c.to_string()
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl From<Rgb> for ratatui::style::Color {
    fn from(c: Rgb) -> Self {
        ratatui::style::Color::Rgb(c.r, c.g, c.b)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Cursor {
    Pointer,
    Default,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CircleNode {
    pub radius: f64,
    pub stroke_width: f64,
    pub fill: Rgb,
    pub stroke: Rgb,
}

/// The progress ring. Written by `draw_arc` each tick.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcNode {
    pub path: ArcPath,
    pub stroke: Rgb,
}

impl PathTarget for ArcNode {
    fn set_path(&mut self, path: ArcPath) {
        self.path = path;
    }
}

/// The circle and checkmark shown once a press completes.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlay {
    pub circle: CircleNode,
    pub opacity: f64,
    pub revealed_at: Option<Instant>,
}

impl Overlay {
    pub fn fade_in(&mut self, now: Instant) {
        self.opacity = 1.0;
        self.revealed_at = Some(now);
    }

    pub fn hide(&mut self) {
        self.opacity = 0.0;
        self.revealed_at = None;
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed_at.is_some()
    }

    /// Opacity as displayed part way through the fade-in.
    pub fn reveal(&self, now: Instant, fade: Duration) -> f64 {
        match self.revealed_at {
            None => 0.0,
            Some(_) if fade.is_zero() => self.opacity,
            Some(at) => {
                let t = now.saturating_duration_since(at).as_secs_f64() / fade.as_secs_f64();
                self.opacity * t.clamp(0.0, 1.0)
            }
        }
    }
}

/// Everything a host needs to draw one button, in a 100 x 100 box.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonView {
    pub background: CircleNode,
    pub arc: ArcNode,
    pub label: String,
    pub text_color: Rgb,
    pub overlay: Overlay,
    pub cursor: Cursor,
}

impl ButtonView {
    pub fn new(attrs: &PresserAttrs) -> Self {
        let ring_radius = RADIUS - STROKE_WIDTH / 2.0;
        Self {
            background: CircleNode {
                radius: ring_radius,
                stroke_width: STROKE_WIDTH,
                fill: attrs.bg_fill_color,
                stroke: attrs.bg_stroke_color,
            },
            arc: ArcNode {
                path: arc_path(RADIUS, RADIUS, ring_radius, 0.0, 0.0),
                stroke: attrs.fg_stroke_color,
            },
            label: attrs.label.clone(),
            text_color: attrs.text_color,
            overlay: Overlay {
                circle: CircleNode {
                    radius: RADIUS - OVERLAY_STROKE_WIDTH / 2.0,
                    stroke_width: OVERLAY_STROKE_WIDTH,
                    fill: OVERLAY_FILL,
                    stroke: OVERLAY_STROKE,
                },
                opacity: 0.0,
                revealed_at: None,
            },
            cursor: Cursor::Pointer,
        }
    }
}
