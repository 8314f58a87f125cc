use std::time::{Duration, Instant};

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Painter, Shape},
        Paragraph, Widget, Wrap,
    },
};
use unicode_width::UnicodeWidthStr;

use crate::{
    arc::{arc_path, ArcPath},
    page::Page,
    view::{ButtonView, Rgb, CHECKMARK, CHECKMARK_COLOR, RADIUS},
    widget::Component,
};

const BUTTON_GAP: u16 = 2;
const HELP_TEXT: &str = "hold a button with the mouse / (r)eset / (q)uit";
/// Upper bound on the degrees between plotted points on a ring.
const MAX_ARC_STEP_DEG: f64 = 1.0;

/// Screen areas for `count` buttons laid out in a centred row above a
/// footer. Terminal cells are about twice as tall as wide, so each button
/// is twice as many columns as rows.
pub fn button_areas(area: Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    // more buttons than columns can never be drawn
    let Ok(n) = u16::try_from(count) else {
        return vec![Rect::default(); count];
    };
    let gaps = BUTTON_GAP.saturating_mul(n - 1);
    let region_height = area.height.saturating_sub(footer_height(count));
    let usable_width = area.width.saturating_sub(gaps);
    let height = region_height.min(usable_width / n / 2);
    let width = height * 2;

    let total_width = width.saturating_mul(n).saturating_add(gaps);
    let x0 = area.x + area.width.saturating_sub(total_width) / 2;
    let y0 = area.y + region_height.saturating_sub(height) / 2;

    (0..n)
        .map(|i| {
            let x = x0.saturating_add(i.saturating_mul(width.saturating_add(BUTTON_GAP)));
            Rect::new(x, y0, width, height)
        })
        .collect()
}

fn footer_height(count: usize) -> u16 {
    // one line per possible message, a spacer, the help line
    u16::try_from(count).unwrap_or(u16::MAX).saturating_add(2)
}

/// View units between neighbouring braille dots when a `RADIUS * 2` square
/// is drawn into `area`.
fn dot_pitch(area: Rect) -> f64 {
    let across = f64::from(area.width) * 2.0;
    let down = f64::from(area.height) * 4.0;
    RADIUS * 2.0 / across.max(down).max(1.0)
}

/// Index of the button whose circle contains the cell at (`column`, `row`).
pub fn hit_test(area: Rect, count: usize, column: u16, row: u16) -> Option<usize> {
    button_areas(area, count).iter().position(|r| {
        if r.width == 0 || r.height == 0 {
            return false;
        }
        let rx = r.width as f64 / 2.0;
        let ry = r.height as f64 / 2.0;
        let dx = (column as f64 + 0.5 - (r.x as f64 + rx)) / rx;
        let dy = (row as f64 + 0.5 - (r.y as f64 + ry)) / ry;
        dx * dx + dy * dy <= 1.0
    })
}

fn blend(from: Rgb, to: Rgb, t: f64) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
    Rgb::new(mix(from.r, to.r), mix(from.g, to.g), mix(from.b, to.b))
}

/// Canvas y grows upward, view y grows downward.
fn flip(y: f64) -> f64 {
    RADIUS * 2.0 - y
}

/// A thick arc drawn as concentric sampled arcs.
struct StrokedArc<'a> {
    path: &'a ArcPath,
    width: f64,
    color: Color,
    step: f64,
}

impl Shape for StrokedArc<'_> {
    fn draw(&self, painter: &mut Painter) {
        if self.path.is_empty() {
            return;
        }
        let center = self.path.center();
        let step_deg = (self.step / self.path.radius().max(1.0))
            .to_degrees()
            .min(MAX_ARC_STEP_DEG);
        let mut offset = -self.width / 2.0;
        while offset <= self.width / 2.0 {
            let ring = arc_path(
                center.x,
                center.y,
                self.path.radius() + offset,
                self.path.start_deg(),
                self.path.end_deg(),
            );
            for p in ring.points(step_deg) {
                if let Some((x, y)) = painter.get_point(p.x, flip(p.y)) {
                    painter.paint(x, y, self.color);
                }
            }
            offset += self.step;
        }
    }
}

/// A filled circle.
struct Disc {
    radius: f64,
    color: Color,
    step: f64,
}

impl Shape for Disc {
    fn draw(&self, painter: &mut Painter) {
        let mut dy = -self.radius;
        while dy <= self.radius {
            let half = (self.radius * self.radius - dy * dy).max(0.0).sqrt();
            let mut dx = -half;
            while dx <= half {
                if let Some((x, y)) = painter.get_point(RADIUS + dx, flip(RADIUS + dy)) {
                    painter.paint(x, y, self.color);
                }
                dx += self.step;
            }
            dy += self.step;
        }
    }
}

fn render_button(view: &ButtonView, reveal: f64, area: Rect, buf: &mut Buffer) {
    if area.width == 0 || area.height == 0 {
        return;
    }

    let background = &view.background;
    let full_ring = arc_path(RADIUS, RADIUS, background.radius, 0.0, 360.0);
    let overlay_fill = blend(background.fill, view.overlay.circle.fill, reveal);
    let cell_width = RADIUS * 2.0 / area.width as f64;
    let step = dot_pitch(area);

    let (text, text_color) = if reveal > 0.0 {
        (CHECKMARK.to_string(), blend(overlay_fill, CHECKMARK_COLOR, reveal))
    } else {
        (view.label.clone(), view.text_color)
    };
    let text_x = RADIUS - text.width() as f64 * cell_width / 2.0;

    Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, RADIUS * 2.0])
        .y_bounds([0.0, RADIUS * 2.0])
        .paint(|ctx| {
            ctx.draw(&Disc {
                radius: background.radius,
                color: background.fill.into(),
                step,
            });
            ctx.draw(&StrokedArc {
                path: &full_ring,
                width: background.stroke_width,
                color: background.stroke.into(),
                step,
            });
            ctx.draw(&StrokedArc {
                path: &view.arc.path,
                width: background.stroke_width,
                color: view.arc.stroke.into(),
                step,
            });
            if reveal > 0.0 {
                ctx.draw(&Disc {
                    radius: background.radius - background.stroke_width / 2.0,
                    color: overlay_fill.into(),
                    step,
                });
            }
            ctx.layer();
            ctx.print(
                text_x,
                RADIUS,
                Span::styled(
                    text.clone(),
                    Style::default()
                        .fg(text_color.into())
                        .add_modifier(Modifier::BOLD),
                ),
            );
        })
        .render(area, buf);
}

/// The demo page as drawn at one instant.
pub struct PageScreen<'a> {
    pub page: &'a Page,
    pub now: Instant,
    pub fade: Duration,
}

impl Widget for PageScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let count = self.page.len();
        let areas = button_areas(area, count);

        for (button, button_area) in self.page.buttons().iter().zip(&areas) {
            if let Some(view) = button.render() {
                let reveal = view.overlay.reveal(self.now, self.fade);
                render_button(view, reveal, *button_area, buf);
            }
        }

        let footer = footer_height(count).min(area.height);
        let footer_area = Rect::new(area.x, area.y + area.height - footer, area.width, footer);

        let messages = self.page.messages();
        let mut lines = vec![Line::from(""); count.saturating_sub(messages.len())];
        lines.extend(messages.into_iter().map(|m| {
            Line::from(Span::styled(
                m,
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ))
        }));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            HELP_TEXT,
            Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
        )));

        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .render(footer_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::InputDevice;
    use crate::page::RawInput;
    use crate::widget::PresserAttrs;

    fn rendered(buffer: &Buffer) -> String {
        buffer
            .content()
            .iter()
            .map(|c| c.symbol())
            .collect::<String>()
    }

    fn page(n: usize, duration_secs: f64) -> (Page, Instant) {
        let t0 = Instant::now();
        let attrs = PresserAttrs {
            duration_secs,
            ..PresserAttrs::default()
        };
        (Page::new(vec![attrs; n], Duration::from_millis(500), t0), t0)
    }

    #[test]
    fn buttons_are_centred_and_do_not_overlap() {
        let area = Rect::new(0, 0, 80, 24);
        let areas = button_areas(area, 3);
        assert_eq!(areas.len(), 3);

        for r in &areas {
            assert_eq!(r.width, r.height * 2);
            assert!(r.right() <= area.right());
            assert!(r.bottom() <= area.bottom() - footer_height(3));
        }
        for pair in areas.windows(2) {
            assert_eq!(pair[1].x, pair[0].right() + BUTTON_GAP);
        }
        let left = areas[0].x - area.x;
        let right = area.right() - areas[2].right();
        assert!(left.abs_diff(right) <= 1);
    }

    #[test]
    fn tiny_area_yields_empty_buttons() {
        let areas = button_areas(Rect::new(0, 0, 4, 3), 3);
        assert!(areas.iter().all(|r| r.width == 0 && r.height == 0));
        assert_eq!(hit_test(Rect::new(0, 0, 4, 3), 3, 1, 1), None);
        assert!(button_areas(Rect::new(0, 0, 80, 24), 0).is_empty());
    }

    #[test]
    fn huge_counts_lay_out_without_panicking() {
        let area = Rect::new(0, 0, 80, 24);
        for count in [300, 40_000, usize::from(u16::MAX), 65_536, 100_000] {
            let areas = button_areas(area, count);
            assert_eq!(areas.len(), count);
            assert!(areas.iter().all(|r| r.width == 0 && r.height == 0));
            assert_eq!(hit_test(area, count, 40, 12), None);
        }
        assert_eq!(footer_height(100_000), u16::MAX);
    }

    #[test]
    fn crowded_page_renders() {
        let (p, t0) = page(300, 1.0);
        let area = Rect::new(0, 0, 80, 24);
        let mut buffer = Buffer::empty(area);
        PageScreen {
            page: &p,
            now: t0,
            fade: Duration::ZERO,
        }
        .render(area, &mut buffer);
        assert_eq!(*buffer.area(), area);
    }

    #[test]
    fn tall_buttons_fill_without_gaps() {
        let (p, t0) = page(1, 1.0);
        let area = Rect::new(0, 0, 200, 80);
        let mut buffer = Buffer::empty(area);
        PageScreen {
            page: &p,
            now: t0,
            fade: Duration::ZERO,
        }
        .render(area, &mut buffer);

        let b = button_areas(area, 1)[0];
        assert!(b.height > 25);
        // every dot of a cell inside the disc is lit
        for dx in [0, 5, 10] {
            let cell = &buffer[(b.x + b.width / 2 + dx, b.y + b.height / 4)];
            assert_eq!(cell.symbol(), "\u{28FF}");
        }
    }

    #[test]
    fn dot_pitch_follows_the_area() {
        assert!((dot_pitch(Rect::new(0, 0, 40, 20)) - 100.0 / 80.0).abs() < 1e-9);
        assert!((dot_pitch(Rect::new(0, 0, 154, 77)) - 100.0 / 308.0).abs() < 1e-9);
        assert!(dot_pitch(Rect::default()).is_finite());
    }

    #[test]
    fn hit_test_uses_the_circle() {
        let area = Rect::new(0, 0, 80, 24);
        let areas = button_areas(area, 3);
        let b = areas[1];
        let center = (b.x + b.width / 2, b.y + b.height / 2);
        assert_eq!(hit_test(area, 3, center.0, center.1), Some(1));
        // corners of the square lie outside the circle
        assert_eq!(hit_test(area, 3, b.x, b.y), None);
        assert_eq!(hit_test(area, 3, 0, 23), None);
    }

    #[test]
    fn blend_interpolates_channels() {
        let a = Rgb::new(0, 100, 200);
        let b = Rgb::new(200, 100, 0);
        assert_eq!(blend(a, b, 0.0), a);
        assert_eq!(blend(a, b, 1.0), b);
        assert_eq!(blend(a, b, 0.5), Rgb::new(100, 100, 100));
        assert_eq!(blend(a, b, 7.0), b);
    }

    #[test]
    fn idle_page_shows_labels_and_help() {
        let (p, t0) = page(3, 1.0);
        let area = Rect::new(0, 0, 100, 30);
        let mut buffer = Buffer::empty(area);

        PageScreen {
            page: &p,
            now: t0,
            fade: Duration::ZERO,
        }
        .render(area, &mut buffer);

        let text = rendered(&buffer);
        assert!(text.contains("Press Me"));
        assert!(text.contains("(q)uit"));
        assert!(!text.contains(CHECKMARK));
    }

    #[test]
    fn finished_button_shows_checkmark_and_message() {
        let (mut p, t0) = page(3, 0.2);
        p.dispatch(RawInput::down(InputDevice::Pointer, Some(0)), t0);
        p.tick(t0 + Duration::from_millis(200));

        let area = Rect::new(0, 0, 100, 30);
        let mut buffer = Buffer::empty(area);
        PageScreen {
            page: &p,
            now: t0 + Duration::from_secs(1),
            fade: Duration::from_millis(250),
        }
        .render(area, &mut buffer);

        let text = rendered(&buffer);
        assert!(text.contains(CHECKMARK));
        assert!(text.contains("Button 1 pressed at"));
    }

    #[test]
    fn small_area_does_not_panic() {
        let (p, t0) = page(3, 1.0);
        let area = Rect::new(0, 0, 10, 3);
        let mut buffer = Buffer::empty(area);
        PageScreen {
            page: &p,
            now: t0,
            fade: Duration::ZERO,
        }
        .render(area, &mut buffer);
        assert_eq!(*buffer.area(), area);
    }
}
