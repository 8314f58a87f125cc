use std::fmt;

/// Exponent of the easing curve applied to press progress.
pub const EASE_EXPONENT: f64 = 2.25;

/// A full turn has coincident endpoints, which a path renderer draws as nothing.
const FULL_TURN_DEG: f64 = 360.0;
const NEAR_FULL_TURN_DEG: f64 = 359.99;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Convert a polar coordinate measured clockwise from 12 o'clock into
/// screen coordinates (y grows downward). Degrees are not normalised.
pub fn polar_to_cartesian(center_x: f64, center_y: f64, radius: f64, degrees: f64) -> Point {
    let r = (degrees - 90.0).to_radians();
    Point {
        x: center_x + radius * r.cos(),
        y: center_y + radius * r.sin(),
    }
}

/// A circular arc sweeping clockwise from `start_deg` to `end_deg`.
///
/// Displays as an SVG path description. The path moves to the end point
/// and draws back to the start point with the sweep flag unset, which
/// traces the same clockwise arc.
#[derive(Debug, Clone, PartialEq)]
pub struct ArcPath {
    center: Point,
    radius: f64,
    start_deg: f64,
    end_deg: f64,
    start: Point,
    end: Point,
    large_arc: bool,
}

impl ArcPath {
    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn center(&self) -> Point {
        self.center
    }

    pub fn large_arc(&self) -> bool {
        self.large_arc
    }

    pub fn start_deg(&self) -> f64 {
        self.start_deg
    }

    pub fn end_deg(&self) -> f64 {
        self.end_deg
    }

    pub fn sweep_deg(&self) -> f64 {
        self.end_deg - self.start_deg
    }

    /// True when the arc has no visible length.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Sample points along the arc, at most `step_deg` apart, start and end
    /// included. Hosts without a native arc primitive plot these.
    pub fn points(&self, step_deg: f64) -> Vec<Point> {
        let sweep = self.sweep_deg();
        if self.is_empty() || sweep <= 0.0 || step_deg <= 0.0 {
            return vec![self.start];
        }

        let steps = (sweep / step_deg).ceil().max(1.0) as usize;
        (0..=steps)
            .map(|i| {
                let deg = self.start_deg + sweep * (i as f64 / steps as f64);
                polar_to_cartesian(self.center.x, self.center.y, self.radius, deg)
            })
            .collect()
    }
}

impl fmt::Display for ArcPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "M {} {} A {} {} 0 {} 0 {} {}",
            self.end.x,
            self.end.y,
            self.radius,
            self.radius,
            if self.large_arc { 1 } else { 0 },
            self.start.x,
            self.start.y
        )
    }
}

/// Build the path for an arc centred at (`center_x`, `center_y`) sweeping
/// clockwise from `start_deg` to `end_deg`.
///
/// The large-arc flag is set when the sweep exceeds 180 degrees. Equal
/// angles give a zero-length arc.
pub fn arc_path(
    center_x: f64,
    center_y: f64,
    radius: f64,
    start_deg: f64,
    end_deg: f64,
) -> ArcPath {
    let end_deg = if end_deg - start_deg >= FULL_TURN_DEG {
        start_deg + NEAR_FULL_TURN_DEG
    } else {
        end_deg
    };

    ArcPath {
        center: Point::new(center_x, center_y),
        radius,
        start_deg,
        end_deg,
        start: polar_to_cartesian(center_x, center_y, radius, start_deg),
        end: polar_to_cartesian(center_x, center_y, radius, end_deg),
        large_arc: end_deg - start_deg > 180.0,
    }
}

/// Non-linear arc motion: slow at first, fast near completion.
pub fn ease_progress(fraction: f64) -> f64 {
    fraction.powf(EASE_EXPONENT)
}

/// Something holding a path attribute the arc can be written into.
pub trait PathTarget {
    fn set_path(&mut self, path: ArcPath);
}

/// Draw `fraction` (already clamped to `[0, 1]`) of the progress ring into
/// `target`, inset so the stroke stays inside a `radius * 2` square.
pub fn draw_arc<T: PathTarget + ?Sized>(
    target: &mut T,
    fraction: f64,
    radius: f64,
    stroke_width: f64,
) {
    target.set_path(arc_path(
        radius,
        radius,
        radius - stroke_width / 2.0,
        0.0,
        FULL_TURN_DEG * ease_progress(fraction),
    ));
}
