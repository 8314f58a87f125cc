use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::arc::draw_arc;
use crate::input::PressCommand;
use crate::press::{PressSession, PressState, TickOutcome};
use crate::view::{ButtonView, Cursor, Rgb, RADIUS, STROKE_WIDTH};

/// Construction parameters for one button.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresserAttrs {
    /// Seconds the press must be held. Non-positive values use the default.
    pub duration_secs: f64,
    pub fg_stroke_color: Rgb,
    pub bg_stroke_color: Rgb,
    pub bg_fill_color: Rgb,
    pub text_color: Rgb,
    pub label: String,
}

impl Default for PresserAttrs {
    fn default() -> Self {
        Self {
            duration_secs: 0.75,
            fg_stroke_color: Rgb::new(0xFF, 0, 0),
            bg_stroke_color: Rgb::new(0xAA, 0, 0),
            bg_fill_color: Rgb::new(0x88, 0, 0),
            text_color: Rgb::new(0xFF, 0xFF, 0xFF),
            label: "Press Me".to_string(),
        }
    }
}

/// The one component interface hosts drive.
pub trait Component {
    /// Mount the visual description. Ticks before this, or after
    /// `unmount`, do nothing.
    fn initialize(&mut self, now: Instant);
    fn handle_input(&mut self, command: PressCommand, now: Instant);
    fn tick(&mut self, now: Instant) -> TickOutcome;
    fn render(&self) -> Option<&ButtonView>;
    /// Return a finished button to idle.
    fn reset(&mut self);
}

type PressedCallback = Box<dyn FnMut() + Send>;

/// A circular button that confirms after being held.
pub struct LongPresser {
    attrs: PresserAttrs,
    session: PressSession,
    view: Option<ButtonView>,
    on_pressed: Option<PressedCallback>,
}

impl fmt::Debug for LongPresser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LongPresser")
            .field("attrs", &self.attrs)
            .field("session", &self.session)
            .field("mounted", &self.view.is_some())
            .finish()
    }
}

impl LongPresser {
    pub fn new(attrs: PresserAttrs, now: Instant) -> Self {
        let session = PressSession::from_secs_f64(attrs.duration_secs, now);
        Self {
            attrs,
            session,
            view: None,
            on_pressed: None,
        }
    }

    /// Called once each time a press completes.
    pub fn on_pressed(mut self, callback: impl FnMut() + Send + 'static) -> Self {
        self.on_pressed = Some(Box::new(callback));
        self
    }

    pub fn attrs(&self) -> &PresserAttrs {
        &self.attrs
    }

    pub fn session(&self) -> &PressSession {
        &self.session
    }

    pub fn state(&self) -> PressState {
        self.session.state()
    }

    pub fn is_animating(&self) -> bool {
        self.view.is_some() && self.session.is_animating()
    }

    pub fn is_mounted(&self) -> bool {
        self.view.is_some()
    }

    /// Tear down the visual description. Later ticks are ignored.
    pub fn unmount(&mut self) {
        self.view = None;
    }

    fn finish(&mut self, now: Instant) {
        if let Some(view) = self.view.as_mut() {
            draw_arc(&mut view.arc, 0.0, RADIUS, STROKE_WIDTH);
            view.cursor = Cursor::Default;
            view.background.stroke = self.attrs.fg_stroke_color;
            view.overlay.fade_in(now);
        }
        info!(label = %self.attrs.label, "long press confirmed");
        if let Some(callback) = self.on_pressed.as_mut() {
            callback();
        }
    }
}

impl Component for LongPresser {
    fn initialize(&mut self, _now: Instant) {
        if self.view.is_none() {
            self.view = Some(ButtonView::new(&self.attrs));
        }
    }

    fn handle_input(&mut self, command: PressCommand, now: Instant) {
        if self.view.is_none() {
            debug!(?command, "input for unmounted button ignored");
            return;
        }
        match command {
            PressCommand::Start => {
                self.session.start_press(now);
            }
            PressCommand::End => {
                self.session.end_press();
            }
        }
    }

    fn tick(&mut self, now: Instant) -> TickOutcome {
        let Some(view) = self.view.as_mut() else {
            return TickOutcome::Idle;
        };

        let outcome = self.session.tick(now);
        match outcome {
            TickOutcome::Continue | TickOutcome::Settled => {
                draw_arc(&mut view.arc, self.session.fraction(), RADIUS, STROKE_WIDTH);
            }
            TickOutcome::Finished => self.finish(now),
            TickOutcome::Idle => {}
        }
        outcome
    }

    fn render(&self) -> Option<&ButtonView> {
        self.view.as_ref()
    }

    fn reset(&mut self) {
        self.session.reset();
        if let Some(view) = self.view.as_mut() {
            view.background.stroke = self.attrs.bg_stroke_color;
            view.cursor = Cursor::Pointer;
            draw_arc(&mut view.arc, 0.0, RADIUS, STROKE_WIDTH);
            view.overlay.hide();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn mounted(duration_secs: f64) -> (LongPresser, Arc<AtomicUsize>, Instant) {
        let t0 = Instant::now();
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let attrs = PresserAttrs {
            duration_secs,
            ..PresserAttrs::default()
        };
        let mut w = LongPresser::new(attrs, t0).on_pressed(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        w.initialize(t0);
        (w, count, t0)
    }

    #[test]
    fn completion_notifies_exactly_once() {
        let (mut w, count, t0) = mounted(1.0);
        w.handle_input(PressCommand::Start, t0);
        for i in 1..=5 {
            w.tick(t0 + ms(250 * i));
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(w.state(), PressState::Finished);
        assert_eq!(w.session().progress(), ms(1000));
    }

    #[test]
    fn finish_applies_flourish() {
        let (mut w, _, t0) = mounted(0.5);
        w.handle_input(PressCommand::Start, t0);
        assert_eq!(w.tick(t0 + ms(500)), TickOutcome::Finished);

        let view = w.render().unwrap();
        assert!(view.arc.path.is_empty());
        assert_eq!(view.background.stroke, w.attrs().fg_stroke_color);
        assert_eq!(view.overlay.opacity, 1.0);
        assert_eq!(view.overlay.revealed_at, Some(t0 + ms(500)));
        assert_eq!(view.cursor, Cursor::Default);
    }

    #[test]
    fn ticks_draw_the_eased_arc() {
        let (mut w, _, t0) = mounted(1.0);
        w.handle_input(PressCommand::Start, t0);
        w.tick(t0 + ms(500));

        let sweep = w.render().unwrap().arc.path.sweep_deg();
        let expected = 360.0 * crate::arc::ease_progress(0.5);
        assert!((sweep - expected).abs() < 1e-9);
    }

    #[test]
    fn release_winds_arc_back_without_notifying() {
        let (mut w, count, t0) = mounted(1.0);
        w.handle_input(PressCommand::Start, t0);
        w.tick(t0 + ms(400));
        w.handle_input(PressCommand::End, t0 + ms(400));
        let outcomes: Vec<_> = (1..=4).map(|i| w.tick(t0 + ms(400 + 100 * i))).collect();

        assert_eq!(outcomes.last(), Some(&TickOutcome::Settled));
        assert_eq!(w.state(), PressState::Idle);
        assert!(w.render().unwrap().arc.path.is_empty());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn reset_restores_idle_view() {
        let (mut w, _, t0) = mounted(0.1);
        w.handle_input(PressCommand::Start, t0);
        w.tick(t0 + ms(100));
        w.reset();

        let fresh = ButtonView::new(w.attrs());
        assert_eq!(w.render(), Some(&fresh));
        assert_eq!(w.state(), PressState::Idle);
    }

    #[test]
    fn reset_on_idle_leaves_view_unchanged() {
        let (mut w, _, _) = mounted(1.0);
        let before = w.render().cloned();
        w.reset();
        assert_eq!(w.render().cloned(), before);
    }

    #[test]
    fn unmounted_widget_ignores_ticks() {
        let (mut w, count, t0) = mounted(0.1);
        w.handle_input(PressCommand::Start, t0);
        w.unmount();

        assert_eq!(w.tick(t0 + ms(500)), TickOutcome::Idle);
        assert!(!w.is_animating());
        assert!(w.render().is_none());
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn input_before_mount_is_ignored() {
        let t0 = Instant::now();
        let mut w = LongPresser::new(PresserAttrs::default(), t0);
        w.handle_input(PressCommand::Start, t0);
        assert_eq!(w.state(), PressState::Idle);
    }

    #[test]
    fn bad_duration_is_normalised() {
        let (w, _, _) = mounted(-3.0);
        assert_eq!(w.session().duration(), crate::press::DEFAULT_DURATION);
    }

    #[test]
    fn attrs_deserialize_with_defaults() {
        let attrs: PresserAttrs =
            serde_json::from_str(r##"{"label": "Hold", "fg_stroke_color": "#0F0"}"##).unwrap();
        assert_eq!(attrs.label, "Hold");
        assert_eq!(attrs.fg_stroke_color, Rgb::new(0, 255, 0));
        assert_eq!(attrs.duration_secs, 0.75);
    }
}
