use std::time::{Duration, Instant};

use tracing::debug;

/// How long after a release a press from the other device stays locked out.
/// Browsers and some terminals replay a touch as mouse events shortly after
/// the touch ends.
pub const DEFAULT_DEVICE_SWITCH_GRACE: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
pub enum InputDevice {
    #[default]
    None,
    Pointer,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    /// mousedown / touchstart
    Down,
    /// mouseup / touchend
    Up,
}

/// What a widget should do with an admitted input edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressCommand {
    Start,
    End,
}

/// Keeps one gesture from being read as both touch and mouse.
///
/// Owned by whatever hosts a group of widgets; the latch is shared by the
/// whole group since only one of them is pressed at a time. With a zero
/// grace the latch moves to another device as soon as nothing is held.
#[derive(Debug, Clone)]
pub struct InputArbiter {
    device: InputDevice,
    holding: bool,
    released_at: Option<Instant>,
    grace: Duration,
}

impl InputArbiter {
    pub fn new(grace: Duration) -> Self {
        Self {
            device: InputDevice::None,
            holding: false,
            released_at: None,
            grace,
        }
    }

    pub fn device(&self) -> InputDevice {
        self.device
    }

    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Decide whether a raw edge from `device` reaches the widget.
    pub fn admit(&mut self, device: InputDevice, edge: Edge, now: Instant) -> Option<PressCommand> {
        if device == InputDevice::None {
            return None;
        }

        match edge {
            Edge::Down => {
                if self.device != InputDevice::None && self.device != device {
                    if self.holding || self.within_grace(now) {
                        debug!(latched = %self.device, ignored = %device, "press from other device ignored");
                        return None;
                    }
                    debug!(from = %self.device, to = %device, "input device switched");
                }
                self.device = device;
                if self.holding {
                    return None;
                }
                self.holding = true;
                Some(PressCommand::Start)
            }
            Edge::Up => {
                if self.device != device || !self.holding {
                    return None;
                }
                self.holding = false;
                self.released_at = Some(now);
                Some(PressCommand::End)
            }
        }
    }

    fn within_grace(&self, now: Instant) -> bool {
        self.released_at
            .is_some_and(|at| now.saturating_duration_since(at) < self.grace)
    }
}

impl Default for InputArbiter {
    fn default() -> Self {
        Self::new(DEFAULT_DEVICE_SWITCH_GRACE)
    }
}
