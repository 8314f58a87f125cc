use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use itertools::Itertools;
use tracing::{debug, info};

use crate::input::{Edge, InputArbiter, InputDevice, PressCommand};
use crate::widget::{Component, LongPresser, PresserAttrs};

/// A raw device edge, already hit-tested against the page's buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawInput {
    pub device: InputDevice,
    pub edge: Edge,
    /// Index of the button under the pointer, if any.
    pub target: Option<usize>,
}

impl RawInput {
    pub fn down(device: InputDevice, target: Option<usize>) -> Self {
        Self {
            device,
            edge: Edge::Down,
            target,
        }
    }

    pub fn up(device: InputDevice, target: Option<usize>) -> Self {
        Self {
            device,
            edge: Edge::Up,
            target,
        }
    }
}

/// A row of long-press buttons sharing one input arbiter.
#[derive(Debug)]
pub struct Page {
    buttons: Vec<LongPresser>,
    arbiter: InputArbiter,
    holder: Option<usize>,
    pressed_at: Vec<Option<DateTime<Local>>>,
    completions: Receiver<usize>,
}

impl Page {
    pub fn new(attrs: Vec<PresserAttrs>, grace: Duration, now: Instant) -> Self {
        let (tx, rx) = mpsc::channel();
        let buttons = attrs
            .into_iter()
            .enumerate()
            .map(|(idx, attrs)| {
                let tx = tx.clone();
                let mut button = LongPresser::new(attrs, now).on_pressed(move || {
                    let _ = tx.send(idx);
                });
                button.initialize(now);
                button
            })
            .collect::<Vec<_>>();

        Self {
            pressed_at: vec![None; buttons.len()],
            buttons,
            arbiter: InputArbiter::new(grace),
            holder: None,
            completions: rx,
        }
    }

    pub fn buttons(&self) -> &[LongPresser] {
        &self.buttons
    }

    pub fn len(&self) -> usize {
        self.buttons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buttons.is_empty()
    }

    pub fn arbiter(&self) -> &InputArbiter {
        &self.arbiter
    }

    pub fn pressed_at(&self, idx: usize) -> Option<DateTime<Local>> {
        self.pressed_at.get(idx).copied().flatten()
    }

    /// Route a raw input edge. Returns true if a button received a command.
    ///
    /// A press needs a button under the pointer; a release goes to whichever
    /// button is held, wherever the pointer is.
    pub fn dispatch(&mut self, input: RawInput, now: Instant) -> bool {
        let target = match input.edge {
            Edge::Down => match input.target.filter(|&idx| idx < self.buttons.len()) {
                Some(idx) => idx,
                None => return false,
            },
            Edge::Up => match self.holder {
                Some(idx) => idx,
                None => return false,
            },
        };

        let Some(command) = self.arbiter.admit(input.device, input.edge, now) else {
            return false;
        };

        debug!(button = target, ?command, device = %input.device, "input dispatched");
        self.holder = match command {
            PressCommand::Start => Some(target),
            PressCommand::End => None,
        };
        self.buttons[target].handle_input(command, now);
        true
    }

    pub fn is_animating(&self) -> bool {
        self.buttons.iter().any(LongPresser::is_animating)
    }

    /// Advance every animating button one frame. Returns true while any
    /// button still needs frames.
    pub fn tick(&mut self, now: Instant) -> bool {
        let mut running = false;
        for button in self.buttons.iter_mut().filter(|b| b.is_animating()) {
            running |= button.tick(now).keeps_running();
        }

        while let Ok(idx) = self.completions.try_recv() {
            if let Some(slot) = self.pressed_at.get_mut(idx) {
                *slot = Some(Local::now());
            }
        }
        running
    }

    /// Return every finished button to idle. Returns how many were reset.
    pub fn reset_finished(&mut self) -> usize {
        let finished = self
            .buttons
            .iter()
            .positions(|b| b.session().is_finished())
            .collect::<Vec<_>>();

        for &idx in &finished {
            self.buttons[idx].reset();
            self.pressed_at[idx] = None;
        }
        if !finished.is_empty() {
            info!(count = finished.len(), "finished buttons reset");
        }
        finished.len()
    }

    /// One line per completed button, in button order.
    pub fn messages(&self) -> Vec<String> {
        self.pressed_at
            .iter()
            .enumerate()
            .filter_map(|(idx, at)| {
                at.map(|at| format!("Button {} pressed at {}!", idx + 1, at.format("%H:%M:%S")))
            })
            .collect()
    }
}
