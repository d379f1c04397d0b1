//! Gesture interpreter: classifies canonical events and drives the view.
//!
//! Recognition works off the rolling [`KindHistory`](crate::session::KindHistory):
//!
//! - `start end start end` is a double tap: zoom in one step at the tap.
//! - `start end start move` from a touch contact begins a one-touch zoom:
//!   vertical motion scales around the spot the finger landed.
//! - `wheel` always zooms around the cursor.
//! - Other moves pinch when the contact separation changed since the gesture
//!   began, continue an active one-touch zoom, or else pan.
//!
//! `start` and `end` events that are not consumed above snapshot the view
//! state; moves are measured against that snapshot.

use log::{debug, trace};
use serde::Serialize;

use crate::config::Profile;
use crate::event::{CanonicalEvent, ContactKind, EventKind};
use crate::normalizer::InputNormalizer;
use crate::platform::{Capabilities, Disposition, EventTarget, Host, RawEvent};
use crate::session::{
    DOUBLE_TAP, GestureSession, OneTouchZoom, Reference, TAP_THEN_DRAG, TAP_THEN_START,
};
use crate::view::{View, ViewStatePatch};
use crate::zoom::{ScaleLimits, scale_about};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Gesture {
    Drag,
    Pinch,
    DoubleTap,
    OneTouchZoom,
    WheelZoom,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Handled {
    pub disposition: Disposition,
    pub event: Option<CanonicalEvent>,
    pub gesture: Option<Gesture>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Steps {
    double_tap: f64,
    wheel: f64,
    one_touch_zoom: f64,
}

#[derive(Debug)]
struct Recognizer<V: View> {
    view: V,
    session: GestureSession,
    steps: Steps,
    limits: ScaleLimits,
}

impl<V: View> Recognizer<V> {
    fn new(view: V, profile: &Profile) -> Self {
        let g = &profile.gestures;
        Self {
            view,
            session: GestureSession::new(g.history_window_ms, g.history_depth),
            steps: Steps {
                double_tap: g.double_tap_step,
                wheel: g.wheel_step,
                one_touch_zoom: g.one_touch_zoom_step,
            },
            limits: profile.zoom.scale_limits(),
        }
    }

    fn process(&mut self, event: CanonicalEvent) -> Option<Gesture> {
        self.session.record(&event);
        trace!("history: {}", self.session.history.describe());

        if self.session.history.contains(&TAP_THEN_START) {
            if self.session.history.contains(&DOUBLE_TAP) {
                self.session.reset_history();
                self.double_tap(&event);
                return Some(Gesture::DoubleTap);
            }

            if self.session.one_touch_zoom.is_none()
                && event.contact == Some(ContactKind::Touch)
                && self.session.history.contains(&TAP_THEN_DRAG)
            {
                self.session.reset_history();
                self.session.one_touch_zoom = Some(OneTouchZoom {
                    anchor: event.target,
                    last: event,
                });
                debug!("one-touch zoom anchored at ({:.1}, {:.1})", event.target.x, event.target.y);
                self.one_touch_zoom(&event);
                return Some(Gesture::OneTouchZoom);
            }
        }

        if event.kind == EventKind::End && self.session.one_touch_zoom.take().is_some() {
            debug!("one-touch zoom finished");
        }

        match event.kind {
            EventKind::Wheel => {
                self.wheel(&event);
                Some(Gesture::WheelZoom)
            }
            EventKind::Move => self.classify_move(&event),
            EventKind::Start | EventKind::End => {
                self.session.reference = Some(Reference {
                    state: self.view.state(),
                    event,
                });
                None
            }
        }
    }

    fn classify_move(&mut self, event: &CanonicalEvent) -> Option<Gesture> {
        let reference = self.session.reference;

        if let Some(r) = reference {
            if event.distance > 1.0 && event.distance != r.event.distance {
                self.pinch(&r, event);
                return Some(Gesture::Pinch);
            }
        }
        if self.session.one_touch_zoom.is_some() {
            self.one_touch_zoom(event);
            return Some(Gesture::OneTouchZoom);
        }
        match reference {
            Some(r) => {
                self.drag(&r, event);
                Some(Gesture::Drag)
            }
            None => {
                debug!("move without a gesture start; ignoring");
                None
            }
        }
    }

    fn drag(&mut self, r: &Reference, event: &CanonicalEvent) {
        let delta = event.target - r.event.target;
        self.view.set_state(ViewStatePatch::position(
            r.state.position_x + delta.x,
            r.state.position_y + delta.y,
        ));
    }

    fn pinch(&mut self, r: &Reference, event: &CanonicalEvent) {
        let requested = r.state.scale * (event.distance / r.event.distance);
        self.scale(event.target, requested);
    }

    fn double_tap(&mut self, event: &CanonicalEvent) {
        let requested = self.view.state().scale + self.steps.double_tap;
        debug!("double tap at ({:.1}, {:.1})", event.target.x, event.target.y);
        self.scale(event.target, requested);
    }

    fn wheel(&mut self, event: &CanonicalEvent) {
        // raw platform delta, deliberately not normalized across devices
        let delta = event.wheel_delta.unwrap_or(0.0);
        let requested = self.view.state().scale - self.steps.wheel * delta;
        self.scale(event.target, requested);
    }

    fn one_touch_zoom(&mut self, event: &CanonicalEvent) {
        let Some(otz) = self.session.one_touch_zoom else {
            return;
        };
        let dy = otz.last.target.y - event.target.y;
        let requested = self.view.state().scale - self.steps.one_touch_zoom * dy;
        self.scale(otz.anchor, requested);
        self.session.one_touch_zoom = Some(OneTouchZoom {
            last: *event,
            ..otz
        });
    }

    fn scale(&mut self, pivot: kurbo::Point, requested: f64) {
        let current = self.view.state();
        let next = scale_about(current, self.view.image_size(), pivot, requested, self.limits);
        trace!("scale {:.4} -> {:.4}", current.scale, next.scale);
        self.view.set_state(ViewStatePatch::full(next));
    }
}

/// Pan/zoom controller for one [`View`].
///
/// Listening starts at construction; [`destroy`](Self::destroy) detaches.
pub struct GestureInterpreter<V: View> {
    normalizer: InputNormalizer<V::Element>,
    recognizer: Recognizer<V>,
    destroyed: bool,
}

impl<V: View + std::fmt::Debug> std::fmt::Debug for GestureInterpreter<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GestureInterpreter")
            .field("recognizer", &self.recognizer)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl<V: View> GestureInterpreter<V> {
    pub fn new(view: V) -> Self {
        let caps = view.element().capabilities();
        Self::with_profile(view, caps, &Profile::default())
    }

    pub fn with_profile(view: V, caps: Capabilities, profile: &Profile) -> Self {
        let normalizer = InputNormalizer::with_capabilities(view.element(), caps);
        Self {
            normalizer,
            recognizer: Recognizer::new(view, profile),
            destroyed: false,
        }
    }

    pub fn handle(&mut self, target: EventTarget, event: &RawEvent) -> Handled {
        let normalized = self.normalizer.handle(target, event);
        let gesture = match normalized.event {
            Some(ev) => self.process(ev),
            None => None,
        };
        Handled {
            disposition: normalized.disposition,
            event: normalized.event,
            gesture,
        }
    }

    pub fn process(&mut self, event: CanonicalEvent) -> Option<Gesture> {
        if self.destroyed {
            return None;
        }
        let gesture = self.recognizer.process(event);
        if let Some(g) = gesture {
            trace!("{} -> {:?}", event.kind.as_str(), g);
        }
        gesture
    }

    /// Lets a host-driven timer expire stale history.
    pub fn tick(&mut self, now_ms: u64) {
        if self.recognizer.session.expire(now_ms) {
            trace!("gesture history expired");
        }
    }

    pub fn session(&self) -> &GestureSession {
        &self.recognizer.session
    }

    pub fn view(&self) -> &V {
        &self.recognizer.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.recognizer.view
    }

    pub fn normalizer(&self) -> &InputNormalizer<V::Element> {
        &self.normalizer
    }

    /// Detaches all input and cancels the session timer. Safe to call twice.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.normalizer.destroy();
        self.recognizer.session.cancel();
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}
