//! Short-term gesture memory: recent primitive kinds, the inactivity timer,
//! and the reference snapshot moves are measured against.

use std::collections::VecDeque;

use kurbo::Point;

use crate::event::{CanonicalEvent, EventKind};
use crate::view::ViewState;

use crate::event::EventKind::{End, Move, Start};

pub const TAP_THEN_START: [EventKind; 3] = [Start, End, Start];
pub const DOUBLE_TAP: [EventKind; 4] = [Start, End, Start, End];
pub const TAP_THEN_DRAG: [EventKind; 4] = [Start, End, Start, Move];

#[derive(Debug, Clone)]
pub struct KindHistory {
    kinds: VecDeque<EventKind>,
    depth: usize,
}

impl KindHistory {
    pub fn new(depth: usize) -> Self {
        Self {
            kinds: VecDeque::with_capacity(depth),
            depth,
        }
    }

    pub fn push(&mut self, kind: EventKind) {
        if self.kinds.len() == self.depth {
            self.kinds.pop_front();
        }
        self.kinds.push_back(kind);
    }

    /// True if `pattern` occurs as a contiguous run anywhere in the window.
    pub fn contains(&self, pattern: &[EventKind]) -> bool {
        if pattern.is_empty() {
            return true;
        }
        if pattern.len() > self.kinds.len() {
            return false;
        }
        (0..=self.kinds.len() - pattern.len())
            .any(|start| pattern.iter().enumerate().all(|(i, k)| self.kinds[start + i] == *k))
    }

    pub fn clear(&mut self) {
        self.kinds.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn describe(&self) -> String {
        self.kinds
            .iter()
            .map(|k| k.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Single rearming timer that expires the history after inactivity.
#[derive(Debug, Clone, Default)]
pub struct SessionTimer {
    deadline_ms: Option<u64>,
}

impl SessionTimer {
    pub fn rearm(&mut self, now_ms: u64, window_ms: u64) {
        self.deadline_ms = Some(now_ms.saturating_add(window_ms));
    }

    pub fn cancel(&mut self) {
        self.deadline_ms = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline_ms.is_some()
    }

    /// Fires (and disarms) if the deadline has been reached.
    pub fn fire_if_due(&mut self, now_ms: u64) -> bool {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reference {
    pub state: ViewState,
    pub event: CanonicalEvent,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OneTouchZoom {
    /// Where the finger first landed; the zoom pivot for the whole session.
    pub anchor: Point,
    /// Previous step, vertical deltas are measured from here.
    pub last: CanonicalEvent,
}

#[derive(Debug, Clone)]
pub struct GestureSession {
    pub history: KindHistory,
    pub timer: SessionTimer,
    pub reference: Option<Reference>,
    pub one_touch_zoom: Option<OneTouchZoom>,
    window_ms: u64,
}

impl GestureSession {
    pub fn new(window_ms: u64, depth: usize) -> Self {
        Self {
            history: KindHistory::new(depth),
            timer: SessionTimer::default(),
            reference: None,
            one_touch_zoom: None,
            window_ms,
        }
    }

    pub fn record(&mut self, event: &CanonicalEvent) {
        self.expire(event.time_ms);
        self.history.push(event.kind);
        self.timer.rearm(event.time_ms, self.window_ms);
    }

    pub fn expire(&mut self, now_ms: u64) -> bool {
        if self.timer.fire_if_due(now_ms) {
            self.history.clear();
            return true;
        }
        false
    }

    pub fn reset_history(&mut self) {
        self.history.clear();
    }

    pub fn cancel(&mut self) {
        self.timer.cancel();
        self.history.clear();
        self.reference = None;
        self.one_touch_zoom = None;
    }
}
