use kurbo::Point;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Start,
    Move,
    End,
    Wheel,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Start => "start",
            EventKind::Move => "move",
            EventKind::End => "end",
            EventKind::Wheel => "wheel",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    Touch,
    Mouse,
    Pen,
}

impl ContactKind {
    pub fn from_pointer_type(s: &str) -> Option<Self> {
        match s {
            "touch" => Some(ContactKind::Touch),
            "mouse" => Some(ContactKind::Mouse),
            "pen" => Some(ContactKind::Pen),
            _ => None,
        }
    }
}

/// A device-agnostic primitive.
///
/// `target` is element-relative. For a single contact `distance` is `1.0` and
/// `target` is the contact point; for two contacts `target` is their midpoint
/// and `distance` their separation. `contact` is only set when the event
/// describes exactly one contact.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanonicalEvent {
    pub kind: EventKind,
    pub target: Point,
    pub distance: f64,
    pub contact: Option<ContactKind>,
    pub wheel_delta: Option<f64>,
    pub time_ms: u64,
}

impl CanonicalEvent {
    pub fn single(kind: EventKind, target: Point, contact: Option<ContactKind>, time_ms: u64) -> Self {
        Self {
            kind,
            target,
            distance: 1.0,
            contact,
            wheel_delta: None,
            time_ms,
        }
    }

    pub fn pair(kind: EventKind, target: Point, distance: f64, time_ms: u64) -> Self {
        Self {
            kind,
            target,
            distance,
            contact: None,
            wheel_delta: None,
            time_ms,
        }
    }

    pub fn wheel(target: Point, delta: f64, time_ms: u64) -> Self {
        Self {
            kind: EventKind::Wheel,
            target,
            distance: 1.0,
            contact: None,
            wheel_delta: Some(delta),
            time_ms,
        }
    }
}
