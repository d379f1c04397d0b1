//! Raw platform input and the host seam the normalizer subscribes through.

use kurbo::{Point, Rect};

use crate::event::ContactKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EventTarget {
    Element,
    /// The document root, used to keep tracking while a button is held outside the element.
    Document,
}

impl EventTarget {
    pub fn as_str(self) -> &'static str {
        match self {
            EventTarget::Element => "element",
            EventTarget::Document => "document",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RawEventType {
    MouseDown,
    MouseMove,
    MouseUp,
    TouchStart,
    TouchMove,
    TouchEnd,
    TouchCancel,
    PointerDown,
    PointerMove,
    PointerUp,
    PointerCancel,
    PointerOut,
    PointerOver,
    Wheel,
}

impl RawEventType {
    pub const ALL: [RawEventType; 14] = [
        RawEventType::MouseDown,
        RawEventType::MouseMove,
        RawEventType::MouseUp,
        RawEventType::TouchStart,
        RawEventType::TouchMove,
        RawEventType::TouchEnd,
        RawEventType::TouchCancel,
        RawEventType::PointerDown,
        RawEventType::PointerMove,
        RawEventType::PointerUp,
        RawEventType::PointerCancel,
        RawEventType::PointerOut,
        RawEventType::PointerOver,
        RawEventType::Wheel,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RawEventType::MouseDown => "mousedown",
            RawEventType::MouseMove => "mousemove",
            RawEventType::MouseUp => "mouseup",
            RawEventType::TouchStart => "touchstart",
            RawEventType::TouchMove => "touchmove",
            RawEventType::TouchEnd => "touchend",
            RawEventType::TouchCancel => "touchcancel",
            RawEventType::PointerDown => "pointerdown",
            RawEventType::PointerMove => "pointermove",
            RawEventType::PointerUp => "pointerup",
            RawEventType::PointerCancel => "pointercancel",
            RawEventType::PointerOut => "pointerout",
            RawEventType::PointerOver => "pointerover",
            RawEventType::Wheel => "wheel",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MousePhase {
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    Cancel,
    Out,
    Over,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TouchLists {
    pub touches: Vec<Point>,
    pub changed: Vec<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub id: i32,
    pub kind: ContactKind,
    pub client: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    Mouse(MousePhase, Point),
    Touch(TouchPhase, TouchLists),
    Pointer(PointerPhase, PointerSample),
    Wheel { client: Point, delta_y: f64 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    pub time_ms: u64,
    pub input: RawInput,
}

impl RawEvent {
    pub fn mouse(phase: MousePhase, client: Point, time_ms: u64) -> Self {
        Self {
            time_ms,
            input: RawInput::Mouse(phase, client),
        }
    }

    pub fn touch(phase: TouchPhase, touches: Vec<Point>, changed: Vec<Point>, time_ms: u64) -> Self {
        Self {
            time_ms,
            input: RawInput::Touch(phase, TouchLists { touches, changed }),
        }
    }

    pub fn pointer(phase: PointerPhase, id: i32, kind: ContactKind, client: Point, time_ms: u64) -> Self {
        Self {
            time_ms,
            input: RawInput::Pointer(phase, PointerSample { id, kind, client }),
        }
    }

    pub fn wheel(client: Point, delta_y: f64, time_ms: u64) -> Self {
        Self {
            time_ms,
            input: RawInput::Wheel { client, delta_y },
        }
    }

    pub fn event_type(&self) -> RawEventType {
        match &self.input {
            RawInput::Mouse(MousePhase::Down, _) => RawEventType::MouseDown,
            RawInput::Mouse(MousePhase::Move, _) => RawEventType::MouseMove,
            RawInput::Mouse(MousePhase::Up, _) => RawEventType::MouseUp,
            RawInput::Touch(TouchPhase::Start, _) => RawEventType::TouchStart,
            RawInput::Touch(TouchPhase::Move, _) => RawEventType::TouchMove,
            RawInput::Touch(TouchPhase::End, _) => RawEventType::TouchEnd,
            RawInput::Touch(TouchPhase::Cancel, _) => RawEventType::TouchCancel,
            RawInput::Pointer(PointerPhase::Down, _) => RawEventType::PointerDown,
            RawInput::Pointer(PointerPhase::Move, _) => RawEventType::PointerMove,
            RawInput::Pointer(PointerPhase::Up, _) => RawEventType::PointerUp,
            RawInput::Pointer(PointerPhase::Cancel, _) => RawEventType::PointerCancel,
            RawInput::Pointer(PointerPhase::Out, _) => RawEventType::PointerOut,
            RawInput::Pointer(PointerPhase::Over, _) => RawEventType::PointerOver,
            RawInput::Wheel { .. } => RawEventType::Wheel,
        }
    }
}

/// Whether the host should run the platform's default action for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    #[default]
    Default,
    PreventDefault,
}

impl Disposition {
    pub fn prevents_default(self) -> bool {
        self == Disposition::PreventDefault
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub pointer_events: bool,
}

impl Capabilities {
    pub fn pointer() -> Self {
        Self {
            pointer_events: true,
        }
    }

    pub fn mouse_and_touch() -> Self {
        Self {
            pointer_events: false,
        }
    }
}

/// The platform element the normalizer is bound to.
///
/// `listen`/`unlisten` are only ever called for pairs that are respectively
/// inactive/active; the normalizer keeps that ledger.
pub trait Host {
    fn capabilities(&self) -> Capabilities;
    fn listen(&mut self, target: EventTarget, ty: RawEventType);
    fn unlisten(&mut self, target: EventTarget, ty: RawEventType);
    fn element_bounds(&self) -> Rect;
    /// Stops the platform from scrolling or zooming natively on touch.
    fn disable_native_touch_actions(&mut self);
}
