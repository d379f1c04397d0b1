//! Scripted host and view, and a TOML trace format for replaying recorded
//! raw input through a [`GestureInterpreter`].

use std::{
    cell::RefCell,
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use kurbo::{Point, Rect, Size};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Profile;
use crate::event::{ContactKind, EventKind};
use crate::gestures::{Gesture, GestureInterpreter};
use crate::platform::{
    Capabilities, EventTarget, Host, MousePhase, PointerPhase, RawEvent, RawEventType, TouchPhase,
};
use crate::view::{View, ViewState, ViewStatePatch};

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse trace: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("event {index}: unknown event type '{name}'")]
    UnknownType { index: usize, name: String },
    #[error("event {index}: unknown target '{name}' (expected element or document)")]
    UnknownTarget { index: usize, name: String },
    #[error("event {index}: {message}")]
    Pointer { index: usize, message: String },
}

#[derive(Debug, Default)]
struct HostState {
    bounds: Rect,
    caps: Capabilities,
    active: BTreeSet<(EventTarget, RawEventType)>,
    touch_actions_disabled: bool,
}

/// In-memory [`Host`]. Clones share state, so a view can hand out its element
/// while tests keep a handle to inspect subscriptions.
#[derive(Debug, Clone, Default)]
pub struct TraceHost {
    inner: Rc<RefCell<HostState>>,
}

impl TraceHost {
    pub fn new(bounds: Rect) -> Self {
        Self::with_capabilities(bounds, Capabilities::pointer())
    }

    pub fn with_capabilities(bounds: Rect, caps: Capabilities) -> Self {
        Self {
            inner: Rc::new(RefCell::new(HostState {
                bounds,
                caps,
                ..HostState::default()
            })),
        }
    }

    pub fn set_bounds(&self, bounds: Rect) {
        self.inner.borrow_mut().bounds = bounds;
    }

    pub fn active(&self) -> Vec<(EventTarget, RawEventType)> {
        self.inner.borrow().active.iter().copied().collect()
    }

    pub fn is_listening(&self, target: EventTarget, ty: RawEventType) -> bool {
        self.inner.borrow().active.contains(&(target, ty))
    }

    pub fn touch_actions_disabled(&self) -> bool {
        self.inner.borrow().touch_actions_disabled
    }
}

impl Host for TraceHost {
    fn capabilities(&self) -> Capabilities {
        self.inner.borrow().caps
    }

    fn listen(&mut self, target: EventTarget, ty: RawEventType) {
        debug!("listen {} on {}", ty.name(), target.as_str());
        self.inner.borrow_mut().active.insert((target, ty));
    }

    fn unlisten(&mut self, target: EventTarget, ty: RawEventType) {
        debug!("unlisten {} on {}", ty.name(), target.as_str());
        self.inner.borrow_mut().active.remove(&(target, ty));
    }

    fn element_bounds(&self) -> Rect {
        self.inner.borrow().bounds
    }

    fn disable_native_touch_actions(&mut self) {
        self.inner.borrow_mut().touch_actions_disabled = true;
    }
}

#[derive(Debug, Clone)]
pub struct MemoryView {
    host: TraceHost,
    image: Size,
    state: ViewState,
    writes: usize,
}

impl MemoryView {
    pub fn new(host: TraceHost, image: Size, state: ViewState) -> Self {
        Self {
            host,
            image,
            state,
            writes: 0,
        }
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn host(&self) -> &TraceHost {
        &self.host
    }
}

impl View for MemoryView {
    type Element = TraceHost;

    fn element(&self) -> TraceHost {
        self.host.clone()
    }

    fn state(&self) -> ViewState {
        self.state
    }

    fn set_state(&mut self, patch: ViewStatePatch) {
        self.state.apply(&patch);
        self.writes += 1;
    }

    fn image_size(&self) -> Size {
        self.image
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ElementBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for ElementBox {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 1000.0,
            height: 1000.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct ImageSize {
    pub width: f64,
    pub height: f64,
}

impl Default for ImageSize {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 1000.0,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Setup {
    #[serde(default = "default_true")]
    pub pointer_events: bool,
    #[serde(default)]
    pub element: ElementBox,
    #[serde(default)]
    pub image: ImageSize,
    #[serde(default)]
    pub state: ViewState,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            pointer_events: true,
            element: ElementBox::default(),
            image: ImageSize::default(),
            state: ViewState::default(),
        }
    }
}

fn default_target() -> String {
    "element".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TraceEvent {
    #[serde(default)]
    pub time_ms: u64,
    #[serde(default = "default_target")]
    pub target: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    pub pointer_id: Option<i32>,
    pub pointer_type: Option<String>,
    #[serde(default)]
    pub touches: Vec<[f64; 2]>,
    #[serde(default)]
    pub changed: Vec<[f64; 2]>,
    #[serde(default)]
    pub delta_y: f64,
}

fn points(raw: &[[f64; 2]]) -> Vec<Point> {
    raw.iter().map(|[x, y]| Point::new(*x, *y)).collect()
}

impl TraceEvent {
    pub fn to_raw(&self, index: usize) -> Result<(EventTarget, RawEvent), ReplayError> {
        let target = match self.target.as_str() {
            "element" => EventTarget::Element,
            "document" => EventTarget::Document,
            other => {
                return Err(ReplayError::UnknownTarget {
                    index,
                    name: other.to_string(),
                });
            }
        };
        let ty = RawEventType::from_name(&self.ty).ok_or_else(|| ReplayError::UnknownType {
            index,
            name: self.ty.clone(),
        })?;
        let client = Point::new(self.x, self.y);
        let t = self.time_ms;

        let event = match ty {
            RawEventType::MouseDown => RawEvent::mouse(MousePhase::Down, client, t),
            RawEventType::MouseMove => RawEvent::mouse(MousePhase::Move, client, t),
            RawEventType::MouseUp => RawEvent::mouse(MousePhase::Up, client, t),
            RawEventType::TouchStart
            | RawEventType::TouchMove
            | RawEventType::TouchEnd
            | RawEventType::TouchCancel => {
                let phase = match ty {
                    RawEventType::TouchStart => TouchPhase::Start,
                    RawEventType::TouchMove => TouchPhase::Move,
                    RawEventType::TouchEnd => TouchPhase::End,
                    _ => TouchPhase::Cancel,
                };
                RawEvent::touch(phase, points(&self.touches), points(&self.changed), t)
            }
            RawEventType::PointerDown
            | RawEventType::PointerMove
            | RawEventType::PointerUp
            | RawEventType::PointerCancel
            | RawEventType::PointerOut
            | RawEventType::PointerOver => {
                let phase = match ty {
                    RawEventType::PointerDown => PointerPhase::Down,
                    RawEventType::PointerMove => PointerPhase::Move,
                    RawEventType::PointerUp => PointerPhase::Up,
                    RawEventType::PointerCancel => PointerPhase::Cancel,
                    RawEventType::PointerOut => PointerPhase::Out,
                    _ => PointerPhase::Over,
                };
                let id = self.pointer_id.ok_or_else(|| ReplayError::Pointer {
                    index,
                    message: format!("{} needs pointer_id", self.ty),
                })?;
                let type_name = self.pointer_type.as_deref().unwrap_or("mouse");
                let kind = ContactKind::from_pointer_type(type_name).ok_or_else(|| {
                    ReplayError::Pointer {
                        index,
                        message: format!("unknown pointer_type '{type_name}'"),
                    }
                })?;
                RawEvent::pointer(phase, id, kind, client, t)
            }
            RawEventType::Wheel => RawEvent::wheel(client, self.delta_y, t),
        };
        Ok((target, event))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Trace {
    #[serde(default)]
    pub setup: Setup,
    #[serde(default)]
    pub events: Vec<TraceEvent>,
}

impl Trace {
    pub fn from_toml_str(txt: &str) -> Result<Self, ReplayError> {
        Ok(toml::from_str(txt)?)
    }

    pub fn load(path: &Path) -> Result<Self, ReplayError> {
        let txt = fs::read_to_string(path).map_err(|source| ReplayError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&txt)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Step {
    pub index: usize,
    pub time_ms: u64,
    pub event: &'static str,
    pub target: &'static str,
    pub prevented: bool,
    pub canonical: Option<EventKind>,
    pub gesture: Option<Gesture>,
    pub state: ViewState,
}

pub fn replay(trace: &Trace, profile: &Profile) -> Result<Vec<Step>, ReplayError> {
    let raw = trace
        .events
        .iter()
        .enumerate()
        .map(|(i, e)| e.to_raw(i))
        .collect::<Result<Vec<_>, _>>()?;

    let setup = &trace.setup;
    let el = setup.element;
    let caps = Capabilities {
        pointer_events: setup.pointer_events,
    };
    let host = TraceHost::with_capabilities(
        Rect::from_origin_size((el.x, el.y), (el.width, el.height)),
        caps,
    );
    let view = MemoryView::new(
        host,
        Size::new(setup.image.width, setup.image.height),
        setup.state,
    );
    let mut interp = GestureInterpreter::with_profile(view, caps, profile);

    let steps = raw
        .iter()
        .enumerate()
        .map(|(index, (target, event))| {
            let handled = interp.handle(*target, event);
            Step {
                index,
                time_ms: event.time_ms,
                event: event.event_type().name(),
                target: target.as_str(),
                prevented: handled.disposition.prevents_default(),
                canonical: handled.event.map(|e| e.kind),
                gesture: handled.gesture,
                state: interp.view().state(),
            }
        })
        .collect();

    interp.destroy();
    Ok(steps)
}
