//! Browser binding: a [`Host`] backed by a DOM element.
//!
//! Every active `(target, type)` pair owns one JS closure. Closures forward
//! translated events to a shared router, which [`attach`] points at the
//! interpreter; the returned [`Disposition`] decides `preventDefault`.

use std::{
    cell::RefCell,
    collections::HashMap,
    fmt,
    rc::{Rc, Weak},
};

use kurbo::{Point, Rect};
use log::{debug, warn};
use wasm_bindgen::{JsCast, JsValue, closure::Closure};
use web_sys::{Element, HtmlElement};

use crate::event::ContactKind;
use crate::gestures::GestureInterpreter;
use crate::platform::{
    Capabilities, Disposition, EventTarget, Host, MousePhase, PointerPhase, RawEvent, RawEventType,
    TouchPhase,
};
use crate::view::View;

type Listener = Closure<dyn FnMut(web_sys::Event)>;
type Route = Box<dyn FnMut(EventTarget, &RawEvent) -> Disposition>;
type Router = Rc<RefCell<Option<Route>>>;

/// Handle to the viewer element. Clones share listeners and routing.
#[derive(Clone)]
pub struct DomHost {
    element: HtmlElement,
    root: Option<Element>,
    listeners: Rc<RefCell<HashMap<(EventTarget, RawEventType), Listener>>>,
    // removed closures may still be on the JS stack; dropped on the next listen
    retired: Rc<RefCell<Vec<Listener>>>,
    router: Router,
}

impl fmt::Debug for DomHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DomHost")
            .field("listeners", &self.listeners.borrow().keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl DomHost {
    pub fn new(element: HtmlElement) -> Self {
        let root = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.document_element());
        if root.is_none() {
            warn!("no document element; out-of-bounds tracking disabled");
        }
        Self {
            element,
            root,
            listeners: Rc::new(RefCell::new(HashMap::new())),
            retired: Rc::new(RefCell::new(Vec::new())),
            router: Rc::new(RefCell::new(None)),
        }
    }

    pub fn element(&self) -> &HtmlElement {
        &self.element
    }

    /// Replaces the function translated events are delivered to.
    pub fn set_router<F>(&self, route: F)
    where
        F: FnMut(EventTarget, &RawEvent) -> Disposition + 'static,
    {
        *self.router.borrow_mut() = Some(Box::new(route));
    }

    fn node(&self, target: EventTarget) -> Option<&web_sys::EventTarget> {
        match target {
            EventTarget::Element => Some(self.element.unchecked_ref()),
            EventTarget::Document => self.root.as_ref().map(|r| r.unchecked_ref()),
        }
    }
}

impl Host for DomHost {
    fn capabilities(&self) -> Capabilities {
        let global = js_sys::global();
        let pointer_events =
            js_sys::Reflect::has(&global, &JsValue::from_str("PointerEvent")).unwrap_or(false);
        Capabilities { pointer_events }
    }

    fn listen(&mut self, target: EventTarget, ty: RawEventType) {
        self.retired.borrow_mut().clear();

        let Some(node) = self.node(target) else {
            return;
        };
        let router = self.router.clone();
        let closure = Closure::wrap(Box::new(move |e: web_sys::Event| {
            let Some(raw) = translate(ty, &e) else {
                return;
            };
            // a nested dispatch while the router is busy is left to the browser
            let disposition = match router.try_borrow_mut() {
                Ok(mut route) => match route.as_mut() {
                    Some(route) => route(target, &raw),
                    None => Disposition::Default,
                },
                Err(_) => Disposition::Default,
            };
            if disposition.prevents_default() {
                e.prevent_default();
            }
        }) as Box<dyn FnMut(web_sys::Event)>);

        if let Err(e) = node.add_event_listener_with_callback(ty.name(), closure.as_ref().unchecked_ref()) {
            warn!("failed to listen for {} on {}: {e:?}", ty.name(), target.as_str());
            return;
        }
        debug!("listening for {} on {}", ty.name(), target.as_str());
        self.listeners.borrow_mut().insert((target, ty), closure);
    }

    fn unlisten(&mut self, target: EventTarget, ty: RawEventType) {
        let Some(closure) = self.listeners.borrow_mut().remove(&(target, ty)) else {
            return;
        };
        if let Some(node) = self.node(target) {
            let _ = node.remove_event_listener_with_callback(ty.name(), closure.as_ref().unchecked_ref());
        }
        self.retired.borrow_mut().push(closure);
    }

    fn element_bounds(&self) -> Rect {
        let r = self.element.get_bounding_client_rect();
        Rect::from_origin_size((r.x(), r.y()), (r.width(), r.height()))
    }

    fn disable_native_touch_actions(&mut self) {
        if let Err(e) = self.element.style().set_property("touch-action", "none") {
            warn!("failed to set touch-action: {e:?}");
        }
    }
}

fn touch_points(list: &web_sys::TouchList) -> Vec<Point> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .map(|t| Point::new(t.client_x() as f64, t.client_y() as f64))
        .collect()
}

/// Converts a DOM event delivered for `ty`. `None` if it is not the expected interface.
fn translate(ty: RawEventType, e: &web_sys::Event) -> Option<RawEvent> {
    let t = e.time_stamp().max(0.0) as u64;
    let raw = match ty {
        RawEventType::MouseDown | RawEventType::MouseMove | RawEventType::MouseUp => {
            let m = e.dyn_ref::<web_sys::MouseEvent>()?;
            let phase = match ty {
                RawEventType::MouseDown => MousePhase::Down,
                RawEventType::MouseMove => MousePhase::Move,
                _ => MousePhase::Up,
            };
            RawEvent::mouse(phase, Point::new(m.client_x() as f64, m.client_y() as f64), t)
        }
        RawEventType::TouchStart
        | RawEventType::TouchMove
        | RawEventType::TouchEnd
        | RawEventType::TouchCancel => {
            let te = e.dyn_ref::<web_sys::TouchEvent>()?;
            let phase = match ty {
                RawEventType::TouchStart => TouchPhase::Start,
                RawEventType::TouchMove => TouchPhase::Move,
                RawEventType::TouchEnd => TouchPhase::End,
                _ => TouchPhase::Cancel,
            };
            RawEvent::touch(
                phase,
                touch_points(&te.touches()),
                touch_points(&te.changed_touches()),
                t,
            )
        }
        RawEventType::PointerDown
        | RawEventType::PointerMove
        | RawEventType::PointerUp
        | RawEventType::PointerCancel
        | RawEventType::PointerOut
        | RawEventType::PointerOver => {
            let p = e.dyn_ref::<web_sys::PointerEvent>()?;
            let phase = match ty {
                RawEventType::PointerDown => PointerPhase::Down,
                RawEventType::PointerMove => PointerPhase::Move,
                RawEventType::PointerUp => PointerPhase::Up,
                RawEventType::PointerCancel => PointerPhase::Cancel,
                RawEventType::PointerOut => PointerPhase::Out,
                _ => PointerPhase::Over,
            };
            // some engines report an empty type for synthetic events
            let kind = ContactKind::from_pointer_type(&p.pointer_type()).unwrap_or(ContactKind::Mouse);
            let m: &web_sys::MouseEvent = p.unchecked_ref();
            RawEvent::pointer(
                phase,
                p.pointer_id(),
                kind,
                Point::new(m.client_x() as f64, m.client_y() as f64),
                t,
            )
        }
        RawEventType::Wheel => {
            let w = e.dyn_ref::<web_sys::WheelEvent>()?;
            let m: &web_sys::MouseEvent = w.unchecked_ref();
            RawEvent::wheel(
                Point::new(m.client_x() as f64, m.client_y() as f64),
                w.delta_y(),
                t,
            )
        }
    };
    Some(raw)
}

/// Builds an interpreter for `view` and routes its element's events to it.
///
/// The router only holds a weak reference; dropping the handle detaches
/// every listener.
pub fn attach<V>(view: V) -> Rc<RefCell<GestureInterpreter<V>>>
where
    V: View<Element = DomHost> + 'static,
{
    let host = view.element();
    let interp = Rc::new(RefCell::new(GestureInterpreter::new(view)));
    let weak: Weak<RefCell<GestureInterpreter<V>>> = Rc::downgrade(&interp);
    host.set_router(move |target, raw| {
        let Some(interp) = weak.upgrade() else {
            return Disposition::Default;
        };
        let Ok(mut interp) = interp.try_borrow_mut() else {
            return Disposition::Default;
        };
        interp.handle(target, raw).disposition
    });
    interp
}
