//! Input normalizer: turns mouse, touch, pointer and wheel input into one
//! stream of [`CanonicalEvent`]s.
//!
//! The platform branch is picked once at construction from [`Capabilities`]:
//!
//! - [`PointerSource`] when a unified pointer event family exists. It keeps a
//!   two-slot [`ContactTable`] and subscribes to moves only while contacts are
//!   down.
//! - [`MouseTouchSource`] otherwise. Mouse moves are tracked on the document
//!   root for the duration of a press; touches are read from the event lists.
//!
//! Wheel input is handled the same way in both branches.
//!
//! Every subscription goes through [`Listeners`], which remembers what is
//! active. Raw events for a `(target, type)` pair that is not active are
//! dropped, so nothing leaks out after [`InputNormalizer::destroy`].

use std::collections::BTreeSet;

use kurbo::Point;
use log::{debug, trace};

use crate::event::{CanonicalEvent, ContactKind, EventKind};
use crate::geometry::{element_relative, midpoint, separation};
use crate::platform::{
    Capabilities, Disposition, EventTarget, Host, MousePhase, PointerPhase, PointerSample,
    RawEvent, RawEventType, RawInput, TouchLists, TouchPhase,
};
use crate::tracker::{Contact, ContactTable};

/// Ledger of active subscriptions in front of a [`Host`].
#[derive(Debug)]
pub struct Listeners<H: Host> {
    host: H,
    active: BTreeSet<(EventTarget, RawEventType)>,
}

impl<H: Host> Listeners<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            active: BTreeSet::new(),
        }
    }

    pub fn add(&mut self, target: EventTarget, ty: RawEventType) {
        if self.active.insert((target, ty)) {
            self.host.listen(target, ty);
        }
    }

    /// Removing a pair that was never added is a no-op.
    pub fn remove(&mut self, target: EventTarget, ty: RawEventType) {
        if self.active.remove(&(target, ty)) {
            self.host.unlisten(target, ty);
        }
    }

    pub fn is_active(&self, target: EventTarget, ty: RawEventType) -> bool {
        self.active.contains(&(target, ty))
    }

    pub fn remove_all(&mut self) {
        for (target, ty) in std::mem::take(&mut self.active) {
            self.host.unlisten(target, ty);
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Normalized {
    pub disposition: Disposition,
    pub event: Option<CanonicalEvent>,
}

impl Normalized {
    fn ignored() -> Self {
        Self::default()
    }

    fn suppressed(event: Option<CanonicalEvent>) -> Self {
        Self {
            disposition: Disposition::PreventDefault,
            event,
        }
    }
}

pub trait InputSource {
    fn attach<H: Host>(&mut self, listeners: &mut Listeners<H>);

    fn detach<H: Host>(&mut self, listeners: &mut Listeners<H>);

    /// Handles an event the ledger already accepted.
    fn handle<H: Host>(
        &mut self,
        target: EventTarget,
        event: &RawEvent,
        listeners: &mut Listeners<H>,
    ) -> Normalized;
}

#[derive(Debug, Default)]
pub struct PointerSource {
    contacts: ContactTable,
}

impl PointerSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contacts(&self) -> &ContactTable {
        &self.contacts
    }

    fn down<H: Host>(&mut self, s: &PointerSample, time_ms: u64, listeners: &mut Listeners<H>) -> Option<CanonicalEvent> {
        if self.contacts.contains(s.id) {
            debug!("pointer {} already down; ignoring", s.id);
            return None;
        }
        let bounds = listeners.host().element_bounds();
        let contact = Contact {
            id: s.id,
            point: s.client,
            kind: s.kind,
        };

        match self.contacts.len() {
            0 => {
                listeners.add(EventTarget::Element, RawEventType::PointerMove);
                if s.kind == ContactKind::Mouse {
                    listeners.add(EventTarget::Element, RawEventType::PointerOut);
                    listeners.add(EventTarget::Element, RawEventType::PointerOver);
                }
                self.contacts.insert(contact);
                Some(CanonicalEvent::single(
                    EventKind::Start,
                    element_relative(s.client, bounds),
                    Some(s.kind),
                    time_ms,
                ))
            }
            1 => {
                let first = *self.contacts.iter().next()?;
                self.contacts.insert(contact);
                Some(CanonicalEvent::pair(
                    EventKind::Start,
                    element_relative(midpoint(s.client, first.point), bounds),
                    separation(s.client, first.point),
                    time_ms,
                ))
            }
            _ => {
                debug!("ignoring pointer {}: already tracking two contacts", s.id);
                None
            }
        }
    }

    fn up<H: Host>(&mut self, s: &PointerSample, time_ms: u64, listeners: &mut Listeners<H>) -> Option<CanonicalEvent> {
        if !self.contacts.contains(s.id) {
            return None;
        }
        let bounds = listeners.host().element_bounds();

        if self.contacts.len() == 1 {
            release_move_tracking(listeners);
        }

        // with two down, report where the survivor is so the next drag starts there
        let (point, kind) = match self.contacts.other(s.id) {
            Some(survivor) => (survivor.point, survivor.kind),
            None => (s.client, s.kind),
        };
        self.contacts.remove(s.id);

        Some(CanonicalEvent::single(
            EventKind::End,
            element_relative(point, bounds),
            Some(kind),
            time_ms,
        ))
    }

    fn moved<H: Host>(&mut self, s: &PointerSample, time_ms: u64, listeners: &Listeners<H>) -> Option<CanonicalEvent> {
        if !self.contacts.update(s.id, s.client) {
            return None;
        }
        let bounds = listeners.host().element_bounds();

        let event = match self.contacts.other(s.id) {
            Some(partner) => CanonicalEvent::pair(
                EventKind::Move,
                element_relative(midpoint(s.client, partner.point), bounds),
                separation(s.client, partner.point),
                time_ms,
            ),
            None => CanonicalEvent::single(
                EventKind::Move,
                element_relative(s.client, bounds),
                Some(s.kind),
                time_ms,
            ),
        };
        Some(event)
    }
}

/// Drops every move/up listener that only lives while contacts are down.
fn release_move_tracking<H: Host>(listeners: &mut Listeners<H>) {
    listeners.remove(EventTarget::Element, RawEventType::PointerMove);
    listeners.remove(EventTarget::Element, RawEventType::PointerOut);
    listeners.remove(EventTarget::Element, RawEventType::PointerOver);
    listeners.remove(EventTarget::Document, RawEventType::PointerMove);
    listeners.remove(EventTarget::Document, RawEventType::PointerUp);
    listeners.remove(EventTarget::Document, RawEventType::PointerCancel);
}

impl InputSource for PointerSource {
    fn attach<H: Host>(&mut self, listeners: &mut Listeners<H>) {
        listeners.add(EventTarget::Element, RawEventType::PointerDown);
        listeners.add(EventTarget::Element, RawEventType::PointerUp);
        listeners.add(EventTarget::Element, RawEventType::PointerCancel);
        listeners.host_mut().disable_native_touch_actions();
    }

    fn detach<H: Host>(&mut self, listeners: &mut Listeners<H>) {
        release_move_tracking(listeners);
        listeners.remove(EventTarget::Element, RawEventType::PointerDown);
        listeners.remove(EventTarget::Element, RawEventType::PointerUp);
        listeners.remove(EventTarget::Element, RawEventType::PointerCancel);
        self.contacts.clear();
    }

    fn handle<H: Host>(
        &mut self,
        _target: EventTarget,
        event: &RawEvent,
        listeners: &mut Listeners<H>,
    ) -> Normalized {
        let RawInput::Pointer(phase, sample) = &event.input else {
            return Normalized::ignored();
        };
        let t = event.time_ms;
        match phase {
            PointerPhase::Down => Normalized::suppressed(self.down(sample, t, listeners)),
            PointerPhase::Up | PointerPhase::Cancel => {
                Normalized::suppressed(self.up(sample, t, listeners))
            }
            PointerPhase::Move => Normalized::suppressed(self.moved(sample, t, listeners)),
            PointerPhase::Out | PointerPhase::Over if !self.contacts.contains(sample.id) => {
                Normalized::ignored()
            }
            PointerPhase::Out => {
                // a held mouse outside the element: follow it on the document root
                debug!("pointer {} left the element; tracking on document", sample.id);
                listeners.add(EventTarget::Document, RawEventType::PointerMove);
                listeners.add(EventTarget::Document, RawEventType::PointerUp);
                listeners.add(EventTarget::Document, RawEventType::PointerCancel);
                Normalized::ignored()
            }
            PointerPhase::Over => {
                listeners.remove(EventTarget::Document, RawEventType::PointerMove);
                listeners.remove(EventTarget::Document, RawEventType::PointerUp);
                listeners.remove(EventTarget::Document, RawEventType::PointerCancel);
                Normalized::ignored()
            }
        }
    }
}

const TOUCH_TYPES: [RawEventType; 4] = [
    RawEventType::TouchStart,
    RawEventType::TouchMove,
    RawEventType::TouchEnd,
    RawEventType::TouchCancel,
];

#[derive(Debug, Default)]
pub struct MouseTouchSource;

impl MouseTouchSource {
    pub fn new() -> Self {
        Self
    }

    fn mouse<H: Host>(
        &mut self,
        phase: MousePhase,
        client: Point,
        time_ms: u64,
        listeners: &mut Listeners<H>,
    ) -> CanonicalEvent {
        let kind = match phase {
            MousePhase::Down => {
                listeners.add(EventTarget::Document, RawEventType::MouseMove);
                listeners.add(EventTarget::Document, RawEventType::MouseUp);
                EventKind::Start
            }
            MousePhase::Move => EventKind::Move,
            MousePhase::Up => {
                listeners.remove(EventTarget::Document, RawEventType::MouseMove);
                listeners.remove(EventTarget::Document, RawEventType::MouseUp);
                EventKind::End
            }
        };
        let bounds = listeners.host().element_bounds();
        CanonicalEvent::single(
            kind,
            element_relative(client, bounds),
            Some(ContactKind::Mouse),
            time_ms,
        )
    }

    fn touch<H: Host>(
        &self,
        phase: TouchPhase,
        lists: &TouchLists,
        time_ms: u64,
        listeners: &Listeners<H>,
    ) -> Option<CanonicalEvent> {
        let kind = match phase {
            TouchPhase::Start => EventKind::Start,
            TouchPhase::Move => EventKind::Move,
            TouchPhase::End | TouchPhase::Cancel => EventKind::End,
        };
        // on end/cancel the active list is empty; the lifted touches are in `changed`
        let touches = if lists.touches.is_empty() {
            &lists.changed
        } else {
            &lists.touches
        };
        let bounds = listeners.host().element_bounds();

        match touches.as_slice() {
            [] => None,
            [only] => Some(CanonicalEvent::single(
                kind,
                element_relative(*only, bounds),
                Some(ContactKind::Touch),
                time_ms,
            )),
            [a, b, ..] => Some(CanonicalEvent::pair(
                kind,
                element_relative(midpoint(*a, *b), bounds),
                separation(*a, *b),
                time_ms,
            )),
        }
    }
}

impl InputSource for MouseTouchSource {
    fn attach<H: Host>(&mut self, listeners: &mut Listeners<H>) {
        listeners.add(EventTarget::Element, RawEventType::MouseDown);
        for ty in TOUCH_TYPES {
            listeners.add(EventTarget::Element, ty);
        }
    }

    fn detach<H: Host>(&mut self, listeners: &mut Listeners<H>) {
        listeners.remove(EventTarget::Element, RawEventType::MouseDown);
        listeners.remove(EventTarget::Document, RawEventType::MouseMove);
        listeners.remove(EventTarget::Document, RawEventType::MouseUp);
        for ty in TOUCH_TYPES {
            listeners.remove(EventTarget::Element, ty);
        }
    }

    fn handle<H: Host>(
        &mut self,
        _target: EventTarget,
        event: &RawEvent,
        listeners: &mut Listeners<H>,
    ) -> Normalized {
        match &event.input {
            RawInput::Mouse(phase, client) => {
                Normalized::suppressed(Some(self.mouse(*phase, *client, event.time_ms, listeners)))
            }
            RawInput::Touch(phase, lists) => {
                Normalized::suppressed(self.touch(*phase, lists, event.time_ms, listeners))
            }
            _ => Normalized::ignored(),
        }
    }
}

#[derive(Debug)]
pub enum Source {
    Pointer(PointerSource),
    MouseTouch(MouseTouchSource),
}

impl Source {
    pub fn for_capabilities(caps: Capabilities) -> Self {
        if caps.pointer_events {
            Source::Pointer(PointerSource::new())
        } else {
            Source::MouseTouch(MouseTouchSource::new())
        }
    }
}

impl InputSource for Source {
    fn attach<H: Host>(&mut self, listeners: &mut Listeners<H>) {
        match self {
            Source::Pointer(s) => s.attach(listeners),
            Source::MouseTouch(s) => s.attach(listeners),
        }
    }

    fn detach<H: Host>(&mut self, listeners: &mut Listeners<H>) {
        match self {
            Source::Pointer(s) => s.detach(listeners),
            Source::MouseTouch(s) => s.detach(listeners),
        }
    }

    fn handle<H: Host>(
        &mut self,
        target: EventTarget,
        event: &RawEvent,
        listeners: &mut Listeners<H>,
    ) -> Normalized {
        match self {
            Source::Pointer(s) => s.handle(target, event, listeners),
            Source::MouseTouch(s) => s.handle(target, event, listeners),
        }
    }
}

#[derive(Debug)]
pub struct InputNormalizer<H: Host> {
    listeners: Listeners<H>,
    source: Source,
    destroyed: bool,
}

impl<H: Host> InputNormalizer<H> {
    pub fn new(host: H) -> Self {
        let caps = host.capabilities();
        Self::with_capabilities(host, caps)
    }

    pub fn with_capabilities(host: H, caps: Capabilities) -> Self {
        let mut listeners = Listeners::new(host);
        let mut source = Source::for_capabilities(caps);
        source.attach(&mut listeners);
        listeners.add(EventTarget::Element, RawEventType::Wheel);
        debug!(
            "input normalizer attached ({} branch)",
            if caps.pointer_events { "pointer" } else { "mouse/touch" }
        );
        Self {
            listeners,
            source,
            destroyed: false,
        }
    }

    pub fn handle(&mut self, target: EventTarget, event: &RawEvent) -> Normalized {
        let ty = event.event_type();
        if self.destroyed || !self.listeners.is_active(target, ty) {
            trace!("dropping {} on {}: not subscribed", ty.name(), target.as_str());
            return Normalized::ignored();
        }

        let out = match &event.input {
            RawInput::Wheel { client, delta_y } => {
                let bounds = self.listeners.host().element_bounds();
                Normalized::suppressed(Some(CanonicalEvent::wheel(
                    element_relative(*client, bounds),
                    *delta_y,
                    event.time_ms,
                )))
            }
            _ => self.source.handle(target, event, &mut self.listeners),
        };

        if let Some(ev) = &out.event {
            trace!(
                "{} -> {} at ({:.1}, {:.1}) d={:.2}",
                ty.name(),
                ev.kind.as_str(),
                ev.target.x,
                ev.target.y,
                ev.distance
            );
        }
        out
    }

    pub fn dispatch<F>(&mut self, target: EventTarget, event: &RawEvent, mut sink: F) -> Disposition
    where
        F: FnMut(CanonicalEvent),
    {
        let out = self.handle(target, event);
        if let Some(ev) = out.event {
            sink(ev);
        }
        out.disposition
    }

    pub fn is_listening(&self, target: EventTarget, ty: RawEventType) -> bool {
        self.listeners.is_active(target, ty)
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    pub fn host(&self) -> &H {
        self.listeners.host()
    }

    pub fn host_mut(&mut self) -> &mut H {
        self.listeners.host_mut()
    }

    /// Detaches every listener, including ones attached mid-gesture. Calling
    /// it again does nothing.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.source.detach(&mut self.listeners);
        self.listeners.remove(EventTarget::Element, RawEventType::Wheel);
        self.listeners.remove_all();
        self.destroyed = true;
        debug!("input normalizer detached");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }
}

impl<H: Host> Drop for InputNormalizer<H> {
    fn drop(&mut self) {
        self.destroy();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replay::TraceHost;
    use kurbo::Rect;

    fn pointer_normalizer() -> InputNormalizer<TraceHost> {
        InputNormalizer::with_capabilities(TraceHost::new(Rect::new(0.0, 0.0, 800.0, 600.0)), Capabilities::pointer())
    }

    fn legacy_normalizer() -> InputNormalizer<TraceHost> {
        InputNormalizer::with_capabilities(
            TraceHost::new(Rect::new(0.0, 0.0, 800.0, 600.0)),
            Capabilities::mouse_and_touch(),
        )
    }

    fn down(id: i32, kind: ContactKind, x: f64, y: f64) -> RawEvent {
        RawEvent::pointer(PointerPhase::Down, id, kind, Point::new(x, y), 0)
    }

    fn mv(id: i32, kind: ContactKind, x: f64, y: f64) -> RawEvent {
        RawEvent::pointer(PointerPhase::Move, id, kind, Point::new(x, y), 0)
    }

    fn up(id: i32, kind: ContactKind, x: f64, y: f64) -> RawEvent {
        RawEvent::pointer(PointerPhase::Up, id, kind, Point::new(x, y), 0)
    }

    const EL: EventTarget = EventTarget::Element;
    const DOC: EventTarget = EventTarget::Document;
    const T: ContactKind = ContactKind::Touch;

    #[test]
    fn pointer_branch_attaches_down_up_and_wheel_only() {
        let n = pointer_normalizer();
        assert!(n.is_listening(EL, RawEventType::PointerDown));
        assert!(n.is_listening(EL, RawEventType::PointerUp));
        assert!(n.is_listening(EL, RawEventType::Wheel));
        assert!(!n.is_listening(EL, RawEventType::PointerMove));
        assert!(!n.is_listening(EL, RawEventType::MouseDown));
        assert!(n.host().touch_actions_disabled());
    }

    #[test]
    fn legacy_branch_attaches_mouse_and_touch() {
        let n = legacy_normalizer();
        assert!(n.is_listening(EL, RawEventType::MouseDown));
        for ty in TOUCH_TYPES {
            assert!(n.is_listening(EL, ty));
        }
        assert!(n.is_listening(EL, RawEventType::Wheel));
        assert!(!n.is_listening(EL, RawEventType::PointerDown));
        assert!(!n.host().touch_actions_disabled());
    }

    #[test]
    fn first_pointer_starts_and_subscribes_move() {
        let mut n = pointer_normalizer();
        let out = n.handle(EL, &down(1, T, 100.0, 50.0));
        assert_eq!(out.disposition, Disposition::PreventDefault);
        let ev = out.event.unwrap();
        assert_eq!(ev.kind, EventKind::Start);
        assert_eq!(ev.target, Point::new(100.0, 50.0));
        assert_eq!(ev.distance, 1.0);
        assert_eq!(ev.contact, Some(T));
        assert!(n.is_listening(EL, RawEventType::PointerMove));
        // touch pointers do not need boundary tracking
        assert!(!n.is_listening(EL, RawEventType::PointerOut));
    }

    #[test]
    fn second_pointer_reports_midpoint_and_separation() {
        let mut n = pointer_normalizer();
        n.handle(EL, &down(1, T, 0.0, 0.0));
        let ev = n.handle(EL, &down(2, T, 60.0, 80.0)).event.unwrap();
        assert_eq!(ev.kind, EventKind::Start);
        assert_eq!(ev.target, Point::new(30.0, 40.0));
        assert_eq!(ev.distance, 100.0);
        assert_eq!(ev.contact, None);
    }

    #[test]
    fn third_pointer_is_ignored() {
        let mut n = pointer_normalizer();
        n.handle(EL, &down(1, T, 0.0, 0.0));
        n.handle(EL, &down(2, T, 10.0, 0.0));
        let out = n.handle(EL, &down(3, T, 20.0, 0.0));
        assert!(out.event.is_none());
        let Source::Pointer(p) = n.source() else {
            panic!("expected pointer source");
        };
        assert_eq!(p.contacts().len(), 2);
        assert!(!p.contacts().contains(3));

        // and its move/up are no-ops
        assert!(n.handle(EL, &mv(3, T, 25.0, 0.0)).event.is_none());
        assert!(n.handle(EL, &up(3, T, 25.0, 0.0)).event.is_none());
    }

    #[test]
    fn two_contact_move_recomputes_pair() {
        let mut n = pointer_normalizer();
        n.handle(EL, &down(1, T, 0.0, 0.0));
        n.handle(EL, &down(2, T, 10.0, 0.0));
        let ev = n.handle(EL, &mv(2, T, 30.0, 40.0)).event.unwrap();
        assert_eq!(ev.kind, EventKind::Move);
        assert_eq!(ev.target, Point::new(15.0, 20.0));
        assert_eq!(ev.distance, 50.0);
    }

    #[test]
    fn lifting_one_of_two_reports_survivor() {
        let mut n = pointer_normalizer();
        n.handle(EL, &down(1, T, 0.0, 0.0));
        n.handle(EL, &down(2, T, 100.0, 0.0));
        let ev = n.handle(EL, &up(1, T, 0.0, 0.0)).event.unwrap();
        assert_eq!(ev.kind, EventKind::End);
        assert_eq!(ev.target, Point::new(100.0, 0.0));
        assert_eq!(ev.distance, 1.0);
        // still one contact down, so moves keep flowing
        assert!(n.is_listening(EL, RawEventType::PointerMove));
        let ev = n.handle(EL, &mv(2, T, 110.0, 5.0)).event.unwrap();
        assert_eq!(ev.target, Point::new(110.0, 5.0));
        assert_eq!(ev.distance, 1.0);
        assert_eq!(ev.contact, Some(T));
    }

    #[test]
    fn last_up_unsubscribes_move() {
        let mut n = pointer_normalizer();
        n.handle(EL, &down(1, T, 0.0, 0.0));
        let ev = n.handle(EL, &up(1, T, 5.0, 6.0)).event.unwrap();
        assert_eq!(ev.target, Point::new(5.0, 6.0));
        assert!(!n.is_listening(EL, RawEventType::PointerMove));
        assert!(n.handle(EL, &mv(1, T, 7.0, 7.0)).event.is_none());
    }

    #[test]
    fn cancel_behaves_like_up() {
        let mut n = pointer_normalizer();
        n.handle(EL, &down(4, T, 1.0, 1.0));
        let cancel = RawEvent::pointer(PointerPhase::Cancel, 4, T, Point::new(2.0, 2.0), 0);
        let ev = n.handle(EL, &cancel).event.unwrap();
        assert_eq!(ev.kind, EventKind::End);
        assert!(!n.is_listening(EL, RawEventType::PointerMove));
    }

    #[test]
    fn unknown_up_is_noop() {
        let mut n = pointer_normalizer();
        let out = n.handle(EL, &up(42, T, 0.0, 0.0));
        assert!(out.event.is_none());
    }

    #[test]
    fn mouse_pointer_escalates_to_document_outside_element() {
        let m = ContactKind::Mouse;
        let mut n = pointer_normalizer();
        n.handle(EL, &down(1, m, 10.0, 10.0));
        assert!(n.is_listening(EL, RawEventType::PointerOut));
        assert!(n.is_listening(EL, RawEventType::PointerOver));

        let out_ev = RawEvent::pointer(PointerPhase::Out, 1, m, Point::new(-1.0, 10.0), 0);
        assert_eq!(n.handle(EL, &out_ev).disposition, Disposition::Default);
        assert!(n.is_listening(DOC, RawEventType::PointerMove));
        assert!(n.is_listening(DOC, RawEventType::PointerUp));

        let ev = n.handle(DOC, &mv(1, m, -50.0, 10.0)).event.unwrap();
        assert_eq!(ev.target, Point::new(-50.0, 10.0));

        let over = RawEvent::pointer(PointerPhase::Over, 1, m, Point::new(1.0, 10.0), 0);
        n.handle(EL, &over);
        assert!(!n.is_listening(DOC, RawEventType::PointerMove));
        assert!(n.handle(DOC, &mv(1, m, -60.0, 10.0)).event.is_none());
    }

    #[test]
    fn mouse_release_outside_element_ends_and_cleans_up() {
        let m = ContactKind::Mouse;
        let mut n = pointer_normalizer();
        n.handle(EL, &down(1, m, 10.0, 10.0));
        n.handle(EL, &RawEvent::pointer(PointerPhase::Out, 1, m, Point::new(-1.0, 0.0), 0));
        let ev = n.handle(DOC, &up(1, m, -30.0, 0.0)).event.unwrap();
        assert_eq!(ev.kind, EventKind::End);
        for (target, ty) in [
            (DOC, RawEventType::PointerMove),
            (DOC, RawEventType::PointerUp),
            (EL, RawEventType::PointerMove),
            (EL, RawEventType::PointerOut),
            (EL, RawEventType::PointerOver),
        ] {
            assert!(!n.is_listening(target, ty), "{} still active", ty.name());
        }
    }

    #[test]
    fn boundary_events_from_untracked_pointers_are_ignored() {
        let mut n = pointer_normalizer();
        n.handle(EL, &down(1, ContactKind::Mouse, 10.0, 10.0));

        let pen = ContactKind::Pen;
        n.handle(EL, &RawEvent::pointer(PointerPhase::Out, 7, pen, Point::new(-1.0, 5.0), 0));
        assert!(!n.is_listening(DOC, RawEventType::PointerMove));
        assert!(!n.is_listening(DOC, RawEventType::PointerUp));

        // the held mouse still escalates, and a stray over does not undo it
        n.handle(EL, &RawEvent::pointer(PointerPhase::Out, 1, ContactKind::Mouse, Point::new(-1.0, 10.0), 0));
        n.handle(EL, &RawEvent::pointer(PointerPhase::Over, 7, pen, Point::new(5.0, 5.0), 0));
        assert!(n.is_listening(DOC, RawEventType::PointerMove));
    }

    #[test]
    fn dropping_detaches_listeners() {
        let host = TraceHost::new(Rect::new(0.0, 0.0, 800.0, 600.0));
        let mut n = InputNormalizer::with_capabilities(host.clone(), Capabilities::pointer());
        n.handle(EL, &down(1, ContactKind::Mouse, 10.0, 10.0));
        assert!(host.is_listening(EL, RawEventType::PointerMove));
        drop(n);
        assert!(host.active().is_empty());
    }

    #[test]
    fn coordinates_follow_element_bounds_per_event() {
        let mut n = pointer_normalizer();
        n.host_mut().set_bounds(Rect::new(100.0, 50.0, 900.0, 650.0));
        let ev = n.handle(EL, &down(1, T, 150.0, 60.0)).event.unwrap();
        assert_eq!(ev.target, Point::new(50.0, 10.0));
        n.host_mut().set_bounds(Rect::new(0.0, 0.0, 800.0, 600.0));
        let ev = n.handle(EL, &mv(1, T, 150.0, 60.0)).event.unwrap();
        assert_eq!(ev.target, Point::new(150.0, 60.0));
    }

    #[test]
    fn mouse_press_tracks_on_document() {
        let mut n = legacy_normalizer();
        let ev = n
            .handle(EL, &RawEvent::mouse(MousePhase::Down, Point::new(5.0, 5.0), 0))
            .event
            .unwrap();
        assert_eq!(ev.kind, EventKind::Start);
        assert_eq!(ev.contact, Some(ContactKind::Mouse));
        assert!(n.is_listening(DOC, RawEventType::MouseMove));

        let out = n.handle(DOC, &RawEvent::mouse(MousePhase::Move, Point::new(9.0, 5.0), 0));
        assert_eq!(out.disposition, Disposition::PreventDefault);
        assert_eq!(out.event.unwrap().kind, EventKind::Move);

        let ev = n
            .handle(DOC, &RawEvent::mouse(MousePhase::Up, Point::new(9.0, 5.0), 0))
            .event
            .unwrap();
        assert_eq!(ev.kind, EventKind::End);
        assert!(!n.is_listening(DOC, RawEventType::MouseMove));
        assert!(!n.is_listening(DOC, RawEventType::MouseUp));
    }

    #[test]
    fn mouse_move_without_press_is_dropped() {
        let mut n = legacy_normalizer();
        let out = n.handle(DOC, &RawEvent::mouse(MousePhase::Move, Point::new(9.0, 5.0), 0));
        assert!(out.event.is_none());
        assert_eq!(out.disposition, Disposition::Default);
    }

    #[test]
    fn touch_pair_and_changed_list_fallback() {
        let mut n = legacy_normalizer();
        let start = RawEvent::touch(
            TouchPhase::Start,
            vec![Point::new(0.0, 0.0), Point::new(0.0, 20.0), Point::new(99.0, 99.0)],
            vec![],
            0,
        );
        let ev = n.handle(EL, &start).event.unwrap();
        assert_eq!(ev.target, Point::new(0.0, 10.0));
        assert_eq!(ev.distance, 20.0);
        assert_eq!(ev.contact, None);

        let end = RawEvent::touch(TouchPhase::Cancel, vec![], vec![Point::new(3.0, 4.0)], 0);
        let ev = n.handle(EL, &end).event.unwrap();
        assert_eq!(ev.kind, EventKind::End);
        assert_eq!(ev.target, Point::new(3.0, 4.0));
        assert_eq!(ev.contact, Some(ContactKind::Touch));
    }

    #[test]
    fn wheel_passes_delta_through() {
        let mut n = legacy_normalizer();
        let out = n.handle(EL, &RawEvent::wheel(Point::new(500.0, 500.0), -100.0, 0));
        assert_eq!(out.disposition, Disposition::PreventDefault);
        let ev = out.event.unwrap();
        assert_eq!(ev.kind, EventKind::Wheel);
        assert_eq!(ev.wheel_delta, Some(-100.0));
    }

    #[test]
    fn destroy_detaches_everything_including_runtime_listeners() {
        let m = ContactKind::Mouse;
        let mut n = pointer_normalizer();
        n.handle(EL, &down(1, m, 10.0, 10.0));
        n.handle(EL, &RawEvent::pointer(PointerPhase::Out, 1, m, Point::new(-1.0, 0.0), 0));
        n.destroy();
        assert!(n.host().active().is_empty());

        let mut count = 0;
        for (target, ev) in [
            (EL, down(2, m, 0.0, 0.0)),
            (DOC, mv(1, m, 0.0, 0.0)),
            (DOC, up(1, m, 0.0, 0.0)),
            (EL, RawEvent::wheel(Point::ZERO, 1.0, 0)),
        ] {
            n.dispatch(target, &ev, |_| count += 1);
        }
        assert_eq!(count, 0);

        // second destroy is a no-op
        n.destroy();
        assert!(n.is_destroyed());
    }
}
