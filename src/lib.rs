//! Pan and zoom gestures for an image viewer, from any pointing device.
//!
//! Raw mouse, touch, pointer and wheel input goes through an
//! [`InputNormalizer`] that reduces it to `start`/`move`/`end`/`wheel`
//! primitives with one target point and a contact separation. A
//! [`GestureInterpreter`] classifies those into drag, pinch, double tap,
//! one-touch zoom and wheel zoom, and patches the [`View`]'s transform so the
//! point under the finger or cursor stays put while zooming.
//!
//! The platform is reached only through the [`Host`] trait, so the same code
//! runs against the DOM (feature `web`) or the in-memory [`replay`] host.

pub mod config;
pub mod event;
pub mod geometry;
pub mod gestures;
pub mod normalizer;
pub mod platform;
pub mod replay;
pub mod session;
pub mod tracker;
pub mod view;
#[cfg(feature = "web")]
pub mod web;
pub mod zoom;

pub use config::{ConfigError, Profile};
pub use event::{CanonicalEvent, ContactKind, EventKind};
pub use gestures::{Gesture, GestureInterpreter, Handled};
pub use normalizer::{InputNormalizer, Normalized};
pub use platform::{Capabilities, Disposition, EventTarget, Host, RawEvent, RawEventType};
pub use view::{View, ViewState, ViewStatePatch};
