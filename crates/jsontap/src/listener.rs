//! The push-based interface through which the parser reports structural
//! milestones.

use crate::parser::Number;

/// Payload of a [`Listener::value`] call.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// A string value with escapes decoded.
    String(String),
    /// A number without fraction or exponent that fits in `i64`.
    Integer(i64),
    /// Any other number.
    Float(f64),
    /// `true` or `false`.
    Boolean(bool),
    /// `null`.
    Null,
}

impl From<Number> for Scalar {
    fn from(n: Number) -> Self {
        match n {
            Number::Integer(i) => Self::Integer(i),
            Number::Float(f) => Self::Float(f),
        }
    }
}

/// Receives parse events in grammar order.
///
/// The parser guarantees that calls are well nested, that every `start_*`
/// is matched by exactly one later `end_*`, and that `key` is only called
/// inside an object, immediately before the value or container it names.
///
/// All methods default to doing nothing.
#[allow(unused_variables)]
pub trait Listener {
    /// The first `[` or `{` of a top-level document.
    fn start_document(&mut self) {}
    /// The outermost container of the document closed.
    fn end_document(&mut self) {}
    /// `{`
    fn start_object(&mut self) {}
    /// `}`
    fn end_object(&mut self) {}
    /// `[`
    fn start_array(&mut self) {}
    /// `]`
    fn end_array(&mut self) {}
    /// An object key, decoded.
    fn key(&mut self, key: &str) {}
    /// A string, number, boolean or null.
    fn value(&mut self, value: Scalar) {}
    /// Only called when [`ParserOptions::emit_whitespace`] is set.
    ///
    /// [`ParserOptions::emit_whitespace`]: crate::ParserOptions::emit_whitespace
    fn whitespace(&mut self, whitespace: &str) {}
}

impl<L: Listener + ?Sized> Listener for &mut L {
    fn start_document(&mut self) {
        (**self).start_document();
    }
    fn end_document(&mut self) {
        (**self).end_document();
    }
    fn start_object(&mut self) {
        (**self).start_object();
    }
    fn end_object(&mut self) {
        (**self).end_object();
    }
    fn start_array(&mut self) {
        (**self).start_array();
    }
    fn end_array(&mut self) {
        (**self).end_array();
    }
    fn key(&mut self, key: &str) {
        (**self).key(key);
    }
    fn value(&mut self, value: Scalar) {
        (**self).value(value);
    }
    fn whitespace(&mut self, whitespace: &str) {
        (**self).whitespace(whitespace);
    }
}

/// One [`Listener`] call in owned form.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// [`Listener::start_document`]
    StartDocument,
    /// [`Listener::end_document`]
    EndDocument,
    /// [`Listener::start_object`]
    StartObject,
    /// [`Listener::end_object`]
    EndObject,
    /// [`Listener::start_array`]
    StartArray,
    /// [`Listener::end_array`]
    EndArray,
    /// [`Listener::key`]
    Key(String),
    /// [`Listener::value`]
    Value(Scalar),
    /// [`Listener::whitespace`]
    Whitespace(String),
}

impl Event {
    /// Replays this event into `listener`.
    pub fn apply<L: Listener + ?Sized>(self, listener: &mut L) {
        match self {
            Event::StartDocument => listener.start_document(),
            Event::EndDocument => listener.end_document(),
            Event::StartObject => listener.start_object(),
            Event::EndObject => listener.end_object(),
            Event::StartArray => listener.start_array(),
            Event::EndArray => listener.end_array(),
            Event::Key(key) => listener.key(&key),
            Event::Value(value) => listener.value(value),
            Event::Whitespace(ws) => listener.whitespace(&ws),
        }
    }
}

/// A listener that records every event it receives.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct EventRecorder {
    /// Everything received so far, oldest first.
    pub events: Vec<Event>,
}

impl EventRecorder {
    /// A recorder with no events.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The recorded events.
    #[must_use]
    pub fn into_events(self) -> Vec<Event> {
        self.events
    }

    /// Replays the recorded events, in order, into `listener`.
    pub fn replay<L: Listener + ?Sized>(self, listener: &mut L) {
        for event in self.events {
            event.apply(listener);
        }
    }
}

impl Listener for EventRecorder {
    fn start_document(&mut self) {
        self.events.push(Event::StartDocument);
    }
    fn end_document(&mut self) {
        self.events.push(Event::EndDocument);
    }
    fn start_object(&mut self) {
        self.events.push(Event::StartObject);
    }
    fn end_object(&mut self) {
        self.events.push(Event::EndObject);
    }
    fn start_array(&mut self) {
        self.events.push(Event::StartArray);
    }
    fn end_array(&mut self) {
        self.events.push(Event::EndArray);
    }
    fn key(&mut self, key: &str) {
        self.events.push(Event::Key(key.to_owned()));
    }
    fn value(&mut self, value: Scalar) {
        self.events.push(Event::Value(value));
    }
    fn whitespace(&mut self, whitespace: &str) {
        self.events.push(Event::Whitespace(whitespace.to_owned()));
    }
}
