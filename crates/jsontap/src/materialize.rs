//! A [`Listener`] that turns events back into [`Value`]s.

use std::collections::BTreeMap;

use crate::{
    listener::{Listener, Scalar},
    value::{Array, Map, Record, Value},
};

/// Configuration for [`ValueCollector`].
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectorOptions {
    /// Build objects as [`Value::Object`] (a key-sorted map) when `true`, or
    /// as [`Value::Record`] (fields in source order) when `false`.
    ///
    /// # Default
    ///
    /// `true`
    pub associative: bool,
}

impl Default for CollectorOptions {
    fn default() -> Self {
        Self { associative: true }
    }
}

#[derive(Debug)]
enum Container {
    Array(Array),
    Object(Map),
    Record(Record),
}

impl Container {
    fn insert(&mut self, key: Option<String>, value: Value) {
        match self {
            Container::Array(array) => array.push(value),
            // The parser always names object members; a missing key means the
            // events broke the listener contract.
            Container::Object(map) => {
                map.insert(key.unwrap_or_default(), value);
            }
            Container::Record(record) => record.insert(key.unwrap_or_default(), value),
        }
    }

    fn into_value(self) -> Value {
        match self {
            Container::Array(array) => Value::Array(array),
            Container::Object(map) => Value::Object(map),
            Container::Record(record) => Value::Record(record),
        }
    }
}

/// Materializes each top-level document and passes it to a callback.
///
/// One collector can be fed any number of consecutive documents; the
/// callback runs once per document, in stream order, as soon as the
/// document's outermost container closes.
///
/// # Examples
///
/// ```
/// use jsontap::{Parser, ParserOptions, Value, ValueCollector};
///
/// let mut values = Vec::new();
/// let collector = ValueCollector::new(|v: Value| values.push(v));
/// let mut parser = Parser::from_reader(&b"{\"a\":1} [true]"[..], collector, ParserOptions::default());
/// parser.parse().unwrap();
/// drop(parser);
/// assert_eq!(values.len(), 2);
/// ```
pub struct ValueCollector<F> {
    callback: F,
    associative: bool,
    /// Containers still being built, innermost last.
    stack: Vec<Container>,
    /// Key announced for the next value or container.
    key: Option<String>,
    level: usize,
    /// Key each open container is stored under in its parent, by level.
    /// `None` means the parent is an array.
    object_keys: BTreeMap<usize, Option<String>>,
    delivered: usize,
}

impl<F> core::fmt::Debug for ValueCollector<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ValueCollector")
            .field("associative", &self.associative)
            .field("stack", &self.stack)
            .field("key", &self.key)
            .field("level", &self.level)
            .field("object_keys", &self.object_keys)
            .field("delivered", &self.delivered)
            .finish_non_exhaustive()
    }
}

impl<F: FnMut(Value)> ValueCollector<F> {
    /// A collector in associative mode.
    pub fn new(callback: F) -> Self {
        Self::with_options(callback, CollectorOptions::default())
    }

    /// A collector configured by `options`.
    pub fn with_options(callback: F, options: CollectorOptions) -> Self {
        Self {
            callback,
            associative: options.associative,
            stack: Vec::new(),
            key: None,
            level: 0,
            object_keys: BTreeMap::new(),
            delivered: 0,
        }
    }

    /// Number of values handed to the callback so far.
    #[must_use]
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Gives the callback back, along with whatever it captured.
    pub fn into_callback(self) -> F {
        self.callback
    }

    fn start_container(&mut self, container: Container) {
        self.level += 1;
        self.object_keys.insert(self.level, self.key.take());
        self.stack.push(container);
    }

    fn end_container(&mut self) {
        let Some(finished) = self.stack.pop() else {
            return;
        };
        let finished = finished.into_value();
        let key = self.object_keys.remove(&self.level).flatten();
        self.level = self.level.saturating_sub(1);

        match self.stack.last_mut() {
            Some(parent) => parent.insert(key, finished),
            None => {
                self.delivered += 1;
                (self.callback)(finished);
            }
        }
    }
}

impl<F: FnMut(Value)> Listener for ValueCollector<F> {
    fn start_document(&mut self) {
        self.stack.clear();
        self.key = None;
        self.level = 0;
        self.object_keys.clear();
    }

    fn end_document(&mut self) {
        self.stack.clear();
    }

    fn start_object(&mut self) {
        let container = if self.associative {
            Container::Object(Map::new())
        } else {
            Container::Record(Record::new())
        };
        self.start_container(container);
    }

    fn end_object(&mut self) {
        self.end_container();
    }

    fn start_array(&mut self) {
        self.start_container(Container::Array(Array::new()));
    }

    fn end_array(&mut self) {
        self.end_container();
    }

    fn key(&mut self, key: &str) {
        self.key = Some(key.to_owned());
    }

    fn value(&mut self, value: Scalar) {
        let value = match value {
            Scalar::String(s) => Value::String(s),
            Scalar::Integer(i) => Value::Integer(i),
            Scalar::Float(f) => Value::Float(f),
            Scalar::Boolean(b) => Value::Boolean(b),
            Scalar::Null => Value::Null,
        };
        let key = self.key.take();
        if let Some(top) = self.stack.last_mut() {
            top.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listener::Event;

    fn collect(events: Vec<Event>, options: CollectorOptions) -> Vec<Value> {
        let mut out = Vec::new();
        let mut collector = ValueCollector::with_options(|v| out.push(v), options);
        for event in events {
            event.apply(&mut collector);
        }
        drop(collector);
        out
    }

    fn nested_events() -> Vec<Event> {
        use Event::*;
        vec![
            StartDocument,
            StartObject,
            Key("b".into()),
            StartArray,
            Value(Scalar::Integer(1)),
            StartObject,
            Key("x".into()),
            Value(Scalar::Null),
            EndObject,
            EndArray,
            Key("a".into()),
            Value(Scalar::String("s".into())),
            EndObject,
            EndDocument,
        ]
    }

    #[test]
    fn builds_nested_maps() {
        let values = collect(nested_events(), CollectorOptions::default());
        let inner: Map = [("x".to_string(), Value::Null)].into_iter().collect();
        let expected: Map = [
            (
                "b".to_string(),
                Value::Array(vec![Value::Integer(1), Value::Object(inner)]),
            ),
            ("a".to_string(), Value::from("s")),
        ]
        .into_iter()
        .collect();
        assert_eq!(values, vec![Value::Object(expected)]);
    }

    #[test]
    fn record_mode_keeps_field_order() {
        let values = collect(
            nested_events(),
            CollectorOptions { associative: false },
        );
        let [Value::Record(record)] = values.as_slice() else {
            panic!("expected one record, got {values:?}");
        };
        let keys: Vec<_> = record.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["b", "a"]);
        assert!(matches!(
            record.get("b").and_then(Value::as_array).map(|a| &a[1]),
            Some(Value::Record(_))
        ));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn record_mode_serializes_like_the_source() {
        let values = collect(nested_events(), CollectorOptions { associative: false });
        assert_eq!(
            serde_json::to_string(&values[0]).unwrap(),
            r#"{"b":[1,{"x":null}],"a":"s"}"#
        );
    }

    #[test]
    fn top_level_arrays_are_delivered() {
        use Event::{EndArray, EndDocument, EndObject, StartArray, StartDocument, StartObject};
        let values = collect(
            vec![
                StartDocument,
                StartArray,
                StartObject,
                EndObject,
                EndArray,
                EndDocument,
            ],
            CollectorOptions::default(),
        );
        assert_eq!(values, vec![Value::Array(vec![Value::Object(Map::new())])]);
    }

    #[test]
    fn reused_across_documents() {
        let mut events = nested_events();
        events.extend(nested_events());
        let mut count = 0;
        let mut collector = ValueCollector::new(|_| count += 1);
        for event in events {
            event.apply(&mut collector);
        }
        assert_eq!(collector.delivered(), 2);
        drop(collector);
        assert_eq!(count, 2);
    }

    #[test]
    fn empty_key_is_a_real_key() {
        use Event::{EndArray, EndDocument, EndObject, Key, StartArray, StartDocument, StartObject};
        let values = collect(
            vec![
                StartDocument,
                StartObject,
                Key(String::new()),
                StartArray,
                EndArray,
                EndObject,
                EndDocument,
            ],
            CollectorOptions::default(),
        );
        assert_eq!(values[0].get(""), Some(&Value::Array(vec![])));
    }
}
