mod arbitrary;

use crate::{
    CollectorOptions, Event, EventRecorder, ParseError, ParserOptions, PushParser, Value,
    ValueCollector,
};

/// Feeds `input` in one piece and returns the recorded events.
pub(crate) fn events(input: &str) -> Result<Vec<Event>, ParseError> {
    events_with(input.as_bytes(), &[input.len()], ParserOptions::default())
}

/// Feeds `input` split at the given chunk lengths; the remainder, if any,
/// goes in a final chunk.
pub(crate) fn events_with(
    input: &[u8],
    chunk_lens: &[usize],
    options: ParserOptions,
) -> Result<Vec<Event>, ParseError> {
    let mut parser = PushParser::new(EventRecorder::new(), options);
    let mut rest = input;
    for &len in chunk_lens {
        let (chunk, tail) = rest.split_at(len.min(rest.len()));
        parser.feed(chunk)?;
        rest = tail;
    }
    parser.feed(rest)?;
    Ok(parser.into_listener().into_events())
}

/// Feeds `input` one byte at a time and materializes every document.
pub(crate) fn values_bytewise(input: &[u8], options: CollectorOptions) -> Result<Vec<Value>, ParseError> {
    let mut out = Vec::new();
    let collector = ValueCollector::with_options(|v| out.push(v), options);
    let mut parser = PushParser::new(collector, ParserOptions::default());
    for b in input {
        parser.feed(core::slice::from_ref(b))?;
    }
    drop(parser);
    Ok(out)
}

/// Converts to `serde_json` for comparison against an independent parser.
pub(crate) fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::Integer(i) => serde_json::Value::from(*i),
        Value::Float(f) => serde_json::Number::from_f64(*f)
            .map_or(serde_json::Value::Null, serde_json::Value::Number),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => items.iter().map(to_json).collect(),
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), to_json(v))).collect(),
        Value::Record(record) => record
            .iter()
            .map(|(k, v)| (k.to_owned(), to_json(v)))
            .collect(),
    }
}
