#![no_main]
use arbitrary::Arbitrary;
use jsontap::{CollectorOptions, ParserOptions, PushParser, Value, ValueCollector};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    emit_whitespace: bool,
    associative: bool,
    /// Sizes of the pieces the payload is fed in; the rest goes in one piece.
    splits: Vec<u8>,
    payload: Vec<u8>,
}

/// Drops numbers so that float rounding differences between the two parsers
/// don't count as disagreements.
fn shape(value: &Value) -> serde_json::Value {
    match value {
        Value::Null | Value::Integer(_) | Value::Float(_) => serde_json::Value::Null,
        Value::Boolean(b) => serde_json::Value::Bool(*b),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Array(items) => items.iter().map(shape).collect(),
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), shape(v))).collect(),
        Value::Record(record) => record.iter().map(|(k, v)| (k.to_owned(), shape(v))).collect(),
    }
}

fn serde_shape(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Number(_) => serde_json::Value::Null,
        serde_json::Value::Array(items) => items.iter().map(serde_shape).collect(),
        serde_json::Value::Object(map) => {
            map.iter().map(|(k, v)| (k.clone(), serde_shape(v))).collect()
        }
        other => other.clone(),
    }
}

fn run(input: Input) {
    let mut values = Vec::new();
    let collector = ValueCollector::with_options(
        |v| values.push(v),
        CollectorOptions {
            associative: input.associative,
        },
    );
    let mut parser = PushParser::new(
        collector,
        ParserOptions {
            emit_whitespace: input.emit_whitespace,
            ..ParserOptions::default()
        },
    );

    let mut rest = input.payload.as_slice();
    let mut result = Ok(());
    for &split in &input.splits {
        let (chunk, tail) = rest.split_at(usize::from(split).min(rest.len()));
        rest = tail;
        result = parser.feed(chunk).map(drop);
        if result.is_err() {
            break;
        }
    }
    if result.is_ok() {
        result = parser.feed(rest).map(drop);
    }
    let documents = parser.documents();
    drop(parser);

    // Whatever serde_json accepts as a stream of containers must be
    // accepted here too, with the same structure.
    let Ok(expected) = serde_json::Deserializer::from_slice(&input.payload)
        .into_iter::<serde_json::Value>()
        .collect::<Result<Vec<_>, _>>()
    else {
        return;
    };
    if !expected.iter().all(|v| v.is_array() || v.is_object()) {
        return;
    }

    assert!(result.is_ok(), "rejected valid input: {result:?}");
    assert_eq!(documents, expected.len());
    let actual: Vec<_> = values.iter().map(shape).collect();
    let expected: Vec<_> = expected.iter().map(serde_shape).collect();
    assert_eq!(actual, expected);
}

fuzz_target!(|input: Input| run(input));
