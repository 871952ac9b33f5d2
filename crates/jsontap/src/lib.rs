//! An event-driven JSON parser for unbounded streams.
//!
//! Input is consumed one byte at a time by a resumable state machine, so a
//! document may arrive in arbitrarily small pieces and many documents may
//! follow each other on one stream (newline-delimited feeds, concatenated
//! records). Each structural milestone is reported to a [`Listener`] as soon
//! as it is complete; [`ValueCollector`] is a listener that rebuilds whole
//! [`Value`]s and hands each top-level document to a callback.
//!
//! ```rust
//! let input = "{\"user\": \"ada\", \"tags\": [1, 2.5, true]}\n[null]";
//! let values = jsontap::collect(input.as_bytes(), jsontap::ParserOptions::default()).unwrap();
//! assert_eq!(values.len(), 2);
//! assert_eq!(values[0].get("user").and_then(jsontap::Value::as_str), Some("ada"));
//! ```

mod listener;
mod materialize;
mod parser;
mod value;

#[cfg(test)]
mod tests;

use std::io::BufRead;

pub use listener::{Event, EventRecorder, Listener, Scalar};
pub use materialize::{CollectorOptions, ValueCollector};
pub use parser::{
    ByteSource, Chunk, ErrorCategory, Literal, Number, ParseError, Parser, ParserOptions,
    Position, PushParser, ReaderSource, StopHandle, StreamError, SyntaxError,
};
pub use value::{Array, Map, Record, Value};

/// Parses every document in `reader` and returns them in stream order.
///
/// # Errors
///
/// A read failure, or the first grammar violation.
pub fn collect<R: BufRead>(reader: R, options: ParserOptions) -> Result<Vec<Value>, StreamError> {
    let mut values = Vec::new();
    for_each_value(reader, options, CollectorOptions::default(), |value| {
        values.push(value);
    })?;
    Ok(values)
}

/// Parses `reader`, calling `callback` with each document as soon as it is
/// complete. Returns the number of documents delivered.
///
/// # Errors
///
/// A read failure, or the first grammar violation. Documents completed
/// before the failure have already been delivered.
pub fn for_each_value<R, F>(
    reader: R,
    options: ParserOptions,
    collector_options: CollectorOptions,
    callback: F,
) -> Result<usize, StreamError>
where
    R: BufRead,
    F: FnMut(Value),
{
    let collector = ValueCollector::with_options(callback, collector_options);
    let mut parser = Parser::from_reader(reader, collector, options);
    parser.parse()?;
    Ok(parser.listener().delivered())
}
