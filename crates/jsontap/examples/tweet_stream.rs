//! Consumes a newline-delimited feed of status documents from stdin and
//! prints a one-line summary of each as soon as it has been parsed.
//!
//! The feed is never buffered as a whole: every document is materialized the
//! moment its closing brace arrives, so the example works the same on a
//! finished file and on a live stream that never ends. An optional limit
//! stops the parser, and closes stdin, after that many documents.
//!
//! Run with
//!
//! ```bash
//! printf '{"user":{"name":"ada"},"text":"hello"}\n{"user":{"name":"bob"},"text":"hi"}\n' \
//!     | RUST_LOG=debug cargo run -p jsontap --example tweet_stream -- 1
//! ```

use std::io::{self, Write};

use jsontap::{Parser, ParserOptions, StopHandle, Value, ValueCollector};

fn summary(value: &Value) -> String {
    let user = value
        .get("user")
        .and_then(|u| u.get("name"))
        .and_then(Value::as_str)
        .unwrap_or("?");
    let text = value.get("text").and_then(Value::as_str).unwrap_or("");
    format!("@{user}: {text}")
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let limit: Option<usize> = std::env::args().nth(1).map(|n| n.parse()).transpose()?;

    let handle = StopHandle::new();
    let stopper = handle.clone();
    let mut seen = 0usize;
    let mut stdout = io::stdout().lock();
    let collector = ValueCollector::new(move |value: Value| {
        seen += 1;
        // A closed pipe downstream is not worth aborting the parse for.
        let _ = writeln!(stdout, "{seen:>4} {}", summary(&value));
        if limit.is_some_and(|limit| seen >= limit) {
            stopper.stop();
        }
    });

    let mut parser = Parser::from_reader(io::stdin().lock(), collector, ParserOptions::default())
        .with_stop_handle(handle);
    parser.parse()?;
    eprintln!("{} documents", parser.documents());
    Ok(())
}
