/// Configuration options for the streaming parser.
///
/// # Examples
///
/// ```rust
/// use jsontap::ParserOptions;
///
/// let options = ParserOptions {
///     emit_whitespace: true,
///     chunk_size: 1024,
///     ..Default::default()
/// };
/// assert_eq!(options.line_ending, "\n");
/// ```
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Whether whitespace between tokens is forwarded to
    /// [`Listener::whitespace`](crate::Listener::whitespace).
    ///
    /// # Default
    ///
    /// `false`
    pub emit_whitespace: bool,

    /// Terminator at which a chunked read stops early.
    ///
    /// The terminator is still delivered to the parser as input; reading a
    /// chunk that ends with it advances the line counter used in error
    /// positions.
    ///
    /// # Default
    ///
    /// `"\n"`
    pub line_ending: String,

    /// Maximum number of bytes requested from the source per read.
    ///
    /// # Default
    ///
    /// `8192`
    pub chunk_size: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            emit_whitespace: false,
            line_ending: String::from("\n"),
            chunk_size: 8192,
        }
    }
}

#[cfg(all(test, feature = "serde"))]
mod tests {
    use super::ParserOptions;

    #[test]
    fn deserializes_with_defaults() {
        let options: ParserOptions =
            serde_json::from_str(r#"{"emit_whitespace": true}"#).unwrap();
        assert_eq!(
            options,
            ParserOptions {
                emit_whitespace: true,
                ..Default::default()
            }
        );
    }
}
