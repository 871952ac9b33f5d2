/// Line and character counters for diagnostics.
///
/// Both counters are 1-based. The column counts bytes within the current
/// line, and skipped byte-order-mark bytes count too.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    /// Current line.
    pub line: usize,
    /// Byte within the current line.
    pub column: usize,
}

impl Default for Position {
    fn default() -> Self {
        Self::new()
    }
}

impl Position {
    /// Line 1, column 1.
    #[must_use]
    pub const fn new() -> Self {
        Self { line: 1, column: 1 }
    }

    /// Moves past the byte that was just consumed.
    pub(crate) fn advance(&mut self) {
        self.column += 1;
    }

    /// Starts a new line. Called by the driver when a chunk ended on the
    /// configured line terminator.
    pub(crate) fn new_line(&mut self) {
        self.line += 1;
        self.column = 1;
    }

    /// True while the byte about to be consumed lies in the first four
    /// positions of the stream, where a byte-order mark may appear.
    pub(crate) fn in_bom_window(self) -> bool {
        self.line == 1 && self.column < 5
    }
}
