/// Knobs for a single parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseConfig {
    /// Nesting budget. Blocks, `if`/`for` statements, parentheses, unary
    /// operands, call suffixes, binary operators on one chain and `else if`
    /// links each take one level; the parse is refused once it runs out.
    ///
    /// The default keeps the deepest accepted tree within a 2 MiB thread
    /// stack in a debug build.
    pub max_depth: u32,
    /// Keep going after a syntax error by skipping to the next `func`.
    pub recover_top_level: bool,
}

impl ParseConfig {
    pub const DEFAULT_MAX_DEPTH: u32 = 128;

    pub const fn new() -> Self {
        Self {
            max_depth: Self::DEFAULT_MAX_DEPTH,
            recover_top_level: false,
        }
    }

    pub const fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub const fn with_recovery(mut self, recover: bool) -> Self {
        self.recover_top_level = recover;
        self
    }
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self::new()
    }
}
