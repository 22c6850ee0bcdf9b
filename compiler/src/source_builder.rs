/// Line-oriented writer for brace-delimited source text.
///
/// A line ending in `{` opens a block and indents the lines after it;
/// [`SourceBuilder::end_block`] closes it again.
pub struct SourceBuilder {
    out:         String,
    indent:      usize,
    indent_unit: String,
}

impl SourceBuilder {
    pub fn new(indent_spaces: usize) -> Self {
        SourceBuilder {
            out:         String::new(),
            indent:      0,
            indent_unit: " ".repeat(indent_spaces),
        }
    }

    pub fn writeln(&mut self, line: &str) {
        if !line.is_empty() {
            for _ in 0..self.indent {
                self.out.push_str(&self.indent_unit);
            }
            self.out.push_str(line);
        }
        self.out.push('\n');
        if line.ends_with('{') {
            self.indent += 1;
        }
    }

    pub fn blank_line(&mut self) {
        self.writeln("");
    }

    pub fn end_block(&mut self) {
        self.end_block_with("");
    }

    /// Closes a block whose brace needs a trailing token, e.g. `};`.
    pub fn end_block_with(&mut self, suffix: &str) {
        self.dedent();
        self.writeln(&format!("}}{}", suffix));
    }

    /// Writes `line` one level further out, as for `public:` labels.
    pub fn writeln_outdented(&mut self, line: &str) {
        self.dedent();
        self.writeln(line);
        self.indent += 1;
    }

    fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn finish(self) -> String {
        self.out
    }
}
