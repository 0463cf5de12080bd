//! Indented block writer
//!
//! Writes nested `header` ... `end` blocks, tracking the indentation level.
//! Knows nothing about schemas.

/// Text buffer with block-structured indentation
#[derive(Debug, Clone)]
pub struct BlockWriter {
    buffer: String,
    depth: usize,
    indent_width: usize,
    closer: String,
}

impl Default for BlockWriter {
    fn default() -> Self {
        Self::new(2, "end")
    }
}

impl BlockWriter {
    pub fn new(indent_width: usize, closer: &str) -> Self {
        Self {
            buffer: String::new(),
            depth: 0,
            indent_width,
            closer: closer.to_string(),
        }
    }

    /// Number of currently open blocks
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Write `text` at the current indentation
    pub fn write_line(&mut self, text: &str) {
        if !text.is_empty() {
            self.buffer
                .extend(std::iter::repeat(' ').take(self.depth * self.indent_width));
            self.buffer.push_str(text);
        }
        self.buffer.push('\n');
    }

    /// Write an empty line
    pub fn blank_line(&mut self) {
        self.buffer.push('\n');
    }

    /// Write `header` and indent everything after it one level deeper
    pub fn open_block(&mut self, header: &str) {
        self.write_line(header);
        self.depth += 1;
    }

    /// Close the innermost block followed by a blank separator line
    pub fn close_block(&mut self) {
        self.close(true);
    }

    /// Close the innermost block without the blank separator line
    pub fn close_block_tight(&mut self) {
        self.close(false);
    }

    fn close(&mut self, blank: bool) {
        if self.depth == 0 {
            tracing::warn!("Ignoring close of a block that was never opened");
            return;
        }
        self.depth -= 1;
        let closer = self.closer.clone();
        self.write_line(&closer);
        if blank {
            self.blank_line();
        }
    }

    /// Close every open block, returning how many were still open
    pub fn finish(&mut self) -> usize {
        let open = self.depth;
        while self.depth > 0 {
            self.close_block_tight();
        }
        open
    }

    pub fn as_str(&self) -> &str {
        &self.buffer
    }

    pub fn into_string(self) -> String {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_nested_blocks_are_indented() {
        let mut writer = BlockWriter::default();
        writer.open_block("outer do");
        writer.open_block("inner do");
        writer.write_line("body");
        writer.close_block();
        writer.write_line("after");
        writer.finish();

        assert_eq!(
            writer.as_str(),
            "outer do\n  inner do\n    body\n  end\n\n  after\nend\n"
        );
    }

    #[test]
    fn test_finish_closes_every_open_block() {
        for opens in 0..6 {
            for closes in 0..=opens {
                let mut writer = BlockWriter::new(4, "}");
                for level in 0..opens {
                    writer.open_block(&format!("block{level} {{"));
                }
                for _ in 0..closes {
                    writer.close_block();
                }

                assert_eq!(writer.finish(), opens - closes);
                assert_eq!(writer.depth(), 0);

                let text = writer.into_string();
                let opened = text.lines().filter(|l| l.ends_with('{')).count();
                let closed = text.lines().filter(|l| l.trim() == "}").count();
                assert_eq!(opened, closed);
                assert!(text.lines().last().map_or(true, |l| !l.starts_with(' ')));
            }
        }
    }

    #[test]
    fn test_extra_close_is_ignored() {
        let mut writer = BlockWriter::default();
        writer.close_block();
        writer.write_line("top");

        assert_eq!(writer.depth(), 0);
        assert_eq!(writer.as_str(), "top\n");
    }

    #[test]
    fn test_custom_indent_width() {
        let mut writer = BlockWriter::new(4, "end");
        writer.open_block("a");
        writer.write_line("b");
        writer.finish();

        assert_eq!(writer.into_string(), "a\n    b\nend\n");
    }
}
