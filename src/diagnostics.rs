//! The diagnostic channel: semantic errors accumulate here
//! and never abort the walk. Parse errors are folded into the same
//! shape once the parser gives up on a declaration and resynchronizes.

use std::fmt;

use serde::Serialize;

use crate::style::Style;
use crate::token::Span;

#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub message: String,
    pub file: String,
    pub offset: usize,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, file: impl Into<String>, offset: usize) -> Self {
        Diagnostic {
            message: message.into(),
            file: file.into(),
            offset,
        }
    }

    /// Renders the user-visible `path:offset: message` form, with a
    /// source-line excerpt and a caret pointing at the offset.
    pub fn display_with_source(&self, source: &str) -> String {
        let (line_num, line_start, line_content) = Self::find_context(source, self.offset);
        let col = self.offset.saturating_sub(line_start);
        let underline = format!("{}{}", " ".repeat(col), Style::red("^"));

        format!(
            "{}:{}: {}\n{} {} {}\n     {} {}",
            self.file,
            self.offset,
            Style::bold_red(&self.message),
            Style::blue(&format!("{:4}", line_num)),
            Style::blue("|"),
            line_content,
            Style::blue("|"),
            underline,
        )
    }

    fn find_context(source: &str, offset: usize) -> (usize, usize, &str) {
        let mut line_num = 1;
        let mut line_start = 0;
        for (i, c) in source.char_indices() {
            if i >= offset {
                break;
            }
            if c == '\n' {
                line_num += 1;
                line_start = i + 1;
            }
        }
        let line_end = source[line_start..]
            .find('\n')
            .map(|off| line_start + off)
            .unwrap_or(source.len());
        (line_num, line_start, &source[line_start..line_end])
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.file, self.offset, self.message)
    }
}

/// Append-only sink for diagnostics. The checker never consults this to
/// decide whether to keep walking — only the driver reads it, at the end.
#[derive(Debug, Default, Clone)]
pub struct DiagnosticChannel {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn report(&mut self, message: impl Into<String>, file: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic::new(message, file, span.start));
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_appends_without_clearing() {
        let mut channel = DiagnosticChannel::new();
        channel.report("first", "a.truk", Span::new(0, 1));
        channel.report("second", "a.truk", Span::new(5, 6));
        assert_eq!(channel.len(), 2);
    }

    #[test]
    fn display_uses_path_offset_message_form() {
        let d = Diagnostic::new("Undefined identifier: x", "a.truk", 12);
        assert_eq!(format!("{}", d), "a.truk:12: Undefined identifier: x");
    }

    #[test]
    fn is_empty_true_for_fresh_channel() {
        let channel = DiagnosticChannel::new();
        assert!(channel.is_empty());
    }
}
