//! Line/column lookup and source-aware rendering of diagnostics.

use std::fmt::Write;

use cel_ir::Span;

use crate::Diagnostic;

/// Byte offset of every line start, for O(log L) line lookup.
///
/// ```
/// use cel_diagnostic::span_utils::LineOffsetTable;
///
/// let source = "a &&\n  b";
/// let table = LineOffsetTable::build(source);
/// assert_eq!(table.offset_to_line_col(source, 0), (1, 1));
/// assert_eq!(table.offset_to_line_col(source, 7), (2, 3));
/// ```
#[derive(Clone, Debug, Default)]
pub struct LineOffsetTable {
    offsets: Vec<usize>,
}

impl LineOffsetTable {
    pub fn build(source: &str) -> Self {
        let mut offsets = vec![0];
        offsets.extend(
            source
                .bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );
        LineOffsetTable { offsets }
    }

    /// 1-based line containing `offset`.
    pub fn line_from_offset(&self, offset: u32) -> usize {
        let offset = offset as usize;
        match self.offsets.binary_search(&offset) {
            Ok(exact) => exact + 1,
            Err(insert) => insert.max(1),
        }
    }

    /// 1-based (line, column); the column counts characters, not bytes.
    pub fn offset_to_line_col(&self, source: &str, offset: u32) -> (usize, usize) {
        let line = self.line_from_offset(offset);
        let line_start = self.offsets.get(line - 1).copied().unwrap_or(0);
        let end = (offset as usize).min(source.len());
        let col = source
            .get(line_start..end)
            .map_or(0, |prefix| prefix.chars().count());
        (line, col + 1)
    }

    /// Text of a 1-based line without its newline.
    pub fn line_text<'s>(&self, source: &'s str, line: usize) -> &'s str {
        let Some(&start) = self.offsets.get(line.wrapping_sub(1)) else {
            return "";
        };
        let end = self.offsets.get(line).map_or(source.len(), |next| next - 1);
        source.get(start..end).unwrap_or("")
    }

    pub fn line_count(&self) -> usize {
        self.offsets.len()
    }
}

/// Render a diagnostic with `line:col` locations and a caret excerpt.
///
/// ```text
/// error [E2002]: found no matching overload for `size` applied to `(int)`
///  --> 1:1
///   |
/// 1 | size(1)
///   | ^^^^^^^ no overload accepts these argument types
/// ```
pub fn render(diagnostic: &Diagnostic, source: &str) -> String {
    render_with_table(diagnostic, source, &LineOffsetTable::build(source))
}

/// Render several diagnostics against the same source, blank-line separated.
pub fn render_all(diagnostics: &[Diagnostic], source: &str) -> String {
    let table = LineOffsetTable::build(source);
    diagnostics
        .iter()
        .map(|d| render_with_table(d, source, &table))
        .collect::<Vec<_>>()
        .join("\n\n")
}

fn render_with_table(diagnostic: &Diagnostic, source: &str, table: &LineOffsetTable) -> String {
    let mut out = format!(
        "{} [{}]: {}",
        diagnostic.severity, diagnostic.code, diagnostic.message
    );
    for label in &diagnostic.labels {
        excerpt(&mut out, source, table, label.span, &label.message, label.is_primary);
    }
    for note in &diagnostic.notes {
        let _ = write!(out, "\n  = note: {note}");
    }
    out
}

fn excerpt(
    out: &mut String,
    source: &str,
    table: &LineOffsetTable,
    span: Span,
    message: &str,
    primary: bool,
) {
    let (line, col) = table.offset_to_line_col(source, span.start);
    let text = table.line_text(source, line);
    let gutter = line.to_string();
    let pad = " ".repeat(gutter.len());

    // Underline only the part of the span on its first line.
    let (end_line, end_col) = table.offset_to_line_col(source, span.end);
    let width = if end_line == line {
        end_col.saturating_sub(col).max(1)
    } else {
        text.chars().count().saturating_sub(col - 1).max(1)
    };
    let marker = if primary { '^' } else { '-' };

    let _ = write!(out, "\n{pad}--> {line}:{col}");
    let _ = write!(out, "\n{pad} |");
    let _ = write!(out, "\n{gutter} | {text}");
    let _ = write!(
        out,
        "\n{pad} | {}{} {message}",
        " ".repeat(col - 1),
        marker.to_string().repeat(width)
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Diagnostic, ErrorCode};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_line_lookup() {
        let source = "line1\nline2\nline3";
        let table = LineOffsetTable::build(source);
        assert_eq!(table.line_count(), 3);
        assert_eq!(table.line_from_offset(0), 1);
        assert_eq!(table.line_from_offset(5), 1);
        assert_eq!(table.line_from_offset(6), 2);
        assert_eq!(table.line_from_offset(12), 3);
        assert_eq!(table.line_text(source, 2), "line2");
        assert_eq!(table.line_text(source, 4), "");
    }

    #[test]
    fn test_offset_to_line_col_unicode() {
        let source = "αβγ\nδε";
        let table = LineOffsetTable::build(source);
        assert_eq!(table.offset_to_line_col(source, 4), (1, 3));
        assert_eq!(table.offset_to_line_col(source, 7), (2, 1));
    }

    #[test]
    fn test_render_excerpt() {
        let source = "x &&\nsize(1)";
        let diag = Diagnostic::error(ErrorCode::E2002)
            .with_message("no overload")
            .with_label(Span::new(5, 12), "here");
        assert_eq!(
            render(&diag, source),
            "error [E2002]: no overload\n --> 2:1\n  |\n2 | size(1)\n  | ^^^^^^^ here"
        );
    }
}
