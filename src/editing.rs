//! Key handling over a plain text buffer.
//!
//! Translates the editor keys that care about indentation into text
//! edits, without depending on any editor framework:
//!
//! | Key | Behaviour |
//! |-----|-----------|
//! | Enter | New line indented by [`AutoIndentEngine::calculate_indent`]; a blank line is cleared and its width carried over |
//! | Tab | Insert one tab string, or indent every selected line |
//! | Shift+Tab | Remove up to one level of leading indentation from every touched line |
//!
//! Offsets are byte offsets into the buffer.
//!
//! ```rust
//! use jupyter_autoindent::editing::{apply_edits, handle_key, Key, Selection};
//! use jupyter_autoindent::AutoIndentEngine;
//!
//! let engine = AutoIndentEngine::default();
//! let source = "def f():";
//! let outcome = handle_key(&engine, source, Selection::cursor(source.len()), Some("python"), Key::Enter);
//!
//! assert_eq!(apply_edits(source, &outcome.edits), "def f():\n    ");
//! assert_eq!(outcome.selection, Selection::cursor(13));
//! ```

use std::ops::Range;

use serde::Serialize;

use crate::engine::{leading_whitespace_width, AutoIndentEngine};
use crate::types::IndentContext;

/// Keys with indentation behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Tab,
    ShiftTab,
}

/// A selection between two byte offsets; collapsed when they are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Selection {
    pub anchor: usize,
    pub head: usize,
}

impl Selection {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    pub fn cursor(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }
}

/// Replace `range` of the buffer with `text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub range: Range<usize>,
    pub text: String,
}

impl TextEdit {
    pub fn insert(at: usize, text: impl Into<String>) -> Self {
        Self {
            range: at..at,
            text: text.into(),
        }
    }

    pub fn delete(range: Range<usize>) -> Self {
        Self {
            range,
            text: String::new(),
        }
    }
}

/// Edits produced for one key press, and where the selection lands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyOutcome {
    /// Non-overlapping edits in ascending order.
    pub edits: Vec<TextEdit>,
    pub selection: Selection,
}

/// Compute the edits for `key` at `selection`.
pub fn handle_key(
    engine: &AutoIndentEngine,
    source: &str,
    selection: Selection,
    language: Option<&str>,
    key: Key,
) -> KeyOutcome {
    let selection = Selection::new(
        clamp_offset(source, selection.anchor),
        clamp_offset(source, selection.head),
    );

    let edits = match key {
        Key::Enter => vec![enter(engine, source, selection, language)],
        Key::Tab if selection.is_collapsed() => {
            vec![TextEdit::insert(selection.head, engine.get_tab_string(language))]
        }
        Key::Tab => {
            let tab = engine.get_tab_string(language);
            touched_lines(source, selection)
                .map(|start| TextEdit::insert(start, tab.clone()))
                .collect()
        }
        Key::ShiftTab => outdent(source, selection, engine.get_tab_size(language)),
    };

    let selection = Selection::new(
        map_offset(selection.anchor, &edits),
        map_offset(selection.head, &edits),
    );
    KeyOutcome { edits, selection }
}

fn enter(
    engine: &AutoIndentEngine,
    source: &str,
    selection: Selection,
    language: Option<&str>,
) -> TextEdit {
    let (start, end) = (selection.start(), selection.end());
    let begin = line_start(source, start);
    let line_end = source[start..].find('\n').map_or(source.len(), |idx| start + idx);
    let full_line = &source[begin..line_end];

    if full_line.trim().is_empty() {
        // Drop the dangling whitespace but keep its width for the new line.
        let width = leading_whitespace_width(full_line);
        return TextEdit {
            range: begin..end.max(line_end),
            text: format!("\n{}", indent_string(engine, width, language)),
        };
    }

    let line = &source[begin..start];

    let mut context = IndentContext::new(line, language.unwrap_or_default())
        .with_current_indent(leading_whitespace_width(line))
        .with_cursor_position(start - begin);
    if begin > 0 {
        let previous = line_start(source, begin - 1);
        context = context.with_previous_line(&source[previous..begin - 1]);
    }

    let result = engine.calculate_indent(&context);
    TextEdit {
        range: start..end,
        text: format!("\n{}", indent_string(engine, result.spaces, language)),
    }
}

fn outdent(source: &str, selection: Selection, tab_size: usize) -> Vec<TextEdit> {
    touched_lines(source, selection)
        .filter_map(|start| {
            let rest = &source[start..];
            let count = if rest.starts_with('\t') {
                1
            } else {
                rest.bytes().take(tab_size).take_while(|&b| b == b' ').count()
            };
            (count > 0).then(|| TextEdit::delete(start..start + count))
        })
        .collect()
}

/// Render a width in the language's indentation style.
pub fn indent_string(engine: &AutoIndentEngine, spaces: usize, language: Option<&str>) -> String {
    if engine.uses_tabs(language) {
        let tab_size = engine.get_tab_size(language);
        let mut out = "\t".repeat(spaces / tab_size);
        out.push_str(&" ".repeat(spaces % tab_size));
        out
    } else {
        " ".repeat(spaces)
    }
}

/// Apply non-overlapping edits to `source`.
pub fn apply_edits(source: &str, edits: &[TextEdit]) -> String {
    let mut sorted: Vec<&TextEdit> = edits.iter().collect();
    sorted.sort_by_key(|edit| edit.range.start);

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for edit in sorted {
        out.push_str(&source[cursor..edit.range.start]);
        out.push_str(&edit.text);
        cursor = edit.range.end;
    }
    out.push_str(&source[cursor..]);
    out
}

/// Starts of every line the selection touches.
///
/// A non-empty selection ending exactly at a line start does not touch
/// that line.
fn touched_lines(source: &str, selection: Selection) -> impl Iterator<Item = usize> + '_ {
    let first = line_start(source, selection.start());
    let end = selection.end();
    let last = if end > selection.start() && line_start(source, end) == end {
        end - 1
    } else {
        end
    };

    std::iter::once(first).chain(
        source[first..last]
            .match_indices('\n')
            .map(move |(idx, _)| first + idx + 1),
    )
}

fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map_or(0, |idx| idx + 1)
}

fn clamp_offset(source: &str, offset: usize) -> usize {
    let mut offset = offset.min(source.len());
    while !source.is_char_boundary(offset) {
        offset -= 1;
    }
    offset
}

/// Where `offset` ends up after `edits`.
fn map_offset(offset: usize, edits: &[TextEdit]) -> usize {
    let mut mapped = offset;
    for edit in edits {
        if edit.range.end <= offset {
            mapped = mapped + edit.text.len() - edit.range.len();
        } else if edit.range.start < offset {
            mapped = mapped + edit.range.start - offset.min(edit.range.end) + edit.text.len();
        }
    }
    mapped
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn press(source: &str, selection: Selection, language: &str, key: Key) -> (String, Selection) {
        let engine = AutoIndentEngine::default();
        let outcome = handle_key(&engine, source, selection, Some(language), key);
        (apply_edits(source, &outcome.edits), outcome.selection)
    }

    #[test]
    fn test_enter_after_block_opener() {
        let source = "if x:\n    for y in z:";
        let (text, selection) = press(source, Selection::cursor(source.len()), "python", Key::Enter);
        assert_eq!(text, "if x:\n    for y in z:\n        ");
        assert_eq!(selection, Selection::cursor(text.len()));
    }

    #[test]
    fn test_enter_preserves_plain_line() {
        let source = "  foo();";
        let (text, _) = press(source, Selection::cursor(source.len()), "javascript", Key::Enter);
        assert_eq!(text, "  foo();\n  ");
    }

    #[test]
    fn test_enter_on_blank_line_clears_it() {
        let source = "def f():\n    ";
        let (text, selection) = press(source, Selection::cursor(source.len()), "python", Key::Enter);
        assert_eq!(text, "def f():\n\n    ");
        assert_eq!(selection, Selection::cursor(text.len()));
    }

    #[test]
    fn test_enter_in_leading_whitespace_splits_line() {
        let source = "    foo";
        let (text, selection) = press(source, Selection::cursor(2), "python", Key::Enter);
        assert_eq!(text, "  \n    foo");
        assert_eq!(selection, Selection::cursor(5));
    }

    #[test]
    fn test_enter_inside_blank_line_clears_all_of_it() {
        let source = "x = 1\n      \ny = 2";
        let (text, selection) = press(source, Selection::cursor(8), "python", Key::Enter);
        assert_eq!(text, "x = 1\n\n      \ny = 2");
        assert_eq!(selection, Selection::cursor(13));
    }

    #[test]
    fn test_enter_uses_text_before_cursor() {
        let source = "if x: pass";
        let (text, selection) = press(source, Selection::cursor(5), "python", Key::Enter);
        assert_eq!(text, "if x:\n     pass");
        assert_eq!(selection, Selection::cursor(10));
    }

    #[test]
    fn test_enter_replaces_selection() {
        let source = "const a = [XYZ";
        let (text, _) = press(source, Selection::new(14, 11), "js", Key::Enter);
        assert_eq!(text, "const a = [\n  ");
    }

    #[test]
    fn test_tab_collapsed_inserts_tab_string() {
        let (text, selection) = press("ab", Selection::cursor(1), "js", Key::Tab);
        assert_eq!(text, "a  b");
        assert_eq!(selection, Selection::cursor(3));
    }

    #[test]
    fn test_tab_indents_selected_lines() {
        let source = "a\nb\nc\n";
        let (text, _) = press(source, Selection::new(0, 4), "python", Key::Tab);
        assert_eq!(text, "    a\n    b\nc\n");
    }

    #[test]
    fn test_shift_tab_outdents_touched_lines() {
        let source = "      a\n\tb\n c";
        let (text, _) = press(source, Selection::new(2, source.len()), "python", Key::ShiftTab);
        assert_eq!(text, "  a\nb\nc");
    }

    #[test]
    fn test_shift_tab_on_cursor_line() {
        let source = "x\n    y";
        let (text, selection) = press(source, Selection::cursor(4), "python", Key::ShiftTab);
        assert_eq!(text, "x\ny");
        assert_eq!(selection, Selection::cursor(2));
    }

    #[test]
    fn test_out_of_range_selection_is_clamped() {
        let (text, _) = press("é", Selection::cursor(1), "python", Key::Tab);
        assert_eq!(text, "    é");
        let (text, _) = press("x", Selection::cursor(99), "python", Key::Tab);
        assert_eq!(text, "x    ");
    }

    #[test]
    fn test_indent_string_with_tabs() {
        let engine = AutoIndentEngine::default();
        engine
            .registry()
            .update_config("python", crate::types::ConfigUpdate::default().use_tabs(true));
        assert_eq!(indent_string(&engine, 10, Some("python")), "\t\t  ");
        assert_eq!(indent_string(&engine, 3, Some("js")), "   ");
    }
}
