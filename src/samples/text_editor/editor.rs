//! The text editor model: text buffer, selection, undo history and presentation state.
//!
//! Positions are char indices into the text; lines are 1-based for error markers and 0-based for
//! the cursor position shown in the status line.

use std::collections::BTreeMap;
use std::ops::Range;
use std::path::Path;

use egui::text::{LayoutJob, TextFormat};
use egui::util::undoer::Undoer;
use egui::{Color32, FontId};
use tracing::debug;

use super::language::{is_identifier_char, LanguageDefinition};
use super::palette::{Palette, PaletteKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub anchor: usize,
    pub cursor: usize,
}

impl Selection {
    pub fn range(&self) -> Range<usize> {
        self.anchor.min(self.cursor)..self.anchor.max(self.cursor)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.cursor
    }
}

/// Language, palette and error markers: what the layouter reads while the widget owns the text.
pub struct Highlighter {
    language: LanguageDefinition,
    palette: Palette,
    error_markers: BTreeMap<usize, String>,
}

impl Highlighter {
    pub fn background(&self) -> Color32 {
        self.palette.background
    }

    /// Whether the widget chrome around the text should use dark visuals.
    pub fn dark_mode(&self) -> bool {
        self.palette.dark_mode
    }

    /// Colors `text` per token and paints error lines with the marker color.
    pub fn layout_job(&self, text: &str, font_id: FontId, wrap_width: f32) -> LayoutJob {
        let mut job = LayoutJob::default();
        job.wrap.max_width = wrap_width;
        let mut line = 1;
        for token in self.language.tokenize(text) {
            let color = self.palette.color(token.kind);
            for segment in text[token.range].split_inclusive('\n') {
                let background = if self.error_markers.contains_key(&line) {
                    self.palette.error_marker
                } else {
                    Color32::TRANSPARENT
                };
                job.append(
                    segment,
                    0.0,
                    TextFormat {
                        font_id: font_id.clone(),
                        color,
                        background,
                        ..Default::default()
                    },
                );
                if segment.ends_with('\n') {
                    line += 1;
                }
            }
        }
        job
    }
}

pub struct TextEditor {
    text: String,
    highlighter: Highlighter,
    read_only: bool,
    selection: Selection,
    // Set when a model operation moved the selection and the widget has not picked it up yet
    pending_selection: bool,
    undoer: Undoer<String>,
}

impl TextEditor {
    pub fn new(language: LanguageDefinition) -> Self {
        let mut editor = Self {
            text: String::new(),
            highlighter: Highlighter {
                language,
                palette: Palette::default(),
                error_markers: BTreeMap::new(),
            },
            read_only: false,
            selection: Selection::default(),
            pending_selection: false,
            undoer: Undoer::default(),
        };
        editor.undoer.add_undo(&editor.text);
        editor
    }

    /// Replaces the whole buffer and starts a fresh undo history.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.undoer = Undoer::default();
        self.undoer.add_undo(&self.text);
        self.set_selection(Selection::default());
    }

    /// Loads a file's raw contents. Returns `false` and leaves the buffer alone when the file
    /// cannot be read.
    pub fn load_file(&mut self, path: &Path) -> bool {
        match std::fs::read(path) {
            Ok(bytes) => {
                self.set_text(String::from_utf8_lossy(&bytes).into_owned());
                true
            }
            Err(e) => {
                debug!("Could not open {}: {e}", path.display());
                false
            }
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The buffer the widget edits in place, next to the state its layouter reads.
    pub fn widget_parts(&mut self) -> (&mut String, &Highlighter) {
        (&mut self.text, &self.highlighter)
    }

    pub fn language(&self) -> &LanguageDefinition {
        &self.highlighter.language
    }

    pub fn line_count(&self) -> usize {
        self.text.split('\n').count()
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_index)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    fn byte_range(&self, chars: Range<usize>) -> Range<usize> {
        self.byte_index(chars.start)..self.byte_index(chars.end)
    }

    pub fn set_selection(&mut self, selection: Selection) {
        let max = self.char_count();
        self.selection = Selection {
            anchor: selection.anchor.min(max),
            cursor: selection.cursor.min(max),
        };
        self.pending_selection = true;
    }

    /// Records the selection the widget reports without echoing it back.
    pub fn sync_selection(&mut self, selection: Selection) {
        let max = self.char_count();
        self.selection = Selection {
            anchor: selection.anchor.min(max),
            cursor: selection.cursor.min(max),
        };
    }

    /// A selection set by a model operation that the widget still has to apply.
    pub fn take_pending_selection(&mut self) -> Option<Selection> {
        std::mem::take(&mut self.pending_selection).then_some(self.selection)
    }

    /// Zero-based (line, column) of the cursor.
    pub fn cursor_position(&self) -> (usize, usize) {
        let before = &self.text[..self.byte_index(self.selection.cursor)];
        let line = before.matches('\n').count();
        let column = before
            .rsplit('\n')
            .next()
            .map(|l| l.chars().count())
            .unwrap_or(0);
        (line, column)
    }

    pub fn has_selection(&self) -> bool {
        !self.selection.is_empty()
    }

    pub fn selected_text(&self) -> Option<&str> {
        self.has_selection()
            .then(|| &self.text[self.byte_range(self.selection.range())])
    }

    pub fn select_all(&mut self) {
        self.set_selection(Selection {
            anchor: 0,
            cursor: self.char_count(),
        });
    }

    pub fn copy(&self) -> Option<String> {
        self.selected_text().map(str::to_string)
    }

    /// Removes the selection and returns it for the clipboard.
    pub fn cut(&mut self) -> Option<String> {
        if self.read_only {
            return None;
        }
        let cut = self.copy()?;
        self.replace_selection("");
        Some(cut)
    }

    /// Deletes the selection, or the char after the cursor when nothing is selected.
    pub fn delete(&mut self) -> bool {
        if self.read_only {
            return false;
        }
        if !self.has_selection() {
            let cursor = self.selection.cursor;
            if cursor >= self.char_count() {
                return false;
            }
            self.selection = Selection {
                anchor: cursor,
                cursor: cursor + 1,
            };
        }
        self.replace_selection("");
        true
    }

    pub fn paste(&mut self, clipboard: &str) -> bool {
        if self.read_only || clipboard.is_empty() {
            return false;
        }
        self.replace_selection(clipboard);
        true
    }

    fn replace_selection(&mut self, replacement: &str) {
        self.undoer.add_undo(&self.text);
        let chars = self.selection.range();
        let bytes = self.byte_range(chars.clone());
        self.text.replace_range(bytes, replacement);
        let cursor = chars.start + replacement.chars().count();
        self.set_selection(Selection {
            anchor: cursor,
            cursor,
        });
    }

    /// Lets the undo history catch up with edits typed into the widget.
    pub fn feed_undo(&mut self, time: f64) {
        self.undoer.feed_state(time, &self.text);
    }

    pub fn can_undo(&self) -> bool {
        !self.read_only && self.undoer.has_undo(&self.text)
    }

    pub fn can_redo(&self) -> bool {
        !self.read_only && self.undoer.has_redo(&self.text)
    }

    pub fn undo(&mut self) -> bool {
        if !self.can_undo() {
            return false;
        }
        match self.undoer.undo(&self.text).cloned() {
            Some(previous) => {
                self.restore(previous);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        if !self.can_redo() {
            return false;
        }
        match self.undoer.redo(&self.text).cloned() {
            Some(next) => {
                self.restore(next);
                true
            }
            None => false,
        }
    }

    fn restore(&mut self, text: String) {
        self.text = text;
        let end = self.char_count();
        let cursor = self.selection.cursor.min(end);
        self.set_selection(Selection {
            anchor: cursor,
            cursor,
        });
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn palette(&self) -> &Palette {
        &self.highlighter.palette
    }

    pub fn set_palette(&mut self, kind: PaletteKind) {
        self.highlighter.palette = Palette::new(kind);
    }

    pub fn set_error_markers(&mut self, markers: BTreeMap<usize, String>) {
        self.highlighter.error_markers = markers;
    }

    pub fn error_marker(&self, line: usize) -> Option<&str> {
        self.highlighter.error_markers.get(&line).map(String::as_str)
    }

    /// The identifier touching `char_index`, if any.
    pub fn word_at(&self, char_index: usize) -> Option<&str> {
        let byte = self.byte_index(char_index);
        let start = self.text[..byte]
            .char_indices()
            .rev()
            .take_while(|(_, c)| is_identifier_char(*c))
            .last()
            .map(|(i, _)| i)
            .unwrap_or(byte);
        let end = self.text[byte..]
            .find(|c: char| !is_identifier_char(c))
            .map(|i| byte + i)
            .unwrap_or(self.text.len());
        (start < end).then(|| &self.text[start..end])
    }

    /// Tooltip for the char under the pointer: a declaration for known identifiers, otherwise the
    /// error marker of that line.
    pub fn hover_text(&self, char_index: usize) -> Option<String> {
        if let Some(declaration) = self
            .word_at(char_index)
            .and_then(|word| self.highlighter.language.declaration(word))
        {
            return Some(declaration.to_string());
        }
        let byte = self.byte_index(char_index);
        let line = self.text[..byte].matches('\n').count() + 1;
        self.error_marker(line)
            .map(|message| format!("Error at line {line}:\n{message}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpp_editor() -> TextEditor {
        TextEditor::new(LanguageDefinition::cplusplus().unwrap())
    }

    fn editor(text: &str) -> TextEditor {
        let mut editor = cpp_editor();
        editor.set_text(text);
        editor
    }

    #[test]
    fn empty_editor() {
        let editor = cpp_editor();
        assert_eq!(editor.text(), "");
        assert_eq!(editor.line_count(), 1);
        assert_eq!(editor.cursor_position(), (0, 0));
        assert!(!editor.has_selection());
        assert!(!editor.can_undo());
        assert_eq!(editor.language().name, "C++");
    }

    #[test]
    fn line_count_and_cursor_position() {
        let mut editor = editor("ab\ncdé\n");
        assert_eq!(editor.line_count(), 3);
        editor.set_selection(Selection {
            anchor: 6,
            cursor: 6,
        });
        assert_eq!(editor.cursor_position(), (1, 3));
        editor.set_selection(Selection {
            anchor: 100,
            cursor: 100,
        });
        assert_eq!(editor.selection.cursor, 7);
        assert_eq!(editor.cursor_position(), (2, 0));
    }

    #[test]
    fn select_all_copy_and_cut() {
        let mut editor = editor("héllo");
        editor.select_all();
        assert_eq!(editor.selected_text(), Some("héllo"));
        assert_eq!(editor.copy().as_deref(), Some("héllo"));
        assert_eq!(editor.cut().as_deref(), Some("héllo"));
        assert_eq!(editor.text(), "");
        assert!(editor.cut().is_none());
    }

    #[test]
    fn paste_replaces_selection() {
        let mut editor = editor("one two three");
        editor.set_selection(Selection {
            anchor: 4,
            cursor: 7,
        });
        assert!(editor.paste("2"));
        assert_eq!(editor.text(), "one 2 three");
        assert_eq!(editor.selection.cursor, 5);
        assert!(!editor.has_selection());
    }

    #[test]
    fn delete_without_selection_removes_next_char() {
        let mut editor = editor("abc");
        editor.set_selection(Selection {
            anchor: 1,
            cursor: 1,
        });
        assert!(editor.delete());
        assert_eq!(editor.text(), "ac");
        editor.set_selection(Selection {
            anchor: 2,
            cursor: 2,
        });
        assert!(!editor.delete());
    }

    #[test]
    fn undo_and_redo() {
        let mut editor = editor("hello");
        editor.select_all();
        editor.delete();
        assert_eq!(editor.text(), "");
        assert!(editor.can_undo());
        assert!(editor.undo());
        assert_eq!(editor.text(), "hello");
        assert!(editor.can_redo());
        assert!(editor.redo());
        assert_eq!(editor.text(), "");
        assert!(!editor.can_redo());
    }

    #[test]
    fn set_text_resets_history() {
        let mut editor = editor("a");
        editor.select_all();
        editor.paste("b");
        editor.set_text("c");
        assert!(!editor.can_undo());
        assert!(!editor.undo());
        assert_eq!(editor.text(), "c");
    }

    #[test]
    fn read_only_refuses_mutation() {
        let mut editor = editor("fixed");
        editor.set_read_only(true);
        editor.select_all();
        assert_eq!(editor.copy().as_deref(), Some("fixed"));
        assert!(editor.cut().is_none());
        assert!(!editor.delete());
        assert!(!editor.paste("x"));
        assert!(!editor.undo());
        assert_eq!(editor.text(), "fixed");

        editor.set_read_only(false);
        assert!(editor.paste("x"));
        assert_eq!(editor.text(), "x");
    }

    #[test]
    fn pending_selection_is_taken_once() {
        let mut editor = editor("abc");
        assert!(editor.take_pending_selection().is_some());
        assert!(editor.take_pending_selection().is_none());
        editor.sync_selection(Selection {
            anchor: 0,
            cursor: 2,
        });
        assert!(editor.take_pending_selection().is_none());
        assert_eq!(editor.selected_text(), Some("ab"));
    }

    #[test]
    fn error_markers_and_hover() {
        let mut editor = TextEditor::new(
            LanguageDefinition::cplusplus()
                .unwrap()
                .with_identifiers([("HWND", "typedef HWND_* HWND")]),
        );
        editor.set_text("int a;\nHWND w;\n");
        editor.set_error_markers(BTreeMap::from([(1, "bad".to_string())]));

        assert_eq!(editor.error_marker(1), Some("bad"));
        assert_eq!(editor.error_marker(2), None);
        assert_eq!(editor.word_at(9), Some("HWND"));
        assert_eq!(editor.hover_text(9).as_deref(), Some("typedef HWND_* HWND"));
        assert_eq!(
            editor.hover_text(4).as_deref(),
            Some("Error at line 1:\nbad")
        );
        assert_eq!(editor.hover_text(12), None);
    }

    #[test]
    fn palette_switch() {
        let mut editor = cpp_editor();
        assert!(editor.highlighter.dark_mode());
        editor.set_palette(PaletteKind::Light);
        assert_eq!(editor.palette().kind, PaletteKind::Light);
        assert!(!editor.highlighter.dark_mode());
        assert_eq!(editor.highlighter.background(), Color32::WHITE);
        editor.set_palette(PaletteKind::RetroBlue);
        assert_eq!(editor.palette().kind, PaletteKind::RetroBlue);
        assert!(editor.highlighter.dark_mode());
    }

    #[test]
    fn layout_job_covers_text_and_marks_error_lines() {
        let mut editor = cpp_editor();
        editor.set_error_markers(BTreeMap::from([(2, "oops".to_string())]));
        let text = "int x;\n/* a\nb */ y";
        let job = editor.highlighter.layout_job(text, FontId::monospace(12.0), f32::INFINITY);
        assert_eq!(job.text, text);

        let marker = editor.palette().error_marker;
        for section in &job.sections {
            let segment = &job.text[section.byte_range.clone()];
            let on_line_two = section.byte_range.start >= 7 && section.byte_range.start < 12;
            assert_eq!(
                section.format.background == marker,
                on_line_two,
                "segment {segment:?}"
            );
        }
        let keyword = &job.sections[0];
        assert_eq!(&job.text[keyword.byte_range.clone()], "int");
        assert_eq!(keyword.format.color, editor.palette().keyword);
    }
}
