//! Plain-text editing buffer for topic notes.
//!
//! The buffer IS the model: every keystroke mutates it directly and `text()`
//! is what gets saved. Cursor positions are (row, column) in characters, with
//! the column clamped to the current line on vertical movement.

use crate::util::sanitize_paste;

#[derive(Debug, Default)]
pub struct NoteBuffer {
    lines: Vec<String>,
    cursor_row: usize,
    cursor_col: usize,
    dirty: bool,
}

impl NoteBuffer {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            ..Self::default()
        }
    }

    /// Replaces the buffer with `content`, resetting the cursor and the
    /// dirty flag. Used when a topic's notes finish loading.
    pub fn set_content(&mut self, content: &str) {
        self.lines = content.split('\n').map(str::to_string).collect();
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.cursor_row = 0;
        self.cursor_col = 0;
        self.dirty = false;
    }

    /// Full buffer contents as a single string.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn cursor(&self) -> (usize, usize) {
        (self.cursor_row, self.cursor_col)
    }

    /// True when the buffer has unsaved edits.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    fn line_len(&self, row: usize) -> usize {
        self.lines.get(row).map_or(0, |l| l.chars().count())
    }

    /// Byte offset of the cursor column within the current line.
    fn byte_col(&self, row: usize, col: usize) -> usize {
        self.lines[row]
            .char_indices()
            .nth(col)
            .map_or_else(|| self.lines[row].len(), |(i, _)| i)
    }

    pub fn insert_char(&mut self, c: char) {
        let at = self.byte_col(self.cursor_row, self.cursor_col);
        self.lines[self.cursor_row].insert(at, c);
        self.cursor_col += 1;
        self.dirty = true;
    }

    pub fn newline(&mut self) {
        let at = self.byte_col(self.cursor_row, self.cursor_col);
        let rest = self.lines[self.cursor_row].split_off(at);
        self.lines.insert(self.cursor_row + 1, rest);
        self.cursor_row += 1;
        self.cursor_col = 0;
        self.dirty = true;
    }

    pub fn backspace(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
            let at = self.byte_col(self.cursor_row, self.cursor_col);
            self.lines[self.cursor_row].remove(at);
            self.dirty = true;
        } else if self.cursor_row > 0 {
            let line = self.lines.remove(self.cursor_row);
            self.cursor_row -= 1;
            self.cursor_col = self.line_len(self.cursor_row);
            self.lines[self.cursor_row].push_str(&line);
            self.dirty = true;
        }
    }

    pub fn delete(&mut self) {
        if self.cursor_col < self.line_len(self.cursor_row) {
            let at = self.byte_col(self.cursor_row, self.cursor_col);
            self.lines[self.cursor_row].remove(at);
            self.dirty = true;
        } else if self.cursor_row + 1 < self.lines.len() {
            let line = self.lines.remove(self.cursor_row + 1);
            self.lines[self.cursor_row].push_str(&line);
            self.dirty = true;
        }
    }

    pub fn move_left(&mut self) {
        if self.cursor_col > 0 {
            self.cursor_col -= 1;
        } else if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = self.line_len(self.cursor_row);
        }
    }

    pub fn move_right(&mut self) {
        if self.cursor_col < self.line_len(self.cursor_row) {
            self.cursor_col += 1;
        } else if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.cursor_col = 0;
        }
    }

    pub fn move_up(&mut self) {
        if self.cursor_row > 0 {
            self.cursor_row -= 1;
            self.cursor_col = self.cursor_col.min(self.line_len(self.cursor_row));
        }
    }

    pub fn move_down(&mut self) {
        if self.cursor_row + 1 < self.lines.len() {
            self.cursor_row += 1;
            self.cursor_col = self.cursor_col.min(self.line_len(self.cursor_row));
        }
    }

    pub fn move_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_col = self.line_len(self.cursor_row);
    }

    /// Inserts a clipboard payload at the cursor.
    ///
    /// The text is taken literally (after control-character sanitization) —
    /// markup like `<b>` is inserted as-is, never interpreted. The caret ends
    /// up immediately after the inserted text.
    pub fn paste(&mut self, payload: &str) {
        let clean = sanitize_paste(payload);
        if clean.is_empty() {
            return;
        }

        let at = self.byte_col(self.cursor_row, self.cursor_col);
        let tail = self.lines[self.cursor_row].split_off(at);

        let mut parts = clean.split('\n');
        if let Some(first) = parts.next() {
            self.lines[self.cursor_row].push_str(first);
            self.cursor_col += first.chars().count();
        }
        for part in parts {
            self.cursor_row += 1;
            self.lines.insert(self.cursor_row, part.to_string());
            self.cursor_col = part.chars().count();
        }
        self.lines[self.cursor_row].push_str(&tail);
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_insert_and_text() {
        let mut buf = NoteBuffer::new();
        for c in "hi".chars() {
            buf.insert_char(c);
        }
        buf.newline();
        buf.insert_char('!');
        assert_eq!(buf.text(), "hi\n!");
        assert!(buf.is_dirty());
    }

    #[test]
    fn test_set_content_resets_dirty_and_cursor() {
        let mut buf = NoteBuffer::new();
        buf.insert_char('x');
        buf.set_content("line one\nline two");
        assert_eq!(buf.lines().len(), 2);
        assert_eq!(buf.cursor(), (0, 0));
        assert!(!buf.is_dirty());
    }

    #[test]
    fn test_paste_is_literal_text() {
        let mut buf = NoteBuffer::new();
        buf.paste("a<b>");
        assert_eq!(buf.text(), "a<b>");
    }

    #[test]
    fn test_paste_places_caret_after_insert() {
        let mut buf = NoteBuffer::new();
        buf.set_content("startend");
        for _ in 0..5 {
            buf.move_right();
        }
        buf.paste("MID");
        assert_eq!(buf.text(), "startMIDend");
        assert_eq!(buf.cursor(), (0, 8));
    }

    #[test]
    fn test_paste_multiline() {
        let mut buf = NoteBuffer::new();
        buf.set_content("ab");
        buf.move_right();
        buf.paste("1\n2");
        assert_eq!(buf.text(), "a1\n2b");
        assert_eq!(buf.cursor(), (1, 1));
    }

    #[test]
    fn test_backspace_joins_lines() {
        let mut buf = NoteBuffer::new();
        buf.set_content("ab\ncd");
        buf.move_down();
        buf.backspace();
        assert_eq!(buf.text(), "abcd");
        assert_eq!(buf.cursor(), (0, 2));
    }

    #[test]
    fn test_vertical_move_clamps_column() {
        let mut buf = NoteBuffer::new();
        buf.set_content("longer line\nab");
        buf.move_end();
        buf.move_down();
        assert_eq!(buf.cursor(), (1, 2));
    }

    #[test]
    fn test_unicode_cursor_and_edit() {
        let mut buf = NoteBuffer::new();
        buf.set_content("héllo");
        buf.move_right();
        buf.move_right();
        buf.insert_char('x');
        assert_eq!(buf.text(), "héxllo");
    }
}
