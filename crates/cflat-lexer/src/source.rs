//! Character sources feeding the lexer.
//!
//! The lexer only needs three operations over its input: take a character,
//! look at the next one without taking it, and give one back. Production
//! compilation reads from a file; tests read from an in-memory string, so
//! lexer and parser tests never touch the filesystem.

use std::fs;
use std::path::Path;

/// A stream of characters with one-level-or-more push-back.
pub trait CharSource {
    /// Take the next character, or `None` at end of input.
    fn next_char(&mut self) -> Option<char>;

    /// Look at the next character without consuming it.
    fn peek_char(&mut self) -> Option<char>;

    /// Give a character back; the next `next_char` returns it first.
    fn push_back(&mut self, c: char);
}

/// File-backed character source used by real compilation runs.
///
/// The file is read and UTF-8-decoded up front, so iteration sees the same
/// characters an in-memory [`StrSource`] over the same text would. Source
/// files are small; buffering the whole file costs nothing here.
pub struct FileSource {
    inner: StrSource,
}

impl FileSource {
    pub fn open(path: &Path) -> std::io::Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(Self {
            inner: StrSource::new(&text),
        })
    }
}

impl CharSource for FileSource {
    fn next_char(&mut self) -> Option<char> {
        self.inner.next_char()
    }

    fn peek_char(&mut self) -> Option<char> {
        self.inner.peek_char()
    }

    fn push_back(&mut self, c: char) {
        self.inner.push_back(c);
    }
}

/// In-memory character source for tests and string compilation.
pub struct StrSource {
    chars: Vec<char>,
    index: usize,
    pushed: Vec<char>,
}

impl StrSource {
    pub fn new(input: &str) -> Self {
        Self {
            chars: input.chars().collect(),
            index: 0,
            pushed: Vec::new(),
        }
    }
}

impl CharSource for StrSource {
    fn next_char(&mut self) -> Option<char> {
        if let Some(c) = self.pushed.pop() {
            return Some(c);
        }
        let c = self.chars.get(self.index).copied();
        if c.is_some() {
            self.index += 1;
        }
        c
    }

    fn peek_char(&mut self) -> Option<char> {
        if let Some(&c) = self.pushed.last() {
            return Some(c);
        }
        self.chars.get(self.index).copied()
    }

    fn push_back(&mut self, c: char) {
        self.pushed.push(c);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_source_decodes_utf8_like_str_source() {
        let text = "puts(\"héllo\");\n";
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("unicode.c");
        std::fs::write(&path, text).unwrap();

        let mut file = FileSource::open(&path).unwrap();
        let mut mem = StrSource::new(text);
        loop {
            let (a, b) = (file.next_char(), mem.next_char());
            assert_eq!(a, b);
            if a.is_none() {
                break;
            }
        }

        let tokens = crate::Lexer::new(FileSource::open(&path).unwrap(), "unicode.c")
            .tokenize()
            .unwrap();
        assert_eq!(
            tokens[2].kind,
            cflat_syntax::token::TokenKind::Str("héllo".to_string())
        );
    }

    #[test]
    fn str_source_round_trips_push_back() {
        let mut src = StrSource::new("ab");
        assert_eq!(src.next_char(), Some('a'));
        src.push_back('a');
        assert_eq!(src.peek_char(), Some('a'));
        assert_eq!(src.next_char(), Some('a'));
        assert_eq!(src.next_char(), Some('b'));
        assert_eq!(src.next_char(), None);
        assert_eq!(src.peek_char(), None);
    }
}
