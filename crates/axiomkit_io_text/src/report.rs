//! Text copy report models and mutable report builder.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// Aggregate counters for one `copy_text` run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ReportTextCopy {
    /// Number of units (bytes, characters or lines) consumed from the source.
    pub cnt_units: u64,
    /// Number of units consumed, counted as characters (one per line under line granularity).
    pub cnt_chars: u64,
    /// Characters inside line content, terminators excluded (line granularity only).
    pub cnt_line_chars: u64,
    /// Number of lines, counting a non-empty unterminated final line.
    pub cnt_lines: u64,
    /// Number of whitespace-delimited words (0 unless enabled).
    pub cnt_words: u64,
    /// Number of `a e i o u` characters, case-insensitive (0 unless enabled).
    pub cnt_vowels: u64,
    /// Raw bytes read from the source.
    pub cnt_bytes_read: u64,
    /// Raw bytes written to the destination.
    pub cnt_bytes_written: u64,
}

impl ReportTextCopy {
    /// Machine-readable counters.
    pub fn to_dict(&self) -> BTreeMap<String, u64> {
        let mut dict_counts = BTreeMap::new();
        dict_counts.insert("cnt_units".to_string(), self.cnt_units);
        dict_counts.insert("cnt_chars".to_string(), self.cnt_chars);
        dict_counts.insert("cnt_line_chars".to_string(), self.cnt_line_chars);
        dict_counts.insert("cnt_lines".to_string(), self.cnt_lines);
        dict_counts.insert("cnt_words".to_string(), self.cnt_words);
        dict_counts.insert("cnt_vowels".to_string(), self.cnt_vowels);
        dict_counts.insert("cnt_bytes_read".to_string(), self.cnt_bytes_read);
        dict_counts.insert("cnt_bytes_written".to_string(), self.cnt_bytes_written);
        dict_counts
    }

    /// Human-readable one-line summary.
    pub fn format(&self, prefix: &str) -> String {
        format!(
            "{prefix} units={} chars={} line_chars={} lines={} words={} vowels={} bytes_read={} bytes_written={}",
            self.cnt_units,
            self.cnt_chars,
            self.cnt_line_chars,
            self.cnt_lines,
            self.cnt_words,
            self.cnt_vowels,
            self.cnt_bytes_read,
            self.cnt_bytes_written
        )
    }

    /// True when nothing was consumed.
    pub fn is_empty(&self) -> bool {
        self.cnt_units == 0 && self.cnt_bytes_read == 0
    }
}

impl fmt::Display for ReportTextCopy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format("[TEXT]"))
    }
}

/// Mutable accumulator for text copy statistics.
///
/// Counters only ever grow. Word and line boundary state is tracked here so
/// every granularity shares one counting rule.
#[derive(Debug, Clone)]
pub struct ReportTextCopyBuilder {
    cnt_units: u64,
    cnt_chars: u64,
    cnt_line_chars: u64,
    cnt_lines: u64,
    cnt_words: u64,
    cnt_vowels: u64,
    cnt_bytes_read: u64,
    cnt_bytes_written: u64,
    if_count_words: bool,
    if_count_vowels: bool,
    if_in_word: bool,
    if_line_open: bool,
}

impl Default for ReportTextCopyBuilder {
    fn default() -> Self {
        Self::new(false, false)
    }
}

impl ReportTextCopyBuilder {
    pub fn new(if_count_words: bool, if_count_vowels: bool) -> Self {
        Self {
            cnt_units: 0,
            cnt_chars: 0,
            cnt_line_chars: 0,
            cnt_lines: 0,
            cnt_words: 0,
            cnt_vowels: 0,
            cnt_bytes_read: 0,
            cnt_bytes_written: 0,
            if_count_words,
            if_count_vowels,
            if_in_word: false,
            if_line_open: false,
        }
    }

    /// Increment consumed unit count by one.
    pub fn add_unit(&mut self) {
        self.cnt_units += 1;
    }

    pub fn add_bytes_read(&mut self, n_bytes: usize) {
        self.cnt_bytes_read += n_bytes as u64;
    }

    pub fn add_bytes_written(&mut self, n_bytes: usize) {
        self.cnt_bytes_written += n_bytes as u64;
    }

    /// Account one raw byte. Non-ASCII bytes count as non-whitespace, non-vowel characters.
    pub fn observe_byte(&mut self, byte: u8) {
        self.cnt_chars += 1;
        if byte.is_ascii() {
            let ch = byte as char;
            self._observe(ch == '\n', ch.is_whitespace(), _is_vowel(ch));
        } else {
            self._observe(false, false, false);
        }
    }

    /// Account one decoded character.
    pub fn observe_char(&mut self, ch: char) {
        self.cnt_chars += 1;
        self._observe(ch == '\n', ch.is_whitespace(), _is_vowel(ch));
    }

    /// Account one line whose terminator has already been stripped.
    ///
    /// The line counts as a single character unit; its content goes to `cnt_line_chars`.
    pub fn observe_line(&mut self, line: &str) {
        self.cnt_chars += 1;
        for ch in line.chars() {
            self.cnt_line_chars += 1;
            self._observe(false, ch.is_whitespace(), _is_vowel(ch));
        }
        self.cnt_lines += 1;
        self.if_line_open = false;
        self.if_in_word = false;
    }

    fn _observe(&mut self, if_newline: bool, if_whitespace: bool, if_vowel: bool) {
        if if_newline {
            self.cnt_lines += 1;
            self.if_line_open = false;
        } else {
            self.if_line_open = true;
        }

        if if_whitespace {
            self.if_in_word = false;
        } else if !self.if_in_word {
            self.if_in_word = true;
            if self.if_count_words {
                self.cnt_words += 1;
            }
        }

        if if_vowel && self.if_count_vowels {
            self.cnt_vowels += 1;
        }
    }

    /// Finalize builder into immutable report.
    ///
    /// A trailing line without `\n` is closed here.
    pub fn build(self) -> ReportTextCopy {
        ReportTextCopy {
            cnt_units: self.cnt_units,
            cnt_chars: self.cnt_chars,
            cnt_line_chars: self.cnt_line_chars,
            cnt_lines: self.cnt_lines + u64::from(self.if_line_open),
            cnt_words: self.cnt_words,
            cnt_vowels: self.cnt_vowels,
            cnt_bytes_read: self.cnt_bytes_read,
            cnt_bytes_written: self.cnt_bytes_written,
        }
    }
}

fn _is_vowel(ch: char) -> bool {
    matches!(ch.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u')
}
