use super::error::{ParseErrorKind, ReadError};
use std::io::{self, BufRead};

/// Columns `start..end` of `line`, trimmed. Ranges past the end of the line are clamped.
pub(crate) fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    let end = end.min(line.len());
    line.get(start.min(end)..end).unwrap_or("").trim()
}

/// Splits a native `.prm` line at the first `#`, `*` or `!`.
///
/// Returns the trimmed data part and the normalized comment (empty when there is none).
pub(crate) fn split_comment(line: &str) -> (&str, String) {
    match line.find(['#', '*', '!']) {
        Some(pos) => {
            let comment = line[pos + 1..].trim().trim_matches('!');
            let comment = comment.split_whitespace().collect::<Vec<_>>().join(" ");
            (line[..pos].trim(), comment)
        }
        None => (line.trim(), String::new()),
    }
}

/// Position inside a file, attached to every parse error.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Location<'a> {
    pub line: usize,
    pub section: &'a str,
}

impl<'a> Location<'a> {
    pub fn new(line: usize, section: &'a str) -> Self {
        Self { line, section }
    }

    pub fn error(&self, kind: ParseErrorKind) -> ReadError {
        ReadError::Parse {
            line: self.line,
            section: self.section.to_string(),
            kind,
        }
    }

    pub fn parse_float(&self, value: &str, field: &str) -> Result<f64, ReadError> {
        value.parse().map_err(|_| {
            self.error(ParseErrorKind::InvalidFloat {
                field: field.to_string(),
                value: value.to_string(),
            })
        })
    }

    pub fn parse_column(&self, line: &str, start: usize, end: usize) -> Result<f64, ReadError> {
        self.parse_float(
            slice_and_trim(line, start, end),
            &format!("columns {}-{}", start + 1, end),
        )
    }

    /// Fails unless `fields` has at least `expected` entries.
    pub fn require_fields(&self, fields: &[&str], expected: usize) -> Result<(), ReadError> {
        if fields.len() < expected {
            return Err(self.error(ParseErrorKind::TooFewFields {
                expected,
                found: fields.len(),
            }));
        }
        Ok(())
    }
}

/// Line reader for the fixed-layout formats, which are consumed block by block.
pub(crate) struct LineCursor<R> {
    reader: R,
    line_no: usize,
}

impl<R: BufRead> LineCursor<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, line_no: 0 }
    }

    /// Next line without its line terminator, or `None` at end of file.
    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = String::new();
        if self.reader.read_line(&mut buf)? == 0 {
            return Ok(None);
        }
        self.line_no += 1;
        let trimmed_len = buf.trim_end_matches(['\n', '\r']).len();
        buf.truncate(trimmed_len);
        Ok(Some(buf))
    }

    /// Next line of the current block; blank lines and end of file both end a block.
    pub fn next_block_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.next_line()?.filter(|line| !line.trim().is_empty()))
    }

    pub fn skip(&mut self, lines: usize) -> io::Result<()> {
        for _ in 0..lines {
            self.next_line()?;
        }
        Ok(())
    }

    pub fn line_no(&self) -> usize {
        self.line_no
    }
}
