//! Lazy single-pass unit readers and per-unit transforms.

use std::io::{self, BufRead, Write};

use crate::report::ReportTextCopyBuilder;
use crate::spec::{EnumLineTerminator, EnumTextGranularity, EnumTextTransform};

/// One unit pulled from the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TextUnit {
    Byte(u8),
    Char(char),
    /// Line content with `\n` / `\r\n` already stripped.
    Line(String),
}

impl TextUnit {
    /// Feed the untransformed unit into the statistics accumulator.
    pub(crate) fn observe(&self, builder_report: &mut ReportTextCopyBuilder) {
        builder_report.add_unit();
        match self {
            Self::Byte(byte) => builder_report.observe_byte(*byte),
            Self::Char(ch) => builder_report.observe_char(*ch),
            Self::Line(line) => builder_report.observe_line(line),
        }
    }

    /// Write the transformed unit and return the number of bytes written.
    ///
    /// Lines are always followed by `line_terminator`.
    pub(crate) fn write_transformed<W: Write>(
        &self,
        writer: &mut W,
        enum_transform: EnumTextTransform,
        line_terminator: EnumLineTerminator,
    ) -> io::Result<usize> {
        match self {
            Self::Byte(byte) => {
                let byte_out = match enum_transform {
                    EnumTextTransform::Identity => *byte,
                    EnumTextTransform::Uppercase => byte.to_ascii_uppercase(),
                };
                writer.write_all(&[byte_out])?;
                Ok(1)
            }
            Self::Char(ch) => {
                let mut buf_utf8 = [0_u8; 4];
                match enum_transform {
                    EnumTextTransform::Identity => {
                        let raw = ch.encode_utf8(&mut buf_utf8).as_bytes();
                        writer.write_all(raw)?;
                        Ok(raw.len())
                    }
                    EnumTextTransform::Uppercase => {
                        let mut n_written = 0;
                        for ch_upper in ch.to_uppercase() {
                            let raw = ch_upper.encode_utf8(&mut buf_utf8).as_bytes();
                            writer.write_all(raw)?;
                            n_written += raw.len();
                        }
                        Ok(n_written)
                    }
                }
            }
            Self::Line(line) => {
                let n_content = match enum_transform {
                    EnumTextTransform::Identity => {
                        writer.write_all(line.as_bytes())?;
                        line.len()
                    }
                    EnumTextTransform::Uppercase => {
                        let line_upper = line.to_uppercase();
                        writer.write_all(line_upper.as_bytes())?;
                        line_upper.len()
                    }
                };
                let raw_terminator = line_terminator.as_bytes();
                writer.write_all(raw_terminator)?;
                Ok(n_content + raw_terminator.len())
            }
        }
    }
}

/// Iterator over source units at a fixed granularity.
///
/// Yields `(unit, n_bytes_consumed)`. Not restartable: the underlying reader
/// cursor only moves forward.
pub(crate) struct UnitReader<R> {
    reader: R,
    granularity: EnumTextGranularity,
    buf_line: Vec<u8>,
    if_done: bool,
}

impl<R: BufRead> UnitReader<R> {
    pub(crate) fn new(reader: R, granularity: EnumTextGranularity) -> Self {
        Self {
            reader,
            granularity,
            buf_line: Vec::new(),
            if_done: false,
        }
    }

    fn _read_byte(&mut self) -> io::Result<Option<u8>> {
        loop {
            match self.reader.fill_buf() {
                Ok([]) => return Ok(None),
                Ok(buf) => {
                    let byte = buf[0];
                    self.reader.consume(1);
                    return Ok(Some(byte));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn _read_char(&mut self) -> io::Result<Option<(char, usize)>> {
        let Some(byte_lead) = self._read_byte()? else {
            return Ok(None);
        };
        let n_width = match byte_lead {
            0x00..=0x7F => return Ok(Some((byte_lead as char, 1))),
            0xC2..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF4 => 4,
            _ => {
                return Err(_invalid_utf8(format!(
                    "invalid UTF-8 lead byte 0x{byte_lead:02x}"
                )));
            }
        };

        let mut buf_utf8 = [byte_lead, 0, 0, 0];
        for slot in buf_utf8.iter_mut().take(n_width).skip(1) {
            *slot = self._read_byte()?.ok_or_else(|| {
                _invalid_utf8("incomplete UTF-8 sequence at end of stream".to_string())
            })?;
        }

        let c_decoded = std::str::from_utf8(&buf_utf8[..n_width])
            .map_err(|e| _invalid_utf8(format!("invalid UTF-8 sequence: {e}")))?;
        match c_decoded.chars().next() {
            Some(ch) => Ok(Some((ch, n_width))),
            None => Err(_invalid_utf8("empty UTF-8 sequence".to_string())),
        }
    }

    fn _read_line(&mut self) -> io::Result<Option<(String, usize)>> {
        self.buf_line.clear();
        let n_read = self.reader.read_until(b'\n', &mut self.buf_line)?;
        if n_read == 0 {
            return Ok(None);
        }
        if self.buf_line.last() == Some(&b'\n') {
            self.buf_line.pop();
        }
        // Drops the `\r` of `\r\n`, or a lone `\r` that ends the stream.
        if self.buf_line.last() == Some(&b'\r') {
            self.buf_line.pop();
        }
        let line = String::from_utf8(std::mem::take(&mut self.buf_line))
            .map_err(|e| _invalid_utf8(format!("invalid UTF-8 in line: {e}")))?;
        Ok(Some((line, n_read)))
    }

    fn _next_unit(&mut self) -> io::Result<Option<(TextUnit, usize)>> {
        match self.granularity {
            EnumTextGranularity::Byte => Ok(self._read_byte()?.map(|b| (TextUnit::Byte(b), 1))),
            EnumTextGranularity::Character => {
                Ok(self._read_char()?.map(|(ch, n)| (TextUnit::Char(ch), n)))
            }
            EnumTextGranularity::Line => {
                Ok(self._read_line()?.map(|(line, n)| (TextUnit::Line(line), n)))
            }
        }
    }
}

impl<R: BufRead> Iterator for UnitReader<R> {
    type Item = io::Result<(TextUnit, usize)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.if_done {
            return None;
        }
        match self._next_unit() {
            Ok(Some(v)) => Some(Ok(v)),
            Ok(None) => {
                self.if_done = true;
                None
            }
            Err(e) => {
                self.if_done = true;
                Some(Err(e))
            }
        }
    }
}

fn _invalid_utf8(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}
