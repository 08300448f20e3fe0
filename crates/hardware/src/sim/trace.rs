//! Memory trace reader.
//!
//! Parses the valgrind "lackey" trace layout, one record per line:
//!
//! ```text
//! I 0400d7d4,8
//!  M 0421c7f0,4
//!  L 04f6b868,8
//!  S 7ff0005c8,8
//! ```
//!
//! Each record is an access kind, a hexadecimal address, a comma, and a decimal
//! access size. Leading and trailing whitespace is ignored and blank lines are
//! skipped. Lines that do not match are reported as
//! [`TraceError::Malformed`] so the caller can skip them.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::str::FromStr;

use crate::common::error::{RecordError, TraceError};

/// Kind of memory reference in a trace record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessKind {
    /// Instruction fetch (`I`); never simulated.
    Instruction,
    /// Data load (`L`).
    Load,
    /// Data store (`S`).
    Store,
    /// Data modify (`M`): a load followed by a store to the same address.
    Modify,
}

impl AccessKind {
    /// Maps a trace letter to its kind.
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            'I' => Some(Self::Instruction),
            'L' => Some(Self::Load),
            'S' => Some(Self::Store),
            'M' => Some(Self::Modify),
            _ => None,
        }
    }

    /// Trace letter for this kind.
    pub const fn as_char(self) -> char {
        match self {
            Self::Instruction => 'I',
            Self::Load => 'L',
            Self::Store => 'S',
            Self::Modify => 'M',
        }
    }

    /// Number of cache accesses one record of this kind performs.
    pub const fn access_count(self) -> usize {
        match self {
            Self::Instruction => 0,
            Self::Load | Self::Store => 1,
            Self::Modify => 2,
        }
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// One parsed trace record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraceRecord {
    /// Kind of reference.
    pub kind: AccessKind,
    /// Referenced address.
    pub address: u64,
    /// Access size in bytes; carried through but not simulated.
    pub size: u32,
}

impl TraceRecord {
    /// Creates a record.
    pub const fn new(kind: AccessKind, address: u64, size: u32) -> Self {
        Self {
            kind,
            address,
            size,
        }
    }
}

impl FromStr for TraceRecord {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        let letter = chars.next().ok_or(RecordError::Empty)?;
        let kind = AccessKind::from_char(letter).ok_or(RecordError::UnknownKind(letter))?;

        let rest = chars.as_str();
        if !rest.starts_with(char::is_whitespace) {
            return Err(RecordError::MissingSeparator);
        }
        let (addr, size) = rest.split_once(',').ok_or(RecordError::MissingComma)?;

        let addr = addr.trim();
        let digits = addr
            .strip_prefix("0x")
            .or_else(|| addr.strip_prefix("0X"))
            .unwrap_or(addr);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(RecordError::BadAddress);
        }
        let address = u64::from_str_radix(digits, 16).map_err(|_| RecordError::BadAddress)?;

        let size = size.trim();
        if size.is_empty() || !size.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RecordError::BadSize);
        }
        let size = size.parse::<u32>().map_err(|_| RecordError::BadSize)?;

        Ok(Self::new(kind, address, size))
    }
}

impl fmt::Display for TraceRecord {
    /// Canonical form: `L 7ff000,4`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:x},{}", self.kind, self.address, self.size)
    }
}

/// A record together with where it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TraceLine {
    /// 1-based line number in the trace.
    pub line: usize,
    /// Line text with surrounding whitespace removed.
    pub text: String,
    /// Parsed record.
    pub record: TraceRecord,
}

/// Streaming trace parser over any buffered reader.
///
/// Yields one item per non-blank line. A read failure is yielded once and ends
/// the iteration; malformed lines are yielded as errors and iteration continues.
#[derive(Debug)]
pub struct TraceReader<R> {
    inner: R,
    line: usize,
    buf: Vec<u8>,
    done: bool,
}

impl TraceReader<BufReader<File>> {
    /// Opens a trace file.
    ///
    /// # Errors
    ///
    /// [`TraceError::Open`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, TraceError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| TraceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> TraceReader<R> {
    /// Wraps a buffered reader.
    pub const fn new(inner: R) -> Self {
        Self {
            inner,
            line: 0,
            buf: Vec::new(),
            done: false,
        }
    }

    /// Number of lines consumed so far, blank ones included.
    pub const fn lines_read(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = Result<TraceLine, TraceError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            self.buf.clear();
            match self.inner.read_until(b'\n', &mut self.buf) {
                Ok(0) => self.done = true,
                Ok(_) => {
                    self.line += 1;
                    // Corrupt bytes make the line malformed rather than aborting the read.
                    let text = String::from_utf8_lossy(&self.buf);
                    let text = text.trim();
                    if text.is_empty() {
                        continue;
                    }
                    let item = match text.parse::<TraceRecord>() {
                        Ok(record) => Ok(TraceLine {
                            line: self.line,
                            text: text.to_owned(),
                            record,
                        }),
                        Err(reason) => Err(TraceError::Malformed {
                            line: self.line,
                            text: text.to_owned(),
                            reason,
                        }),
                    };
                    return Some(item);
                }
                Err(source) => {
                    self.done = true;
                    return Some(Err(TraceError::Read {
                        line: self.line + 1,
                        source,
                    }));
                }
            }
        }
        None
    }
}
