use std::borrow::Cow;
use std::fmt;

use serde::{Serialize, Serializer};

use crate::scanner::SpecifierSpan;
use crate::specifier::Specifier;

/// A scanned directive after decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Piece {
    Percent(SpecifierSpan),
    Argument(Specifier),
}

impl Piece {
    fn span(&self) -> SpecifierSpan {
        match self {
            Piece::Percent(span) => *span,
            Piece::Argument(spec) => spec.span(),
        }
    }
}

/// The rendered text of one record.
///
/// Kept as bytes: neither format strings nor string arguments have to be
/// UTF-8. Any newline comes from the format string itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LogLine {
    bytes: Vec<u8>,
}

impl LogLine {
    /// Interleave the literal runs of `fmt` with the rendered pieces.
    pub fn assemble(fmt: &[u8], pieces: &[Piece]) -> Self {
        let mut bytes = Vec::with_capacity(fmt.len() + pieces.len() * 8);
        let mut last_end = 0;

        for piece in pieces {
            let span = piece.span();
            bytes.extend_from_slice(&fmt[last_end..span.begin]);
            match piece {
                Piece::Percent(_) => bytes.push(b'%'),
                Piece::Argument(spec) => spec.render_into(&mut bytes),
            }
            last_end = span.end;
        }
        bytes.extend_from_slice(&fmt[last_end..]);

        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lossy UTF-8 view of the line.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

impl Serialize for LogLine {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text())
    }
}

impl From<&str> for LogLine {
    fn from(text: &str) -> Self {
        Self {
            bytes: text.as_bytes().to_vec(),
        }
    }
}
