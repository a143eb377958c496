use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, trace};

use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::grammar::Grammar;
use crate::line::{LogLine, Piece};
use crate::scanner::{scan, Directive};
use crate::specifier::Specifier;

/// Decode one record whose format string has already been read.
///
/// All fixed-size fields come first on the wire, then every bare `%s`
/// payload, so the specifiers are walked twice in the same order.
pub fn decode_record<R: BufRead>(
    fmt: &[u8],
    cursor: &mut ByteCursor<R>,
    grammar: &Grammar,
) -> Result<LogLine> {
    let mut pieces: Vec<Piece> = scan(fmt, grammar)
        .into_iter()
        .map(|directive| match directive {
            Directive::Percent(span) => Piece::Percent(span),
            Directive::Specifier(kind, span) => Piece::Argument(Specifier::new(kind, span)),
        })
        .collect();

    trace!(offset = cursor.position(), "fixed pass");
    for piece in pieces.iter_mut() {
        if let Piece::Argument(spec) = piece {
            spec.read_fixed(fmt, cursor)?;
        }
    }

    trace!(offset = cursor.position(), "variable pass");
    for piece in pieces.iter_mut() {
        if let Piece::Argument(spec) = piece {
            spec.read_variable(cursor)?;
        }
    }

    Ok(LogLine::assemble(fmt, &pieces))
}

/// Pull-based decoder over a whole stream, one line per record.
///
/// The first error ends the sequence: after a failed record the cursor is
/// no longer on a record boundary.
#[derive(Debug)]
pub struct RecordDecoder<R> {
    cursor: ByteCursor<R>,
    grammar: Grammar,
    records: usize,
    failed: bool,
}

impl RecordDecoder<BufReader<File>> {
    /// Open a log file. The file is closed when the decoder is dropped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> RecordDecoder<R> {
    pub fn new(reader: R) -> Self {
        Self::with_grammar(reader, Grammar::default())
    }

    pub fn with_grammar(reader: R, grammar: Grammar) -> Self {
        Self {
            cursor: ByteCursor::new(reader),
            grammar,
            records: 0,
            failed: false,
        }
    }

    /// Decode the next record.
    ///
    /// `Ok(None)` means the stream ended cleanly on a record boundary.
    pub fn next_line(&mut self) -> Result<Option<LogLine>> {
        if self.failed {
            return Ok(None);
        }
        match self.decode_next() {
            Ok(line) => Ok(line),
            Err(err) => {
                self.failed = true;
                debug!(record = self.records, offset = self.cursor.position(), "decode failed: {}", err);
                Err(err)
            }
        }
    }

    fn decode_next(&mut self) -> Result<Option<LogLine>> {
        let offset = self.cursor.position();
        let Some(fmt) = self.cursor.read_until_nul()? else {
            debug!(records = self.records, offset, "end of stream");
            return Ok(None);
        };

        let line = decode_record(&fmt, &mut self.cursor, &self.grammar)?;
        debug!(
            record = self.records,
            offset,
            len = self.cursor.position() - offset,
            "decoded record"
        );
        self.records += 1;
        Ok(Some(line))
    }

    /// Number of lines produced so far.
    pub fn records_decoded(&self) -> usize {
        self.records
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> u64 {
        self.cursor.position()
    }
}

impl<R: BufRead> Iterator for RecordDecoder<R> {
    type Item = Result<LogLine>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line().transpose()
    }
}

impl<R: BufRead> std::iter::FusedIterator for RecordDecoder<R> {}

/// Decode a complete in-memory stream.
pub fn decode_bytes(data: &[u8]) -> Result<Vec<LogLine>> {
    RecordDecoder::new(data).collect()
}
