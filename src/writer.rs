//! Producing side of the log stream.
//!
//! Lays records out the same way the decoder reads them: the format string
//! and its NUL, every argument's fixed-size part in order, then the payload
//! of every bare `%s` in order.

use std::io::Write;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::{DecodeError, Result};
use crate::grammar::{self, Grammar, IntWidth, SpecifierKind, StringLayout};
use crate::scanner::{scan, Directive, SpecifierSpan};

/// An argument to encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogArg<'a> {
    Int(i64),
    Uint(u64),
    Str(&'a [u8]),
}

impl<'a> From<&'a str> for LogArg<'a> {
    fn from(s: &'a str) -> Self {
        LogArg::Str(s.as_bytes())
    }
}

impl From<i64> for LogArg<'_> {
    fn from(v: i64) -> Self {
        LogArg::Int(v)
    }
}

impl From<i32> for LogArg<'_> {
    fn from(v: i32) -> Self {
        LogArg::Int(v.into())
    }
}

impl From<u64> for LogArg<'_> {
    fn from(v: u64) -> Self {
        LogArg::Uint(v)
    }
}

impl From<u32> for LogArg<'_> {
    fn from(v: u32) -> Self {
        LogArg::Uint(v.into())
    }
}

/// Log levels of the level prefix record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Err,
    Critical,
}

impl Level {
    pub fn as_str(self) -> &'static str {
        match self {
            Level::Trace => "TRACE",
            Level::Debug => "DEBUG",
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Err => "ERR",
            Level::Critical => "CRITICAL",
        }
    }
}

/// Records [`RecordWriter::log`] writes ahead of the line itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prefix {
    /// `[%8s]` carrying the level name.
    Level,
    /// `[%d-%3s-%d %d:%d:%d]: ` carrying the UTC wall clock time.
    Time,
    /// `[%llu]: ` carrying nanoseconds since the Unix epoch.
    Nanoseconds,
}

const LEVEL_PREFIX_FORMAT: &[u8] = b"[%8s]";
const TIME_PREFIX_FORMAT: &[u8] = b"[%d-%3s-%d %d:%d:%d]: ";
const NANOSECOND_PREFIX_FORMAT: &[u8] = b"[%llu]: ";

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

impl Prefix {
    fn encode_into(self, level: Level, now: SystemTime, grammar: &Grammar, out: &mut Vec<u8>) -> Result<()> {
        // Clocks set before 1970 log the epoch.
        let since_epoch = now.duration_since(UNIX_EPOCH).unwrap_or_default();
        match self {
            Prefix::Level => encode_into(LEVEL_PREFIX_FORMAT, &[level.as_str().into()], grammar, out),
            Prefix::Time => {
                let t = CivilTime::from_unix(since_epoch.as_secs());
                let args = [
                    LogArg::Int(t.year),
                    MONTHS[t.month].into(),
                    LogArg::Uint(t.day),
                    LogArg::Uint(t.hour),
                    LogArg::Uint(t.minute),
                    LogArg::Uint(t.second),
                ];
                encode_into(TIME_PREFIX_FORMAT, &args, grammar, out)
            }
            Prefix::Nanoseconds => encode_into(
                NANOSECOND_PREFIX_FORMAT,
                &[LogArg::Uint(since_epoch.as_nanos() as u64)],
                grammar,
                out,
            ),
        }
    }
}

/// Broken-down UTC time. `month` counts from 0.
#[derive(Debug, PartialEq, Eq)]
struct CivilTime {
    year: i64,
    month: usize,
    day: u64,
    hour: u64,
    minute: u64,
    second: u64,
}

impl CivilTime {
    /// Proleptic Gregorian calendar, counted in 400-year eras starting on
    /// 0000-03-01 so the leap day falls at the end of each year.
    fn from_unix(secs: u64) -> Self {
        let z = (secs / 86_400) as i64 + 719_468;
        let era = z.div_euclid(146_097);
        let doe = z.rem_euclid(146_097);
        let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
        let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
        let mp = (5 * doy + 2) / 153;
        let month = if mp < 10 { mp + 2 } else { mp - 10 };
        let rem = secs % 86_400;

        Self {
            year: era * 400 + yoe + i64::from(month < 2),
            month: month as usize,
            day: (doy - (153 * mp + 2) / 5 + 1) as u64,
            hour: rem / 3_600,
            minute: rem / 60 % 60,
            second: rem % 60,
        }
    }
}

/// Encode one record into a fresh buffer.
pub fn encode_record(fmt: &[u8], args: &[LogArg<'_>], grammar: &Grammar) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(fmt.len() + 1 + args.len() * 8);
    encode_into(fmt, args, grammar, &mut out)?;
    Ok(out)
}

fn encode_into(fmt: &[u8], args: &[LogArg<'_>], grammar: &Grammar, out: &mut Vec<u8>) -> Result<()> {
    // The NUL ends the format string on the wire.
    if let Some(offset) = fmt.iter().position(|&b| b == 0) {
        return Err(DecodeError::NulInFormat { offset });
    }

    let specifiers: Vec<(SpecifierKind, SpecifierSpan)> = scan(fmt, grammar)
        .into_iter()
        .filter_map(|directive| match directive {
            Directive::Specifier(kind, span) => Some((kind, span)),
            Directive::Percent(_) => None,
        })
        .collect();
    if specifiers.len() != args.len() {
        return Err(DecodeError::ArgumentCount {
            expected: specifiers.len(),
            actual: args.len(),
        });
    }

    // Validate everything before writing so a bad call leaves `out` as it was.
    let mut fixed = Vec::new();
    let mut variable = Vec::new();
    for (index, ((kind, span), arg)) in specifiers.iter().zip(args).enumerate() {
        let text = span.text(fmt);
        let modifiers = span.modifiers(fmt);
        let mismatch = || DecodeError::ArgumentKind {
            index,
            specifier: String::from_utf8_lossy(text).into_owned(),
        };

        match (kind.is_integer(), *arg) {
            (true, LogArg::Int(v)) => {
                put_int(&mut fixed, v as u64, grammar::integer_width(modifiers, text)?)
            }
            (true, LogArg::Uint(v)) => put_int(&mut fixed, v, grammar::integer_width(modifiers, text)?),
            (false, LogArg::Str(s)) => match grammar::string_layout(modifiers, text)? {
                StringLayout::Variable => {
                    let len = u32::try_from(s.len()).map_err(|_| mismatch())?;
                    fixed.extend_from_slice(&len.to_le_bytes());
                    variable.extend_from_slice(s);
                }
                StringLayout::Fixed(size) => {
                    let take = s.len().min(size);
                    let end = fixed.len().checked_add(size).ok_or_else(|| {
                        DecodeError::InvalidStringWidth {
                            specifier: String::from_utf8_lossy(text).into_owned(),
                        }
                    })?;
                    fixed.extend_from_slice(&s[..take]);
                    fixed.resize(end, 0);
                }
            },
            _ => return Err(mismatch()),
        }
    }

    out.extend_from_slice(fmt);
    out.push(0);
    out.extend_from_slice(&fixed);
    out.extend_from_slice(&variable);
    Ok(())
}

/// Truncates like a C integer cast.
fn put_int(out: &mut Vec<u8>, v: u64, width: IntWidth) {
    match width {
        IntWidth::Four => out.extend_from_slice(&(v as u32).to_le_bytes()),
        IntWidth::Eight => out.extend_from_slice(&v.to_le_bytes()),
    }
}

/// Appends encoded records to a sink.
#[derive(Debug)]
pub struct RecordWriter<W> {
    sink: W,
    grammar: Grammar,
    suffix: Option<u8>,
    prefixes: Vec<Prefix>,
    buf: Vec<u8>,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            grammar: Grammar::default(),
            suffix: None,
            prefixes: vec![Prefix::Level],
            buf: Vec::new(),
        }
    }

    pub fn with_grammar(mut self, grammar: Grammar) -> Self {
        self.grammar = grammar;
        self
    }

    /// Append `suffix` to every format string, typically `b'\n'` so decoded
    /// lines come out one per line.
    pub fn with_line_suffix(mut self, suffix: u8) -> Self {
        self.suffix = Some(suffix);
        self
    }

    /// Prefix records written by [`log`](Self::log), in order. Defaults to
    /// the level alone.
    pub fn with_prefixes(mut self, prefixes: &[Prefix]) -> Self {
        self.prefixes = prefixes.to_vec();
        self
    }

    pub fn write_record(&mut self, fmt: &str, args: &[LogArg<'_>]) -> Result<()> {
        self.buf.clear();
        self.push_line(fmt, args)?;
        self.sink.write_all(&self.buf)?;
        Ok(())
    }

    /// Write the prefix records followed by the line itself.
    pub fn log(&mut self, level: Level, fmt: &str, args: &[LogArg<'_>]) -> Result<()> {
        self.log_at(level, SystemTime::now(), fmt, args)
    }

    fn log_at(&mut self, level: Level, now: SystemTime, fmt: &str, args: &[LogArg<'_>]) -> Result<()> {
        self.buf.clear();
        for prefix in &self.prefixes {
            prefix.encode_into(level, now, &self.grammar, &mut self.buf)?;
        }
        self.push_line(fmt, args)?;
        self.sink.write_all(&self.buf)?;
        Ok(())
    }

    fn push_line(&mut self, fmt: &str, args: &[LogArg<'_>]) -> Result<()> {
        let mut fmt = fmt.as_bytes().to_vec();
        if let Some(suffix) = self.suffix {
            fmt.push(suffix);
        }
        encode_into(&fmt, args, &self.grammar, &mut self.buf)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}
