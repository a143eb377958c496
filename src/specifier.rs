use std::fmt;
use std::io::BufRead;

use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::grammar::{self, IntWidth, SpecifierKind, StringLayout};
use crate::scanner::SpecifierSpan;

/// A decoded argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Signed(i64),
    Unsigned(u64),
    /// String payload with every NUL byte removed.
    Bytes(Vec<u8>),
}

impl Value {
    fn text(mut bytes: Vec<u8>) -> Self {
        bytes.retain(|&b| b != 0);
        Value::Bytes(bytes)
    }

    /// Append the rendered form: integers in decimal, strings verbatim.
    pub fn render_into(&self, out: &mut Vec<u8>) {
        match self {
            Value::Signed(v) => out.extend_from_slice(v.to_string().as_bytes()),
            Value::Unsigned(v) => out.extend_from_slice(v.to_string().as_bytes()),
            Value::Bytes(bytes) => out.extend_from_slice(bytes),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Signed(v) => write!(f, "{}", v),
            Value::Unsigned(v) => write!(f, "{}", v),
            Value::Bytes(bytes) => f.write_str(&String::from_utf8_lossy(bytes)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    Unread,
    /// Bare `%s` after the fixed pass: the payload length is known, the
    /// payload itself comes in the variable pass.
    AwaitingPayload(u32),
    Decoded(Value),
}

/// One specifier of a record together with its decoding progress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specifier {
    kind: SpecifierKind,
    span: SpecifierSpan,
    state: State,
}

impl Specifier {
    pub fn new(kind: SpecifierKind, span: SpecifierSpan) -> Self {
        Self {
            kind,
            span,
            state: State::Unread,
        }
    }

    pub fn span(&self) -> SpecifierSpan {
        self.span
    }

    /// The decoded value, once both passes have run.
    pub fn value(&self) -> Option<&Value> {
        match &self.state {
            State::Decoded(value) => Some(value),
            _ => None,
        }
    }

    /// Fixed pass: consume this argument's fixed-size bytes.
    ///
    /// Integers and `%<N>s` are complete afterwards. A bare `%s` only reads its
    /// `u32` length here.
    pub fn read_fixed<R: BufRead>(&mut self, fmt: &[u8], cursor: &mut ByteCursor<R>) -> Result<()> {
        let text = self.span.text(fmt);
        let modifiers = self.span.modifiers(fmt);

        self.state = match self.kind {
            SpecifierKind::SignedInt
            | SpecifierKind::UnsignedInt
            | SpecifierKind::HexInt
            | SpecifierKind::Pointer => {
                let width = grammar::integer_width(modifiers, text)?;
                State::Decoded(read_int(cursor, width, self.kind.is_signed())?)
            }
            SpecifierKind::String => match grammar::string_layout(modifiers, text)? {
                StringLayout::Variable => {
                    let len = u32::from_le_bytes(cursor.read_array::<4>()?);
                    State::AwaitingPayload(len)
                }
                StringLayout::Fixed(size) => State::Decoded(Value::text(cursor.read_exact(size)?)),
            },
        };
        Ok(())
    }

    /// Variable pass: only a bare `%s` reads anything here.
    pub fn read_variable<R: BufRead>(&mut self, cursor: &mut ByteCursor<R>) -> Result<()> {
        if let State::AwaitingPayload(len) = self.state {
            self.state = State::Decoded(Value::text(cursor.read_exact(len as usize)?));
        }
        Ok(())
    }

    /// Append the rendered value. Nothing is written before decoding finished.
    pub fn render_into(&self, out: &mut Vec<u8>) {
        if let Some(value) = self.value() {
            value.render_into(out);
        }
    }
}

fn read_int<R: BufRead>(cursor: &mut ByteCursor<R>, width: IntWidth, signed: bool) -> Result<Value> {
    Ok(match (width, signed) {
        (IntWidth::Four, true) => Value::Signed(i32::from_le_bytes(cursor.read_array()?).into()),
        (IntWidth::Four, false) => Value::Unsigned(u32::from_le_bytes(cursor.read_array()?).into()),
        (IntWidth::Eight, true) => Value::Signed(i64::from_le_bytes(cursor.read_array()?)),
        (IntWidth::Eight, false) => Value::Unsigned(u64::from_le_bytes(cursor.read_array()?)),
    })
}
