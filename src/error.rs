use thiserror::Error;

pub type Result<T> = std::result::Result<T, DecodeError>;

/// Everything that can stop a decode session.
///
/// Running out of bytes at a record boundary is not listed here: it ends the
/// record sequence normally and is reported as `Ok(None)` by the cursor and
/// the record driver.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("stream truncated at byte {offset}: needed {needed} bytes, {available} available")]
    TruncatedStream {
        offset: u64,
        needed: usize,
        available: usize,
    },

    #[error("invalid length modifier in `{specifier}`: {count} 'l' modifiers, at most 2 allowed")]
    InvalidLengthModifier { specifier: String, count: usize },

    #[error("invalid fixed string width in `{specifier}`")]
    InvalidStringWidth { specifier: String },

    #[error("more than one specifier matches terminator '{0}'")]
    AmbiguousSpecifier(char),

    #[error("'{0}' cannot be used as a terminator")]
    InvalidTerminator(char),

    #[error("format expects {expected} arguments, {actual} given")]
    ArgumentCount { expected: usize, actual: usize },

    #[error("format string has a NUL byte at offset {offset}")]
    NulInFormat { offset: usize },

    #[error("argument {index} does not fit `{specifier}`")]
    ArgumentKind { index: usize, specifier: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
