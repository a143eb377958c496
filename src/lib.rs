//! Decoder for llcpp binary log streams.
//!
//! Each record on the wire is a NUL-terminated printf-style format string
//! followed by its packed arguments. Sizes are not stored separately: they
//! come from the specifiers themselves (`%d`, `%lld`, `%8s`, `%s`, ...).
//!
//! ```
//! use llcpp_decoder::decode_bytes;
//!
//! let mut data = b"count=%d name=%s\0".to_vec();
//! data.extend_from_slice(&42i32.to_le_bytes());
//! data.extend_from_slice(&3u32.to_le_bytes());
//! data.extend_from_slice(b"abc");
//!
//! let lines = decode_bytes(&data).unwrap();
//! assert_eq!(lines[0].to_string(), "count=42 name=abc");
//! ```

pub mod cursor;
pub mod error;
pub mod grammar;
pub mod line;
pub mod record;
pub mod scanner;
pub mod specifier;
pub mod writer;

pub use cursor::ByteCursor;
pub use error::{DecodeError, Result};
pub use grammar::{Grammar, SpecifierKind, TerminatorDescriptor};
pub use line::LogLine;
pub use record::{decode_bytes, decode_record, RecordDecoder};
pub use specifier::{Specifier, Value};
pub use writer::{encode_record, Level, LogArg, Prefix, RecordWriter};
