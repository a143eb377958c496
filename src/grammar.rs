//! Terminator table and the rules that turn an escape span into argument
//! sizes.

use crate::error::{DecodeError, Result};

/// The argument kinds a format string can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecifierKind {
    SignedInt,
    UnsignedInt,
    /// `%x`. Decoded signed and rendered in decimal; hex output was never
    /// implemented by the logger side.
    HexInt,
    /// `%p`. Unsigned, rendered in decimal.
    Pointer,
    String,
}

impl SpecifierKind {
    pub fn is_integer(self) -> bool {
        !matches!(self, SpecifierKind::String)
    }

    pub fn is_signed(self) -> bool {
        matches!(self, SpecifierKind::SignedInt | SpecifierKind::HexInt)
    }
}

/// One row of a terminator table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TerminatorDescriptor {
    pub letter: u8,
    pub kind: SpecifierKind,
}

impl TerminatorDescriptor {
    pub const fn new(letter: u8, kind: SpecifierKind) -> Self {
        Self { letter, kind }
    }
}

pub const BUILTIN_TERMINATORS: [TerminatorDescriptor; 5] = [
    TerminatorDescriptor::new(b'd', SpecifierKind::SignedInt),
    TerminatorDescriptor::new(b'u', SpecifierKind::UnsignedInt),
    TerminatorDescriptor::new(b'x', SpecifierKind::HexInt),
    TerminatorDescriptor::new(b's', SpecifierKind::String),
    TerminatorDescriptor::new(b'p', SpecifierKind::Pointer),
];

static BUILTIN: Grammar = Grammar::from_table_unchecked(&BUILTIN_TERMINATORS);

/// Lookup from terminator letter to specifier kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grammar {
    table: [Option<SpecifierKind>; 256],
}

impl Grammar {
    /// Build a grammar from a descriptor list.
    ///
    /// Two descriptors sharing a letter is a configuration error and is
    /// reported here, once, rather than while decoding.
    pub fn new(descriptors: &[TerminatorDescriptor]) -> Result<Self> {
        let mut table = [None; 256];
        for descriptor in descriptors {
            let letter = descriptor.letter;
            if letter == b'%' || letter == 0 {
                return Err(DecodeError::InvalidTerminator(letter as char));
            }
            let slot = &mut table[letter as usize];
            if slot.is_some() {
                return Err(DecodeError::AmbiguousSpecifier(letter as char));
            }
            *slot = Some(descriptor.kind);
        }
        Ok(Self { table })
    }

    /// The `d u x s p` table.
    pub fn builtin() -> &'static Grammar {
        &BUILTIN
    }

    const fn from_table_unchecked(descriptors: &[TerminatorDescriptor]) -> Self {
        let mut table = [None; 256];
        let mut i = 0;
        while i < descriptors.len() {
            table[descriptors[i].letter as usize] = Some(descriptors[i].kind);
            i += 1;
        }
        Self { table }
    }

    pub fn classify(&self, letter: u8) -> Option<SpecifierKind> {
        self.table[letter as usize]
    }
}

impl Default for Grammar {
    fn default() -> Self {
        BUILTIN.clone()
    }
}

/// Byte width of an integer argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntWidth {
    Four,
    Eight,
}

impl IntWidth {
    pub fn bytes(self) -> usize {
        match self {
            IntWidth::Four => 4,
            IntWidth::Eight => 8,
        }
    }
}

/// Width from the `l` count of the modifiers between `%` and the letter.
///
/// `specifier` is the whole escape, only used for the error message.
pub fn integer_width(modifiers: &[u8], specifier: &[u8]) -> Result<IntWidth> {
    match modifiers.iter().filter(|&&b| b == b'l').count() {
        0 | 1 => Ok(IntWidth::Four),
        2 => Ok(IntWidth::Eight),
        count => Err(DecodeError::InvalidLengthModifier {
            specifier: String::from_utf8_lossy(specifier).into_owned(),
            count,
        }),
    }
}

/// How a `%s` argument is laid out on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringLayout {
    /// Bare `%s`: a `u32` length in the fixed pass, the payload in the
    /// variable pass.
    Variable,
    /// `%<N>s`: exactly `N` bytes in the fixed pass.
    Fixed(usize),
}

/// Size of the length prefix written for a bare `%s`.
pub const LENGTH_PREFIX_SIZE: usize = 4;

/// Widths are capped at `u32::MAX`, the same limit as a bare `%s` payload.
pub fn string_layout(modifiers: &[u8], specifier: &[u8]) -> Result<StringLayout> {
    if specifier.len() <= 2 {
        return Ok(StringLayout::Variable);
    }

    let invalid = || DecodeError::InvalidStringWidth {
        specifier: String::from_utf8_lossy(specifier).into_owned(),
    };
    if !modifiers.iter().all(u8::is_ascii_digit) {
        return Err(invalid());
    }
    std::str::from_utf8(modifiers)
        .ok()
        .and_then(|digits| digits.parse::<u32>().ok())
        .and_then(|width| usize::try_from(width).ok())
        .map(StringLayout::Fixed)
        .ok_or_else(invalid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let grammar = Grammar::builtin();
        assert_eq!(grammar.classify(b'd'), Some(SpecifierKind::SignedInt));
        assert_eq!(grammar.classify(b'u'), Some(SpecifierKind::UnsignedInt));
        assert_eq!(grammar.classify(b'x'), Some(SpecifierKind::HexInt));
        assert_eq!(grammar.classify(b'p'), Some(SpecifierKind::Pointer));
        assert_eq!(grammar.classify(b's'), Some(SpecifierKind::String));
        assert_eq!(grammar.classify(b'l'), None);
        assert_eq!(grammar.classify(b'f'), None);
    }

    #[test]
    fn test_builtin_table_validates() {
        let checked = Grammar::new(&BUILTIN_TERMINATORS).unwrap();
        assert_eq!(&checked, Grammar::builtin());
    }

    #[test]
    fn test_duplicate_letter_is_ambiguous() {
        let mut descriptors = BUILTIN_TERMINATORS.to_vec();
        descriptors.push(TerminatorDescriptor::new(b'u', SpecifierKind::Pointer));

        let err = Grammar::new(&descriptors).unwrap_err();
        assert!(matches!(err, DecodeError::AmbiguousSpecifier('u')));
    }

    #[test]
    fn test_percent_is_not_a_terminator() {
        let err = Grammar::new(&[TerminatorDescriptor::new(b'%', SpecifierKind::String)]).unwrap_err();
        assert!(matches!(err, DecodeError::InvalidTerminator('%')));
    }

    #[test]
    fn test_signedness() {
        assert!(SpecifierKind::SignedInt.is_signed());
        assert!(SpecifierKind::HexInt.is_signed());
        assert!(!SpecifierKind::UnsignedInt.is_signed());
        assert!(!SpecifierKind::Pointer.is_signed());
        assert!(!SpecifierKind::String.is_integer());
    }

    #[test]
    fn test_integer_width_from_l_count() {
        assert_eq!(integer_width(b"", b"%d").unwrap(), IntWidth::Four);
        assert_eq!(integer_width(b"l", b"%ld").unwrap(), IntWidth::Four);
        assert_eq!(integer_width(b"ll", b"%lld").unwrap(), IntWidth::Eight);
        // Other modifier characters are ignored.
        assert_eq!(integer_width(b"0l8l", b"%0l8lu").unwrap(), IntWidth::Eight);

        match integer_width(b"llll", b"%lllld") {
            Err(DecodeError::InvalidLengthModifier { specifier, count }) => {
                assert_eq!(specifier, "%lllld");
                assert_eq!(count, 4);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(integer_width(b"lll", b"%lllu").is_err());
    }

    #[test]
    fn test_string_layout() {
        assert_eq!(string_layout(b"", b"%s").unwrap(), StringLayout::Variable);
        assert_eq!(string_layout(b"5", b"%5s").unwrap(), StringLayout::Fixed(5));
        assert_eq!(string_layout(b"128", b"%128s").unwrap(), StringLayout::Fixed(128));
        assert_eq!(string_layout(b"0", b"%0s").unwrap(), StringLayout::Fixed(0));

        assert!(matches!(
            string_layout(b"l", b"%ls"),
            Err(DecodeError::InvalidStringWidth { .. })
        ));
        assert!(string_layout(b"-5", b"%-5s").is_err());
        assert!(string_layout(b"99999999999999999999999", b"%99999999999999999999999s").is_err());

        assert_eq!(
            string_layout(b"4294967295", b"%4294967295s").unwrap(),
            StringLayout::Fixed(u32::MAX as usize)
        );
        assert!(matches!(
            string_layout(b"4294967296", b"%4294967296s"),
            Err(DecodeError::InvalidStringWidth { .. })
        ));
        assert!(string_layout(b"18446744073709551615", b"%18446744073709551615s").is_err());
    }
}
