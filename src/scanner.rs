use crate::grammar::{Grammar, SpecifierKind};

/// Half-open byte range of one escape, from its `%` to one past the
/// terminator letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecifierSpan {
    pub begin: usize,
    pub end: usize,
}

impl SpecifierSpan {
    pub fn new(begin: usize, end: usize) -> Self {
        Self { begin, end }
    }

    /// The whole escape, `%` and letter included.
    pub fn text<'a>(&self, fmt: &'a [u8]) -> &'a [u8] {
        &fmt[self.begin..self.end]
    }

    /// Everything strictly between `%` and the terminator letter.
    pub fn modifiers<'a>(&self, fmt: &'a [u8]) -> &'a [u8] {
        &fmt[self.begin + 1..self.end - 1]
    }
}

/// One item found by the scanner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    /// `%%`, rendered as a single `%` and consuming nothing.
    Percent(SpecifierSpan),
    /// A specifier that consumes an argument.
    Specifier(SpecifierKind, SpecifierSpan),
}

impl Directive {
    pub fn span(&self) -> SpecifierSpan {
        match *self {
            Directive::Percent(span) | Directive::Specifier(_, span) => span,
        }
    }
}

/// Find every escape in `fmt`, in order of appearance.
///
/// A `%` directly after an open `%` closes it as a literal percent. Any other
/// `%` opens a new escape, dropping one that never reached a terminator.
/// Characters inside an open escape that are not terminators are left for the
/// grammar to interpret from the span.
pub fn scan(fmt: &[u8], grammar: &Grammar) -> Vec<Directive> {
    let mut directives = Vec::new();
    let mut open: Option<usize> = None;

    for (i, &c) in fmt.iter().enumerate() {
        if c == b'%' {
            open = match open {
                Some(begin) if begin + 1 == i => {
                    directives.push(Directive::Percent(SpecifierSpan::new(begin, i + 1)));
                    None
                }
                _ => Some(i),
            };
            continue;
        }

        let Some(begin) = open else {
            continue;
        };
        if let Some(kind) = grammar.classify(c) {
            directives.push(Directive::Specifier(kind, SpecifierSpan::new(begin, i + 1)));
            open = None;
        }
    }

    directives
}
