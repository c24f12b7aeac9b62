//! All errors related to parsing Conventional Commits.

use crate::commit::Commit;

/// All possible violations detected while parsing a commit message.
///
/// Each variant carries the zero-based byte column at which the violation was
/// detected and, where the diagnostic names a character, the offending byte.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ErrorKind {
    /// The input was empty.
    #[error("empty input: col={col:02}")]
    Empty {
        /// Byte column of the violation.
        col: usize,
    },

    /// A byte that cannot continue any accepted type keyword.
    #[error("illegal '{ch}' character in commit message type: col={col:02}")]
    Type {
        /// The offending byte.
        ch: char,
        /// Byte column of the violation.
        col: usize,
    },

    /// The input ended in the middle of a type keyword.
    #[error("incomplete commit message type after '{ch}' character: col={col:02}")]
    TypeIncomplete {
        /// The last consumed byte.
        ch: char,
        /// Byte column of the violation.
        col: usize,
    },

    /// The mandatory colon after the type (and optional scope and breaking
    /// marker) was missing.
    #[error("expecting colon (':') character, got '{ch}' character: col={col:02}")]
    Colon {
        /// The offending byte.
        ch: char,
        /// Byte column of the violation.
        col: usize,
    },

    /// An illegal byte inside the scope parentheses.
    #[error("illegal '{ch}' character in scope: col={col:02}")]
    Scope {
        /// The offending byte.
        ch: char,
        /// Byte column of the violation.
        col: usize,
    },

    /// The input ended before the scope was closed.
    #[error("expecting closing parentheses (')') character, got early exit after '{ch}' character: col={col:02}")]
    ScopeIncomplete {
        /// The last consumed byte.
        ch: char,
        /// Byte column of the violation.
        col: usize,
    },

    /// The input ended where the grammar still required more bytes.
    #[error("early exit after '{ch}' character: col={col:02}")]
    Early {
        /// The last consumed byte.
        ch: char,
        /// Byte column of the violation.
        col: usize,
    },

    /// The byte after the colon was not a white space.
    #[error("expecting at least one white-space (' ') character, got '{ch}' character: col={col:02}")]
    DescriptionInit {
        /// The offending byte.
        ch: char,
        /// Byte column of the violation.
        col: usize,
    },

    /// The input ended before any description text.
    #[error("expecting a description text (without newlines) after '{ch}' character: col={col:02}")]
    Description {
        /// The last consumed byte.
        ch: char,
        /// Byte column of the violation.
        col: usize,
    },

    /// A newline where description text was expected.
    #[error("illegal newline: col={col:02}")]
    Newline {
        /// Byte column just past the newline.
        col: usize,
    },

    /// The blank line separating the description from the rest was missing.
    #[error("missing a blank line: col={col:02}")]
    MissingBlankLine {
        /// Byte column of the violation.
        col: usize,
    },

    /// An illegal byte inside a footer trailer.
    #[error("illegal '{ch}' character in trailer: col={col:02}")]
    Trailer {
        /// The offending byte.
        ch: char,
        /// Byte column of the violation.
        col: usize,
    },

    /// The input ended in the middle of a footer trailer.
    #[error("incomplete footer trailer after '{ch}' character: col={col:02}")]
    TrailerIncomplete {
        /// The last consumed byte.
        ch: char,
        /// Byte column of the violation.
        col: usize,
    },
}

impl ErrorKind {
    /// The byte column at which the violation was detected.
    pub fn column(&self) -> usize {
        match *self {
            Self::Empty { col }
            | Self::Type { col, .. }
            | Self::TypeIncomplete { col, .. }
            | Self::Colon { col, .. }
            | Self::Scope { col, .. }
            | Self::ScopeIncomplete { col, .. }
            | Self::Early { col, .. }
            | Self::DescriptionInit { col, .. }
            | Self::Description { col, .. }
            | Self::Newline { col }
            | Self::MissingBlankLine { col }
            | Self::Trailer { col, .. }
            | Self::TrailerIncomplete { col, .. } => col,
        }
    }
}

/// A fatal parse failure.
///
/// In best-effort mode the error also carries the partially populated record,
/// provided the minimum viable prefix (type and description) was recognized
/// before the failure.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    kind: ErrorKind,
    partial: Option<Box<Commit>>,
}

impl Error {
    pub(crate) fn new(kind: ErrorKind, partial: Option<Box<Commit>>) -> Self {
        Self { kind, partial }
    }

    /// The diagnostic that stopped the parse.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// The byte column at which the parse stopped.
    pub fn column(&self) -> usize {
        self.kind.column()
    }

    /// The partial record, when best-effort mode was on and the record was
    /// minimally valid.
    pub fn partial(&self) -> Option<&Commit> {
        self.partial.as_deref()
    }

    /// Consumes the error, returning the partial record if any.
    pub fn into_partial(self) -> Option<Commit> {
        self.partial.map(|commit| *commit)
    }
}

#[cfg(test)]
mod tests {
    use super::ErrorKind;

    #[test]
    fn columns_are_zero_padded_to_two_digits() {
        let err = ErrorKind::Type { ch: 'z', col: 0 };
        assert_eq!(
            err.to_string(),
            "illegal 'z' character in commit message type: col=00"
        );

        let err = ErrorKind::Trailer { ch: '!', col: 123 };
        assert_eq!(err.to_string(), "illegal '!' character in trailer: col=123");
    }

    #[test]
    fn raw_bytes_render_verbatim() {
        let err = ErrorKind::Scope { ch: '\n', col: 7 };
        assert_eq!(err.to_string(), "illegal '\n' character in scope: col=07");
    }
}
