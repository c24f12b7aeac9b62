//! A parser library for the [Conventional Commits] specification.
//!
//! [Conventional Commits]: https://www.conventionalcommits.org
//!
//! The parser is a byte-level state machine: it consumes the message one byte
//! at a time and either yields a validated [`Commit`] record or reports the
//! first violation together with the byte column at which it was detected.
//! Body text and footer trailers are distinguished by speculating a trailer
//! on each candidate line and rewinding the speculated bytes into the body
//! when no trailer has been committed yet.
//!
//! # Example
//!
//! ```rust
//! use conventional_commits::Commit;
//!
//! fn main() -> Result<(), conventional_commits::Error> {
//!     let message = "fix(machine): rewind to the body on a lone trailer token\n\
//!                    \n\
//!                    A token without its separator is body content, not a\n\
//!                    trailer, so the speculated bytes are replayed.\n\
//!                    \n\
//!                    Reviewed-by: Alice\n\
//!                    Refs #42\n";
//!
//!     let commit = Commit::new(message)?;
//!
//!     assert_eq!(commit.type_(), "fix");
//!     assert_eq!(commit.scope(), Some("machine"));
//!     assert_eq!(
//!         commit.description(),
//!         "rewind to the body on a lone trailer token"
//!     );
//!     assert!(commit.body().starts_with("A token without"));
//!     assert_eq!(commit.footers()["reviewed-by"], ["Alice"]);
//!     assert_eq!(commit.footers()["refs"], ["42"]);
//!     Ok(())
//! }
//! ```
//!
//! # Dialects
//!
//! Three type vocabularies are selectable through [`TypeSet`]: the minimal
//! `fix`/`feat` pair (the default), the eleven conventional keywords, or any
//! free-form run of printable characters. Keywords match case-insensitively
//! and are recorded in their original byte case.
//!
//! # Best effort
//!
//! With [`Parser::with_best_effort`] the parser attaches the partially
//! populated record to the returned [`Error`] whenever the minimum viable
//! prefix — type and description — was recognized before the failure.
//!
//! # Logging
//!
//! The machine emits [`tracing`] events while it works: `info` for each
//! recognized production, `debug` for machine decisions, and one `error` per
//! failed parse. Attach any `tracing` subscriber to observe them.

#![deny(
    missing_debug_implementations,
    missing_docs,
    nonstandard_style,
    rust_2018_idioms,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unsafe_code,
    unused_import_braces,
    unused_lifetimes,
    unused_qualifications
)]
#![doc(html_root_url = "https://docs.rs/conventional-commits")]

mod commit;
mod component;
pub mod error;
mod machine;
mod types;

pub use commit::{Commit, BREAKING_CHANGE_KEY};
pub use error::{Error, ErrorKind};
pub use types::TypeSet;

use machine::Machine;
use tracing::error;

/// A reusable Conventional Commits parser.
///
/// The parser itself only holds the configured options; every call to
/// [`parse`](Self::parse) runs on fresh transient state, so one instance may
/// be reused for successive messages.
#[derive(Clone, Copy, Debug, Default)]
pub struct Parser {
    best_effort: bool,
    types: TypeSet,
}

impl Parser {
    /// Creates a parser for the minimal dialect with best-effort mode off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables or disables best-effort mode.
    ///
    /// When on, a failed parse whose record is minimally valid (type and
    /// description recognized) attaches that partial record to the error.
    #[must_use]
    pub fn with_best_effort(mut self, best_effort: bool) -> Self {
        self.best_effort = best_effort;
        self
    }

    /// Selects the commit message type dialect.
    #[must_use]
    pub fn with_types(mut self, types: TypeSet) -> Self {
        self.types = types;
        self
    }

    /// Whether best-effort mode is on.
    pub fn best_effort(&self) -> bool {
        self.best_effort
    }

    /// The selected type dialect.
    pub fn types(&self) -> TypeSet {
        self.types
    }

    /// Parses one commit message.
    ///
    /// # Errors
    ///
    /// Returns the first violation together with the byte column at which it
    /// was detected. In best-effort mode the error carries the partial record
    /// when type and description had already been recognized.
    pub fn parse(&self, input: impl AsRef<[u8]>) -> Result<Commit, Error> {
        let mut machine = Machine::new(input.as_ref(), self.types);
        match machine.run() {
            Ok(()) => Ok(machine.into_commit()),
            Err(kind) => {
                error!(%kind, "commit message parse failed");
                let partial = if self.best_effort && machine.minimal() {
                    Some(Box::new(machine.into_commit()))
                } else {
                    None
                };
                Err(Error::new(kind, partial))
            }
        }
    }
}
