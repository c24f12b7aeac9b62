//! The conventional commit record and its builder.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;

use crate::component::{Body, Description, Scope, Type};
use crate::error::Error;

/// The key under which both the `BREAKING CHANGE` literal and the
/// `BREAKING-CHANGE` token are recorded.
pub const BREAKING_CHANGE_KEY: &str = "breaking-change";

/// A parsed conventional commit message.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Commit {
    ty: Type,
    scope: Option<Scope>,
    description: Description,
    body: Body,
    exclamation: bool,
    footers: IndexMap<String, Vec<String>>,
}

impl Commit {
    /// Parses the provided commit message string with a default
    /// [`Parser`](crate::Parser) (minimal dialect, best-effort off).
    ///
    /// # Errors
    ///
    /// This function returns an error if the commit does not conform to the
    /// Conventional Commit specification.
    pub fn new(string: &str) -> Result<Self, Error> {
        crate::Parser::new().parse(string)
    }

    /// The type of the commit, in its original byte case.
    pub fn type_(&self) -> &str {
        &self.ty
    }

    /// The optional scope of the commit.
    ///
    /// An empty scope block `()` is reported as no scope at all.
    pub fn scope(&self) -> Option<&str> {
        self.scope.as_deref()
    }

    /// The commit description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The commit body, containing a more detailed explanation of the commit
    /// changes. Empty when the message had none.
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Whether the header carried the `!` marker before the colon.
    pub fn exclamation(&self) -> bool {
        self.exclamation
    }

    /// A flag to signal that the commit contains breaking changes.
    ///
    /// This flag is set either when the commit has an exclamation mark after
    /// the message type and scope, e.g.:
    ///
    ///   feat(scope)!: this is a breaking change
    ///   feat!: this is a breaking change
    ///
    /// Or when the `BREAKING CHANGE: ` footer is defined:
    ///
    ///   feat: my commit description
    ///
    ///   BREAKING CHANGE: this is a breaking change
    pub fn breaking(&self) -> bool {
        self.exclamation || self.footers.contains_key(BREAKING_CHANGE_KEY)
    }

    /// The footer trailers, keyed by lowercased token in input order.
    ///
    /// A token that appears more than once keeps one entry with its values in
    /// input order.
    pub fn footers(&self) -> &IndexMap<String, Vec<String>> {
        &self.footers
    }

    /// Whether the record holds the minimum viable fields, i.e. a non-empty
    /// type and a non-empty description.
    ///
    /// Records returned from a successful parse always are; partial records
    /// attached to an [`Error`] in best-effort mode are exactly the minimal
    /// ones.
    pub fn minimal(&self) -> bool {
        !self.ty.is_empty() && !self.description.is_empty()
    }
}

impl FromStr for Commit {
    type Err = Error;

    fn from_str(string: &str) -> Result<Self, Self::Err> {
        Self::new(string)
    }
}

impl fmt::Display for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_())?;

        if let Some(scope) = self.scope() {
            write!(f, "({scope})")?;
        }

        if self.exclamation {
            f.write_str("!")?;
        }

        write!(f, ": {}", self.description)?;

        if !self.body.is_empty() {
            write!(f, "\n\n{}", self.body)?;
        }

        let mut separator = "\n\n";
        for (key, values) in &self.footers {
            for value in values {
                write!(f, "{separator}{key}: {value}")?;
                separator = "\n";
            }
        }

        Ok(())
    }
}

/// Accumulates productions as the recognizer emits them.
#[derive(Debug, Default)]
pub(crate) struct CommitBuilder {
    pub(crate) ty: String,
    pub(crate) scope: String,
    pub(crate) description: String,
    pub(crate) body: String,
    pub(crate) exclamation: bool,
    pub(crate) footers: IndexMap<String, Vec<String>>,
}

impl CommitBuilder {
    pub(crate) fn minimal(&self) -> bool {
        !self.ty.is_empty() && !self.description.is_empty()
    }

    pub(crate) fn build(self) -> Commit {
        // The recognizer accumulates any final newline run into the body; the
        // record ends at the last content byte.
        let trimmed = self.body.trim_end_matches('\n').len();
        let mut body = self.body;
        body.truncate(trimmed);

        let scope = if self.scope.is_empty() {
            None
        } else {
            Some(Scope(self.scope))
        };

        Commit {
            ty: Type(self.ty),
            scope,
            description: Description(self.description),
            body: Body(body),
            exclamation: self.exclamation,
            footers: self.footers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_round_trips_observable_fields() {
        let message = "feat(api)!: add endpoint\n\
                       \n\
                       Explanation goes here.\n\
                       \n\
                       reviewed-by: Alice\n\
                       refs: 42";
        let commit = Commit::new(message).unwrap();
        let again = Commit::new(&commit.to_string()).unwrap();

        assert_eq!(commit, again);
    }

    #[test]
    fn display_omits_empty_sections() {
        let commit = Commit::new("fix: typo").unwrap();
        assert_eq!(commit.to_string(), "fix: typo");

        let commit = Commit::new("fix: typo\n\nRefs #1").unwrap();
        assert_eq!(commit.to_string(), "fix: typo\n\nrefs: 1");
    }

    #[test]
    fn breaking_is_set_by_marker_or_footer() {
        let commit = Commit::new("fix!: drop api").unwrap();
        assert!(commit.exclamation());
        assert!(commit.breaking());

        let commit = Commit::new("fix: x\n\nBREAKING CHANGE: gone").unwrap();
        assert!(!commit.exclamation());
        assert!(commit.breaking());

        let commit = Commit::new("fix: x").unwrap();
        assert!(!commit.breaking());
    }

    #[test]
    fn duplicate_footer_keys_append_in_order() {
        let commit = Commit::new("fix: x\n\nRefs #1\nRefs #2\nAcked-by: B").unwrap();

        let footers = commit.footers();
        assert_eq!(footers["refs"], ["1", "2"]);
        assert_eq!(footers["acked-by"], ["B"]);
        assert_eq!(
            footers.keys().collect::<Vec<_>>(),
            ["refs", "acked-by"]
        );
    }

    #[test]
    fn minimal_requires_type_and_description() {
        let commit = Commit::new("fix: typo").unwrap();
        assert!(commit.minimal());
    }
}
