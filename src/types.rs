//! Commit message type dialects.

/// The vocabulary accepted for the commit message type.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub enum TypeSet {
    /// Only `fix` and `feat`.
    #[default]
    Minimal,

    /// The eleven types popularized by the Angular convention.
    Conventional,

    /// Any non-empty run of printable characters up to the scope, breaking
    /// marker, or colon.
    FreeForm,
}

pub(crate) const MINIMAL: &[&str] = &["fix", "feat"];

pub(crate) const CONVENTIONAL: &[&str] = &[
    "build", "chore", "ci", "docs", "feat", "fix", "perf", "refactor", "revert", "style", "test",
];
