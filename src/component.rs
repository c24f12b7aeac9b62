//! Conventional Commit components.

use std::fmt;
use std::ops::Deref;

macro_rules! components {
    ($($ty:ident),+) => (
        $(
            /// A component of the conventional commit.
            #[derive(Clone, Debug, Eq, Hash, PartialEq)]
            pub(crate) struct $ty(pub(crate) String);

            impl Deref for $ty {
                type Target = str;

                fn deref(&self) -> &Self::Target {
                    &self.0
                }
            }

            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    self.0.fmt(f)
                }
            }

            impl From<String> for $ty {
                fn from(string: String) -> Self {
                    Self(string)
                }
            }
        )+
    )
}

components![Type, Scope, Description, Body];
