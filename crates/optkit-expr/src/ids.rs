use std::fmt;

/// Identifies the problem that issued a handle.
///
/// Handles are only meaningful inside the problem that created them; the tag
/// lets a problem reject handles that were issued by another one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct ProblemTag(u32);

impl ProblemTag {
    /// Create a tag from a u32 value.
    pub fn new(value: u32) -> Self {
        Self(value)
    }

    /// Get the inner u32 value.
    pub fn inner(self) -> u32 {
        self.0
    }
}

macro_rules! define_id_type {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            owner: ProblemTag,
            index: u32,
        }

        impl $name {
            /// Create a handle for position `index` inside the problem `owner`.
            pub fn new(owner: ProblemTag, index: u32) -> Self {
                Self { owner, index }
            }

            /// The problem that issued this handle.
            pub fn owner(self) -> ProblemTag {
                self.owner
            }

            /// Get the inner u32 position.
            pub fn inner(self) -> u32 {
                self.index
            }

            /// Position as a vector index.
            pub fn index(self) -> usize {
                self.index as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}@{}", $prefix, self.index, self.owner.0)
            }
        }
    };
}

define_id_type!(VariableId, "v");
define_id_type!(ConstraintId, "c");
