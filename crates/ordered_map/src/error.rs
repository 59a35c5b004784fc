use thiserror::Error;

/// Returned by `remove_min` / `remove_max` on a map with no entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("tree is empty")]
pub struct EmptyTreeError;

/// A single broken structural invariant, as found by `OrderedMap::verify`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum Violation {
    #[error("not in symmetric order")]
    SymmetricOrder,
    #[error("subtree counts not consistent")]
    SubtreeSize,
    #[error("ranks not consistent")]
    Rank,
    #[error("sibling heights differ by more than one")]
    HeightBalance,
    #[error("stored height does not match subtree height")]
    StaleHeight,
    #[error("not a 2-3 tree")]
    NotTwoThree,
    #[error("black links not balanced")]
    BlackBalance,
    #[error("root is red")]
    RedRoot,
}

/// Every invariant a map failed, in the order the predicates were evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("integrity check failed: {}", describe(.violations))]
pub struct IntegrityError {
    violations: Vec<Violation>,
}

impl IntegrityError {
    /// `Ok(())` when `violations` is empty.
    pub(crate) fn check(violations: Vec<Violation>) -> Result<(), Self> {
        if violations.is_empty() {
            Ok(())
        } else {
            Err(Self { violations })
        }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn contains(&self, violation: Violation) -> bool {
        self.violations.contains(&violation)
    }
}

fn describe(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(Violation::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
