//! Error types for the ADT layer.

/// Errors that can occur when constructing an ADT from untrusted data.
///
/// The safe constructors (like [`NonEmptyList::from_vec`](crate::NonEmptyList::from_vec))
/// return `Option`; the `TryFrom` impls return this error instead, so
/// callers can use `?` and get a readable message in logs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdtError {
    /// A `NonEmptyList` was requested from a sequence with no elements.
    #[error("cannot build a non-empty list from an empty sequence")]
    EmptyList,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list_display() {
        assert_eq!(
            AdtError::EmptyList.to_string(),
            "cannot build a non-empty list from an empty sequence"
        );
    }
}
