use crate::error::DomainError;

/// Optimistic concurrency check at the persistence boundary. `expected` is
/// the version the caller read; `found` is the currently stored version.
/// Every racing mutation path goes through this; there is no other
/// concurrency-control mechanism for child entities.
pub fn ensure_version(expected: i64, found: i64) -> Result<(), DomainError> {
    if expected != found {
        return Err(DomainError::VersionConflict { expected, found });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_version_passes() {
        assert!(ensure_version(2, 2).is_ok());
    }

    #[test]
    fn test_stale_version_is_a_conflict() {
        let err = ensure_version(2, 3).unwrap_err();
        assert!(matches!(
            err,
            DomainError::VersionConflict { expected: 2, found: 3 }
        ));
    }
}
