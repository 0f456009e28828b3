use crate::error::{EngineError, EngineResult};

/// Compute the next human-readable record identifier for a creation path.
///
/// `current_max` is the highest stored identifier (callers obtain it with a
/// descending query over the numeric suffix, so insertion order does not
/// matter). Identifiers have the shape `PREFIX_<n>`; the numeric part is
/// everything after the first `_`, which keeps legacy records created under
/// a different prefix scheme parseable.
///
/// With no prior record the sequence starts at `PREFIX_1`.
pub fn next_record_uid(prefix: &str, current_max: Option<&str>) -> EngineResult<String> {
    let next = match current_max {
        Some(existing) => parse_uid_suffix(existing)? + 1,
        None => 1,
    };
    Ok(format!("{prefix}_{next}"))
}

/// Extract the numeric suffix of a stored `PREFIX_<n>` identifier.
///
/// A stored value whose suffix does not parse is corrupt data; allocation
/// must fail loudly rather than fall back to a guessed sequence value.
pub fn parse_uid_suffix(uid: &str) -> EngineResult<u64> {
    let suffix = uid
        .split_once('_')
        .map(|(_, rest)| rest)
        .ok_or_else(|| EngineError::MalformedIdentifier(uid.to_string()))?;
    suffix
        .parse::<u64>()
        .map_err(|_| EngineError::MalformedIdentifier(uid.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_existing_identifier() {
        assert_eq!(next_record_uid("DF", Some("DF_7")).unwrap(), "DF_8");
        assert_eq!(next_record_uid("FF", Some("FF_41")).unwrap(), "FF_42");
    }

    #[test]
    fn starts_at_one_when_store_is_empty() {
        assert_eq!(next_record_uid("DF", None).unwrap(), "DF_1");
    }

    #[test]
    fn tolerates_legacy_prefix_on_stored_value() {
        // The stored maximum may carry an older prefix; only the suffix counts.
        assert_eq!(next_record_uid("DF", Some("FF_12")).unwrap(), "DF_13");
    }

    #[test]
    fn suffix_after_first_underscore_only() {
        assert_eq!(parse_uid_suffix("DF_9").unwrap(), 9);
        // Everything after the *first* underscore must be numeric.
        assert!(matches!(
            parse_uid_suffix("DF_9_1"),
            Err(EngineError::MalformedIdentifier(_))
        ));
    }

    #[test]
    fn malformed_suffix_is_fatal() {
        assert!(matches!(
            next_record_uid("DF", Some("DF_abc")),
            Err(EngineError::MalformedIdentifier(_))
        ));
        assert!(matches!(
            next_record_uid("DF", Some("no-underscore")),
            Err(EngineError::MalformedIdentifier(_))
        ));
    }
}
