use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::duplicate::DuplicateReport;
use crate::error::{EngineError, EngineResult};

/// Caller-chosen policy for an identity-field collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Write nothing; report zero records written.
    Skip,
    /// Suffix the colliding identity value(s) and insert as a fresh record.
    Append,
    /// Delete the conflicting record(s), then insert the candidate.
    Replace,
    /// Defer to a human: return the report, write nothing.
    Prompt,
}

impl std::fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DuplicatePolicy::Skip => write!(f, "skip"),
            DuplicatePolicy::Append => write!(f, "append"),
            DuplicatePolicy::Replace => write!(f, "replace"),
            DuplicatePolicy::Prompt => write!(f, "prompt"),
        }
    }
}

impl FromStr for DuplicatePolicy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(DuplicatePolicy::Skip),
            "append" => Ok(DuplicatePolicy::Append),
            "replace" => Ok(DuplicatePolicy::Replace),
            "prompt" => Ok(DuplicatePolicy::Prompt),
            other => Err(EngineError::InvalidPolicy(other.to_string())),
        }
    }
}

/// Mutation plan produced for a detected collision. The storage layer
/// executes the plan; the planner itself never touches storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionPlan {
    /// Nothing to write.
    NoOp,
    /// Hand the report back upstream for a human decision.
    Defer(DuplicateReport),
    /// Insert as a fresh record (new identifier) after suffixing each
    /// colliding identity field.
    InsertSuffixed { fields: Vec<String> },
    /// Delete the listed records, then insert the candidate reusing
    /// `reuse_uid` as its external identifier.
    ReplaceExisting { delete_ids: Vec<i64>, reuse_uid: String },
}

/// Turn a policy and a detection report into a mutation plan.
///
/// With an empty report every policy degenerates to a plain insert, which is
/// modeled as `InsertSuffixed` with no fields to touch.
pub fn plan_resolution(
    policy: DuplicatePolicy,
    report: &DuplicateReport,
) -> EngineResult<ResolutionPlan> {
    if report.is_empty() {
        return Ok(ResolutionPlan::InsertSuffixed { fields: Vec::new() });
    }
    match policy {
        DuplicatePolicy::Skip => Ok(ResolutionPlan::NoOp),
        DuplicatePolicy::Prompt => Ok(ResolutionPlan::Defer(report.clone())),
        DuplicatePolicy::Append => Ok(ResolutionPlan::InsertSuffixed {
            fields: report.colliding_fields().iter().map(|f| f.to_string()).collect(),
        }),
        DuplicatePolicy::Replace => {
            let reuse_uid = report.hits[0].record_uid.clone();
            Ok(ResolutionPlan::ReplaceExisting {
                delete_ids: report.conflicting_ids(),
                reuse_uid,
            })
        }
    }
}

/// Manufacture a distinct identity value by appending `__<n>`, where `n` is
/// one greater than the highest suffix already present among `existing`
/// values sharing the same base.
pub fn append_suffix(base: &str, existing: &[String]) -> String {
    let max_suffix = existing
        .iter()
        .filter_map(|value| parse_suffix(base, value))
        .max()
        .unwrap_or(0);
    format!("{base}__{}", max_suffix + 1)
}

/// Parse the `__<n>` counter of `value` relative to `base`. The bare base
/// itself counts as suffix 0.
fn parse_suffix(base: &str, value: &str) -> Option<u32> {
    let rest = value.strip_prefix(base)?;
    if rest.is_empty() {
        return Some(0);
    }
    let digits = rest.strip_prefix("__")?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::duplicate::DuplicateHit;

    fn report_with(fields: &[(&str, i64, &str)]) -> DuplicateReport {
        DuplicateReport {
            hits: fields
                .iter()
                .map(|(field, id, uid)| DuplicateHit {
                    field: field.to_string(),
                    record_id: *id,
                    record_uid: uid.to_string(),
                    customer_name: None,
                    value: "x".to_string(),
                })
                .collect(),
        }
    }

    #[test]
    fn unknown_policy_is_rejected() {
        assert!(matches!(
            "merge".parse::<DuplicatePolicy>(),
            Err(EngineError::InvalidPolicy(_))
        ));
        assert_eq!("Replace".parse::<DuplicatePolicy>().unwrap(), DuplicatePolicy::Replace);
    }

    #[test]
    fn skip_plans_nothing() {
        let report = report_with(&[("mobile", 4, "DF_4")]);
        assert_eq!(
            plan_resolution(DuplicatePolicy::Skip, &report).unwrap(),
            ResolutionPlan::NoOp
        );
    }

    #[test]
    fn prompt_defers_with_the_report() {
        let report = report_with(&[("mobile", 4, "DF_4")]);
        match plan_resolution(DuplicatePolicy::Prompt, &report).unwrap() {
            ResolutionPlan::Defer(returned) => assert_eq!(returned, report),
            other => panic!("unexpected plan: {other:?}"),
        }
    }

    #[test]
    fn append_targets_each_colliding_field_once() {
        let report = report_with(&[("mobile", 4, "DF_4"), ("mobile", 9, "DF_9"), ("crn", 4, "DF_4")]);
        match plan_resolution(DuplicatePolicy::Append, &report).unwrap() {
            ResolutionPlan::InsertSuffixed { fields } => {
                assert_eq!(fields, vec!["mobile".to_string(), "crn".to_string()]);
            }
            other => panic!("unexpected plan: {other:?}"),
        }
    }

    #[test]
    fn replace_reuses_first_conflicting_uid() {
        let report = report_with(&[("mobile", 4, "DF_4"), ("email", 9, "DF_9")]);
        match plan_resolution(DuplicatePolicy::Replace, &report).unwrap() {
            ResolutionPlan::ReplaceExisting { delete_ids, reuse_uid } => {
                assert_eq!(delete_ids, vec![4, 9]);
                assert_eq!(reuse_uid, "DF_4");
            }
            other => panic!("unexpected plan: {other:?}"),
        }
    }

    #[test]
    fn no_hits_means_plain_insert_for_any_policy() {
        let empty = DuplicateReport::default();
        assert_eq!(
            plan_resolution(DuplicatePolicy::Skip, &empty).unwrap(),
            ResolutionPlan::InsertSuffixed { fields: Vec::new() }
        );
    }

    #[test]
    fn first_suffix_is_one() {
        let existing = vec!["9998887777".to_string()];
        assert_eq!(append_suffix("9998887777", &existing), "9998887777__1");
    }

    #[test]
    fn suffix_counts_past_the_maximum() {
        let existing = vec![
            "9998887777".to_string(),
            "9998887777__1".to_string(),
            "9998887777__2".to_string(),
        ];
        assert_eq!(append_suffix("9998887777", &existing), "9998887777__3");
    }

    #[test]
    fn unrelated_and_malformed_values_are_ignored() {
        let existing = vec![
            "9998887777__1".to_string(),
            "9998887777__x".to_string(),
            "99988877779".to_string(),
            "9998887777__5__tail".to_string(),
        ];
        assert_eq!(append_suffix("9998887777", &existing), "9998887777__2");
    }
}
