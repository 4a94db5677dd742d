use crate::students::repo_types::{EligibilityStatus, OverallStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    NotEligible,
}

/// Classify a student's eligibility record. Only `overall_status` counts; the
/// checklist booleans are audit context.
pub fn evaluate(record: Option<&EligibilityStatus>) -> Eligibility {
    match record.map(|r| r.overall_status) {
        Some(OverallStatus::Eligible | OverallStatus::Override) => Eligibility::Eligible,
        Some(OverallStatus::NotEligible | OverallStatus::Pending) | None => {
            Eligibility::NotEligible
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn record(overall_status: OverallStatus, all_checked: bool) -> EligibilityStatus {
        EligibilityStatus {
            id: 1,
            student_id: 1,
            classes_completed: all_checked,
            fees_paid: all_checked,
            assignments_submitted: all_checked,
            documents_submitted: all_checked,
            trainer_consent: all_checked,
            override_requested: false,
            override_applied: false,
            overall_status,
            reason: None,
            comments: None,
            updated_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[test]
    fn eligible_and_override_are_eligible() {
        assert_eq!(evaluate(Some(&record(OverallStatus::Eligible, true))), Eligibility::Eligible);
        assert_eq!(evaluate(Some(&record(OverallStatus::Override, false))), Eligibility::Eligible);
    }

    #[test]
    fn everything_else_is_not_eligible() {
        assert_eq!(
            evaluate(Some(&record(OverallStatus::NotEligible, false))),
            Eligibility::NotEligible
        );
        assert_eq!(evaluate(Some(&record(OverallStatus::Pending, false))), Eligibility::NotEligible);
        assert_eq!(evaluate(None), Eligibility::NotEligible);
    }

    #[test]
    fn checklist_does_not_override_overall_status() {
        assert_eq!(
            evaluate(Some(&record(OverallStatus::NotEligible, true))),
            Eligibility::NotEligible
        );
    }
}
