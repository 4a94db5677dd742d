use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "student_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum StudentStatus {
    Active,
    Inactive,
    PlacementInitiated,
    Placed,
    Graduated,
    Withdrawn,
}

/// Staff-maintained verdict on a student's eligibility checklist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "overall_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OverallStatus {
    Eligible,
    NotEligible,
    Pending,
    Override,
}

impl OverallStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OverallStatus::Eligible => "eligible",
            OverallStatus::NotEligible => "not_eligible",
            OverallStatus::Pending => "pending",
            OverallStatus::Override => "override",
        }
    }
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Student {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub status: StudentStatus,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl Student {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ContactDetails {
    pub id: i64,
    pub student_id: i64,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub is_primary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EligibilityStatus {
    pub id: i64,
    pub student_id: i64,
    pub classes_completed: bool,
    pub fees_paid: bool,
    pub assignments_submitted: bool,
    pub documents_submitted: bool,
    pub trainer_consent: bool,
    pub override_requested: bool,
    pub override_applied: bool,
    pub overall_status: OverallStatus,
    pub reason: Option<String>,
    pub comments: Option<String>,
    pub updated_at: OffsetDateTime,
}

/// Student loaded together with the records the credential workflow reads.
#[derive(Debug, Clone, Serialize)]
pub struct StudentWithRelations {
    pub student: Student,
    pub contact_details: Vec<ContactDetails>,
    pub eligibility: Option<EligibilityStatus>,
}

impl StudentWithRelations {
    /// First contact record, in stored order, with a non-blank email.
    pub fn primary_email(&self) -> Option<&str> {
        self.contact_details
            .iter()
            .filter_map(|c| c.email.as_deref())
            .map(str::trim)
            .find(|e| !e.is_empty())
    }
}
