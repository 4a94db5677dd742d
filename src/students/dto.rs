use serde::{Deserialize, Serialize};

use super::repo::EligibilityChanges;
use super::repo_types::{EligibilityStatus, OverallStatus, StudentWithRelations};

#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedStudentResponse {
    pub student: StudentWithRelations,
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateEligibilityRequest {
    #[serde(default)]
    pub classes_completed: bool,
    #[serde(default)]
    pub fees_paid: bool,
    #[serde(default)]
    pub assignments_submitted: bool,
    #[serde(default)]
    pub documents_submitted: bool,
    #[serde(default)]
    pub trainer_consent: bool,
    #[serde(default)]
    pub override_requested: bool,
    #[serde(default)]
    pub override_applied: bool,
    pub overall_status: OverallStatus,
    pub reason: Option<String>,
    pub comments: Option<String>,
}

impl From<UpdateEligibilityRequest> for EligibilityChanges {
    fn from(r: UpdateEligibilityRequest) -> Self {
        fn clean(s: Option<String>) -> Option<String> {
            s.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        }
        Self {
            classes_completed: r.classes_completed,
            fees_paid: r.fees_paid,
            assignments_submitted: r.assignments_submitted,
            documents_submitted: r.documents_submitted,
            trainer_consent: r.trainer_consent,
            override_requested: r.override_requested,
            override_applied: r.override_applied,
            overall_status: r.overall_status,
            reason: clean(r.reason),
            comments: clean(r.comments),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct EligibilityResponse {
    pub success: bool,
    pub data: EligibilityStatus,
}
