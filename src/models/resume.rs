// Resume record model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::content::RequestStatus;

/// Flat token cost of a resume enhancement, Basic and Targeted alike
pub const RESUME_ENHANCE_COST: i64 = 5;

/// Kind of resume record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ResumeKind {
    UserUploaded,
    BasicEnhanced,
    TargetedEnhanced,
}

impl ResumeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResumeKind::UserUploaded => "User Uploaded",
            ResumeKind::BasicEnhanced => "Basic Enhanced",
            ResumeKind::TargetedEnhanced => "Targeted Enhanced",
        }
    }

    pub fn is_enhancement(&self) -> bool {
        matches!(self, ResumeKind::BasicEnhanced | ResumeKind::TargetedEnhanced)
    }
}

impl FromStr for ResumeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "User Uploaded" => Ok(ResumeKind::UserUploaded),
            "Basic Enhanced" => Ok(ResumeKind::BasicEnhanced),
            "Targeted Enhanced" => Ok(ResumeKind::TargetedEnhanced),
            _ => Err(format!("Invalid resume kind: {}", s)),
        }
    }
}

/// Resume record as stored in the Resume Store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeRecord {
    pub id: String,
    pub user_id: String,
    pub user_email: String,
    pub file_name: String,
    pub file_url: String,
    pub kind: ResumeKind,
    /// Target job posting, Targeted enhancements only
    pub job_url: Option<String>,
    pub status: RequestStatus,
    pub output: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// New resume record for creation
#[derive(Debug, Clone)]
pub struct NewResumeRecord {
    pub user_id: String,
    pub user_email: String,
    pub file_name: String,
    pub file_url: String,
    pub kind: ResumeKind,
    pub job_url: Option<String>,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

/// Partial update against a resume record
#[derive(Debug, Clone, Default)]
pub struct ResumePatch {
    pub status: Option<RequestStatus>,
    pub output: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            ResumeKind::UserUploaded,
            ResumeKind::BasicEnhanced,
            ResumeKind::TargetedEnhanced,
        ] {
            assert_eq!(ResumeKind::from_str(kind.as_str()), Ok(kind));
        }
        assert!(ResumeKind::from_str("Enhanced").is_err());
    }

    #[test]
    fn test_enhancement_predicate() {
        assert!(!ResumeKind::UserUploaded.is_enhancement());
        assert!(ResumeKind::BasicEnhanced.is_enhancement());
        assert!(ResumeKind::TargetedEnhanced.is_enhancement());
    }
}
