// Content request model and lifecycle states

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Flat token cost of a social media post
pub const SOCIAL_POST_COST: i64 = 2;

/// Word-count granularity for long-form pricing
const WORDS_PER_TOKEN_UNIT: u32 = 500;

/// Kind of content the fulfillment worker is asked to produce
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ContentType {
    BlogPost,
    SeoArticle,
    SocialMediaPost,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::BlogPost => "Blog Post",
            ContentType::SeoArticle => "SEO Article",
            ContentType::SocialMediaPost => "Social Media Post",
        }
    }
}

impl FromStr for ContentType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Blog Post" => Ok(ContentType::BlogPost),
            "SEO Article" => Ok(ContentType::SeoArticle),
            "Social Media Post" => Ok(ContentType::SocialMediaPost),
            _ => Err(format!("Invalid content type: {}", s)),
        }
    }
}

/// Request lifecycle status. `In Progress`, `Completed` and `Failed` are
/// written only by the external fulfillment worker; the application itself
/// writes `Requested` and `Cancelled`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RequestStatus {
    Requested,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Requested => "Requested",
            RequestStatus::InProgress => "In Progress",
            RequestStatus::Completed => "Completed",
            RequestStatus::Failed => "Failed",
            RequestStatus::Cancelled => "Cancelled",
        }
    }

    /// User-initiated cancellation is allowed before the work is delivered
    pub fn can_cancel(&self) -> bool {
        matches!(self, RequestStatus::Requested | RequestStatus::InProgress)
    }

    /// Resubmission re-enters the pipeline from a failure only
    pub fn can_resubmit(&self) -> bool {
        matches!(self, RequestStatus::Failed)
    }

    /// In-place edits and regeneration apply to delivered output only
    pub fn can_edit(&self) -> bool {
        matches!(self, RequestStatus::Completed)
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Requested" => Ok(RequestStatus::Requested),
            "In Progress" => Ok(RequestStatus::InProgress),
            "Completed" => Ok(RequestStatus::Completed),
            "Failed" => Ok(RequestStatus::Failed),
            "Cancelled" => Ok(RequestStatus::Cancelled),
            _ => Err(format!("Invalid request status: {}", s)),
        }
    }
}

/// Type-specific request parameters, stored as a tagged JSON payload
/// alongside the free-text details
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentParams {
    Blog { keywords: Vec<String>, word_count: u32 },
    Seo { keywords: Vec<String>, word_count: u32 },
    Social { platform: String },
}

impl ContentParams {
    pub fn content_type(&self) -> ContentType {
        match self {
            ContentParams::Blog { .. } => ContentType::BlogPost,
            ContentParams::Seo { .. } => ContentType::SeoArticle,
            ContentParams::Social { .. } => ContentType::SocialMediaPost,
        }
    }

    /// Token cost: flat for social posts, word-count-proportional for
    /// long-form content (whole 500-word units, floor of 1)
    pub fn token_cost(&self) -> i64 {
        match self {
            ContentParams::Social { .. } => SOCIAL_POST_COST,
            ContentParams::Blog { word_count, .. } | ContentParams::Seo { word_count, .. } => {
                std::cmp::max(1, (word_count / WORDS_PER_TOKEN_UNIT) as i64)
            },
        }
    }
}

/// Content generation request as stored in the Content Store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRequest {
    pub id: String,
    pub user_id: String,
    pub user_email: String,
    pub content_type: ContentType,
    pub details: String,
    pub params: ContentParams,
    pub status: RequestStatus,
    pub output: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// New content request for creation
#[derive(Debug, Clone)]
pub struct NewContentRequest {
    pub user_id: String,
    pub user_email: String,
    pub content_type: ContentType,
    pub details: String,
    pub params: ContentParams,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

/// Partial update against a content request record
#[derive(Debug, Clone, Default)]
pub struct ContentPatch {
    pub details: Option<String>,
    pub params: Option<ContentParams>,
    pub status: Option<RequestStatus>,
    /// Inner `None` clears the output field
    pub output: Option<Option<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_and_status_round_trip() {
        for ty in [
            ContentType::BlogPost,
            ContentType::SeoArticle,
            ContentType::SocialMediaPost,
        ] {
            assert_eq!(ContentType::from_str(ty.as_str()), Ok(ty));
        }
        for status in [
            RequestStatus::Requested,
            RequestStatus::InProgress,
            RequestStatus::Completed,
            RequestStatus::Failed,
            RequestStatus::Cancelled,
        ] {
            assert_eq!(RequestStatus::from_str(status.as_str()), Ok(status));
        }
        assert!(ContentType::from_str("Newsletter").is_err());
        assert!(RequestStatus::from_str("Queued").is_err());
    }

    #[test]
    fn test_transition_guards() {
        assert!(RequestStatus::Requested.can_cancel());
        assert!(RequestStatus::InProgress.can_cancel());
        assert!(!RequestStatus::Completed.can_cancel());
        assert!(!RequestStatus::Cancelled.can_cancel());

        assert!(RequestStatus::Failed.can_resubmit());
        assert!(!RequestStatus::Requested.can_resubmit());

        assert!(RequestStatus::Completed.can_edit());
        assert!(!RequestStatus::InProgress.can_edit());
    }

    #[test]
    fn test_token_costs() {
        let social = ContentParams::Social {
            platform: "linkedin".to_string(),
        };
        assert_eq!(social.token_cost(), 2);

        let short_blog = ContentParams::Blog {
            keywords: vec![],
            word_count: 300,
        };
        // Below one unit, floor of 1 applies
        assert_eq!(short_blog.token_cost(), 1);

        let long_blog = ContentParams::Blog {
            keywords: vec!["rust".to_string()],
            word_count: 1499,
        };
        // 1499 words round down to two whole 500-word units
        assert_eq!(long_blog.token_cost(), 2);

        let seo = ContentParams::Seo {
            keywords: vec!["seo".to_string()],
            word_count: 2500,
        };
        assert_eq!(seo.token_cost(), 5);
    }

    #[test]
    fn test_params_tagged_serialization() {
        let params = ContentParams::Blog {
            keywords: vec!["a".to_string(), "b".to_string()],
            word_count: 1000,
        };
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"type\":\"blog\""));

        let back: ContentParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
        assert_eq!(back.content_type(), ContentType::BlogPost);
    }
}
