use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Lifecycle status of a scheduled post.
///
/// Closed set; the backend never sends anything else.
#[derive(
    Serialize,
    Deserialize,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Display,
    AsRefStr,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum PostStatus {
    Scheduled,
    Ready,
    Pending,
    Approved,
    Publishing,
    Posted,
    Failed,
    Cancelled,
}

impl PostStatus {
    /// Whether a post in this status may take part in a bulk action.
    pub fn is_selectable(self) -> bool {
        !matches!(self, PostStatus::Posted | PostStatus::Publishing)
    }

    pub fn is_editable(self) -> bool {
        !matches!(
            self,
            PostStatus::Posted | PostStatus::Publishing | PostStatus::Cancelled
        )
    }

    pub fn label(self) -> &'static str {
        match self {
            PostStatus::Scheduled => "Scheduled",
            PostStatus::Ready => "Ready",
            PostStatus::Pending => "Pending",
            PostStatus::Approved => "Approved",
            PostStatus::Publishing => "Publishing",
            PostStatus::Posted => "Posted",
            PostStatus::Failed => "Failed",
            PostStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub(crate) enum MediaType {
    #[default]
    Image,
    Video,
}

impl MediaType {
    /// Guess the media type from a URL's file extension.
    pub fn from_url(url: &str) -> Self {
        let path = url.split(['?', '#']).next().unwrap_or_default();
        let ext = path.rsplit('.').next().unwrap_or_default().to_lowercase();
        match ext.as_str() {
            "mp4" | "mov" | "webm" | "m4v" => MediaType::Video,
            _ => MediaType::Image,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub(crate) struct MediaItem {
    pub url: String,
    #[serde(rename = "type", default)]
    pub media_type: MediaType,
}

impl MediaItem {
    pub fn from_url(url: &str) -> Self {
        Self {
            url: url.to_string(),
            media_type: MediaType::from_url(url),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub(crate) enum PostType {
    SingleImage,
    Carousel,
}

impl PostType {
    pub fn for_media_count(count: usize) -> Self {
        if count > 1 {
            PostType::Carousel
        } else {
            PostType::SingleImage
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Post {
    pub id: String,
    pub status: PostStatus,
    pub caption: String,
    #[serde(default)]
    pub subject: Option<String>,
    pub scheduled_at: DateTime<Utc>,
    #[serde(default)]
    pub media: Vec<MediaItem>,
    #[serde(default)]
    pub post_type: Option<PostType>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub batch_id: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Batch {
    pub id: String,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub post_count: Option<u32>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Recurring posting schedule for the current client.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub(crate) struct Schedule {
    /// 0 = Monday .. 6 = Sunday.
    #[serde(default)]
    pub days_of_week: Vec<u8>,
    /// `HH:MM`, local to `timezone`.
    #[serde(default)]
    pub times: Vec<String>,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub(crate) enum Role {
    Admin,
    Client,
}

/// Signed-in user as reported by the identity provider.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct Identity {
    pub user_id: String,
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub client_id: Option<String>,
}

impl Identity {
    /// Administrators not linked to a client only get the admin landing view.
    pub fn is_unassigned_admin(&self) -> bool {
        self.role == Role::Admin
            && self
                .client_id
                .as_deref()
                .map(|c| c.trim().is_empty())
                .unwrap_or(true)
    }
}

/// Per-id outcome of a bulk post action.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub(crate) struct BulkActionReport {
    pub success_count: u32,
    pub failed_count: u32,
    #[serde(default)]
    pub failed: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_predicates() {
        assert!(PostStatus::Scheduled.is_selectable());
        assert!(PostStatus::Cancelled.is_selectable());
        assert!(!PostStatus::Posted.is_selectable());
        assert!(!PostStatus::Publishing.is_selectable());

        assert!(PostStatus::Failed.is_editable());
        assert!(!PostStatus::Cancelled.is_editable());
        assert!(!PostStatus::Posted.is_editable());
    }

    #[test]
    fn test_status_parses_lowercase() {
        assert_eq!("approved".parse::<PostStatus>().ok(), Some(PostStatus::Approved));
        assert_eq!(PostStatus::Publishing.as_ref(), "publishing");
    }

    #[test]
    fn test_media_type_from_url() {
        assert_eq!(MediaType::from_url("https://cdn/x.MP4?sig=1"), MediaType::Video);
        assert_eq!(MediaType::from_url("https://cdn/x.jpg"), MediaType::Image);
        assert_eq!(MediaType::from_url("https://cdn/noext"), MediaType::Image);
    }

    #[test]
    fn test_post_contract_deserialize() {
        let json = r#"{
            "id": "p1",
            "status": "pending",
            "caption": "hello",
            "subject": null,
            "scheduled_at": "2026-01-30T09:00:00Z",
            "media": [{"url": "https://cdn/a.jpg", "type": "image"}]
        }"#;
        let post: Post = serde_json::from_str(json).expect("post should parse");
        assert_eq!(post.status, PostStatus::Pending);
        assert_eq!(post.media.len(), 1);
        assert!(post.batch_id.is_none());
    }

    #[test]
    fn test_unassigned_admin() {
        let mut id = Identity {
            user_id: "u".to_string(),
            email: "a@example.com".to_string(),
            role: Role::Admin,
            client_id: None,
        };
        assert!(id.is_unassigned_admin());

        id.client_id = Some("  ".to_string());
        assert!(id.is_unassigned_admin());

        id.client_id = Some("c1".to_string());
        assert!(!id.is_unassigned_admin());

        id.role = Role::Client;
        id.client_id = None;
        assert!(!id.is_unassigned_admin());
    }
}
