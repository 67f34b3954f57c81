use crate::config::EnvConfig;
use crate::models::{Batch, BulkActionReport, Identity, MediaItem, Post, PostStatus, PostType, Schedule};
use crate::selection::BulkAction;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub(crate) enum ApiError {
    #[error("Session expired, please sign in again")]
    Unauthorized,
    #[error("Network error: {0}")]
    Network(String),
    #[error("Request failed ({status}): {body}")]
    Http { status: u16, body: String },
    #[error("Unexpected response: {0}")]
    Parse(String),
}

impl ApiError {
    fn network(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }

    fn parse(e: impl std::fmt::Display) -> Self {
        Self::Parse(e.to_string())
    }

    /// Prefer the backend's `detail`/`error` message over the raw body.
    fn http(status: u16, body: String) -> Self {
        let body = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                v.get("detail")
                    .or_else(|| v.get("error"))
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
            })
            .unwrap_or(body);
        Self::Http { status, body }
    }
}

pub(crate) type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct LoginResponse {
    pub token: String,
    pub user: Identity,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub(crate) struct PostFilters {
    pub status: Option<PostStatus>,
    pub batch_id: Option<String>,
}

impl PostFilters {
    pub fn to_query(&self) -> String {
        let mut parts = Vec::new();
        if let Some(status) = self.status {
            parts.push(format!("status={}", status.as_ref()));
        }
        if let Some(batch_id) = self.batch_id.as_deref().filter(|s| !s.trim().is_empty()) {
            parts.push(format!("batch_id={}", urlencoding::encode(batch_id)));
        }
        if parts.is_empty() {
            String::new()
        } else {
            format!("?{}", parts.join("&"))
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct PostInput {
    pub caption: String,
    pub subject: Option<String>,
    pub scheduled_at: chrono::DateTime<chrono::Utc>,
    pub media: Vec<MediaItem>,
    pub post_type: PostType,
    pub platform: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct BulkActionRequest {
    pub action: BulkAction,
    pub ids: Vec<String>,
}

/// One post inside a batch-creation request.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct BatchPostPayload {
    pub scheduled_at: chrono::DateTime<chrono::Utc>,
    pub caption: String,
    pub subject: String,
    pub post_type: PostType,
    pub media: Vec<MediaItem>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub(crate) struct CreateBatchRequest {
    pub platform: String,
    pub posts: Vec<BatchPostPayload>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct PostListResponse {
    #[serde(default)]
    pub posts: Vec<Post>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct PostResponse {
    pub post: Post,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct BatchResponse {
    pub batch: Batch,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct BatchDetailResponse {
    pub batch: Batch,
    #[serde(default)]
    pub posts: Vec<Post>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub(crate) struct ScheduleResponse {
    #[serde(default)]
    pub schedule: Option<Schedule>,
}

/// Bulk post operations, split out so orchestration can run against fakes.
#[async_trait(?Send)]
pub(crate) trait PostApi {
    async fn bulk_post_action(
        &self,
        action: BulkAction,
        ids: &[String],
    ) -> ApiResult<BulkActionReport>;
}

#[async_trait(?Send)]
pub(crate) trait BatchApi {
    async fn create_batch(&self, payload: &CreateBatchRequest) -> ApiResult<Batch>;
}

/// Accept the body of a success response that carries no payload.
///
/// `204 No Content` has an empty body; some endpoints answer `{}` or `null`.
fn expect_empty_body(text: &str) -> ApiResult<()> {
    if text.trim().is_empty() {
        return Ok(());
    }
    serde_json::from_str::<serde_json::Value>(text)
        .map(|_| ())
        .map_err(ApiError::parse)
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct ApiClient {
    pub(crate) base_url: String,
    pub(crate) token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            token: None,
        }
    }

    pub fn from_config(config: &EnvConfig) -> Self {
        Self::new(config.api_url.clone())
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn set_token(&mut self, token: String) {
        self.token = Some(token);
    }

    pub fn clear_token(&mut self) {
        self.token = None;
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    fn auth_header(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {}", t))
    }

    /// Send a request and return the raw body of a 2xx response.
    async fn send(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> ApiResult<String> {
        let client = reqwest::Client::new();
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(%method, %url, "api request");

        let mut req = client.request(method, url);
        if let Some(header) = self.auth_header() {
            req = req.header("Authorization", header);
        }
        if let Some(b) = body {
            req = req.json(b);
        }

        let res = req.send().await.map_err(ApiError::network)?;
        let status = res.status();

        if status.is_success() {
            res.text().await.map_err(ApiError::parse)
        } else if status.as_u16() == 401 {
            Err(ApiError::Unauthorized)
        } else {
            let body = res.text().await.unwrap_or_default();
            Err(ApiError::http(status.as_u16(), body))
        }
    }

    async fn request<T: serde::de::DeserializeOwned>(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> ApiResult<T> {
        let text = self.send(method, path, body).await?;
        serde_json::from_str(&text).map_err(ApiError::parse)
    }

    async fn request_empty(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&impl Serialize>,
    ) -> ApiResult<()> {
        let text = self.send(method, path, body).await?;
        expect_empty_body(&text)
    }

    pub async fn login(&self, email: &str, password: &str) -> ApiResult<LoginResponse> {
        self.request(
            reqwest::Method::POST,
            "/auth/login",
            Some(&LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            }),
        )
        .await
    }

    pub async fn list_posts(&self, filters: &PostFilters) -> ApiResult<Vec<Post>> {
        let res: PostListResponse = self
            .request(
                reqwest::Method::GET,
                &format!("/posts{}", filters.to_query()),
                None::<&()>,
            )
            .await?;
        Ok(res.posts)
    }

    pub async fn get_post(&self, id: &str) -> ApiResult<Post> {
        let res: PostResponse = self
            .request(
                reqwest::Method::GET,
                &format!("/posts/{}", urlencoding::encode(id)),
                None::<&()>,
            )
            .await?;
        Ok(res.post)
    }

    pub async fn create_post(&self, input: &PostInput) -> ApiResult<Post> {
        let res: PostResponse = self
            .request(reqwest::Method::POST, "/posts", Some(input))
            .await?;
        Ok(res.post)
    }

    pub async fn update_post(&self, id: &str, input: &PostInput) -> ApiResult<Post> {
        let res: PostResponse = self
            .request(
                reqwest::Method::PUT,
                &format!("/posts/{}", urlencoding::encode(id)),
                Some(input),
            )
            .await?;
        Ok(res.post)
    }

    pub async fn delete_post(&self, id: &str) -> ApiResult<()> {
        self.request_empty(
            reqwest::Method::DELETE,
            &format!("/posts/{}", urlencoding::encode(id)),
            None::<&()>,
        )
        .await
    }

    pub async fn get_batch(&self, id: &str) -> ApiResult<BatchDetailResponse> {
        self.request(
            reqwest::Method::GET,
            &format!("/batches/{}", urlencoding::encode(id)),
            None::<&()>,
        )
        .await
    }

    pub async fn get_schedule(&self) -> ApiResult<Schedule> {
        let res: ScheduleResponse = self
            .request(reqwest::Method::GET, "/schedule", None::<&()>)
            .await?;
        Ok(res.schedule.unwrap_or_default())
    }

    pub async fn update_schedule(&self, schedule: &Schedule) -> ApiResult<Schedule> {
        let res: ScheduleResponse = self
            .request(reqwest::Method::PUT, "/schedule", Some(schedule))
            .await?;
        Ok(res.schedule.unwrap_or_else(|| schedule.clone()))
    }
}

#[async_trait(?Send)]
impl PostApi for ApiClient {
    async fn bulk_post_action(
        &self,
        action: BulkAction,
        ids: &[String],
    ) -> ApiResult<BulkActionReport> {
        self.request(
            reqwest::Method::POST,
            "/posts/bulk",
            Some(&BulkActionRequest {
                action,
                ids: ids.to_vec(),
            }),
        )
        .await
    }
}

#[async_trait(?Send)]
impl BatchApi for ApiClient {
    async fn create_batch(&self, payload: &CreateBatchRequest) -> ApiResult<Batch> {
        let res: BatchResponse = self
            .request(reqwest::Method::POST, "/batches", Some(payload))
            .await?;
        Ok(res.batch)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    #[test]
    fn test_login_response_contract_deserialize() {
        let json = r#"{
            "token": "jwt-token",
            "user": {"user_id": "u1", "email": "u@example.com", "role": "admin", "client_id": null}
        }"#;
        let parsed: LoginResponse =
            serde_json::from_str(json).expect("login response should parse");
        assert_eq!(parsed.token, "jwt-token");
        assert_eq!(parsed.user.role, Role::Admin);
        assert!(parsed.user.is_unassigned_admin());
    }

    #[test]
    fn test_bulk_report_contract_deserialize() {
        let json = r#"{"success_count": 2, "failed_count": 1, "failed": ["x"]}"#;
        let parsed: BulkActionReport = serde_json::from_str(json).expect("should parse");
        assert_eq!(parsed.success_count, 2);
        assert_eq!(parsed.failed, vec!["x".to_string()]);
    }

    #[test]
    fn test_bulk_request_serialization() {
        let req = BulkActionRequest {
            action: BulkAction::Skip,
            ids: vec!["a".to_string(), "b".to_string()],
        };
        let v = serde_json::to_value(req).expect("should serialize");
        assert_eq!(v["action"], "skip");
        assert_eq!(v["ids"][1], "b");
    }

    #[test]
    fn test_batch_detail_contract_deserialize() {
        let json = r#"{
            "batch": {"id": "b1", "platform": "instagram", "post_count": 1},
            "posts": [{
                "id": "p1", "status": "scheduled", "caption": "c",
                "scheduled_at": "2026-01-30T09:00:00Z", "batch_id": "b1"
            }]
        }"#;
        let parsed: BatchDetailResponse = serde_json::from_str(json).expect("should parse");
        assert_eq!(parsed.batch.id, "b1");
        assert_eq!(parsed.posts[0].batch_id.as_deref(), Some("b1"));
    }

    #[test]
    fn test_schedule_response_may_be_empty() {
        let parsed: ScheduleResponse = serde_json::from_str("{}").expect("should parse");
        assert!(parsed.schedule.is_none());
    }

    #[test]
    fn test_post_filters_query() {
        assert_eq!(PostFilters::default().to_query(), "");
        let f = PostFilters {
            status: Some(PostStatus::Pending),
            batch_id: Some("b 1".to_string()),
        };
        assert_eq!(f.to_query(), "?status=pending&batch_id=b%201");
    }

    #[test]
    fn test_empty_success_bodies_are_accepted() {
        assert_eq!(expect_empty_body(""), Ok(()));
        assert_eq!(expect_empty_body("  \n"), Ok(()));
        assert_eq!(expect_empty_body("{}"), Ok(()));
        assert_eq!(expect_empty_body("null"), Ok(()));
        assert!(matches!(expect_empty_body("<html>"), Err(ApiError::Parse(_))));
    }

    #[test]
    fn test_http_error_prefers_detail() {
        let e = ApiError::http(422, r#"{"detail": "caption required"}"#.to_string());
        assert_eq!(e.to_string(), "Request failed (422): caption required");

        let e = ApiError::http(500, "boom".to_string());
        assert_eq!(e.to_string(), "Request failed (500): boom");
    }

    #[test]
    fn test_api_client_auth_header() {
        let mut client = ApiClient::new("http://localhost:8000".to_string());
        assert!(client.auth_header().is_none());
        assert!(!client.is_authenticated());

        client.set_token("my-jwt-token".to_string());
        assert_eq!(client.auth_header().as_deref(), Some("Bearer my-jwt-token"));

        client.clear_token();
        assert!(!client.is_authenticated());
    }
}
