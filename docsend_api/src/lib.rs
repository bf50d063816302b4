//! HTTP client for the docsend API: auth, client records, attachment
//! transfer, and email dispatch. Both binaries talk to the server through
//! this crate.

pub mod attachments;
pub mod error;

pub use attachments::{HttpUploader, ProgressFn, Uploader};
pub use error::{ApiError, ErrorBody};

use docsend_core::api::{
    AttachmentId, ClientCreateBody, ClientId, ClientsResponse, EmailSendBody, EmailSendResponse,
    LoginBody, LoginResponse, ProfileResponse, RegisterBody,
};
use docsend_core::models::clients::Client;
use reqwest::StatusCode;

#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for `base_url`, attaching the bearer token to every
    /// request when one is given. Auth endpoints work without it.
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self, ApiError> {
        let mut default_headers = reqwest::header::HeaderMap::new();
        if let Some(token) = token {
            let mut auth_value =
                reqwest::header::HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|_| ApiError::Unauthorized)?;
            auth_value.set_sensitive(true);
            default_headers.append(reqwest::header::AUTHORIZATION, auth_value);
        }
        let client = reqwest::Client::builder()
            .default_headers(default_headers)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.client
    }

    /// Map error statuses to typed errors, decoding the server's error
    /// payload for everything that is not a plain 401/404.
    pub(crate) async fn ensure_ok(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if status == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        let body: ErrorBody = response.json().await.unwrap_or_default();
        Err(ApiError::Api {
            status,
            messages: body.messages(),
        })
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/auth/register"))
            .json(&RegisterBody {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        Self::ensure_ok(response).await?;
        Ok(())
    }

    /// Exchange credentials for an API token.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginBody {
                email: email.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        let parsed: LoginResponse = Self::ensure_ok(response).await?.json().await?;
        Ok(parsed.token)
    }

    pub async fn profile(&self) -> Result<ProfileResponse, ApiError> {
        let response = self.client.get(self.url("/me")).send().await?;
        Ok(Self::ensure_ok(response).await?.json().await?)
    }

    pub async fn clients(&self) -> Result<Vec<Client>, ApiError> {
        let response = self.client.get(self.url("/clients")).send().await?;
        let parsed: ClientsResponse = Self::ensure_ok(response).await?.json().await?;
        Ok(parsed.clients)
    }

    pub async fn create_client(&self, body: &ClientCreateBody) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.url("/clients"))
            .json(body)
            .send()
            .await?;
        Self::ensure_ok(response).await?;
        Ok(())
    }

    /// Trigger the server-side email with the uploaded attachments. The
    /// response may carry an email id; its presence is the caller's cue to
    /// clear local state.
    pub async fn send_email(
        &self,
        client_id: ClientId,
        attachment_ids: Vec<AttachmentId>,
    ) -> Result<EmailSendResponse, ApiError> {
        let response = self
            .client
            .post(self.url("/emails"))
            .json(&EmailSendBody {
                client_id,
                attachment_ids,
            })
            .send()
            .await?;
        Ok(Self::ensure_ok(response).await?.json().await?)
    }

    pub async fn delete_attachment(&self, id: &AttachmentId) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.url(&format!("/attachments/{}/delete", id.0)))
            .send()
            .await?;
        Self::ensure_ok(response).await?;
        Ok(())
    }
}
