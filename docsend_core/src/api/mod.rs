use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::clients::Client;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Hash, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct FileId(pub String);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Hash, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct AttachmentId(pub String);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Hash, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct ClientId(pub String);

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Hash, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct EmailId(pub String);

impl FileId {
    /// Best-effort unique id for a file offered for upload: the file name,
    /// its modification time in millis, and a random suffix.
    pub fn generate(name: &str, modified: Option<DateTime<Utc>>) -> Self {
        let millis = modified.map(|m| m.timestamp_millis()).unwrap_or_default();
        let uuid = Uuid::new_v4().simple().to_string();
        let suffix = &uuid[..7];
        FileId(format!("{name}-{millis}-{suffix}"))
    }
}

// Auth
#[derive(Serialize, Deserialize)]
pub struct RegisterBody {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
}

#[derive(Serialize, Deserialize)]
pub struct ProfileResponse {
    pub name: String,
    pub email: String,
}

// Clients
#[derive(Serialize, Deserialize)]
pub struct ClientsResponse {
    pub clients: Vec<Client>,
}

/// The server takes the accountant fields flattened on creation, even though
/// it nests them in listings.
#[derive(Serialize, Deserialize)]
pub struct ClientCreateBody {
    pub name: String,
    pub tax_id: String,
    pub accountant_name: String,
    pub accountant_email: String,
}

// Attachments
#[derive(Serialize, Deserialize)]
pub struct AttachmentUploadResponse {
    pub attachment_id: AttachmentId,
}

// Email dispatch
#[derive(Serialize, Deserialize)]
pub struct EmailSendBody {
    pub client_id: ClientId,
    pub attachment_ids: Vec<AttachmentId>,
}

#[derive(Serialize, Deserialize)]
pub struct EmailSendResponse {
    pub message: String,
    pub data: EmailSendData,
}

#[derive(Serialize, Deserialize, Default)]
pub struct EmailSendData {
    pub email_id: Option<EmailId>,
}
