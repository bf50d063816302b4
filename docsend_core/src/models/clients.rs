use serde::{Deserialize, Serialize};

use crate::{api::ClientId, StrConversion};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Client {
    pub id: ClientId,
    pub name: String,
    pub tax_id: String,
    pub accountant: Accountant,
    pub status: ClientStatus,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Accountant {
    pub name: String,
    pub email: String,
}

/// Whether this client already received a submission email.
#[derive(Serialize, Deserialize, Debug, PartialEq, Eq, Clone, Copy)]
pub enum ClientStatus {
    #[serde(rename = "sent")]
    Sent,
    #[serde(rename = "not_send")]
    NotSent,
}

impl std::fmt::Display for ClientStatus {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(fmt, "{}", self.as_str())
    }
}
impl StrConversion for ClientStatus {
    fn from_str(value: &str) -> Self {
        match value {
            "sent" => Self::Sent,
            _ => Self::NotSent,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::NotSent => "not_send",
        }
    }
}
