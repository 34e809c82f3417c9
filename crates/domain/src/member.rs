use crate::shared::entity::{Entity, ID};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberRole {
    Unsubscriber,
    Subscriber,
    Mentor,
    Admin,
}

impl MemberRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsubscriber => "UNSUBSCRIBER",
            Self::Subscriber => "SUBSCRIBER",
            Self::Mentor => "MENTOR",
            Self::Admin => "ADMIN",
        }
    }
}

impl FromStr for MemberRole {
    type Err = ();

    fn from_str(role: &str) -> Result<Self, Self::Err> {
        match role {
            "UNSUBSCRIBER" => Ok(Self::Unsubscriber),
            "SUBSCRIBER" => Ok(Self::Subscriber),
            "MENTOR" => Ok(Self::Mentor),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(()),
        }
    }
}

/// A community `Member` as seen by the alerting subsystem
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: ID,
    /// Chat id on the messaging platform, 0 when the member never linked an account
    pub telegram_id: i64,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub role: MemberRole,
    pub birthday: Option<NaiveDate>,
}

impl Member {
    pub fn new(telegram_id: i64, username: impl Into<String>) -> Self {
        Self {
            id: Default::default(),
            telegram_id,
            username: username.into(),
            first_name: String::new(),
            last_name: String::new(),
            role: MemberRole::Subscriber,
            birthday: None,
        }
    }

    pub fn has_linked_chat(&self) -> bool {
        self.telegram_id != 0
    }

    /// Members who should get an initial alert for every new event
    pub fn is_community_subscriber(&self) -> bool {
        self.has_linked_chat() && self.role != MemberRole::Unsubscriber
    }

    /// "First Last", falling back to the username when both are empty
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        let name = name.trim();
        if name.is_empty() {
            self.username.clone()
        } else {
            name.to_string()
        }
    }
}

impl Entity for Member {
    fn id(&self) -> &ID {
        &self.id
    }
}
