use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::double_option;
use crate::lookup::LookupKind;

/// Numeric ticket identifier. Assigned as `1 + max(existing)`.
pub type TicketId = u64;

/// Ticket urgency.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(format!("unknown priority: {other}")),
        }
    }
}

/// A comment on a ticket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub author: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// A support ticket.
///
/// `status` and `category` hold the key of a
/// [`LookupEntry`](crate::LookupEntry), or `None` when unset. `id` and
/// `created_at` are assigned once at creation and never change afterwards.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,
    pub user: String,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: Option<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Ticket {
    /// The key this ticket references for the given lookup kind.
    pub fn reference(&self, kind: LookupKind) -> Option<&str> {
        match kind {
            LookupKind::Status => self.status.as_deref(),
            LookupKind::Category => self.category.as_deref(),
        }
    }

    pub fn reference_mut(&mut self, kind: LookupKind) -> &mut Option<String> {
        match kind {
            LookupKind::Status => &mut self.status,
            LookupKind::Category => &mut self.category,
        }
    }

    /// Shallow-merge a patch. Fields absent from the patch are kept.
    pub fn apply(&mut self, patch: TicketPatch) {
        let TicketPatch {
            user,
            title,
            description,
            priority,
            status,
            category,
            comments,
        } = patch;

        if let Some(user) = user {
            self.user = user;
        }
        if let Some(title) = title {
            self.title = title;
        }
        if let Some(description) = description {
            self.description = description;
        }
        if let Some(priority) = priority {
            self.priority = priority;
        }
        if let Some(status) = status {
            self.status = status;
        }
        if let Some(category) = category {
            self.category = category;
        }
        if let Some(comments) = comments {
            self.comments = comments;
        }
    }

    /// Sort comments most recent first. Ties keep their current order.
    pub fn sort_comments_newest_first(&mut self) {
        self.comments.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }

    pub fn comment(&self, comment_id: &str) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == comment_id)
    }
}

/// Field set supplied when creating a ticket.
///
/// Every field is optional at the type level so that missing fields can be
/// reported together. `status` and `category` distinguish an absent field
/// (`None`) from an explicit `null` (`Some(None)`); only the former counts
/// as missing.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<Option<String>>,
}

impl TicketFields {
    /// Names of required fields that were not supplied, in declaration order.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.user.is_none() {
            missing.push("user");
        }
        if self.title.is_none() {
            missing.push("title");
        }
        if self.description.is_none() {
            missing.push("description");
        }
        if self.priority.is_none() {
            missing.push("priority");
        }
        if self.status.is_none() {
            missing.push("status");
        }
        if self.category.is_none() {
            missing.push("category");
        }
        missing
    }

    /// Referenced key for the given lookup kind, if one was supplied.
    pub fn reference(&self, kind: LookupKind) -> Option<&str> {
        let field = match kind {
            LookupKind::Status => &self.status,
            LookupKind::Category => &self.category,
        };
        field.as_ref().and_then(|k| k.as_deref())
    }

    /// Build a ticket with an empty comment thread.
    ///
    /// Returns the missing field names if any required field is absent.
    pub fn into_ticket(
        self,
        id: TicketId,
        created_at: DateTime<Utc>,
    ) -> Result<Ticket, Vec<&'static str>> {
        let missing = self.missing_fields();
        match self {
            TicketFields {
                user: Some(user),
                title: Some(title),
                description: Some(description),
                priority: Some(priority),
                status: Some(status),
                category: Some(category),
            } => Ok(Ticket {
                id,
                user,
                title,
                description,
                priority,
                status,
                category,
                created_at,
                comments: Vec::new(),
            }),
            _ => Err(missing),
        }
    }
}

/// Sparse edit of a ticket.
///
/// There is no `id` or `createdAt` field: identity and creation time cannot
/// be changed, and such keys in an incoming body are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub status: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<Comment>>,
}

impl TicketPatch {
    /// Referenced key for the given lookup kind, if the patch sets one.
    pub fn reference(&self, kind: LookupKind) -> Option<&str> {
        let field = match kind {
            LookupKind::Status => &self.status,
            LookupKind::Category => &self.category,
        };
        field.as_ref().and_then(|k| k.as_deref())
    }
}
