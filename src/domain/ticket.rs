use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

use crate::domain::{EntityKind, EntityRef};
use crate::error::DeskError;

/// Unique identifier for a ticket (e.g., TKT1, TKT2, TKT100)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TicketId(String);

impl TicketId {
    const PREFIX: &'static str = "TKT";

    /// Creates a new TicketId from a counter
    pub fn new(counter: u32) -> Self {
        Self(format!("{}{}", Self::PREFIX, counter))
    }

    /// Returns the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric part of the id
    pub fn number(&self) -> u32 {
        self.0
            .get(Self::PREFIX.len()..)
            .and_then(|digits| digits.parse().ok())
            .unwrap_or(0)
    }
}

impl FromStr for TicketId {
    type Err = DeskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_uppercase();

        match normalized.strip_prefix(Self::PREFIX) {
            Some(digits)
                if digits.bytes().all(|b| b.is_ascii_digit()) && digits.parse::<u32>().is_ok() =>
            {
                Ok(Self(normalized))
            }
            _ => Err(DeskError::InvalidTicketId(s.to_string())),
        }
    }
}

impl TryFrom<String> for TicketId {
    type Error = DeskError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TicketId> for String {
    fn from(id: TicketId) -> Self {
        id.0
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle status of a support ticket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Ongoing,
    Completed,
}

impl TicketStatus {
    pub const ALL: [TicketStatus; 3] = [Self::Open, Self::Ongoing, Self::Completed];

    /// Checks if a status transition is valid
    pub fn can_transition_to(&self, target: &TicketStatus) -> bool {
        match (self, target) {
            (Self::Open, Self::Ongoing) => true,
            (Self::Open, Self::Completed) => true,

            (Self::Ongoing, Self::Open) => true,
            (Self::Ongoing, Self::Completed) => true,

            // Reopened
            (Self::Completed, Self::Ongoing) => true,

            _ if self == target => true,

            _ => false,
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "Open"),
            Self::Ongoing => write!(f, "In Progress"),
            Self::Completed => write!(f, "Completed"),
        }
    }
}

impl FromStr for TicketStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "ongoing" | "in progress" => Ok(Self::Ongoing),
            "completed" => Ok(Self::Completed),
            _ => Err(format!(
                "Invalid status '{}'. Valid statuses: open, ongoing, completed",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TicketPriority {
    pub const ALL: [TicketPriority; 3] = [Self::Low, Self::Medium, Self::High];
}

impl fmt::Display for TicketPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

impl FromStr for TicketPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(format!(
                "Invalid priority '{}'. Valid priorities: low, medium, high",
                s
            )),
        }
    }
}

/// The single pharmacy or company a ticket is raised against.
///
/// Serialized flat as `pharmacyId`/`pharmacyName` or `companyId`/`companyName`.
/// Records carrying both ids, or neither, are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "OwnerFields", into = "OwnerFields")]
pub enum TicketOwner {
    Pharmacy { id: String, name: String },
    Company { id: String, name: String },
}

/// Stored shape of [`TicketOwner`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnerFields {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pharmacy_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pharmacy_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    company_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    company_name: Option<String>,
}

impl TryFrom<OwnerFields> for TicketOwner {
    type Error = String;

    fn try_from(fields: OwnerFields) -> Result<Self, Self::Error> {
        match (fields.pharmacy_id, fields.company_id) {
            (Some(id), None) => Ok(Self::Pharmacy {
                id,
                name: fields.pharmacy_name.unwrap_or_default(),
            }),
            (None, Some(id)) => Ok(Self::Company {
                id,
                name: fields.company_name.unwrap_or_default(),
            }),
            (Some(pharmacy), Some(company)) => Err(format!(
                "ticket references both pharmacy {} and company {}",
                pharmacy, company
            )),
            (None, None) => Err("ticket references neither a pharmacy nor a company".to_string()),
        }
    }
}

impl From<TicketOwner> for OwnerFields {
    fn from(owner: TicketOwner) -> Self {
        match owner {
            TicketOwner::Pharmacy { id, name } => Self {
                pharmacy_id: Some(id),
                pharmacy_name: Some(name),
                ..Self::default()
            },
            TicketOwner::Company { id, name } => Self {
                company_id: Some(id),
                company_name: Some(name),
                ..Self::default()
            },
        }
    }
}

impl TicketOwner {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Pharmacy { .. } => EntityKind::Pharmacy,
            Self::Company { .. } => EntityKind::Company,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Pharmacy { id, .. } | Self::Company { id, .. } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Pharmacy { name, .. } | Self::Company { name, .. } => name,
        }
    }

    pub fn to_ref(&self) -> EntityRef {
        match self {
            Self::Pharmacy { id, .. } => EntityRef::Pharmacy(id.clone()),
            Self::Company { id, .. } => EntityRef::Company(id.clone()),
        }
    }

    pub fn is(&self, entity: &EntityRef) -> bool {
        self.kind() == entity.kind() && self.id() == entity.id()
    }
}

/// A support ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub category: String,
    #[serde(flatten)]
    pub owner: TicketOwner,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Creates an open, medium priority ticket stamped at `now`
    pub fn new(id: TicketId, title: String, owner: TicketOwner, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title,
            description: String::new(),
            status: TicketStatus::Open,
            priority: TicketPriority::default(),
            category: String::new(),
            owner,
            assigned_to: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Changes the ticket status
    pub fn transition_to(
        &mut self,
        new_status: TicketStatus,
        now: DateTime<Utc>,
    ) -> Result<(), DeskError> {
        if !self.status.can_transition_to(&new_status) {
            return Err(DeskError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: new_status.to_string(),
            });
        }

        if self.status != new_status {
            self.status = new_status;
            self.touch(now);
        }
        Ok(())
    }

    /// Assigns the ticket to a staff member, or clears the assignment
    pub fn assign_to(&mut self, assignee: Option<String>, now: DateTime<Utc>) {
        self.assigned_to = assignee.filter(|a| !a.trim().is_empty());
        self.touch(now);
    }

    pub fn assignee_label(&self) -> &str {
        self.assigned_to.as_deref().unwrap_or("Unassigned")
    }

    // updated_at never moves behind created_at
    fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now.max(self.created_at);
    }
}
