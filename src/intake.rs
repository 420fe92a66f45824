//! Turning operator form input into validated tickets.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{Entity, EntityRef, EntityResolver, Ticket, TicketId, TicketOwner, TicketPriority},
    error::{DeskError, Result},
};

/// Entity context handed over by the navigation layer when the operator
/// opens ticket creation from a profile or search result
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TicketLocationState {
    pub pharmacy_id: Option<String>,
    pub pharmacy_name: Option<String>,
    pub pharmacy_email: Option<String>,
    pub pharmacy_phone: Option<String>,
    pub pharmacy_postcode: Option<String>,
    pub company_id: Option<String>,
    pub company_name: Option<String>,
    pub company_email: Option<String>,
    pub company_phone: Option<String>,
}

impl TicketLocationState {
    /// The entity this state points at; a pharmacy wins if both are set
    pub fn selection(&self) -> Option<EntityRef> {
        present(&self.pharmacy_id)
            .map(EntityRef::Pharmacy)
            .or_else(|| present(&self.company_id).map(EntityRef::Company))
    }
}

// Empty ids count as absent
fn present(id: &Option<String>) -> Option<String> {
    id.as_deref().filter(|id| !id.is_empty()).map(String::from)
}

impl From<&Entity> for TicketLocationState {
    fn from(entity: &Entity) -> Self {
        match entity {
            Entity::Pharmacy(p) => Self {
                pharmacy_id: Some(p.id.clone()),
                pharmacy_name: Some(p.name.clone()),
                pharmacy_email: Some(p.email.clone()),
                pharmacy_phone: Some(p.phone.clone()),
                pharmacy_postcode: Some(p.postcode.clone()),
                ..Self::default()
            },
            Entity::Company(c) => Self {
                company_id: Some(c.id.clone()),
                company_name: Some(c.name.clone()),
                company_email: Some(c.email.clone()),
                company_phone: Some(c.phone.clone()),
                ..Self::default()
            },
        }
    }
}

/// Unsaved ticket form data
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketDraft {
    selection: Option<EntityRef>,
    preselected: bool,
    pub title: String,
    pub description: String,
    pub category: String,
    pub priority: Option<TicketPriority>,
    pub assigned_to: Option<String>,
}

impl TicketDraft {
    /// An empty draft where the operator still has to pick an entity
    pub fn new() -> Self {
        Self::default()
    }

    /// A draft opened with entity context. When the state names an entity the
    /// selection is locked and the manual picker should be hidden.
    pub fn from_location(state: &TicketLocationState) -> Self {
        let selection = state.selection();
        Self {
            preselected: selection.is_some(),
            selection,
            ..Self::default()
        }
    }

    pub fn has_preselected_entity(&self) -> bool {
        self.preselected
    }

    pub fn selection(&self) -> Option<&EntityRef> {
        self.selection.as_ref()
    }

    /// Picks the entity manually; rejected when the draft was preselected
    pub fn select_entity(&mut self, entity: EntityRef) -> Result<()> {
        if self.preselected {
            return Err(DeskError::SelectionLocked);
        }
        self.selection = Some(entity);
        Ok(())
    }

    pub fn clear_selection(&mut self) -> Result<()> {
        if self.preselected {
            return Err(DeskError::SelectionLocked);
        }
        self.selection = None;
        Ok(())
    }

    pub fn with_details(
        mut self,
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        self.title = title.into();
        self.description = description.into();
        self.category = category.into();
        self
    }

    fn missing_required_field(&self) -> bool {
        [&self.title, &self.description, &self.category]
            .iter()
            .any(|field| field.trim().is_empty())
    }
}

/// Validates `draft` and builds the ticket it describes.
///
/// Checks run in order and stop at the first failure: an entity must be
/// selected, then title, description and category must all be filled in,
/// then the selected entity must exist.
pub fn create_ticket<R>(
    draft: &TicketDraft,
    resolver: &R,
    id: TicketId,
    now: DateTime<Utc>,
) -> Result<Ticket>
where
    R: EntityResolver + ?Sized,
{
    let selection = draft.selection().ok_or(DeskError::MissingEntitySelection)?;

    if draft.missing_required_field() {
        return Err(DeskError::MissingRequiredField);
    }

    let entity = resolver
        .resolve(selection)
        .ok_or_else(|| DeskError::EntityNotFound {
            kind: selection.kind(),
            id: selection.id().to_string(),
        })?;

    let owner = match &entity {
        Entity::Pharmacy(p) => TicketOwner::Pharmacy {
            id: p.id.clone(),
            name: p.name.clone(),
        },
        Entity::Company(c) => TicketOwner::Company {
            id: c.id.clone(),
            name: c.name.clone(),
        },
    };

    let mut ticket = Ticket::new(id, draft.title.trim().to_string(), owner, now);
    ticket.description = draft.description.trim().to_string();
    ticket.category = draft.category.trim().to_string();
    ticket.priority = draft.priority.unwrap_or_default();
    ticket.assigned_to = draft
        .assigned_to
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty() && !a.eq_ignore_ascii_case("unassigned"))
        .map(String::from);

    Ok(ticket)
}

/// Outcome signal for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "message", rename_all = "lowercase")]
pub enum Notification {
    Success(String),
    Error(String),
}

impl Notification {
    pub const TICKET_CREATED: &'static str = "Support ticket created successfully!";

    pub fn for_ticket(result: &Result<Ticket>) -> Self {
        match result {
            Ok(_) => Self::Success(Self::TICKET_CREATED.to_string()),
            Err(err) => Self::Error(err.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}
