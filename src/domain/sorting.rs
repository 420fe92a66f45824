use crate::domain::ticket::{Ticket, TicketPriority, TicketStatus};
use std::cmp::Ordering;
use std::str::FromStr;

/// Fields available for sorting tickets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Title,
    Status,
    Priority,
    Owner,
    Created,
    Updated,
}

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "id" => Ok(SortField::Id),
            "title" => Ok(SortField::Title),
            "status" => Ok(SortField::Status),
            "priority" => Ok(SortField::Priority),
            "owner" => Ok(SortField::Owner),
            "created" => Ok(SortField::Created),
            "updated" => Ok(SortField::Updated),
            _ => Err(format!(
                "Unknown sort field '{}' (id, title, status, priority, owner, created, updated)",
                s
            )),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            _ => Err(format!(
                "Invalid sort order '{}'. Valid orders: asc, desc",
                s
            )),
        }
    }
}

/// Sorts tickets in-place for display in a ticket table.
///
/// The sort is stable, so tickets comparing equal keep their relative order.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use pharmadesk_core::domain::sorting::{sort_tickets, SortField, SortOrder};
/// use pharmadesk_core::domain::ticket::{Ticket, TicketId, TicketOwner};
///
/// let owner = TicketOwner::Company { id: "c1".to_string(), name: "Acme".to_string() };
/// let now = Utc::now();
/// let mut tickets = vec![
///     Ticket::new(TicketId::new(3), "C".to_string(), owner.clone(), now),
///     Ticket::new(TicketId::new(1), "A".to_string(), owner.clone(), now),
///     Ticket::new(TicketId::new(2), "B".to_string(), owner, now),
/// ];
///
/// sort_tickets(&mut tickets, SortField::Id, SortOrder::Ascending);
/// assert_eq!(tickets[0].id.as_str(), "TKT1");
/// ```
pub fn sort_tickets(tickets: &mut [Ticket], field: SortField, order: SortOrder) {
    tickets.sort_by(|a, b| {
        let cmp = match field {
            SortField::Id => a.id.number().cmp(&b.id.number()),
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::Status => compare_status(&a.status, &b.status),
            SortField::Priority => compare_priority(&a.priority, &b.priority),
            SortField::Owner => a
                .owner
                .name()
                .to_lowercase()
                .cmp(&b.owner.name().to_lowercase()),
            SortField::Created => a.created_at.cmp(&b.created_at),
            SortField::Updated => a.updated_at.cmp(&b.updated_at),
        };

        match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });
}

/// Status order: Open → Ongoing → Completed
fn compare_status(a: &TicketStatus, b: &TicketStatus) -> Ordering {
    fn status_order(s: &TicketStatus) -> u8 {
        match s {
            TicketStatus::Open => 0,
            TicketStatus::Ongoing => 1,
            TicketStatus::Completed => 2,
        }
    }
    status_order(a).cmp(&status_order(b))
}

fn compare_priority(a: &TicketPriority, b: &TicketPriority) -> Ordering {
    fn priority_order(p: &TicketPriority) -> u8 {
        match p {
            TicketPriority::Low => 0,
            TicketPriority::Medium => 1,
            TicketPriority::High => 2,
        }
    }
    priority_order(a).cmp(&priority_order(b))
}
