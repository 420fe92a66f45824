//! # Pharmadesk Core
//!
//! Directory search, ticket intake and dashboard aggregation for a pharmacy
//! support desk.
//!
//! The crate holds the business rules behind the operator screens: filtering
//! companies and pharmacies, validating new support tickets against the
//! entity they are raised for, and counting tickets per status over rolling
//! time windows. Rendering, routing and authentication live elsewhere.

pub mod aggregation;
pub mod config;
pub mod domain;
pub mod error;
pub mod intake;
pub mod search;
pub mod service;
pub mod storage;

// Re-export commonly used types
pub use aggregation::{aggregate_ticket_status, StatusCounts, TimeWindow};
pub use config::DeskConfig;
pub use domain::{
    Company, Dataset, Entity, EntityKind, EntityRef, Pharmacy, Staff, Ticket, TicketId,
    TicketOwner, TicketPriority, TicketStatus, TodoItem,
};
pub use error::{DeskError, Result};
pub use intake::{create_ticket, Notification, TicketDraft, TicketLocationState};
pub use search::{search, EmptyQueryPolicy};
pub use service::SupportDesk;
pub use storage::EntityStore;
