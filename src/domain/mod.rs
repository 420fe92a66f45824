pub mod company;
pub mod dataset;
pub mod entity;
pub mod pharmacy;
pub mod sorting;
pub mod staff;
pub mod ticket;
pub mod todo;

pub use company::{Company, CompanyDraft};
pub use dataset::{Change, Dataset};
pub use entity::{Entity, EntityKind, EntityRef, EntityResolver};
pub use pharmacy::{Pharmacy, PharmacyDraft};
pub use sorting::{sort_tickets, SortField, SortOrder};
pub use staff::Staff;
pub use ticket::{Ticket, TicketId, TicketOwner, TicketPriority, TicketStatus};
pub use todo::{toggle_completion, TodoItem};
