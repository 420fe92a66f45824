use crate::{
    domain::{Change, Company, Dataset, Entity, EntityKind, Pharmacy, Staff, Ticket, TodoItem},
    error::Result,
};
use async_trait::async_trait;

pub mod file_storage;
pub mod memory_storage;

pub use file_storage::FileStorage;
pub use memory_storage::MemoryStorage;

/// Repository holding every company, pharmacy, ticket, staff and to-do record
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Initializes the storage backend
    async fn initialize(&self) -> Result<()>;

    /// Reads a consistent copy of the whole dataset
    async fn snapshot(&self) -> Result<Dataset>;

    /// Applies a single change; writes are serialized by the backend
    async fn apply(&self, change: Change) -> Result<()>;

    /// Allocates the next ticket id and inserts `ticket` under it in one
    /// serialized write, returning the stored ticket
    async fn insert_new_ticket(&self, ticket: Ticket) -> Result<Ticket>;

    /// Checks if the store holds a dataset
    async fn is_initialized(&self) -> bool;

    async fn list_companies(&self) -> Result<Vec<Company>> {
        Ok(self.snapshot().await?.companies)
    }

    async fn list_pharmacies(&self) -> Result<Vec<Pharmacy>> {
        Ok(self.snapshot().await?.pharmacies)
    }

    async fn list_tickets(&self) -> Result<Vec<Ticket>> {
        Ok(self.snapshot().await?.tickets)
    }

    async fn list_staff(&self) -> Result<Vec<Staff>> {
        Ok(self.snapshot().await?.staff)
    }

    async fn list_todos(&self) -> Result<Vec<TodoItem>> {
        Ok(self.snapshot().await?.todos)
    }

    /// Looks up a company or pharmacy; `None` when no record has that id
    async fn get_by_id(&self, kind: EntityKind, id: &str) -> Result<Option<Entity>> {
        Ok(self.snapshot().await?.entity(kind, id))
    }
}
