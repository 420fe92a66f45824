use crate::{
    domain::{Change, Dataset, Ticket},
    error::Result,
    storage::EntityStore,
};
use async_trait::async_trait;
use tokio::sync::RwLock;

/// In-memory store holding a dataset for the lifetime of the process
#[derive(Default)]
pub struct MemoryStorage {
    dataset: RwLock<Dataset>,
}

impl MemoryStorage {
    pub fn new(dataset: Dataset) -> Self {
        Self {
            dataset: RwLock::new(dataset),
        }
    }
}

#[async_trait]
impl EntityStore for MemoryStorage {
    async fn initialize(&self) -> Result<()> {
        self.dataset.read().await.validate()
    }

    async fn snapshot(&self) -> Result<Dataset> {
        Ok(self.dataset.read().await.clone())
    }

    async fn apply(&self, change: Change) -> Result<()> {
        let mut guard = self.dataset.write().await;

        // Apply to a copy so a failed change leaves the stored dataset intact
        let mut next = guard.clone();
        next.apply(change)?;
        *guard = next;
        Ok(())
    }

    async fn insert_new_ticket(&self, ticket: Ticket) -> Result<Ticket> {
        let mut guard = self.dataset.write().await;

        let mut next = guard.clone();
        let stored = next.insert_new_ticket(ticket)?;
        *guard = next;
        Ok(stored)
    }

    async fn is_initialized(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Company, EntityKind, TicketId, TicketOwner, TodoItem};
    use chrono::Utc;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_lists_seeded_records() {
        let storage = MemoryStorage::new(Dataset::demo(Utc::now()));
        storage.initialize().await.unwrap();

        assert_eq!(storage.list_companies().await.unwrap().len(), 2);
        assert_eq!(storage.list_pharmacies().await.unwrap().len(), 4);
        assert_eq!(storage.list_tickets().await.unwrap().len(), 5);
        assert_eq!(storage.list_staff().await.unwrap().len(), 3);
        assert_eq!(storage.list_todos().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_get_by_id() {
        let storage = MemoryStorage::new(Dataset::demo(Utc::now()));

        let found = storage.get_by_id(EntityKind::Pharmacy, "p3").await.unwrap();
        assert_eq!(found.unwrap().name(), "WellCare Deansgate");

        let missing = storage.get_by_id(EntityKind::Company, "p3").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_failed_change_keeps_dataset() {
        let storage = MemoryStorage::new(Dataset::demo(Utc::now()));
        let before = storage.snapshot().await.unwrap();

        let result = storage
            .apply(Change::InsertCompany(Company::new("c1", "Clash")))
            .await;

        assert!(result.is_err());
        assert_eq!(storage.snapshot().await.unwrap(), before);
    }

    #[tokio::test]
    async fn test_apply_is_visible_to_later_reads() {
        let storage = MemoryStorage::default();
        let todos = vec![TodoItem::new("Ring supplier", Utc::now())];
        storage.apply(Change::ReplaceTodos(todos)).await.unwrap();

        assert_eq!(storage.list_todos().await.unwrap()[0].text, "Ring supplier");
    }

    #[tokio::test]
    async fn test_initialize_rejects_invalid_dataset() {
        let mut data = Dataset::demo(Utc::now());
        data.pharmacies[0].company_id = Some("c404".to_string());

        let storage = MemoryStorage::new(data);
        assert!(storage.initialize().await.is_err());
    }

    #[tokio::test]
    async fn test_concurrent_inserts_get_distinct_ids() {
        let storage = Arc::new(MemoryStorage::new(Dataset::demo(Utc::now())));
        let owner = TicketOwner::Pharmacy {
            id: "p1".to_string(),
            name: String::new(),
        };
        let title = "Till crash".to_string();
        let ticket = Ticket::new(TicketId::new(1), title, owner, Utc::now());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let storage = Arc::clone(&storage);
                let ticket = ticket.clone();
                tokio::spawn(async move { storage.insert_new_ticket(ticket).await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap().unwrap().id.number());
        }
        ids.sort_unstable();

        assert_eq!(ids, (6..14).collect::<Vec<_>>());
        assert_eq!(storage.list_tickets().await.unwrap().len(), 13);
    }
}
