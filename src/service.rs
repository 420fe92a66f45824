//! Query and command entry points used by the dashboard screens.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::{
    aggregation::{
        aggregate_ticket_priority, aggregate_ticket_status, tickets_with_status, PriorityCounts,
        StatusCounts, TimeWindow,
    },
    config::DeskConfig,
    domain::{
        sort_tickets, toggle_completion, Change, Company, CompanyDraft, Entity, EntityKind,
        EntityRef, Pharmacy, PharmacyDraft, SortField, SortOrder, Ticket, TicketId, TicketStatus,
        TodoItem,
    },
    error::{DeskError, Result},
    intake::{create_ticket, Notification, TicketDraft},
    search::{
        directory_entries, search, CompanyField, DirectoryField, EmptyQueryPolicy, PharmacyField,
    },
    storage::EntityStore,
};

/// A company with its pharmacy locations and tickets
#[derive(Debug, Clone, Serialize)]
pub struct CompanyProfile {
    pub company: Company,
    pub pharmacies: Vec<Pharmacy>,
    pub tickets: Vec<Ticket>,
}

/// A pharmacy with its parent company (if any) and tickets
#[derive(Debug, Clone, Serialize)]
pub struct PharmacyProfile {
    pub pharmacy: Pharmacy,
    pub company: Option<Company>,
    pub tickets: Vec<Ticket>,
}

/// Everything the dashboard shows for one time window
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSummary {
    pub window: TimeWindow,
    pub status_counts: StatusCounts,
    pub priority_counts: PriorityCounts,
    pub open: Vec<Ticket>,
    pub ongoing: Vec<Ticket>,
    pub completed: Vec<Ticket>,
    pub todos: Vec<TodoItem>,
}

/// Result of submitting a ticket draft
#[derive(Debug)]
pub struct Submission {
    pub ticket: Result<Ticket>,
    pub notification: Notification,
    /// False when the write path is disabled by configuration
    pub persisted: bool,
}

pub struct SupportDesk<S: EntityStore> {
    store: S,
    config: DeskConfig,
}

impl<S: EntityStore> SupportDesk<S> {
    pub fn new(store: S, config: DeskConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &DeskConfig {
        &self.config
    }

    /// Company list filter; a blank query lists every company
    pub async fn search_companies(&self, query: &str) -> Result<Vec<Company>> {
        let companies = self.store.list_companies().await?;
        let policy = EmptyQueryPolicy::ReturnAll;
        let hits = search(query, &companies, &CompanyField::DEFAULT, policy);
        Ok(hits.into_iter().cloned().collect())
    }

    /// Pharmacy list filter; a blank query lists every pharmacy
    pub async fn search_pharmacies(&self, query: &str) -> Result<Vec<Pharmacy>> {
        let pharmacies = self.store.list_pharmacies().await?;
        let policy = EmptyQueryPolicy::ReturnAll;
        let hits = search(query, &pharmacies, &PharmacyField::DEFAULT, policy);
        Ok(hits.into_iter().cloned().collect())
    }

    /// Combined pharmacy and company lookup used before raising a ticket.
    /// A blank query returns nothing.
    pub async fn search_directory(&self, query: &str) -> Result<Vec<Entity>> {
        let entries = directory_entries(&self.store.snapshot().await?);
        let policy = EmptyQueryPolicy::ReturnNone;
        let hits = search(query, &entries, &DirectoryField::DEFAULT, policy);
        Ok(hits.into_iter().cloned().collect())
    }

    pub async fn company_profile(&self, id: &str) -> Result<CompanyProfile> {
        let dataset = self.store.snapshot().await?;
        let company = dataset.company(id).cloned().ok_or_else(|| {
            tracing::warn!(id, "company profile not found");
            DeskError::EntityNotFound {
                kind: EntityKind::Company,
                id: id.to_string(),
            }
        })?;

        Ok(CompanyProfile {
            pharmacies: dataset.pharmacies_of(id),
            tickets: dataset.tickets_for(&EntityRef::Company(id.to_string())),
            company,
        })
    }

    pub async fn pharmacy_profile(&self, id: &str) -> Result<PharmacyProfile> {
        let dataset = self.store.snapshot().await?;
        let pharmacy = dataset.pharmacy(id).cloned().ok_or_else(|| {
            tracing::warn!(id, "pharmacy profile not found");
            DeskError::EntityNotFound {
                kind: EntityKind::Pharmacy,
                id: id.to_string(),
            }
        })?;

        let company = pharmacy
            .company_id
            .as_deref()
            .and_then(|company_id| dataset.company(company_id))
            .cloned();

        Ok(PharmacyProfile {
            tickets: dataset.tickets_for(&EntityRef::Pharmacy(id.to_string())),
            company,
            pharmacy,
        })
    }

    /// Chart counts for `window` plus the status tabs, newest tickets first
    pub async fn dashboard(
        &self,
        window: TimeWindow,
        now: DateTime<Utc>,
    ) -> Result<DashboardSummary> {
        let dataset = self.store.snapshot().await?;

        let tab = |status| {
            let mut tickets = tickets_with_status(&dataset.tickets, status);
            sort_tickets(&mut tickets, SortField::Created, SortOrder::Descending);
            tickets
        };

        Ok(DashboardSummary {
            window,
            status_counts: aggregate_ticket_status(&dataset.tickets, window, now),
            priority_counts: aggregate_ticket_priority(&dataset.tickets, window, now),
            open: tab(TicketStatus::Open),
            ongoing: tab(TicketStatus::Ongoing),
            completed: tab(TicketStatus::Completed),
            todos: dataset.todos.clone(),
        })
    }

    /// Dashboard for the configured default window at the current time
    pub async fn default_dashboard(&self) -> Result<DashboardSummary> {
        self.dashboard(self.config.default_window, Utc::now()).await
    }

    /// Validates and, unless writes are disabled, stores a new ticket.
    ///
    /// The id from the snapshot is provisional; the store assigns the final
    /// one inside its write lock.
    pub async fn submit_ticket(
        &self,
        draft: &TicketDraft,
        now: DateTime<Utc>,
    ) -> Result<Submission> {
        let dataset = self.store.snapshot().await?;
        let result = create_ticket(draft, &dataset, dataset.next_ticket_id()?, now);

        let ticket = match result {
            Ok(ticket) => ticket,
            Err(err) if err.is_user_correctable() => {
                tracing::warn!(error = %err, "ticket draft rejected");
                let ticket = Err(err);
                return Ok(Submission {
                    notification: Notification::for_ticket(&ticket),
                    ticket,
                    persisted: false,
                });
            }
            Err(err) => return Err(err),
        };

        if !self.config.is_known_category(&ticket.category) {
            tracing::debug!(category = %ticket.category, "ticket uses an unlisted category");
        }

        let (ticket, persisted) = if self.config.persist_writes {
            let ticket = self.store.insert_new_ticket(ticket).await?;
            tracing::info!(id = %ticket.id, owner = ticket.owner.id(), "ticket created");
            (ticket, true)
        } else {
            tracing::debug!(id = %ticket.id, "write path disabled, ticket not stored");
            (ticket, false)
        };

        let ticket = Ok(ticket);
        Ok(Submission {
            notification: Notification::for_ticket(&ticket),
            ticket,
            persisted,
        })
    }

    pub async fn update_ticket_status(
        &self,
        id: &TicketId,
        status: TicketStatus,
        now: DateTime<Utc>,
    ) -> Result<Ticket> {
        let dataset = self.store.snapshot().await?;
        let mut ticket = dataset
            .ticket(id)
            .cloned()
            .ok_or_else(|| DeskError::TicketNotFound(id.to_string()))?;

        ticket.transition_to(status, now)?;
        self.store
            .apply(Change::ReplaceTicket(ticket.clone()))
            .await?;
        tracing::info!(%id, %status, "ticket status updated");
        Ok(ticket)
    }

    pub async fn assign_ticket(
        &self,
        id: &TicketId,
        assignee: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Ticket> {
        let dataset = self.store.snapshot().await?;
        let mut ticket = dataset
            .ticket(id)
            .cloned()
            .ok_or_else(|| DeskError::TicketNotFound(id.to_string()))?;

        ticket.assign_to(assignee, now);
        self.store
            .apply(Change::ReplaceTicket(ticket.clone()))
            .await?;
        tracing::info!(%id, assignee = ticket.assignee_label(), "ticket assigned");
        Ok(ticket)
    }

    pub async fn add_company(&self, draft: CompanyDraft) -> Result<Company> {
        if draft.name.trim().is_empty() {
            return Err(DeskError::MissingRequiredField);
        }

        let company = draft.into_company();
        self.write(Change::InsertCompany(company.clone())).await?;
        Ok(company)
    }

    pub async fn add_pharmacy(&self, draft: PharmacyDraft) -> Result<Pharmacy> {
        if draft.name.trim().is_empty() || draft.postcode.trim().is_empty() {
            return Err(DeskError::MissingRequiredField);
        }

        let mut pharmacy = draft.into_pharmacy();
        if let Some(company_id) = &pharmacy.company_id {
            let company = self
                .store
                .get_by_id(EntityKind::Company, company_id)
                .await?
                .ok_or_else(|| DeskError::EntityNotFound {
                    kind: EntityKind::Company,
                    id: company_id.clone(),
                })?;
            pharmacy.company_name = Some(company.name().to_string());
        }

        self.write(Change::InsertPharmacy(pharmacy.clone())).await?;
        Ok(pharmacy)
    }

    pub async fn rename_company(&self, id: &str, name: &str) -> Result<()> {
        self.rename(Change::RenameCompany {
            id: id.to_string(),
            name: name.trim().to_string(),
        })
        .await
    }

    pub async fn rename_pharmacy(&self, id: &str, name: &str) -> Result<()> {
        self.rename(Change::RenamePharmacy {
            id: id.to_string(),
            name: name.trim().to_string(),
        })
        .await
    }

    pub async fn toggle_todo(&self, id: &str) -> Result<Vec<TodoItem>> {
        let todos = toggle_completion(&self.store.list_todos().await?, id);
        self.write(Change::ReplaceTodos(todos.clone())).await?;
        Ok(todos)
    }

    pub async fn add_todo(&self, text: &str, now: DateTime<Utc>) -> Result<Vec<TodoItem>> {
        if text.trim().is_empty() {
            return Err(DeskError::MissingRequiredField);
        }

        let mut todos = self.store.list_todos().await?;
        todos.push(TodoItem::new(text.trim(), now));
        self.write(Change::ReplaceTodos(todos.clone())).await?;
        Ok(todos)
    }

    async fn rename(&self, change: Change) -> Result<()> {
        if let Change::RenameCompany { name, .. } | Change::RenamePharmacy { name, .. } = &change {
            if name.is_empty() {
                return Err(DeskError::MissingRequiredField);
            }
        }
        self.write(change).await
    }

    // Create/update operations honour the persist_writes switch
    async fn write(&self, change: Change) -> Result<()> {
        if !self.config.persist_writes {
            tracing::debug!(?change, "write path disabled, change dropped");
            return Ok(());
        }
        tracing::info!(?change, "applying change");
        self.store.apply(change).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{domain::Dataset, storage::MemoryStorage};
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
    }

    fn desk() -> SupportDesk<MemoryStorage> {
        let store = MemoryStorage::new(Dataset::demo(now()));
        SupportDesk::new(store, DeskConfig::default())
    }

    fn read_only_desk() -> SupportDesk<MemoryStorage> {
        let config = DeskConfig {
            persist_writes: false,
            ..DeskConfig::default()
        };
        SupportDesk::new(MemoryStorage::new(Dataset::demo(now())), config)
    }

    fn draft_for(entity: EntityRef) -> TicketDraft {
        let mut draft = TicketDraft::new().with_details(
            "Fridge alarm",
            "Alarm sounding overnight",
            "Technical Support",
        );
        draft.select_entity(entity).unwrap();
        draft
    }

    #[tokio::test]
    async fn test_list_searches_return_all_on_blank_query() {
        let desk = desk();
        assert_eq!(desk.search_companies("").await.unwrap().len(), 2);
        assert_eq!(desk.search_pharmacies("").await.unwrap().len(), 4);
        assert!(desk.search_directory("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_pharmacies_by_postcode() {
        let desk = desk();
        let hits = desk.search_pharmacies("m3 4lz").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "p3");
    }

    #[tokio::test]
    async fn test_company_profile() {
        let profile = desk().company_profile("c1").await.unwrap();
        assert_eq!(profile.company.name, "Acme Health Group");
        assert_eq!(profile.pharmacies.len(), 2);
        assert_eq!(profile.tickets.len(), 1);
    }

    #[tokio::test]
    async fn test_profile_not_found() {
        let err = desk().pharmacy_profile("p404").await.unwrap_err();
        assert_eq!(err.to_string(), "Pharmacy not found: p404");
        assert!(err.is_user_correctable());
    }

    #[tokio::test]
    async fn test_independent_pharmacy_profile() {
        let profile = desk().pharmacy_profile("p4").await.unwrap();
        assert!(profile.company.is_none());
        assert_eq!(profile.tickets.len(), 1);
    }

    #[tokio::test]
    async fn test_dashboard_counts_and_tabs() {
        let summary = desk().dashboard(TimeWindow::Weekly, now()).await.unwrap();

        assert_eq!(
            summary.status_counts,
            StatusCounts {
                open: 1,
                ongoing: 1,
                completed: 0,
            }
        );
        assert_eq!(summary.open.len(), 2);
        assert_eq!(summary.ongoing.len(), 2);
        assert_eq!(summary.completed.len(), 1);
        assert_eq!(summary.open[0].id.as_str(), "TKT1");
        assert_eq!(summary.todos.len(), 2);
    }

    #[tokio::test]
    async fn test_submit_ticket_persists() {
        let desk = desk();
        let submission = desk
            .submit_ticket(&draft_for(EntityRef::Pharmacy("p2".to_string())), now())
            .await
            .unwrap();

        assert!(submission.persisted);
        assert!(submission.notification.is_success());
        let ticket = submission.ticket.unwrap();
        assert_eq!(ticket.id.as_str(), "TKT6");

        let profile = desk.pharmacy_profile("p2").await.unwrap();
        assert_eq!(profile.tickets, vec![ticket]);
    }

    #[tokio::test]
    async fn test_submit_invalid_draft_notifies_error() {
        let desk = desk();
        let empty = TicketDraft::new();
        let submission = desk.submit_ticket(&empty, now()).await.unwrap();

        assert!(!submission.persisted);
        assert_eq!(
            submission.notification,
            Notification::Error("Please select a pharmacy or company".to_string())
        );
        assert_eq!(desk.store().list_tickets().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_read_only_desk_never_appends() {
        let desk = read_only_desk();
        let submission = desk
            .submit_ticket(&draft_for(EntityRef::Company("c1".to_string())), now())
            .await
            .unwrap();

        assert!(submission.notification.is_success());
        assert!(!submission.persisted);
        assert_eq!(desk.store().list_tickets().await.unwrap().len(), 5);

        desk.toggle_todo("1").await.unwrap();
        assert!(!desk.store().list_todos().await.unwrap()[0].completed);
    }

    #[tokio::test]
    async fn test_update_ticket_status() {
        let desk = desk();
        let later = now() + Duration::hours(2);

        let ticket = desk
            .update_ticket_status(&TicketId::new(1), TicketStatus::Ongoing, later)
            .await
            .unwrap();
        assert_eq!(ticket.updated_at, later);

        let err = desk
            .update_ticket_status(&TicketId::new(3), TicketStatus::Open, later)
            .await
            .unwrap_err();
        assert!(matches!(err, DeskError::InvalidStatusTransition { .. }));

        let err = desk
            .update_ticket_status(&TicketId::new(99), TicketStatus::Open, later)
            .await
            .unwrap_err();
        assert!(matches!(err, DeskError::TicketNotFound(_)));
    }

    #[tokio::test]
    async fn test_assign_ticket() {
        let desk = desk();
        let ticket = desk
            .assign_ticket(&TicketId::new(1), Some("Priya Patel".to_string()), now())
            .await
            .unwrap();
        assert_eq!(ticket.assignee_label(), "Priya Patel");
    }

    #[tokio::test]
    async fn test_add_pharmacy_under_company() {
        let desk = desk();
        let pharmacy = desk
            .add_pharmacy(PharmacyDraft {
                name: "Acme Pharmacy Hackney".to_string(),
                company_id: Some("c1".to_string()),
                postcode: "E8 1DY".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(pharmacy.company_name.as_deref(), Some("Acme Health Group"));
        let profile = desk.company_profile("c1").await.unwrap();
        assert_eq!(profile.pharmacies.len(), 3);
        assert!(profile.company.pharmacy_ids.contains(&pharmacy.id));
    }

    #[tokio::test]
    async fn test_add_pharmacy_requires_known_company() {
        let err = desk()
            .add_pharmacy(PharmacyDraft {
                name: "Ghost".to_string(),
                company_id: Some("c404".to_string()),
                postcode: "X1 1XX".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Company not found: c404");
    }

    #[tokio::test]
    async fn test_add_company_requires_name() {
        let draft = CompanyDraft::default();
        let err = desk().add_company(draft).await.unwrap_err();
        assert!(matches!(err, DeskError::MissingRequiredField));
    }

    #[tokio::test]
    async fn test_rename_company_refreshes_search() {
        let desk = desk();
        desk.rename_company("c2", "Northgate Pharmacy Group")
            .await
            .unwrap();

        let hits = desk.search_pharmacies("northgate").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "p3");

        assert!(desk.rename_pharmacy("p3", "  ").await.is_err());
    }

    #[tokio::test]
    async fn test_todos() {
        let desk = desk();
        let todos = desk.toggle_todo("1").await.unwrap();
        assert!(todos[0].completed);

        let todos = desk.add_todo("Order toner", now()).await.unwrap();
        assert_eq!(todos.len(), 3);
        assert_eq!(todos[2].text, "Order toner");

        assert!(desk.add_todo("   ", now()).await.is_err());
    }
}
