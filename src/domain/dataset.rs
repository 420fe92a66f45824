use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::{
    domain::{
        Company, Entity, EntityKind, EntityRef, EntityResolver, Pharmacy, Staff, Ticket, TicketId,
        TicketOwner, TicketPriority, TicketStatus, TodoItem,
    },
    error::{DeskError, Result},
};

/// A complete snapshot of every record the desk knows about
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub companies: Vec<Company>,
    pub pharmacies: Vec<Pharmacy>,
    pub tickets: Vec<Ticket>,
    pub staff: Vec<Staff>,
    pub todos: Vec<TodoItem>,
}

/// A single write against a dataset
#[derive(Debug, Clone)]
pub enum Change {
    InsertCompany(Company),
    InsertPharmacy(Pharmacy),
    InsertTicket(Ticket),
    ReplaceTicket(Ticket),
    RenameCompany { id: String, name: String },
    RenamePharmacy { id: String, name: String },
    ReplaceTodos(Vec<TodoItem>),
}

impl Dataset {
    pub fn company(&self, id: &str) -> Option<&Company> {
        self.companies.iter().find(|c| c.id == id)
    }

    pub fn pharmacy(&self, id: &str) -> Option<&Pharmacy> {
        self.pharmacies.iter().find(|p| p.id == id)
    }

    pub fn ticket(&self, id: &TicketId) -> Option<&Ticket> {
        self.tickets.iter().find(|t| &t.id == id)
    }

    pub fn entity(&self, kind: EntityKind, id: &str) -> Option<Entity> {
        match kind {
            EntityKind::Company => self.company(id).cloned().map(Entity::Company),
            EntityKind::Pharmacy => self.pharmacy(id).cloned().map(Entity::Pharmacy),
        }
    }

    /// Pharmacies whose company id points at `company_id`
    pub fn pharmacies_of(&self, company_id: &str) -> Vec<Pharmacy> {
        self.pharmacies
            .iter()
            .filter(|p| p.company_id.as_deref() == Some(company_id))
            .cloned()
            .collect()
    }

    /// Tickets raised against the given entity
    pub fn tickets_for(&self, entity: &EntityRef) -> Vec<Ticket> {
        self.tickets
            .iter()
            .filter(|t| t.owner.is(entity))
            .cloned()
            .collect()
    }

    /// Generates the id following the highest existing ticket number
    pub fn next_ticket_id(&self) -> Result<TicketId> {
        let highest = self.tickets.iter().map(|t| t.id.number()).max();
        highest
            .unwrap_or(0)
            .checked_add(1)
            .map(TicketId::new)
            .ok_or_else(|| DeskError::StorageError("Ticket numbers exhausted".to_string()))
    }

    /// Stamps `ticket` with the next free id and inserts it.
    ///
    /// Returns the ticket as stored, with its owner name taken from the dataset.
    pub fn insert_new_ticket(&mut self, mut ticket: Ticket) -> Result<Ticket> {
        ticket.id = self.next_ticket_id()?;
        let id = ticket.id.clone();
        self.apply(Change::InsertTicket(ticket))?;
        self.ticket(&id)
            .cloned()
            .ok_or_else(|| DeskError::TicketNotFound(id.to_string()))
    }

    /// Checks id uniqueness and cross-record references
    pub fn validate(&self) -> Result<()> {
        ensure_unique(self.companies.iter().map(|c| c.id.as_str()))?;
        ensure_unique(self.pharmacies.iter().map(|p| p.id.as_str()))?;
        ensure_unique(self.tickets.iter().map(|t| t.id.as_str()))?;
        ensure_unique(self.staff.iter().map(|s| s.id.as_str()))?;
        ensure_unique(self.todos.iter().map(|t| t.id.as_str()))?;

        for pharmacy in &self.pharmacies {
            if let Some(company_id) = &pharmacy.company_id {
                if self.company(company_id).is_none() {
                    return Err(DeskError::DanglingReference {
                        pharmacy: pharmacy.id.clone(),
                        company: company_id.clone(),
                    });
                }
            }
        }

        for ticket in &self.tickets {
            let owner = ticket.owner.to_ref();
            if self.resolve(&owner).is_none() {
                return Err(DeskError::EntityNotFound {
                    kind: owner.kind(),
                    id: owner.id().to_string(),
                });
            }
            if ticket.updated_at < ticket.created_at {
                return Err(DeskError::StorageError(format!(
                    "Ticket {} was updated before it was created",
                    ticket.id
                )));
            }
        }

        Ok(())
    }

    /// Recomputes every cached company/pharmacy name from the source records.
    ///
    /// Returns the number of cached names that changed.
    pub fn refresh_denormalized_names(&mut self) -> usize {
        let company_names: HashMap<String, String> = self
            .companies
            .iter()
            .map(|c| (c.id.clone(), c.name.clone()))
            .collect();
        let pharmacy_names: HashMap<String, String> = self
            .pharmacies
            .iter()
            .map(|p| (p.id.clone(), p.name.clone()))
            .collect();

        let mut changed = 0;

        for pharmacy in &mut self.pharmacies {
            let Some(company_id) = &pharmacy.company_id else {
                continue;
            };
            if let Some(name) = company_names.get(company_id) {
                if pharmacy.company_name.as_ref() != Some(name) {
                    pharmacy.company_name = Some(name.clone());
                    changed += 1;
                }
            }
        }

        for ticket in &mut self.tickets {
            let fresh = match &ticket.owner {
                TicketOwner::Pharmacy { id, .. } => pharmacy_names.get(id),
                TicketOwner::Company { id, .. } => company_names.get(id),
            };
            if let Some(fresh) = fresh {
                if ticket.owner.name() != fresh {
                    set_owner_name(&mut ticket.owner, fresh.clone());
                    changed += 1;
                }
            }
        }

        changed
    }

    /// Applies a single change, leaving the dataset untouched on error
    pub fn apply(&mut self, change: Change) -> Result<()> {
        match change {
            Change::InsertCompany(company) => {
                if self.company(&company.id).is_some() {
                    return Err(DeskError::DuplicateId(company.id));
                }
                self.companies.push(company);
            }
            Change::InsertPharmacy(mut pharmacy) => {
                if self.pharmacy(&pharmacy.id).is_some() {
                    return Err(DeskError::DuplicateId(pharmacy.id));
                }
                if let Some(company_id) = pharmacy.company_id.clone() {
                    let company = self
                        .companies
                        .iter_mut()
                        .find(|c| c.id == company_id)
                        .ok_or_else(|| DeskError::DanglingReference {
                            pharmacy: pharmacy.id.clone(),
                            company: company_id.clone(),
                        })?;
                    pharmacy.company_name = Some(company.name.clone());
                    if !company.pharmacy_ids.contains(&pharmacy.id) {
                        company.pharmacy_ids.push(pharmacy.id.clone());
                    }
                }
                self.pharmacies.push(pharmacy);
            }
            Change::InsertTicket(mut ticket) => {
                if self.ticket(&ticket.id).is_some() {
                    return Err(DeskError::DuplicateId(ticket.id.to_string()));
                }
                let owner = ticket.owner.to_ref();
                let entity = self
                    .resolve(&owner)
                    .ok_or_else(|| DeskError::EntityNotFound {
                        kind: owner.kind(),
                        id: owner.id().to_string(),
                    })?;
                set_owner_name(&mut ticket.owner, entity.name().to_string());
                self.tickets.push(ticket);
            }
            Change::ReplaceTicket(ticket) => {
                let slot = self
                    .tickets
                    .iter_mut()
                    .find(|t| t.id == ticket.id)
                    .ok_or_else(|| DeskError::TicketNotFound(ticket.id.to_string()))?;
                *slot = ticket;
            }
            Change::RenameCompany { id, name } => {
                let company = self
                    .companies
                    .iter_mut()
                    .find(|c| c.id == id)
                    .ok_or_else(|| DeskError::EntityNotFound {
                        kind: EntityKind::Company,
                        id: id.clone(),
                    })?;
                company.name = name;
                self.refresh_denormalized_names();
            }
            Change::RenamePharmacy { id, name } => {
                let pharmacy = self
                    .pharmacies
                    .iter_mut()
                    .find(|p| p.id == id)
                    .ok_or_else(|| DeskError::EntityNotFound {
                        kind: EntityKind::Pharmacy,
                        id: id.clone(),
                    })?;
                pharmacy.name = name;
                self.refresh_denormalized_names();
            }
            Change::ReplaceTodos(todos) => {
                ensure_unique(todos.iter().map(|t| t.id.as_str()))?;
                self.todos = todos;
            }
        }
        Ok(())
    }

    /// Seed data used when no dataset exists yet; timestamps are relative to `now`
    pub fn demo(now: DateTime<Utc>) -> Self {
        let acme = Company::new("c1", "Acme Health Group").with_contact(
            "contact@acmehealth.co.uk",
            "020 7946 0001",
            "1 Main Street, London",
        );
        let wellcare = Company::new("c2", "WellCare Pharmacies Ltd").with_contact(
            "info@wellcare.co.uk",
            "0161 496 0002",
            "22 King Street, Manchester",
        );

        let mut pharmacies = vec![
            Pharmacy::new("p1", "Acme Pharmacy Camden")
                .with_contact(
                    "camden@acmehealth.co.uk",
                    "020 7946 0101",
                    "NW1 8NH",
                    "12 Camden High Street, London",
                )
                .owned_by("c1", "Acme Health Group"),
            Pharmacy::new("p2", "Acme Pharmacy Islington")
                .with_contact(
                    "islington@acmehealth.co.uk",
                    "020 7946 0102",
                    "N1 0PS",
                    "4 Upper Street, London",
                )
                .owned_by("c1", "Acme Health Group"),
            Pharmacy::new("p3", "WellCare Deansgate")
                .with_contact(
                    "deansgate@wellcare.co.uk",
                    "0161 496 0201",
                    "M3 4LZ",
                    "150 Deansgate, Manchester",
                )
                .owned_by("c2", "WellCare Pharmacies Ltd"),
            Pharmacy::new("p4", "Riverside Chemist").with_contact(
                "hello@riversidechemist.co.uk",
                "0117 496 0301",
                "BS1 4DJ",
                "8 Welsh Back, Bristol",
            ),
        ];
        pharmacies[3].notes = Some("Independent pharmacy".to_string());

        let mut companies = vec![acme, wellcare];
        for company in &mut companies {
            company.pharmacy_ids = pharmacies
                .iter()
                .filter(|p| p.company_id.as_deref() == Some(company.id.as_str()))
                .map(|p| p.id.clone())
                .collect();
        }

        let ticket = |n: u32, title: &str, status, priority, category: &str, owner, age_days| {
            let created = now - Duration::days(age_days);
            let mut t = Ticket::new(TicketId::new(n), title.to_string(), owner, created);
            t.description = format!("{} reported by the site team.", title);
            t.status = status;
            t.priority = priority;
            t.category = category.to_string();
            t.updated_at = created;
            t
        };
        let pharmacy_owner = |p: &Pharmacy| TicketOwner::Pharmacy {
            id: p.id.clone(),
            name: p.name.clone(),
        };
        let company_owner = |c: &Company| TicketOwner::Company {
            id: c.id.clone(),
            name: c.name.clone(),
        };

        let mut tickets = vec![
            ticket(
                1,
                "Label printer offline",
                TicketStatus::Open,
                TicketPriority::High,
                "Technical Support",
                pharmacy_owner(&pharmacies[0]),
                0,
            ),
            ticket(
                2,
                "Duplicate invoice",
                TicketStatus::Ongoing,
                TicketPriority::Medium,
                "Billing",
                company_owner(&companies[0]),
                3,
            ),
            ticket(
                3,
                "New starter training",
                TicketStatus::Completed,
                TicketPriority::Low,
                "Training",
                pharmacy_owner(&pharmacies[2]),
                20,
            ),
            ticket(
                4,
                "Update account contacts",
                TicketStatus::Open,
                TicketPriority::Low,
                "Account Management",
                company_owner(&companies[1]),
                45,
            ),
            ticket(
                5,
                "Stock sync failing",
                TicketStatus::Ongoing,
                TicketPriority::High,
                "Technical Support",
                pharmacy_owner(&pharmacies[3]),
                120,
            ),
        ];
        tickets[1].assigned_to = Some("Sarah Johnson".to_string());
        tickets[4].assigned_to = Some("Tom Baker".to_string());

        let staff = vec![
            Staff::new("s1", "Sarah Johnson", "sarah.johnson@pharmadesk.co.uk"),
            Staff::new("s2", "Tom Baker", "tom.baker@pharmadesk.co.uk"),
            Staff::new("s3", "Priya Patel", "priya.patel@pharmadesk.co.uk"),
        ];

        let todos = vec![
            TodoItem {
                id: "1".to_string(),
                text: "Follow up with Acme on invoice".to_string(),
                completed: false,
                created_at: now - Duration::days(1),
            },
            TodoItem {
                id: "2".to_string(),
                text: "Schedule WellCare training session".to_string(),
                completed: true,
                created_at: now - Duration::days(2),
            },
        ];

        Self {
            companies,
            pharmacies,
            tickets,
            staff,
            todos,
        }
    }
}

impl EntityResolver for Dataset {
    fn resolve(&self, entity: &EntityRef) -> Option<Entity> {
        self.entity(entity.kind(), entity.id())
    }
}

fn set_owner_name(owner: &mut TicketOwner, fresh: String) {
    match owner {
        TicketOwner::Pharmacy { name, .. } | TicketOwner::Company { name, .. } => *name = fresh,
    }
}

fn ensure_unique<'a>(ids: impl Iterator<Item = &'a str>) -> Result<()> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(DeskError::DuplicateId(id.to_string()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::demo(Utc::now())
    }

    #[test]
    fn test_demo_dataset_is_valid() {
        let data = dataset();
        data.validate().unwrap();
        assert_eq!(data.company("c1").unwrap().pharmacy_ids, vec!["p1", "p2"]);
    }

    #[test]
    fn test_next_ticket_id_follows_highest() {
        assert_eq!(dataset().next_ticket_id().unwrap().as_str(), "TKT6");
        let first = Dataset::default().next_ticket_id().unwrap();
        assert_eq!(first.as_str(), "TKT1");
    }

    #[test]
    fn test_next_ticket_id_at_counter_limit() {
        let mut data = dataset();
        data.tickets[0].id = TicketId::new(u32::MAX);

        let err = data.next_ticket_id().unwrap_err();
        assert!(matches!(err, DeskError::StorageError(_)));
    }

    #[test]
    fn test_insert_new_ticket_stamps_next_id() {
        let mut data = dataset();
        let owner = TicketOwner::Company {
            id: "c2".to_string(),
            name: String::new(),
        };
        let title = "Contract query".to_string();
        let draft = Ticket::new(TicketId::new(1), title, owner, Utc::now());

        let first = data.insert_new_ticket(draft.clone()).unwrap();
        let second = data.insert_new_ticket(draft).unwrap();

        assert_eq!(first.id.as_str(), "TKT6");
        assert_eq!(second.id.as_str(), "TKT7");
        assert_eq!(first.owner.name(), "WellCare Pharmacies Ltd");
        assert_eq!(data.tickets.len(), 7);
    }

    #[test]
    fn test_validate_rejects_dangling_company() {
        let mut data = dataset();
        data.pharmacies[0].company_id = Some("nope".to_string());

        let err = data.validate().unwrap_err();
        assert!(matches!(err, DeskError::DanglingReference { .. }));
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let mut data = dataset();
        let copy = data.companies[0].clone();
        data.companies.push(copy);

        assert!(matches!(data.validate(), Err(DeskError::DuplicateId(id)) if id == "c1"));
    }

    #[test]
    fn test_rename_company_propagates_cached_names() {
        let mut data = dataset();
        data.apply(Change::RenameCompany {
            id: "c1".to_string(),
            name: "Acme Care".to_string(),
        })
        .unwrap();

        for pharmacy in data.pharmacies_of("c1") {
            assert_eq!(pharmacy.company_name.as_deref(), Some("Acme Care"));
        }
        let company_ticket = data.ticket(&TicketId::new(2)).unwrap();
        assert_eq!(company_ticket.owner.name(), "Acme Care");
    }

    #[test]
    fn test_rename_pharmacy_propagates_to_tickets() {
        let mut data = dataset();
        data.apply(Change::RenamePharmacy {
            id: "p1".to_string(),
            name: "Acme Pharmacy Kentish Town".to_string(),
        })
        .unwrap();

        assert_eq!(
            data.ticket(&TicketId::new(1)).unwrap().owner.name(),
            "Acme Pharmacy Kentish Town"
        );
    }

    #[test]
    fn test_rename_unknown_company_fails() {
        let mut data = dataset();
        let err = data
            .apply(Change::RenameCompany {
                id: "zzz".to_string(),
                name: "Ghost".to_string(),
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "Company not found: zzz");
    }

    #[test]
    fn test_refresh_repairs_stale_copies() {
        let mut data = dataset();
        data.pharmacies[0].company_name = Some("Old Name".to_string());
        data.tickets[0].owner = TicketOwner::Pharmacy {
            id: "p1".to_string(),
            name: "Stale".to_string(),
        };

        assert_eq!(data.refresh_denormalized_names(), 2);
        assert_eq!(
            data.pharmacies[0].company_name.as_deref(),
            Some("Acme Health Group")
        );
        assert_eq!(data.tickets[0].owner.name(), "Acme Pharmacy Camden");
        assert_eq!(data.refresh_denormalized_names(), 0);
    }

    #[test]
    fn test_insert_pharmacy_links_company() {
        let mut data = dataset();
        let pharmacy = Pharmacy {
            company_id: Some("c2".to_string()),
            ..Pharmacy::new("p9", "WellCare Salford")
        };

        data.apply(Change::InsertPharmacy(pharmacy)).unwrap();

        assert_eq!(
            data.pharmacy("p9").unwrap().company_name.as_deref(),
            Some("WellCare Pharmacies Ltd")
        );
        let company = data.company("c2").unwrap();
        assert!(company.pharmacy_ids.contains(&"p9".to_string()));
    }

    #[test]
    fn test_insert_pharmacy_with_unknown_company_fails() {
        let mut data = dataset();
        let before = data.clone();
        let pharmacy = Pharmacy {
            company_id: Some("c404".to_string()),
            ..Pharmacy::new("p9", "Nowhere")
        };

        assert!(data.apply(Change::InsertPharmacy(pharmacy)).is_err());
        assert_eq!(data, before);
    }

    #[test]
    fn test_insert_ticket_rejects_duplicate_and_unknown_owner() {
        let mut data = dataset();
        let now = Utc::now();

        let duplicate = data.tickets[0].clone();
        assert!(matches!(
            data.apply(Change::InsertTicket(duplicate)),
            Err(DeskError::DuplicateId(_))
        ));

        let orphan = Ticket::new(
            TicketId::new(50),
            "Orphan".to_string(),
            TicketOwner::Company {
                id: "c404".to_string(),
                name: String::new(),
            },
            now,
        );
        assert!(matches!(
            data.apply(Change::InsertTicket(orphan)),
            Err(DeskError::EntityNotFound { .. })
        ));
    }

    #[test]
    fn test_tickets_for_entity() {
        let data = dataset();
        let tickets = data.tickets_for(&EntityRef::Company("c1".to_string()));
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].id.as_str(), "TKT2");
    }
}
