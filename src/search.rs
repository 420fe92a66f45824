//! Case-insensitive substring search over companies, pharmacies and the
//! combined directory used when raising a ticket.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{Company, Dataset, Entity, Pharmacy};

/// What a search returns when the query is blank.
///
/// A query made only of whitespace counts as blank for every search,
/// including the company and pharmacy lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EmptyQueryPolicy {
    ReturnAll,
    ReturnNone,
}

/// Extracts one searchable text field from an entity
pub trait SearchField<E> {
    /// `None` when the entity has no value for this field
    fn extract<'a>(&self, entity: &'a E) -> Option<&'a str>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompanyField {
    Name,
    Email,
    Phone,
    Address,
}

impl CompanyField {
    /// Fields searched by the company list
    pub const DEFAULT: [CompanyField; 3] = [Self::Name, Self::Email, Self::Address];
}

impl SearchField<Company> for CompanyField {
    fn extract<'a>(&self, company: &'a Company) -> Option<&'a str> {
        match self {
            Self::Name => Some(&company.name),
            Self::Email => Some(&company.email),
            Self::Phone => Some(&company.phone),
            Self::Address => Some(&company.address),
        }
    }
}

impl FromStr for CompanyField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            "phone" => Ok(Self::Phone),
            "address" => Ok(Self::Address),
            _ => Err(format!(
                "Invalid company field '{}'. Valid fields: name, email, phone, address",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PharmacyField {
    Name,
    Email,
    Phone,
    Postcode,
    Address,
    CompanyName,
}

impl PharmacyField {
    /// Fields searched by the pharmacy list
    pub const DEFAULT: [PharmacyField; 5] = [
        Self::Name,
        Self::Email,
        Self::Postcode,
        Self::Address,
        Self::CompanyName,
    ];
}

impl SearchField<Pharmacy> for PharmacyField {
    fn extract<'a>(&self, pharmacy: &'a Pharmacy) -> Option<&'a str> {
        match self {
            Self::Name => Some(&pharmacy.name),
            Self::Email => Some(&pharmacy.email),
            Self::Phone => Some(&pharmacy.phone),
            Self::Postcode => Some(&pharmacy.postcode),
            Self::Address => Some(&pharmacy.address),
            Self::CompanyName => pharmacy.company_name.as_deref(),
        }
    }
}

impl FromStr for PharmacyField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            "phone" => Ok(Self::Phone),
            "postcode" => Ok(Self::Postcode),
            "address" => Ok(Self::Address),
            "company" | "company-name" => Ok(Self::CompanyName),
            _ => Err(format!(
                "Unknown pharmacy field '{}' (name, email, phone, postcode, address, company)",
                s
            )),
        }
    }
}

/// Fields of the combined pharmacy + company directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectoryField {
    Name,
    Email,
    Postcode,
    Phone,
}

impl DirectoryField {
    /// Fields searched when picking an entity for a new ticket
    pub const DEFAULT: [DirectoryField; 4] = [Self::Name, Self::Email, Self::Postcode, Self::Phone];
}

impl SearchField<Entity> for DirectoryField {
    fn extract<'a>(&self, entity: &'a Entity) -> Option<&'a str> {
        match self {
            Self::Name => Some(entity.name()),
            Self::Email => Some(entity.email()),
            Self::Postcode => entity.postcode(),
            Self::Phone => Some(entity.phone()),
        }
    }
}

impl FromStr for DirectoryField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "name" => Ok(Self::Name),
            "email" => Ok(Self::Email),
            "postcode" => Ok(Self::Postcode),
            "phone" => Ok(Self::Phone),
            _ => Err(format!(
                "Invalid directory field '{}'. Valid fields: name, email, postcode, phone",
                s
            )),
        }
    }
}

/// Filters `entities` down to those where any of `fields` contains `query`,
/// ignoring case.
///
/// A query that is blank after trimming is answered by `policy` instead.
/// Results keep the input order.
pub fn search<'a, E, F>(
    query: &str,
    entities: &'a [E],
    fields: &[F],
    policy: EmptyQueryPolicy,
) -> Vec<&'a E>
where
    F: SearchField<E>,
{
    if query.trim().is_empty() {
        return match policy {
            EmptyQueryPolicy::ReturnAll => entities.iter().collect(),
            EmptyQueryPolicy::ReturnNone => Vec::new(),
        };
    }

    let needle = query.to_lowercase();
    let matches: Vec<&E> = entities
        .iter()
        .filter(|entity| {
            fields.iter().any(|field| {
                field
                    .extract(entity)
                    .map(|value| value.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
        })
        .collect();

    tracing::debug!(
        query,
        total = entities.len(),
        matched = matches.len(),
        "search filtered entities"
    );
    matches
}

/// Every pharmacy followed by every company, as one searchable list
pub fn directory_entries(dataset: &Dataset) -> Vec<Entity> {
    dataset
        .pharmacies
        .iter()
        .cloned()
        .map(Entity::Pharmacy)
        .chain(dataset.companies.iter().cloned().map(Entity::Company))
        .collect()
}
