use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{Company, Pharmacy};

/// The two kinds of record a ticket can be raised against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Company,
    Pharmacy,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Company => write!(f, "Company"),
            Self::Pharmacy => write!(f, "Pharmacy"),
        }
    }
}

/// Reference to a company or pharmacy by id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum EntityRef {
    Company(String),
    Pharmacy(String),
}

impl EntityRef {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Company(_) => EntityKind::Company,
            Self::Pharmacy(_) => EntityKind::Pharmacy,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Company(id) | Self::Pharmacy(id) => id,
        }
    }
}

/// A resolved company or pharmacy record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Entity {
    Company(Company),
    Pharmacy(Pharmacy),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Company(_) => EntityKind::Company,
            Self::Pharmacy(_) => EntityKind::Pharmacy,
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::Company(c) => &c.id,
            Self::Pharmacy(p) => &p.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Company(c) => &c.name,
            Self::Pharmacy(p) => &p.name,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Self::Company(c) => &c.email,
            Self::Pharmacy(p) => &p.email,
        }
    }

    pub fn phone(&self) -> &str {
        match self {
            Self::Company(c) => &c.phone,
            Self::Pharmacy(p) => &p.phone,
        }
    }

    /// Companies carry no postcode
    pub fn postcode(&self) -> Option<&str> {
        match self {
            Self::Company(_) => None,
            Self::Pharmacy(p) => Some(&p.postcode),
        }
    }

    pub fn to_ref(&self) -> EntityRef {
        match self {
            Self::Company(c) => EntityRef::Company(c.id.clone()),
            Self::Pharmacy(p) => EntityRef::Pharmacy(p.id.clone()),
        }
    }
}

/// Looks up companies and pharmacies by reference
pub trait EntityResolver {
    fn resolve(&self, entity: &EntityRef) -> Option<Entity>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_accessors() {
        let pharmacy = Pharmacy::new("p1", "High Street").with_contact(
            "hs@x.com",
            "0200",
            "AB1 2CD",
            "2 High St",
        );
        let pharmacy = Entity::Pharmacy(pharmacy);
        assert_eq!(pharmacy.kind(), EntityKind::Pharmacy);
        assert_eq!(pharmacy.postcode(), Some("AB1 2CD"));
        assert_eq!(pharmacy.to_ref(), EntityRef::Pharmacy("p1".to_string()));

        let company = Entity::Company(Company::new("c1", "Acme"));
        assert_eq!(company.postcode(), None);
        assert_eq!(company.to_ref().id(), "c1");
    }

    #[test]
    fn test_entity_ref_serialization() {
        let company = EntityRef::Company("c1".to_string());
        let json = serde_json::to_string(&company).unwrap();
        assert_eq!(json, r#"{"kind":"company","id":"c1"}"#);
    }
}
