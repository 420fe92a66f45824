use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A company owning zero or more pharmacy locations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pharmacy_ids: Vec<String>,
}

impl Company {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            notes: None,
            pharmacy_ids: Vec::new(),
        }
    }

    pub fn with_contact(
        mut self,
        email: impl Into<String>,
        phone: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        self.email = email.into();
        self.phone = phone.into();
        self.address = address.into();
        self
    }
}

/// Form data for registering a new company
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CompanyDraft {
    /// Builds the company record under a freshly generated id
    pub fn into_company(self) -> Company {
        Company {
            id: Uuid::new_v4().to_string(),
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
            pharmacy_ids: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_into_company_assigns_id() {
        let draft = CompanyDraft {
            name: "Acme".to_string(),
            notes: Some("  ".to_string()),
            ..Default::default()
        };

        let a = draft.clone().into_company();
        let b = draft.into_company();

        assert_ne!(a.id, b.id);
        assert_eq!(a.name, "Acme");
        assert!(a.notes.is_none());
    }

    #[test]
    fn test_company_deserializes_without_optional_fields() {
        let json = r#"{
            "id": "c1",
            "name": "Acme",
            "email": "a@acme.com",
            "phone": "0100",
            "address": "1 Main St"
        }"#;

        let company: Company = serde_json::from_str(json).unwrap();
        assert_eq!(company.id, "c1");
        assert!(company.pharmacy_ids.is_empty());
        assert!(company.notes.is_none());
    }
}
