use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single pharmacy location, optionally part of a company
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pharmacy {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_id: Option<String>,
    /// Cached copy of the owning company's name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub email: String,
    pub phone: String,
    pub postcode: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Pharmacy {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            company_id: None,
            company_name: None,
            email: String::new(),
            phone: String::new(),
            postcode: String::new(),
            address: String::new(),
            notes: None,
        }
    }

    pub fn with_contact(
        mut self,
        email: impl Into<String>,
        phone: impl Into<String>,
        postcode: impl Into<String>,
        address: impl Into<String>,
    ) -> Self {
        self.email = email.into();
        self.phone = phone.into();
        self.postcode = postcode.into();
        self.address = address.into();
        self
    }

    /// Links the pharmacy to a company, caching its name
    pub fn owned_by(
        mut self,
        company_id: impl Into<String>,
        company_name: impl Into<String>,
    ) -> Self {
        self.company_id = Some(company_id.into());
        self.company_name = Some(company_name.into());
        self
    }

    pub fn is_independent(&self) -> bool {
        self.company_id.is_none()
    }
}

/// Form data for registering a new pharmacy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PharmacyDraft {
    pub name: String,
    #[serde(default)]
    pub company_id: Option<String>,
    pub email: String,
    pub phone: String,
    pub postcode: String,
    pub address: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl PharmacyDraft {
    /// Builds the pharmacy record under a freshly generated id.
    ///
    /// The company name is left empty; it is filled in when the record is
    /// inserted into a dataset that knows the company.
    pub fn into_pharmacy(self) -> Pharmacy {
        Pharmacy {
            id: Uuid::new_v4().to_string(),
            name: self.name,
            company_id: self.company_id.filter(|id| !id.is_empty()),
            company_name: None,
            email: self.email,
            phone: self.phone,
            postcode: self.postcode,
            address: self.address,
            notes: self.notes.filter(|n| !n.trim().is_empty()),
        }
    }
}
