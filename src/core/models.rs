//! API data models
//!
//! Shapes of the JSON exchanged with the backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Authenticated user as returned by `/api/user`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub email_verified_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Login form payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub remember: bool,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            remember: false,
        }
    }

    pub fn remember(mut self, remember: bool) -> Self {
        self.remember = remember;
        self
    }
}

/// A link in the paginator's page list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageLink {
    pub url: Option<String>,
    pub label: String,
    pub active: bool,
}

/// Laravel length-aware paginator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub current_page: u32,
    pub last_page: u32,
    pub total: u64,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub from: Option<u64>,
    #[serde(default)]
    pub to: Option<u64>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub first_page_url: Option<String>,
    #[serde(default)]
    pub last_page_url: Option<String>,
    #[serde(default)]
    pub next_page_url: Option<String>,
    #[serde(default)]
    pub prev_page_url: Option<String>,
    #[serde(default)]
    pub links: Vec<PageLink>,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}

/// Brazilian document type: individual (CPF) or company (CNPJ)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CustomerKind {
    #[default]
    Cpf,
    Cnpj,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContactKind {
    #[default]
    Text,
    Phone,
    Email,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AddressKind {
    #[default]
    Home,
    Commercial,
    Billing,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactProperties {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub whatsapp: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(rename = "type", default)]
    pub kind: ContactKind,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub properties: ContactProperties,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Address {
    #[serde(rename = "type", default)]
    pub kind: AddressKind,
    #[serde(default)]
    pub zipcode: Option<u64>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub complement: Option<String>,
}

/// Person or company record behind a customer
///
/// Person fields are set for CPF customers, company fields for CNPJ ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Customerable {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub cpf: Option<u64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub legal_name: Option<String>,
    #[serde(default)]
    pub cnpj: Option<u64>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub addresses: Vec<Address>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub document_id: Option<String>,
    pub customerable_type: String,
    pub customerable_id: u64,
    #[serde(rename = "type")]
    pub kind: CustomerKind,
    pub created_at: String,
    pub updated_at: String,
    #[serde(default)]
    pub customerable: Customerable,
}

impl Customer {
    /// Company name or the person's full name
    pub fn display_name(&self) -> String {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return name.to_string();
        }
        let c = &self.customerable;
        match self.kind {
            CustomerKind::Cnpj => c.name.clone().unwrap_or_default(),
            CustomerKind::Cpf => [c.first_name.as_deref(), c.last_name.as_deref()]
                .into_iter()
                .flatten()
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

/// Create/update payload for `/api/customers`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerForm {
    #[serde(rename = "type")]
    pub kind: CustomerKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpf: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub legal_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cnpj: Option<u64>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub addresses: Vec<Address>,
}

/// Work order; everything beyond the keys is kept verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkOrder {
    pub id: u64,
    #[serde(default)]
    pub customer_id: Option<u64>,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}
