use serde::{Deserialize, Serialize};

use salesdesk_core::{DocumentId, DomainError, DomainResult, Entity, SalespersonId};

/// Client identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub DocumentId);

impl ClientId {
    pub fn new(id: DocumentId) -> Self {
        Self(id)
    }

    pub fn generate() -> Self {
        Self(DocumentId::new())
    }
}

impl core::fmt::Display for ClientId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::str::FromStr for ClientId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// A client and the salesperson who owns it.
///
/// `salesperson` is set once by [`Client::register`]; [`ClientPatch`] has no
/// way to change it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    pub id: ClientId,
    #[serde(rename = "nombre")]
    pub name: String,
    #[serde(rename = "apellido")]
    pub surname: String,
    #[serde(rename = "empresa")]
    pub company: String,
    pub email: String,
    #[serde(rename = "telefono", default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(rename = "vendedor")]
    salesperson: SalespersonId,
}

/// Payload for registering a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    #[serde(alias = "nombre")]
    pub name: String,
    #[serde(alias = "apellido")]
    pub surname: String,
    #[serde(alias = "empresa")]
    pub company: String,
    pub email: String,
    #[serde(default, alias = "telefono")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientPatch {
    #[serde(default, alias = "nombre")]
    pub name: Option<String>,
    #[serde(default, alias = "apellido")]
    pub surname: Option<String>,
    #[serde(default, alias = "empresa")]
    pub company: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "telefono")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientFilter {
    pub salesperson: Option<SalespersonId>,
    pub email: Option<String>,
}

impl ClientFilter {
    pub fn owned_by(salesperson: SalespersonId) -> Self {
        Self {
            salesperson: Some(salesperson),
            email: None,
        }
    }

    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            salesperson: None,
            email: Some(normalize_email(&email.into())),
        }
    }
}

impl Client {
    pub fn register(id: ClientId, input: NewClient, salesperson: SalespersonId) -> DomainResult<Self> {
        Ok(Self {
            id,
            name: required("nombre", input.name)?,
            surname: required("apellido", input.surname)?,
            company: required("empresa", input.company)?,
            email: validate_email(&input.email)?,
            phone: input.phone.filter(|p| !p.trim().is_empty()),
            salesperson,
        })
    }

    pub fn salesperson(&self) -> SalespersonId {
        self.salesperson
    }

    pub fn apply_patch(&mut self, patch: ClientPatch) -> DomainResult<()> {
        // Validate everything before touching any field.
        let name = patch.name.map(|v| required("nombre", v)).transpose()?;
        let surname = patch.surname.map(|v| required("apellido", v)).transpose()?;
        let company = patch.company.map(|v| required("empresa", v)).transpose()?;
        let email = patch.email.map(|v| validate_email(&v)).transpose()?;

        if let Some(v) = name {
            self.name = v;
        }
        if let Some(v) = surname {
            self.surname = v;
        }
        if let Some(v) = company {
            self.company = v;
        }
        if let Some(v) = email {
            self.email = v;
        }
        if let Some(phone) = patch.phone {
            self.phone = Some(phone).filter(|p| !p.trim().is_empty());
        }
        Ok(())
    }
}

fn required(field: &'static str, value: String) -> DomainResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, "cannot be empty"));
    }
    Ok(trimmed.to_string())
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn validate_email(email: &str) -> DomainResult<String> {
    let email = normalize_email(email);
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.contains('@') => {
            Ok(email)
        }
        _ => Err(DomainError::validation("email", "not a valid e-mail address")),
    }
}

impl Entity for Client {
    type Id = ClientId;
    type Filter = ClientFilter;

    const COLLECTION: &'static str = "clientes";

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn matches(&self, filter: &Self::Filter) -> bool {
        filter.salesperson.is_none_or(|s| s == self.salesperson)
            && filter.email.as_deref().is_none_or(|e| e == self.email)
    }
}
