use serde::{Deserialize, Serialize};

use supplyerp_core::{DomainError, DomainResult, Entity, typed_id};

typed_id!(
    /// Party identifier.
    PartyId
);

/// A party (supplier, customer, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    id: PartyId,
    name: String,
    code: Option<String>,
}

impl Party {
    pub fn new(id: PartyId, name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("party name cannot be empty"));
        }
        Ok(Self {
            id,
            name,
            code: None,
        })
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        let code = code.into();
        self.code = if code.trim().is_empty() { None } else { Some(code) };
        self
    }

    pub fn id_typed(&self) -> PartyId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> Option<&str> {
        self.code.as_deref()
    }

    /// Display name used when the party is referenced from other records.
    pub fn rec_name(&self) -> String {
        match &self.code {
            Some(code) => format!("[{code}] {}", self.name),
            None => self.name.clone(),
        }
    }
}

impl Entity for Party {
    type Id = PartyId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
