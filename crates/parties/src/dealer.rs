use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use partsdesk_core::{DomainError, DomainResult, Entity, RecordId};

/// Dealer identifier.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DealerId(pub RecordId);

impl DealerId {
    pub fn new(id: RecordId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for DealerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Contact information for a dealer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub contact_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// A dealer purchasing products from the central catalog.
///
/// `code` is unique across dealers (enforced by the store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dealer {
    id: DealerId,
    name: String,
    code: String,
    contact: ContactInfo,
    created_at: DateTime<Utc>,
}

impl Dealer {
    pub fn new(
        id: DealerId,
        name: impl Into<String>,
        code: impl Into<String>,
        contact: ContactInfo,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.into();
        let code = code.into();

        if name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if code.trim().is_empty() {
            return Err(DomainError::validation("code cannot be empty"));
        }

        Ok(Self {
            id,
            name,
            code,
            contact,
            created_at: now,
        })
    }

    pub fn id_typed(&self) -> DealerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl Entity for Dealer {
    type Id = DealerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dealer_requires_name_and_code() {
        let id = DealerId::new(RecordId::from_i64(1));
        assert!(Dealer::new(id, "", "ABC", ContactInfo::default(), Utc::now()).is_err());
        assert!(Dealer::new(id, "ABC Motors", " ", ContactInfo::default(), Utc::now()).is_err());

        let dealer =
            Dealer::new(id, "ABC Motors", "ABC", ContactInfo::default(), Utc::now()).unwrap();
        assert_eq!(dealer.code(), "ABC");
    }
}
