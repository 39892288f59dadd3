use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{shareholder::Shareholder, verification::Verification};

const CURRENT_SCHEMA_VERSION: u8 = 1;

/// The aktiebok aggregate: company facts, the shareholder registry, and
/// the verification journal the register derives its views from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareRegister {
    pub id: Uuid,
    pub company_name: String,
    pub org_number: String,
    /// Registered share capital in SEK.
    pub share_capital: f64,
    #[serde(default)]
    pub shareholders: Vec<Shareholder>,
    #[serde(default)]
    pub verifications: Vec<Verification>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "ShareRegister::schema_version_default")]
    pub schema_version: u8,
}

impl ShareRegister {
    pub fn new(
        company_name: impl Into<String>,
        org_number: impl Into<String>,
        share_capital: f64,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            company_name: company_name.into(),
            org_number: org_number.into(),
            share_capital,
            shareholders: Vec::new(),
            verifications: Vec::new(),
            created_at: now,
            updated_at: now,
            schema_version: CURRENT_SCHEMA_VERSION,
        }
    }

    pub fn add_shareholder(&mut self, shareholder: Shareholder) -> Uuid {
        let id = shareholder.id;
        self.shareholders.push(shareholder);
        self.touch();
        id
    }

    pub fn add_verification(&mut self, verification: Verification) -> Uuid {
        let id = verification.id;
        self.verifications.push(verification);
        self.touch();
        id
    }

    pub fn shareholder(&self, id: Uuid) -> Option<&Shareholder> {
        self.shareholders.iter().find(|holder| holder.id == id)
    }

    /// Name lookup used by transfers; trimmed and case-insensitive.
    pub fn shareholder_by_name(&self, name: &str) -> Option<&Shareholder> {
        let wanted = name.trim().to_lowercase();
        self.shareholders
            .iter()
            .find(|holder| holder.name.trim().to_lowercase() == wanted)
    }

    pub fn shareholder_by_name_mut(&mut self, name: &str) -> Option<&mut Shareholder> {
        let wanted = name.trim().to_lowercase();
        self.shareholders
            .iter_mut()
            .find(|holder| holder.name.trim().to_lowercase() == wanted)
    }

    pub fn total_shares(&self) -> u64 {
        self.shareholders.iter().map(|holder| holder.shares).sum()
    }

    pub fn total_votes(&self) -> u64 {
        self.shareholders.iter().map(|holder| holder.votes()).sum()
    }

    /// Kvotvärde: share capital divided by total shares, 0 for an empty
    /// register.
    pub fn quota_value(&self) -> f64 {
        let total = self.total_shares();
        if total == 0 {
            0.0
        } else {
            self.share_capital / total as f64
        }
    }

    /// The next free share number, one past the highest assigned so far.
    pub fn next_share_number(&self) -> u64 {
        self.shareholders
            .iter()
            .map(|holder| holder.share_number_to)
            .max()
            .map(|highest| highest + 1)
            .unwrap_or(1)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    pub fn schema_version_default() -> u8 {
        CURRENT_SCHEMA_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::shareholder::ShareClass;

    fn register_with_holders() -> ShareRegister {
        let mut register = ShareRegister::new("Testbolaget AB", "556000-0000", 100_000.0);
        register.add_shareholder(Shareholder::new(
            "Anna Alm",
            "19800101-1234",
            600,
            ShareClass::B,
            1,
            600,
        ));
        register.add_shareholder(Shareholder::new(
            "Bertil Berg",
            "19750505-5678",
            400,
            ShareClass::B,
            601,
            1000,
        ));
        register
    }

    #[test]
    fn totals_and_quota_value() {
        let register = register_with_holders();
        assert_eq!(register.total_shares(), 1000);
        assert_eq!(register.total_votes(), 1000);
        assert_eq!(register.quota_value(), 100.0);
        assert_eq!(register.next_share_number(), 1001);
    }

    #[test]
    fn empty_register_yields_zero_quota_and_share_number_one() {
        let register = ShareRegister::new("Nystartat AB", "556111-1111", 25_000.0);
        assert_eq!(register.quota_value(), 0.0);
        assert_eq!(register.next_share_number(), 1);
    }

    #[test]
    fn name_lookup_ignores_case_and_whitespace() {
        let register = register_with_holders();
        assert!(register.shareholder_by_name("  anna alm ").is_some());
        assert!(register.shareholder_by_name("Okänd Person").is_none());
    }
}
