use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::transaction::TransactionKind;

/// BAS chart-of-accounts codes referenced by share transactions.
pub const ACCOUNT_BANK: &str = "1930";
pub const ACCOUNT_SHARE_CAPITAL: &str = "2081";
pub const ACCOUNT_SHARE_PREMIUM: &str = "2097";

/// A single debit/credit row of a verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRow {
    pub account: String,
    pub description: String,
    pub debit: f64,
    pub credit: f64,
}

impl VerificationRow {
    pub fn debit(account: &str, description: impl Into<String>, amount: f64) -> Self {
        Self {
            account: account.into(),
            description: description.into(),
            debit: amount,
            credit: 0.0,
        }
    }

    pub fn credit(account: &str, description: impl Into<String>, amount: f64) -> Self {
        Self {
            account: account.into(),
            description: description.into(),
            debit: 0.0,
            credit: amount,
        }
    }
}

/// A dated bookkeeping journal entry (verifikation).
///
/// Share issues and splits carry accounting rows; transfers between
/// shareholders have no P&L or balance-sheet impact and carry none.
/// `kind` is set by the register's own mutations; entries recorded
/// elsewhere in the bookkeeping may lack it and are classified from the
/// description text instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verification {
    pub id: Uuid,
    pub date: NaiveDate,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<TransactionKind>,
    #[serde(default)]
    pub rows: Vec<VerificationRow>,
}

impl Verification {
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        kind: Option<TransactionKind>,
        rows: Vec<VerificationRow>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            description: description.into(),
            kind,
            rows,
        }
    }

    /// Amount moved over the bank account (1930), if any row touches it.
    pub fn bank_amount(&self) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| row.account == ACCOUNT_BANK)
            .map(|row| if row.debit > 0.0 { row.debit } else { row.credit })
    }

    pub fn row_for_account(&self, account: &str) -> Option<&VerificationRow> {
        self.rows.iter().find(|row| row.account == account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_amount_prefers_debit_side() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let entry = Verification::new(
            date,
            "Nyemission: 100 B-aktier till Carin Ceder à 50 kr",
            Some(TransactionKind::NewIssue),
            vec![
                VerificationRow::debit(ACCOUNT_BANK, "Inbetalning nyemission", 5000.0),
                VerificationRow::credit(ACCOUNT_SHARE_CAPITAL, "Aktiekapital", 1000.0),
            ],
        );
        assert_eq!(entry.bank_amount(), Some(5000.0));
        assert!(entry.row_for_account(ACCOUNT_SHARE_PREMIUM).is_none());
    }

    #[test]
    fn bank_amount_is_none_for_transfers() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let entry = Verification::new(
            date,
            "Överlåtelse (gåva): 10 aktier från Anna Alm till Bertil Berg",
            Some(TransactionKind::Gift),
            Vec::new(),
        );
        assert_eq!(entry.bank_amount(), None);
    }
}
