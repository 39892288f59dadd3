use std::fmt;

use serde::{Deserialize, Serialize};

/// The statutory transaction families the share register records.
///
/// Labels are the Swedish terms shown to users: Nyemission (new issue),
/// Köp/Gåva/Arv (transfer by purchase, gift, or inheritance), and Split.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransactionKind {
    NewIssue,
    Purchase,
    Gift,
    Inheritance,
    Split,
}

impl TransactionKind {
    pub fn label(self) -> &'static str {
        match self {
            TransactionKind::NewIssue => "Nyemission",
            TransactionKind::Purchase => "Köp",
            TransactionKind::Gift => "Gåva",
            TransactionKind::Inheritance => "Arv",
            TransactionKind::Split => "Split",
        }
    }

    /// Köp, Gåva, and Arv all move existing shares between holders.
    pub fn is_transfer(self) -> bool {
        matches!(
            self,
            TransactionKind::Purchase | TransactionKind::Gift | TransactionKind::Inheritance
        )
    }

    pub fn all() -> [TransactionKind; 5] {
        [
            TransactionKind::NewIssue,
            TransactionKind::Purchase,
            TransactionKind::Gift,
            TransactionKind::Inheritance,
            TransactionKind::Split,
        ]
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_covers_purchase_gift_and_inheritance() {
        assert!(TransactionKind::Purchase.is_transfer());
        assert!(TransactionKind::Gift.is_transfer());
        assert!(TransactionKind::Inheritance.is_transfer());
        assert!(!TransactionKind::NewIssue.is_transfer());
        assert!(!TransactionKind::Split.is_transfer());
    }
}
