//! Display models derived from the shareholder registry and the
//! verification journal.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::register::{ShareClass, ShareRegister, TransactionKind, Verification};

/// One row of the shareholder grid, percentages pre-rounded for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ShareholderView {
    pub id: Uuid,
    pub name: String,
    pub id_number: String,
    pub shares: u64,
    pub share_class: ShareClass,
    pub share_number_from: u64,
    pub share_number_to: u64,
    pub ownership_percent: u32,
    pub votes: u64,
    pub vote_percent: u32,
}

/// A transaction-history row reconstructed from the journal.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionView {
    pub id: Uuid,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub from: Option<String>,
    pub to: Option<String>,
    pub shares: u64,
    pub price_per_share: f64,
    pub total_price: f64,
}

static SHARE_COUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s+(?:[AB]-)?aktier").unwrap());
static TO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"till\s+(.+?)(?:\s+à|,|$)").unwrap());
static FROM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"från\s+(.+?)(?:\s+till\b|,|$)").unwrap());

/// Description keywords that mark a journal entry as equity-related when
/// no first-class kind was stored with it.
const EQUITY_KEYWORDS: [&str; 4] = ["nyemission", "aktier", "överlåtelse", "split"];

pub struct ViewService;

impl ViewService {
    pub fn shareholder_views(register: &ShareRegister) -> Vec<ShareholderView> {
        // Substitute 1 as denominator for an empty register so the grid
        // renders zeros instead of NaN.
        let total_shares = register.total_shares().max(1);
        let total_votes = register.total_votes().max(1);

        register
            .shareholders
            .iter()
            .map(|holder| {
                let votes = holder.votes();
                ShareholderView {
                    id: holder.id,
                    name: holder.name.clone(),
                    id_number: holder.id_number.clone(),
                    shares: holder.shares,
                    share_class: holder.share_class,
                    share_number_from: holder.share_number_from,
                    share_number_to: holder.share_number_to,
                    ownership_percent: round_percent(holder.shares, total_shares),
                    votes,
                    vote_percent: round_percent(votes, total_votes),
                }
            })
            .collect()
    }

    /// Reconstructs the transaction history, journal order preserved.
    ///
    /// Entries created by the register carry their kind; anything else is
    /// kept only if its description mentions equity and is then classified
    /// by keyword, a best-effort heuristic.
    pub fn transaction_views(register: &ShareRegister) -> Vec<TransactionView> {
        register
            .verifications
            .iter()
            .filter(|entry| entry.kind.is_some() || mentions_equity(&entry.description))
            .map(|entry| Self::view_for(entry))
            .collect()
    }

    fn view_for(entry: &Verification) -> TransactionView {
        let kind = entry
            .kind
            .unwrap_or_else(|| classify_description(&entry.description));
        let shares = extract_share_count(&entry.description);
        let total_price = entry.bank_amount().unwrap_or(0.0);
        let price_per_share = if shares > 0 {
            total_price / shares as f64
        } else {
            0.0
        };
        TransactionView {
            id: entry.id,
            date: entry.date,
            kind,
            from: capture(&FROM_RE, &entry.description),
            to: capture(&TO_RE, &entry.description),
            shares,
            price_per_share,
            total_price,
        }
    }
}

fn round_percent(part: u64, whole: u64) -> u32 {
    ((part as f64 / whole as f64) * 100.0).round() as u32
}

fn mentions_equity(description: &str) -> bool {
    let lowered = description.to_lowercase();
    EQUITY_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

/// Keyword fallback for journal entries without a stored kind. Precedence
/// mirrors the dialog's labels: gåva and arv before the generic transfer
/// words, split next, new issue as the default.
fn classify_description(description: &str) -> TransactionKind {
    let lowered = description.to_lowercase();
    if lowered.contains("gåva") {
        TransactionKind::Gift
    } else if lowered.contains("arv") {
        TransactionKind::Inheritance
    } else if lowered.contains("split") {
        TransactionKind::Split
    } else if lowered.contains("köp") || lowered.contains("överlåtelse") {
        TransactionKind::Purchase
    } else {
        TransactionKind::NewIssue
    }
}

fn extract_share_count(description: &str) -> u64 {
    SHARE_COUNT_RE
        .captures(description)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

fn capture(re: &Regex, description: &str) -> Option<String> {
    re.captures(description)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::register::{
        ShareRegister, Shareholder, Verification, VerificationRow, ACCOUNT_BANK,
        ACCOUNT_SHARE_CAPITAL,
    };

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    fn register_600_300_100() -> ShareRegister {
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
            300,
            ShareClass::B,
            601,
            900,
        ));
        register.add_shareholder(Shareholder::new(
            "Carin Ceder",
            "19900909-9012",
            100,
            ShareClass::B,
            901,
            1000,
        ));
        register
    }

    #[test]
    fn ownership_and_votes_for_single_class_register() {
        let views = ViewService::shareholder_views(&register_600_300_100());
        let ownership: Vec<u32> = views.iter().map(|view| view.ownership_percent).collect();
        let votes: Vec<u32> = views.iter().map(|view| view.vote_percent).collect();
        assert_eq!(ownership, vec![60, 30, 10]);
        assert_eq!(votes, vec![60, 30, 10]);
    }

    #[test]
    fn empty_register_produces_no_views_and_no_panic() {
        let register = ShareRegister::new("Nystartat AB", "556111-1111", 25_000.0);
        assert!(ViewService::shareholder_views(&register).is_empty());
    }

    #[test]
    fn stored_kind_wins_over_description_keywords() {
        let mut register = register_600_300_100();
        // Description says gåva, stored kind says purchase; the stored
        // kind must win.
        register.add_verification(Verification::new(
            date(),
            "Överlåtelse (gåva): 10 aktier från Anna Alm till Bertil Berg",
            Some(TransactionKind::Purchase),
            Vec::new(),
        ));
        let views = ViewService::transaction_views(&register);
        assert_eq!(views.len(), 1);
        assert_eq!(views[0].kind, TransactionKind::Purchase);
    }

    #[test]
    fn keyword_fallback_classifies_unmarked_entries() {
        let mut register = register_600_300_100();
        register.add_verification(Verification::new(
            date(),
            "Gåva: 10 aktier från Anna Alm till Bertil Berg",
            None,
            Vec::new(),
        ));
        register.add_verification(Verification::new(
            date(),
            "Nyemission: 100 B-aktier till Carin Ceder à 50 kr",
            None,
            vec![
                VerificationRow::debit(ACCOUNT_BANK, "Inbetalning nyemission", 5000.0),
                VerificationRow::credit(ACCOUNT_SHARE_CAPITAL, "Aktiekapital", 1000.0),
            ],
        ));
        register.add_verification(Verification::new(
            date(),
            "Hyra kontorslokal mars",
            None,
            vec![VerificationRow::credit(ACCOUNT_BANK, "Hyra", 9000.0)],
        ));

        let views = ViewService::transaction_views(&register);
        assert_eq!(views.len(), 2, "non-equity entries are filtered out");
        assert_eq!(views[0].kind, TransactionKind::Gift);
        assert_eq!(views[1].kind, TransactionKind::NewIssue);
    }

    #[test]
    fn counterparties_and_price_are_extracted_from_description() {
        let mut register = register_600_300_100();
        register.add_verification(Verification::new(
            date(),
            "Nyemission: 100 B-aktier till Carin Ceder à 50 kr",
            Some(TransactionKind::NewIssue),
            vec![
                VerificationRow::debit(ACCOUNT_BANK, "Inbetalning nyemission", 5000.0),
                VerificationRow::credit(ACCOUNT_SHARE_CAPITAL, "Aktiekapital", 1000.0),
            ],
        ));
        register.add_verification(Verification::new(
            date(),
            "Överlåtelse (köp): 200 aktier från Anna Alm till Bertil Berg",
            Some(TransactionKind::Purchase),
            Vec::new(),
        ));

        let views = ViewService::transaction_views(&register);
        assert_eq!(views[0].to.as_deref(), Some("Carin Ceder"));
        assert_eq!(views[0].from, None);
        assert_eq!(views[0].shares, 100);
        assert_eq!(views[0].price_per_share, 50.0);
        assert_eq!(views[0].total_price, 5000.0);

        assert_eq!(views[1].from.as_deref(), Some("Anna Alm"));
        assert_eq!(views[1].to.as_deref(), Some("Bertil Berg"));
        assert_eq!(views[1].shares, 200);
        assert_eq!(views[1].price_per_share, 0.0);
    }
}
