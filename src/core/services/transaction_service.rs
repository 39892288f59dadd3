//! Validation and execution of share-register transactions.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::core::services::{ServiceError, ServiceResult};
use crate::errors::RegisterError;
use crate::register::{
    ShareClass, ShareRegister, Shareholder, TransactionKind, Verification, VerificationRow,
    ACCOUNT_BANK, ACCOUNT_SHARE_CAPITAL, ACCOUNT_SHARE_PREMIUM,
};
use crate::utils::format_amount;

/// Collected dialog input for one transaction, validated on execution.
#[derive(Debug, Clone)]
pub struct TransactionRequest {
    pub kind: TransactionKind,
    pub date: NaiveDate,
    pub to_name: Option<String>,
    /// Required when the recipient is not yet in the register.
    pub to_id_number: Option<String>,
    pub from_name: Option<String>,
    pub shares: u64,
    pub share_class: ShareClass,
    pub price_per_share: Option<f64>,
    pub split_factor: Option<u32>,
}

/// Executes transactions against the register, all-or-nothing: every
/// validation runs before the first field is mutated, so a rejected
/// request leaves both the registry and the journal untouched.
pub struct TransactionService;

impl TransactionService {
    pub fn execute(
        register: &mut ShareRegister,
        request: &TransactionRequest,
    ) -> ServiceResult<Uuid> {
        match request.kind {
            TransactionKind::NewIssue => Self::apply_new_issue(register, request),
            TransactionKind::Purchase | TransactionKind::Gift | TransactionKind::Inheritance => {
                Self::apply_transfer(register, request)
            }
            TransactionKind::Split => Self::apply_split(register, request),
        }
    }

    fn apply_new_issue(
        register: &mut ShareRegister,
        request: &TransactionRequest,
    ) -> ServiceResult<Uuid> {
        let to = required_name(request.to_name.as_deref(), "Mottagarens namn saknas")?;
        let shares = required_shares(request.shares)?;
        let price = request
            .price_per_share
            .filter(|price| *price > 0.0)
            .ok_or_else(|| ServiceError::Invalid("Pris per aktie krävs för nyemission".into()))?;
        ensure_recipient_creatable(register, &to, request.to_id_number.as_deref())?;

        let quota = register.quota_value();
        let total = price * shares as f64;
        let capital = quota * shares as f64;
        let mut rows = vec![
            VerificationRow::debit(ACCOUNT_BANK, "Inbetalning nyemission", total),
            VerificationRow::credit(ACCOUNT_SHARE_CAPITAL, "Aktiekapital", capital),
        ];
        // Anything paid above the quota value goes to the premium fund.
        if total > capital {
            rows.push(VerificationRow::credit(
                ACCOUNT_SHARE_PREMIUM,
                "Överkursfond",
                total - capital,
            ));
        }

        credit_shares(register, &to, request, RangeAssignment::Extend)?;

        let description = format!(
            "Nyemission: {} {}-aktier till {} à {} kr",
            shares,
            request.share_class.label(),
            to,
            format_amount(price)
        );
        let id = register.add_verification(Verification::new(
            request.date,
            description,
            Some(TransactionKind::NewIssue),
            rows,
        ));
        tracing::info!(shares, to = %to, "nyemission recorded");
        Ok(id)
    }

    fn apply_transfer(
        register: &mut ShareRegister,
        request: &TransactionRequest,
    ) -> ServiceResult<Uuid> {
        let to = required_name(request.to_name.as_deref(), "Mottagarens namn saknas")?;
        let from = required_name(request.from_name.as_deref(), "Överlåtarens namn saknas")?;
        let shares = required_shares(request.shares)?;

        let holder = register
            .shareholder_by_name(&from)
            .ok_or_else(|| ServiceError::Register(RegisterError::ShareholderNotFound(from.clone())))?;
        if holder.shares < shares {
            return Err(ServiceError::Invalid(format!(
                "{} äger endast {} aktier",
                holder.name, holder.shares
            )));
        }
        ensure_recipient_creatable(register, &to, request.to_id_number.as_deref())?;

        if let Some(sender) = register.shareholder_by_name_mut(&from) {
            sender.shares -= shares;
        }
        credit_shares(register, &to, request, RangeAssignment::KeepExisting)?;

        let description = format!(
            "Överlåtelse ({}): {} aktier från {} till {}",
            request.kind.label().to_lowercase(),
            shares,
            from,
            to
        );
        // Transfers have no P&L or balance-sheet impact; the journal entry
        // carries no rows.
        let id = register.add_verification(Verification::new(
            request.date,
            description,
            Some(request.kind),
            Vec::new(),
        ));
        tracing::info!(shares, from = %from, to = %to, kind = %request.kind, "transfer recorded");
        Ok(id)
    }

    fn apply_split(
        register: &mut ShareRegister,
        request: &TransactionRequest,
    ) -> ServiceResult<Uuid> {
        let factor = request
            .split_factor
            .filter(|factor| *factor >= 2)
            .ok_or_else(|| ServiceError::Invalid("Splitfaktor måste vara minst 2".into()))?;
        if register.shareholders.is_empty() {
            return Err(ServiceError::Invalid("Aktieboken saknar aktieägare".into()));
        }

        let before = register.total_shares();
        // Renumber every holding sequentially from 1, in register order.
        let mut next = 1u64;
        for holder in &mut register.shareholders {
            holder.shares *= factor as u64;
            holder.share_number_from = next;
            holder.share_number_to = next + holder.shares - 1;
            next = holder.share_number_to + 1;
        }
        let after = register.total_shares();

        let description = format!("Aktiesplit {}:1, {} aktier blir {} aktier", factor, before, after);
        let id = register.add_verification(Verification::new(
            request.date,
            description,
            Some(TransactionKind::Split),
            Vec::new(),
        ));
        tracing::info!(factor, before, after, "split recorded");
        Ok(id)
    }

}

#[derive(Clone, Copy)]
enum RangeAssignment {
    /// New issues mint fresh share numbers for existing holders too.
    Extend,
    /// Transfers move existing shares; an existing recipient keeps its
    /// recorded range.
    KeepExisting,
}

/// Creating a recipient requires an id-number; verified before any
/// mutation so a failing request cannot leave the sender debited.
fn ensure_recipient_creatable(
    register: &ShareRegister,
    name: &str,
    id_number: Option<&str>,
) -> ServiceResult<()> {
    if register.shareholder_by_name(name).is_some() {
        return Ok(());
    }
    match id_number.map(str::trim) {
        Some(id) if !id.is_empty() => Ok(()),
        _ => Err(ServiceError::Invalid(
            "Personnummer eller organisationsnummer krävs för ny aktieägare".into(),
        )),
    }
}

fn credit_shares(
    register: &mut ShareRegister,
    name: &str,
    request: &TransactionRequest,
    assignment: RangeAssignment,
) -> ServiceResult<()> {
    let next = register.next_share_number();
    let shares = request.shares;
    if let Some(existing) = register.shareholder_by_name_mut(name) {
        existing.shares += shares;
        if let RangeAssignment::Extend = assignment {
            existing.share_number_to = next + shares - 1;
        }
    } else {
        let id_number = match request.to_id_number.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => {
                return Err(ServiceError::Invalid(
                    "Personnummer eller organisationsnummer krävs för ny aktieägare".into(),
                ))
            }
        };
        register.add_shareholder(Shareholder::new(
            name,
            id_number,
            shares,
            request.share_class,
            next,
            next + shares - 1,
        ));
    }
    register.touch();
    Ok(())
}

fn required_name(value: Option<&str>, message: &str) -> ServiceResult<String> {
    match value.map(str::trim) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => Err(ServiceError::Invalid(message.into())),
    }
}

fn required_shares(shares: u64) -> ServiceResult<u64> {
    if shares == 0 {
        return Err(ServiceError::Invalid(
            "Antal aktier måste vara större än noll".into(),
        ));
    }
    Ok(shares)
}
