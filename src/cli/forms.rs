//! Interactive transaction entry, one dialoguer step per dialog field.

use chrono::NaiveDate;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};

use crate::cli::core::CommandError;
use crate::core::services::TransactionRequest;
use crate::register::{ShareClass, ShareRegister, TransactionKind};
use crate::utils::format_amount;

/// Runs the transaction wizard. Returns `None` when the user backs out.
/// The prompts enforce field-level constraints only; the transaction
/// service has the final word.
pub fn run_transaction_wizard(
    register: &ShareRegister,
    today: NaiveDate,
    theme: &ColorfulTheme,
) -> Result<Option<TransactionRequest>, CommandError> {
    let kinds = TransactionKind::all();
    let labels: Vec<&str> = kinds.iter().map(|kind| kind.label()).collect();
    let selected = Select::with_theme(theme)
        .with_prompt("Transaktionstyp")
        .items(&labels)
        .default(0)
        .interact_opt()?;
    let kind = match selected {
        Some(index) => kinds[index],
        None => return Ok(None),
    };

    let date = prompt_date(theme, today)?;

    let request = match kind {
        TransactionKind::Split => {
            let factor: u32 = Input::with_theme(theme)
                .with_prompt("Splitfaktor")
                .validate_with(|factor: &u32| {
                    if *factor >= 2 {
                        Ok(())
                    } else {
                        Err("Splitfaktorn måste vara minst 2")
                    }
                })
                .interact_text()?;
            TransactionRequest {
                kind,
                date,
                to_name: None,
                to_id_number: None,
                from_name: None,
                shares: 0,
                share_class: ShareClass::B,
                price_per_share: None,
                split_factor: Some(factor),
            }
        }
        _ => {
            let from_name = if kind.is_transfer() {
                match prompt_sender(register, theme)? {
                    Some(name) => Some(name),
                    None => return Ok(None),
                }
            } else {
                None
            };

            let to_name: String = Input::with_theme(theme)
                .with_prompt("Mottagarens namn")
                .validate_with(|name: &String| {
                    if name.trim().is_empty() {
                        Err("Namnet får inte vara tomt")
                    } else {
                        Ok(())
                    }
                })
                .interact_text()?;

            // Only a recipient the register has never seen needs an
            // id-number.
            let to_id_number = if register.shareholder_by_name(&to_name).is_none() {
                let id: String = Input::with_theme(theme)
                    .with_prompt("Person-/organisationsnummer")
                    .validate_with(|id: &String| {
                        if id.trim().is_empty() {
                            Err("Numret krävs för en ny aktieägare")
                        } else {
                            Ok(())
                        }
                    })
                    .interact_text()?;
                Some(id.trim().to_string())
            } else {
                None
            };

            let shares: u64 = Input::with_theme(theme)
                .with_prompt("Antal aktier")
                .validate_with(|shares: &u64| {
                    if *shares > 0 {
                        Ok(())
                    } else {
                        Err("Antalet måste vara större än noll")
                    }
                })
                .interact_text()?;

            let share_class = prompt_share_class(theme)?;
            let price_per_share = prompt_price(kind, theme)?;

            TransactionRequest {
                kind,
                date,
                to_name: Some(to_name.trim().to_string()),
                to_id_number,
                from_name,
                shares,
                share_class,
                price_per_share,
                split_factor: None,
            }
        }
    };

    if confirm(&request, theme)? {
        Ok(Some(request))
    } else {
        Ok(None)
    }
}

fn prompt_date(theme: &ColorfulTheme, today: NaiveDate) -> Result<NaiveDate, CommandError> {
    let raw: String = Input::with_theme(theme)
        .with_prompt("Datum (ÅÅÅÅ-MM-DD)")
        .default(today.to_string())
        .validate_with(|value: &String| {
            NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
                .map(|_| ())
                .map_err(|_| "Använd formatet ÅÅÅÅ-MM-DD")
        })
        .interact_text()?;
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| CommandError::Input("Ogiltigt datum".into()))
}

fn prompt_sender(
    register: &ShareRegister,
    theme: &ColorfulTheme,
) -> Result<Option<String>, CommandError> {
    if register.shareholders.is_empty() {
        return Err(CommandError::Input(
            "Aktieboken saknar aktieägare att överlåta från".into(),
        ));
    }
    let names: Vec<String> = register
        .shareholders
        .iter()
        .map(|holder| format!("{} ({} aktier)", holder.name, holder.shares))
        .collect();
    let selected = Select::with_theme(theme)
        .with_prompt("Överlåtare")
        .items(&names)
        .default(0)
        .interact_opt()?;
    Ok(selected.map(|index| register.shareholders[index].name.clone()))
}

fn prompt_share_class(theme: &ColorfulTheme) -> Result<ShareClass, CommandError> {
    let selected = Select::with_theme(theme)
        .with_prompt("Aktieslag")
        .items(&["A (10 röster per aktie)", "B (1 röst per aktie)"])
        .default(1)
        .interact_opt()?;
    Ok(match selected {
        Some(0) => ShareClass::A,
        _ => ShareClass::B,
    })
}

fn prompt_price(
    kind: TransactionKind,
    theme: &ColorfulTheme,
) -> Result<Option<f64>, CommandError> {
    match kind {
        TransactionKind::NewIssue => {
            let price: f64 = Input::with_theme(theme)
                .with_prompt("Pris per aktie (kr)")
                .validate_with(|price: &f64| {
                    if *price > 0.0 {
                        Ok(())
                    } else {
                        Err("Priset måste vara större än noll")
                    }
                })
                .interact_text()?;
            Ok(Some(price))
        }
        TransactionKind::Purchase => {
            // A purchase price is collected but transfers book no rows, so
            // it never reaches the ledger.
            let raw: String = Input::with_theme(theme)
                .with_prompt("Pris per aktie (kr, valfritt)")
                .allow_empty(true)
                .interact_text()?;
            Ok(raw.trim().parse::<f64>().ok().filter(|price| *price > 0.0))
        }
        _ => Ok(None),
    }
}

fn confirm(request: &TransactionRequest, theme: &ColorfulTheme) -> Result<bool, CommandError> {
    let mut lines = vec![format!("Typ: {}", request.kind)];
    lines.push(format!("Datum: {}", request.date));
    if let Some(factor) = request.split_factor {
        lines.push(format!("Faktor: {}:1", factor));
    }
    if let Some(from) = &request.from_name {
        lines.push(format!("Från: {}", from));
    }
    if let Some(to) = &request.to_name {
        lines.push(format!("Till: {}", to));
    }
    if request.shares > 0 {
        lines.push(format!(
            "Antal: {} {}-aktier",
            request.shares,
            request.share_class.label()
        ));
    }
    if let Some(price) = request.price_per_share {
        lines.push(format!("Pris: {} kr/aktie", format_amount(price)));
    }
    for line in &lines {
        println!("  {}", line);
    }
    Ok(Confirm::with_theme(theme)
        .with_prompt("Bokför transaktionen?")
        .default(true)
        .interact()?)
}
