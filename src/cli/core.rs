//! Shell context, command dispatch, and user-facing error reporting.

use chrono::{NaiveDate, Utc};
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use strsim::levenshtein;

use crate::cli::{forms, output, tables};
use crate::config::{Config, ConfigManager};
use crate::core::services::{
    ServiceError, SummaryService, TransactionRequest, TransactionService, ViewService,
};
use crate::errors::RegisterError;
use crate::register::{ShareClass, ShareRegister, TransactionKind};
use crate::storage::{JsonStorage, StorageBackend};

/// Top-level CLI failure; anything that should abort the whole shell.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] RegisterError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Readline error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

/// Failure of a single command; reported and the shell keeps running.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error(transparent)]
    Core(#[from] RegisterError),
    #[error(transparent)]
    Service(#[from] ServiceError),
    #[error("{0}")]
    Input(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<dialoguer::Error> for CommandError {
    fn from(err: dialoguer::Error) -> Self {
        match err {
            dialoguer::Error::IO(err) => CommandError::Io(err),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

pub enum LoopControl {
    Continue,
    Exit,
}

const COMMANDS: [&str; 14] = [
    "exit",
    "help",
    "issue",
    "new",
    "new-register",
    "open",
    "owners",
    "quit",
    "registers",
    "save",
    "split",
    "stats",
    "transactions",
    "transfer",
];

pub struct ShellContext {
    mode: CliMode,
    theme: ColorfulTheme,
    storage: JsonStorage,
    config_manager: ConfigManager,
    config: Config,
    register: Option<ShareRegister>,
    register_name: Option<String>,
}

impl ShellContext {
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let storage = JsonStorage::new_default()?;
        let config_manager = ConfigManager::new()?;
        let config = config_manager.load()?;
        let mut context = Self {
            mode,
            theme: ColorfulTheme::default(),
            storage,
            config_manager,
            config,
            register: None,
            register_name: None,
        };
        context.reopen_last_register();
        Ok(context)
    }

    fn reopen_last_register(&mut self) {
        let last = match self.storage.last_register() {
            Ok(Some(name)) => name,
            _ => return,
        };
        if let Ok(register) = self.storage.load(&last) {
            output::info(format!("Öppnade aktiebok: {}", register.company_name));
            self.register = Some(register);
            self.register_name = Some(last);
        }
    }

    pub fn mode(&self) -> CliMode {
        self.mode
    }

    pub fn command_names(&self) -> Vec<String> {
        COMMANDS.iter().map(|name| name.to_string()).collect()
    }

    pub fn prompt(&self) -> String {
        match &self.register_name {
            Some(name) => format!("aktiebok({})> ", name),
            None => "aktiebok> ".into(),
        }
    }

    pub fn dispatch(&mut self, command: &str, args: &[&str]) -> Result<LoopControl, CommandError> {
        match command {
            "exit" | "quit" => return Ok(LoopControl::Exit),
            "help" => self.cmd_help(),
            "new-register" => self.cmd_new_register(args)?,
            "open" => self.cmd_open(args)?,
            "registers" => self.cmd_registers()?,
            "save" => self.cmd_save(args)?,
            "owners" => self.cmd_owners()?,
            "transactions" => self.cmd_transactions()?,
            "stats" => self.cmd_stats()?,
            "issue" => self.cmd_issue(args)?,
            "transfer" => self.cmd_transfer(args)?,
            "split" => self.cmd_split(args)?,
            "new" => self.cmd_new()?,
            unknown => {
                output::warning(format!("Okänt kommando `{}`.", unknown));
                if let Some(candidate) = self.suggestion_for(unknown) {
                    output::info(format!("Menade du `{}`? Skriv `help` för en lista.", candidate));
                }
            }
        }
        Ok(LoopControl::Continue)
    }

    fn suggestion_for(&self, command: &str) -> Option<String> {
        COMMANDS
            .iter()
            .map(|candidate| (candidate, levenshtein(command, candidate)))
            .filter(|(_, distance)| *distance <= 2)
            .min_by_key(|(_, distance)| *distance)
            .map(|(candidate, _)| candidate.to_string())
    }

    fn cmd_help(&self) {
        println!("Kommandon:");
        println!("  new-register <företag> <orgnr> <aktiekapital>   skapa en ny aktiebok");
        println!("  open <namn>                                     öppna en sparad aktiebok");
        println!("  registers                                       lista sparade aktieböcker");
        println!("  save [sökväg]                                   spara (eller exportera till fil)");
        println!("  owners                                          visa aktieägarna");
        println!("  transactions                                    visa transaktionshistoriken");
        println!("  stats                                           visa totaler och kvotvärde");
        println!("  issue <namn> <antal> <klass> <pris> [idnr] [datum]");
        println!("  transfer <köp|gåva|arv> <från> <till> <antal> [idnr] [datum]");
        println!("  split <faktor> [datum]");
        println!("  new                                             interaktiv transaktionsguide");
        println!("  exit                                            avsluta");
    }

    fn cmd_new_register(&mut self, args: &[&str]) -> Result<(), CommandError> {
        if args.len() < 3 {
            return Err(CommandError::Input(
                "Användning: new-register <företag> <orgnr> <aktiekapital>".into(),
            ));
        }
        let share_capital: f64 = args[2]
            .parse()
            .map_err(|_| CommandError::Input("Aktiekapitalet måste vara ett tal".into()))?;
        let register = ShareRegister::new(args[0], args[1], share_capital);
        self.storage.save(&register, args[0])?;
        self.storage.record_last_register(Some(args[0]))?;
        self.config.last_opened_register = Some(args[0].to_string());
        self.config_manager.save(&self.config)?;
        output::success(
            "Ny aktiebok skapad",
            &format!("{} ({})", register.company_name, register.org_number),
        );
        self.register = Some(register);
        self.register_name = Some(args[0].to_string());
        Ok(())
    }

    fn cmd_open(&mut self, args: &[&str]) -> Result<(), CommandError> {
        if args.is_empty() {
            return Err(CommandError::Input("Användning: open <namn>".into()));
        }
        let register = self.storage.load(args[0])?;
        self.storage.record_last_register(Some(args[0]))?;
        self.config.last_opened_register = Some(args[0].to_string());
        self.config_manager.save(&self.config)?;
        output::success("Aktiebok öppnad", &register.company_name);
        self.register = Some(register);
        self.register_name = Some(args[0].to_string());
        Ok(())
    }

    fn cmd_registers(&self) -> Result<(), CommandError> {
        let names = self.storage.list_registers()?;
        if names.is_empty() {
            output::info("Inga sparade aktieböcker.");
        } else {
            for name in names {
                println!("  {}", name);
            }
        }
        Ok(())
    }

    fn cmd_save(&mut self, args: &[&str]) -> Result<(), CommandError> {
        let name = self.current_name()?;
        let register = self.current_register()?;
        if let Some(path) = args.first() {
            self.storage
                .save_to_path(register, std::path::Path::new(path))?;
            output::success("Aktiebok exporterad", path);
        } else {
            self.storage.save(register, &name)?;
            output::success("Aktiebok sparad", &name);
        }
        Ok(())
    }

    fn cmd_owners(&self) -> Result<(), CommandError> {
        let register = self.current_register()?;
        println!(
            "Aktiebok för {} ({})",
            register.company_name, register.org_number
        );
        output::blank_line();
        let views = ViewService::shareholder_views(register);
        if views.is_empty() {
            output::info("Aktieboken saknar aktieägare.");
            return Ok(());
        }
        println!("{}", tables::shareholder_table(&views).render());
        output::blank_line();
        let stats = SummaryService::stats(register);
        println!("{}", tables::stats_line(&stats));
        Ok(())
    }

    fn cmd_transactions(&self) -> Result<(), CommandError> {
        let register = self.current_register()?;
        let views = ViewService::transaction_views(register);
        if views.is_empty() {
            output::info("Inga transaktioner registrerade.");
            return Ok(());
        }
        println!("{}", tables::transaction_table(&views).render());
        Ok(())
    }

    fn cmd_stats(&self) -> Result<(), CommandError> {
        let register = self.current_register()?;
        let stats = SummaryService::stats(register);
        println!("{}", tables::stats_line(&stats));
        println!(
            "Kvotvärde: {} kr",
            crate::utils::format_amount(register.quota_value())
        );
        Ok(())
    }

    fn cmd_issue(&mut self, args: &[&str]) -> Result<(), CommandError> {
        if args.len() < 4 {
            return Err(CommandError::Input(
                "Användning: issue <namn> <antal> <klass> <pris> [idnr] [datum]".into(),
            ));
        }
        let request = TransactionRequest {
            kind: TransactionKind::NewIssue,
            date: parse_date_arg(args.get(5))?,
            to_name: Some(args[0].to_string()),
            to_id_number: args.get(4).map(|id| id.to_string()),
            from_name: None,
            shares: parse_shares(args[1])?,
            share_class: parse_share_class(args[2])?,
            price_per_share: Some(parse_price(args[3])?),
            split_factor: None,
        };
        self.execute_and_persist(&request)
    }

    fn cmd_transfer(&mut self, args: &[&str]) -> Result<(), CommandError> {
        if args.len() < 4 {
            return Err(CommandError::Input(
                "Användning: transfer <köp|gåva|arv> <från> <till> <antal> [idnr] [datum]".into(),
            ));
        }
        let kind = parse_transfer_kind(args[0])?;
        let request = TransactionRequest {
            kind,
            date: parse_date_arg(args.get(5))?,
            to_name: Some(args[2].to_string()),
            to_id_number: args.get(4).map(|id| id.to_string()),
            from_name: Some(args[1].to_string()),
            shares: parse_shares(args[3])?,
            share_class: ShareClass::B,
            price_per_share: None,
            split_factor: None,
        };
        self.execute_and_persist(&request)
    }

    fn cmd_split(&mut self, args: &[&str]) -> Result<(), CommandError> {
        if args.is_empty() {
            return Err(CommandError::Input(
                "Användning: split <faktor> [datum]".into(),
            ));
        }
        let factor: u32 = args[0]
            .parse()
            .map_err(|_| CommandError::Input("Splitfaktorn måste vara ett heltal".into()))?;
        let request = TransactionRequest {
            kind: TransactionKind::Split,
            date: parse_date_arg(args.get(1))?,
            to_name: None,
            to_id_number: None,
            from_name: None,
            shares: 0,
            share_class: ShareClass::B,
            price_per_share: None,
            split_factor: Some(factor),
        };
        self.execute_and_persist(&request)
    }

    fn cmd_new(&mut self) -> Result<(), CommandError> {
        if self.mode == CliMode::Script {
            output::warning("Guiden är inte tillgänglig i skriptläge.");
            return Ok(());
        }
        let request = {
            let register = self.register.as_ref().ok_or_else(no_register_error)?;
            forms::run_transaction_wizard(register, today(), &self.theme)?
        };
        match request {
            Some(request) => self.execute_and_persist(&request),
            None => {
                output::info("Avbrutet.");
                Ok(())
            }
        }
    }

    /// Runs the transaction and persists the whole register with one
    /// atomic write, so the journal and the registry can never diverge
    /// on disk.
    fn execute_and_persist(&mut self, request: &TransactionRequest) -> Result<(), CommandError> {
        let name = self.current_name()?;
        let mut register = self.register.take().ok_or_else(no_register_error)?;
        let outcome = TransactionService::execute(&mut register, request);
        let persisted = match &outcome {
            Ok(_) => self.storage.save(&register, &name),
            Err(_) => Ok(()),
        };
        self.register = Some(register);
        outcome?;
        persisted?;
        output::success("Transaktionen bokförd", &describe(request));
        Ok(())
    }

    fn current_register(&self) -> Result<&ShareRegister, CommandError> {
        self.register.as_ref().ok_or_else(no_register_error)
    }

    fn current_name(&self) -> Result<String, CommandError> {
        self.register_name.clone().ok_or_else(no_register_error)
    }

    pub fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt("Avsluta?")
            .default(false)
            .interact()
            .unwrap_or(true))
    }

    pub fn report_error(&self, err: CommandError) {
        match err {
            CommandError::Service(ServiceError::Invalid(message)) => {
                output::error("Transaktionen avvisades", &message);
            }
            CommandError::Service(ServiceError::Register(RegisterError::ShareholderNotFound(
                name,
            ))) => {
                output::error("Aktieägaren hittades inte", &name);
            }
            CommandError::Input(message) => {
                output::error("Felaktig inmatning", &message);
            }
            other => {
                tracing::error!(error = %other, "command failed");
                output::error("Ett fel uppstod", &other.to_string());
            }
        }
    }
}

fn no_register_error() -> CommandError {
    CommandError::Input(
        "Ingen aktiebok är öppen. Skapa en med `new-register` eller öppna med `open`.".into(),
    )
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn describe(request: &TransactionRequest) -> String {
    match request.kind {
        TransactionKind::Split => format!(
            "Split {}:1",
            request.split_factor.unwrap_or_default()
        ),
        kind => format!(
            "{}, {} {}-aktier",
            kind.label(),
            request.shares,
            request.share_class.label()
        ),
    }
}

fn parse_date_arg(arg: Option<&&str>) -> Result<NaiveDate, CommandError> {
    match arg {
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| CommandError::Input("Datum anges som ÅÅÅÅ-MM-DD".into())),
        None => Ok(today()),
    }
}

fn parse_shares(raw: &str) -> Result<u64, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::Input("Antalet aktier måste vara ett heltal".into()))
}

fn parse_price(raw: &str) -> Result<f64, CommandError> {
    raw.parse()
        .map_err(|_| CommandError::Input("Priset måste vara ett tal".into()))
}

fn parse_share_class(raw: &str) -> Result<ShareClass, CommandError> {
    ShareClass::parse(raw)
        .ok_or_else(|| CommandError::Input("Aktieslaget är A eller B".into()))
}

fn parse_transfer_kind(raw: &str) -> Result<TransactionKind, CommandError> {
    match raw.to_lowercase().as_str() {
        "köp" | "kop" => Ok(TransactionKind::Purchase),
        "gåva" | "gava" => Ok(TransactionKind::Gift),
        "arv" => Ok(TransactionKind::Inheritance),
        _ => Err(CommandError::Input(
            "Överlåtelsetypen är köp, gåva eller arv".into(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_kinds_accept_ascii_fallbacks() {
        assert_eq!(
            parse_transfer_kind("Gåva").unwrap(),
            TransactionKind::Gift
        );
        assert_eq!(parse_transfer_kind("gava").unwrap(), TransactionKind::Gift);
        assert_eq!(parse_transfer_kind("kop").unwrap(), TransactionKind::Purchase);
        assert!(parse_transfer_kind("byte").is_err());
    }

    #[test]
    fn date_arg_defaults_to_today() {
        let parsed = parse_date_arg(None).unwrap();
        assert_eq!(parsed, today());
        let explicit = parse_date_arg(Some(&"2025-03-01")).unwrap();
        assert_eq!(explicit, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    }
}
