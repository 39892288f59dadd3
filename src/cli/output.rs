use colored::Colorize;
use std::fmt;

/// Message categories used by the CLI output helpers. Success and error
/// mirror the toast surface of the register UI: a short title plus an
/// optional body.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
}

fn label(kind: MessageKind) -> &'static str {
    match kind {
        MessageKind::Info => "INFO",
        MessageKind::Success => "OK",
        MessageKind::Warning => "VARNING",
        MessageKind::Error => "FEL",
    }
}

fn styled(kind: MessageKind, text: String) -> String {
    match kind {
        MessageKind::Success => text.bright_green().to_string(),
        MessageKind::Warning => text.bright_yellow().to_string(),
        MessageKind::Error => text.bright_red().to_string(),
        MessageKind::Info => text,
    }
}

pub fn toast(kind: MessageKind, title: &str, body: &str) {
    let line = if body.is_empty() {
        format!("{}: {}", label(kind), title)
    } else {
        format!("{}: {}: {}", label(kind), title, body)
    };
    println!("{}", styled(kind, line));
}

pub fn success(title: &str, body: &str) {
    toast(MessageKind::Success, title, body);
}

pub fn error(title: &str, body: &str) {
    toast(MessageKind::Error, title, body);
}

pub fn warning(message: impl fmt::Display) {
    toast(MessageKind::Warning, &message.to_string(), "");
}

pub fn info(message: impl fmt::Display) {
    toast(MessageKind::Info, &message.to_string(), "");
}

pub fn blank_line() {
    println!();
}
