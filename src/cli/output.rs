use colored::Colorize;
use std::fmt;

use crate::ledger::NotificationKind;

/// Message categories used by the CLI output helpers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Warning,
    Error,
    Section,
}

impl From<NotificationKind> for MessageKind {
    fn from(kind: NotificationKind) -> Self {
        match kind {
            NotificationKind::Info => MessageKind::Info,
            NotificationKind::Success => MessageKind::Success,
            NotificationKind::Warning => MessageKind::Warning,
            NotificationKind::Error => MessageKind::Error,
        }
    }
}

fn build_label(kind: MessageKind) -> (&'static str, &'static str) {
    match kind {
        MessageKind::Info => ("INFO", "[i]"),
        MessageKind::Success => ("SUCCESS", "[+]"),
        MessageKind::Warning => ("WARNING", "[!]"),
        MessageKind::Error => ("ERROR", "[x]"),
        MessageKind::Section => ("", ""),
    }
}

fn apply_style(kind: MessageKind, message: impl fmt::Display) -> String {
    let text = message.to_string();
    let formatted = match kind {
        MessageKind::Section => format!("=== {} ===", text.trim()),
        _ => {
            let (label, icon) = build_label(kind);
            format!("{label}: {icon} {text}")
        }
    };

    tint(kind, formatted)
}

fn tint(kind: MessageKind, text: String) -> String {
    match kind {
        MessageKind::Success => text.bright_green().to_string(),
        MessageKind::Warning => text.bright_yellow().to_string(),
        MessageKind::Error => text.bright_red().to_string(),
        MessageKind::Section => text.bold().to_string(),
        MessageKind::Info => text,
    }
}

fn listing_line(kind: MessageKind, message: impl fmt::Display) -> String {
    format!("  {}", tint(kind, message.to_string()))
}

pub fn print(kind: MessageKind, message: impl fmt::Display) {
    let formatted = apply_style(kind, message);
    match kind {
        MessageKind::Section => println!("\n{}", formatted),
        _ => println!("{}", formatted),
    }
}

pub fn info(message: impl fmt::Display) {
    print(MessageKind::Info, message);
}

pub fn success(message: impl fmt::Display) {
    print(MessageKind::Success, message);
}

pub fn warning(message: impl fmt::Display) {
    print(MessageKind::Warning, message);
}

pub fn error(message: impl fmt::Display) {
    print(MessageKind::Error, message);
}

pub fn section(title: impl fmt::Display) {
    print(MessageKind::Section, title);
}

/// Plain, unlabelled line used for listings.
pub fn line(message: impl fmt::Display) {
    println!("  {}", message);
}

/// Listing line coloured like a message of the given kind, without the label.
pub fn tinted_line(kind: MessageKind, message: impl fmt::Display) {
    println!("{}", listing_line(kind, message));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_prefix_messages() {
        colored::control::set_override(false);
        assert_eq!(apply_style(MessageKind::Warning, "careful"), "WARNING: [!] careful");
        assert_eq!(apply_style(MessageKind::Section, " Budgets "), "=== Budgets ===");
    }

    #[test]
    fn notification_kinds_pick_matching_styles() {
        colored::control::set_override(false);
        assert_eq!(MessageKind::from(NotificationKind::Warning), MessageKind::Warning);
        assert_eq!(MessageKind::from(NotificationKind::Error), MessageKind::Error);
        assert_eq!(MessageKind::from(NotificationKind::Success), MessageKind::Success);
        assert_eq!(MessageKind::from(NotificationKind::Info), MessageKind::Info);
        assert_eq!(
            listing_line(NotificationKind::Warning.into(), "* over budget"),
            "  * over budget"
        );
    }
}
