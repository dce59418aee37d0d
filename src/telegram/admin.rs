//! Operator command parsing and execution.
//!
//! Slash commands from the single admin chat manage the ledger's wallet,
//! code, and settings tables. Messages from any other chat are never
//! treated as commands.

use teloxide::types::ChatId;
use tracing::{error, warn};

use crate::auth::is_national_id;
use crate::domain::Network;
use crate::ledger::Ledger;

/// Supported operator commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    SetWallet { network: Network, address: String },
    AddCode { code: String, national_id: String },
    DelCode { code: String },
    Notify { enabled: bool },
    Interval { minutes: u64 },
    Help,
}

/// Parse error for operator command messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminParseError {
    NotACommand,
    UnknownCommand(String),
    MissingArgument(&'static str),
    InvalidNetwork(String),
    InvalidNationalId(String),
    InvalidToggle(String),
    InvalidNumber(String),
}

impl std::fmt::Display for AdminParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotACommand => write!(f, "message is not a command"),
            Self::UnknownCommand(cmd) => write!(f, "unknown command `{cmd}`"),
            Self::MissingArgument(name) => write!(f, "missing argument `{name}`"),
            Self::InvalidNetwork(value) => write!(
                f,
                "invalid network `{value}` (use: ERC20, TRC20, BEP20, Solana)"
            ),
            Self::InvalidNationalId(value) => {
                write!(f, "invalid national id `{value}` (must be 10 digits)")
            }
            Self::InvalidToggle(value) => write!(f, "invalid toggle `{value}` (use: on, off)"),
            Self::InvalidNumber(value) => write!(f, "invalid number `{value}`"),
        }
    }
}

impl std::error::Error for AdminParseError {}

/// Parse an admin-chat message into an operator command.
pub fn parse_admin_command(text: &str) -> Result<AdminCommand, AdminParseError> {
    let mut parts = text.split_whitespace();
    let Some(raw_command) = parts.next() else {
        return Err(AdminParseError::NotACommand);
    };
    if !raw_command.starts_with('/') {
        return Err(AdminParseError::NotACommand);
    }

    let command = raw_command
        .split_once('@')
        .map_or(raw_command, |(head, _)| head);

    match command {
        "/help" | "/start" => Ok(AdminCommand::Help),
        "/setwallet" => {
            let raw_network = parts
                .next()
                .ok_or(AdminParseError::MissingArgument("network"))?;
            let address = parts
                .next()
                .ok_or(AdminParseError::MissingArgument("address"))?;

            let network = Network::from_label(raw_network)
                .ok_or_else(|| AdminParseError::InvalidNetwork(raw_network.to_string()))?;

            Ok(AdminCommand::SetWallet {
                network,
                address: address.to_string(),
            })
        }
        "/addcode" => {
            let code = parts.next().ok_or(AdminParseError::MissingArgument("code"))?;
            let national_id = parts
                .next()
                .ok_or(AdminParseError::MissingArgument("national_id"))?;

            if !is_national_id(national_id) {
                return Err(AdminParseError::InvalidNationalId(national_id.to_string()));
            }

            Ok(AdminCommand::AddCode {
                code: code.to_string(),
                national_id: national_id.to_string(),
            })
        }
        "/delcode" => {
            let code = parts.next().ok_or(AdminParseError::MissingArgument("code"))?;
            Ok(AdminCommand::DelCode {
                code: code.to_string(),
            })
        }
        "/notify" => {
            let raw = parts.next().ok_or(AdminParseError::MissingArgument("on|off"))?;
            match raw {
                "on" => Ok(AdminCommand::Notify { enabled: true }),
                "off" => Ok(AdminCommand::Notify { enabled: false }),
                other => Err(AdminParseError::InvalidToggle(other.to_string())),
            }
        }
        "/interval" => {
            let raw = parts
                .next()
                .ok_or(AdminParseError::MissingArgument("minutes"))?;
            let minutes: u64 = raw
                .parse()
                .map_err(|_| AdminParseError::InvalidNumber(raw.to_string()))?;
            if minutes == 0 {
                return Err(AdminParseError::InvalidNumber(raw.to_string()));
            }
            Ok(AdminCommand::Interval { minutes })
        }
        other => Err(AdminParseError::UnknownCommand(other.to_string())),
    }
}

/// Help text returned by `/help`.
pub const fn admin_help() -> &'static str {
    "📋 Operator commands\n\n\
    /setwallet <network> <address> - set a deposit address\n\
    /addcode <code> <national_id> - provision a subscribe code\n\
    /delcode <code> - remove a subscribe code\n\
    /notify on|off - toggle order notifications\n\
    /interval <minutes> - set the channel broadcast interval\n\n\
    Networks: ERC20, TRC20, BEP20, Solana"
}

/// Process a message and return a response if it is an operator command.
///
/// Returns `None` for messages from non-admin chats and for admin-chat
/// messages that are not commands; both fall through to the conversation
/// engine.
pub fn admin_response_for_message(
    text: &str,
    incoming_chat: ChatId,
    admin_chat: ChatId,
    ledger: &Ledger,
) -> Option<String> {
    if incoming_chat != admin_chat {
        if text.trim_start().starts_with('/') && text.trim() != "/start" {
            warn!(
                chat_id = incoming_chat.0,
                "ignoring command from non-admin chat"
            );
        }
        return None;
    }

    match parse_admin_command(text) {
        Ok(command) => Some(execute(command, ledger)),
        Err(AdminParseError::NotACommand) => None,
        Err(err) => Some(format!("Invalid command: {err}\n\n{}", admin_help())),
    }
}

fn execute(command: AdminCommand, ledger: &Ledger) -> String {
    let result = match command {
        AdminCommand::Help => return admin_help().to_string(),
        AdminCommand::SetWallet { network, address } => ledger
            .set_wallet(network, &address)
            .map(|()| format!("✅ {network} deposit address updated.")),
        AdminCommand::AddCode { code, national_id } => ledger
            .upsert_code(&code, &national_id, true)
            .map(|()| format!("✅ Code `{code}` provisioned.")),
        AdminCommand::DelCode { code } => ledger.remove_code(&code).map(|existed| {
            if existed {
                format!("✅ Code `{code}` removed.")
            } else {
                format!("Code `{code}` was not found.")
            }
        }),
        AdminCommand::Notify { enabled } => ledger.set_order_notifications(enabled).map(|()| {
            if enabled {
                "✅ Order notifications on.".to_string()
            } else {
                "✅ Order notifications off.".to_string()
            }
        }),
        AdminCommand::Interval { minutes } => ledger
            .set_channel_interval(minutes)
            .map(|()| format!("✅ Broadcast interval set to {minutes} minutes.")),
    };

    result.unwrap_or_else(|e| {
        error!(error = %e, "operator command failed");
        format!("⚠️ Ledger update failed: {e}")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn temp_ledger() -> (Arc<Ledger>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        (Arc::new(Ledger::open(dir.path()).unwrap()), dir)
    }

    // -------------------------------------------------------------------------
    // Parsing
    // -------------------------------------------------------------------------

    #[test]
    fn parse_setwallet() {
        assert_eq!(
            parse_admin_command("/setwallet TRC20 TDepositAddr").unwrap(),
            AdminCommand::SetWallet {
                network: Network::Trc20,
                address: "TDepositAddr".into(),
            }
        );
    }

    #[test]
    fn parse_setwallet_rejects_unknown_network() {
        assert!(matches!(
            parse_admin_command("/setwallet DOGE addr"),
            Err(AdminParseError::InvalidNetwork(_))
        ));
    }

    #[test]
    fn parse_addcode_requires_a_valid_national_id() {
        assert_eq!(
            parse_admin_command("/addcode GOLD1 1234567890").unwrap(),
            AdminCommand::AddCode {
                code: "GOLD1".into(),
                national_id: "1234567890".into(),
            }
        );
        assert!(matches!(
            parse_admin_command("/addcode GOLD1 123"),
            Err(AdminParseError::InvalidNationalId(_))
        ));
    }

    #[test]
    fn parse_notify_toggle() {
        assert_eq!(
            parse_admin_command("/notify on").unwrap(),
            AdminCommand::Notify { enabled: true }
        );
        assert_eq!(
            parse_admin_command("/notify off").unwrap(),
            AdminCommand::Notify { enabled: false }
        );
        assert!(matches!(
            parse_admin_command("/notify maybe"),
            Err(AdminParseError::InvalidToggle(_))
        ));
    }

    #[test]
    fn parse_interval_rejects_zero() {
        assert_eq!(
            parse_admin_command("/interval 15").unwrap(),
            AdminCommand::Interval { minutes: 15 }
        );
        assert!(matches!(
            parse_admin_command("/interval 0"),
            Err(AdminParseError::InvalidNumber(_))
        ));
        assert!(matches!(
            parse_admin_command("/interval soon"),
            Err(AdminParseError::InvalidNumber(_))
        ));
    }

    #[test]
    fn parse_with_bot_mention() {
        assert_eq!(
            parse_admin_command("/notify@desk_bot on").unwrap(),
            AdminCommand::Notify { enabled: true }
        );
    }

    #[test]
    fn parse_missing_arguments() {
        assert!(matches!(
            parse_admin_command("/setwallet"),
            Err(AdminParseError::MissingArgument("network"))
        ));
        assert!(matches!(
            parse_admin_command("/setwallet TRC20"),
            Err(AdminParseError::MissingArgument("address"))
        ));
    }

    #[test]
    fn parse_non_commands() {
        assert!(matches!(
            parse_admin_command("hello"),
            Err(AdminParseError::NotACommand)
        ));
        assert!(matches!(
            parse_admin_command("/frobnicate"),
            Err(AdminParseError::UnknownCommand(_))
        ));
    }

    // -------------------------------------------------------------------------
    // Authorization and execution
    // -------------------------------------------------------------------------

    #[test]
    fn commands_from_other_chats_are_ignored() {
        let (ledger, _dir) = temp_ledger();

        let response =
            admin_response_for_message("/notify off", ChatId(7), ChatId(42), &ledger);

        assert!(response.is_none());
        assert!(ledger.settings().order_notifications);
    }

    #[test]
    fn plain_text_in_the_admin_chat_falls_through() {
        let (ledger, _dir) = temp_ledger();

        let response = admin_response_for_message("2000000", ChatId(42), ChatId(42), &ledger);

        assert!(response.is_none());
    }

    #[test]
    fn setwallet_updates_the_ledger() {
        let (ledger, _dir) = temp_ledger();

        let response =
            admin_response_for_message("/setwallet BEP20 0xDeposit", ChatId(42), ChatId(42), &ledger)
                .unwrap();

        assert!(response.contains("updated"));
        assert_eq!(ledger.wallet(Network::Bep20).as_deref(), Some("0xDeposit"));
    }

    #[test]
    fn addcode_and_delcode_manage_the_code_table() {
        let (ledger, _dir) = temp_ledger();

        admin_response_for_message("/addcode GOLD1 1234567890", ChatId(42), ChatId(42), &ledger)
            .unwrap();
        assert!(ledger.lookup_code("GOLD1").unwrap().active);

        let removed =
            admin_response_for_message("/delcode GOLD1", ChatId(42), ChatId(42), &ledger).unwrap();
        assert!(removed.contains("removed"));
        assert!(ledger.lookup_code("GOLD1").is_none());

        let missing =
            admin_response_for_message("/delcode GOLD1", ChatId(42), ChatId(42), &ledger).unwrap();
        assert!(missing.contains("not found"));
    }

    #[test]
    fn invalid_command_includes_help() {
        let (ledger, _dir) = temp_ledger();

        let response =
            admin_response_for_message("/setwallet DOGE x", ChatId(42), ChatId(42), &ledger)
                .unwrap();

        assert!(response.contains("Invalid command"));
        assert!(response.contains("/setwallet"));
    }
}
