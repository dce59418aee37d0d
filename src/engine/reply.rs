//! Engine output: reply texts plus fixed keyboard variants.
//!
//! The engine only selects which keyboard to show; rendering it into
//! transport types is the adapter's job.

use crate::domain::Network;

use super::intent::labels;

/// Fixed keyboard layouts, one per prompt family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyboard {
    /// Price / buy / sell, shown whenever the user is idle.
    MainMenu,
    /// Confirm or cancel an order preview.
    ConfirmCancel,
    /// The four network buttons plus cancel.
    Networks,
    /// Skip or cancel, for optional banking fields.
    SkipCancel,
    /// Cancel only, for required free-text fields.
    CancelOnly,
    /// No keyboard change.
    None,
}

impl Keyboard {
    /// Button rows for this layout, or `None` when no keyboard is attached.
    pub fn rows(self) -> Option<Vec<Vec<&'static str>>> {
        match self {
            Keyboard::MainMenu => Some(vec![
                vec![labels::PRICE],
                vec![labels::BUY, labels::SELL],
            ]),
            Keyboard::ConfirmCancel => Some(vec![vec![labels::CONFIRM, labels::CANCEL]]),
            Keyboard::Networks => {
                let mut rows: Vec<Vec<&'static str>> = Network::ALL
                    .chunks(2)
                    .map(|pair| pair.iter().map(|n| n.label()).collect())
                    .collect();
                rows.push(vec![labels::CANCEL]);
                Some(rows)
            }
            Keyboard::SkipCancel => Some(vec![vec![labels::SKIP], vec![labels::CANCEL]]),
            Keyboard::CancelOnly => Some(vec![vec![labels::CANCEL]]),
            Keyboard::None => None,
        }
    }
}

/// One outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Keyboard,
}

impl Reply {
    pub fn new(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            text: text.into(),
            keyboard,
        }
    }
}

/// Everything one handled event produces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub replies: Vec<Reply>,
    /// Notification for the operator chat, produced when an order completes.
    /// Delivery is the adapter's concern and never feeds back into the flow.
    pub operator_note: Option<String>,
}

impl Response {
    pub fn single(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            replies: vec![Reply::new(text, keyboard)],
            operator_note: None,
        }
    }

    pub fn order(reply: Reply, operator_note: String) -> Self {
        Self {
            replies: vec![reply],
            operator_note: Some(operator_note),
        }
    }
}
