//! Short-lived identity verification gating buy/sell entry.
//!
//! A user passes a two-step challenge (pre-provisioned subscribe code, then
//! the 10-digit national id bound to it) and stays authorized for fifteen
//! minutes. Records live only in memory and expire lazily: an expired
//! record is treated as absent and purged on the next [`AuthGate::authorize`]
//! read; there is no background sweep.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::domain::UserId;
use crate::ledger::Ledger;

/// How long one successful verification lasts.
fn validity() -> Duration {
    Duration::minutes(15)
}

/// One user's verification record. Written only on a full challenge match.
#[derive(Debug, Clone)]
pub struct AuthRecord {
    pub code: String,
    pub verified: bool,
    pub expires_at: DateTime<Utc>,
}

/// Verification gate backed by the ledger's subscribe-code table.
pub struct AuthGate {
    ledger: Arc<Ledger>,
    records: RwLock<HashMap<UserId, AuthRecord>>,
}

impl AuthGate {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self {
            ledger,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// True iff a verified, unexpired record exists for the user.
    ///
    /// An expired record is deleted here, on the read that notices it.
    pub fn authorize(&self, user: UserId) -> bool {
        let mut records = self.records.write();
        match records.get(&user) {
            Some(record) if record.verified && record.expires_at > Utc::now() => true,
            Some(_) => {
                debug!(user_id = user, "purging expired auth record");
                records.remove(&user);
                false
            }
            None => false,
        }
    }

    /// First challenge step: does the submitted code exist and is it active?
    pub fn code_is_active(&self, code: &str) -> bool {
        self.ledger
            .lookup_code(code)
            .map(|c| c.active)
            .unwrap_or(false)
    }

    /// Second challenge step: the national id must match the one bound to
    /// the code. Only a full match writes the record.
    pub fn submit_national_id(&self, user: UserId, code: &str, national_id: &str) -> bool {
        let Some(entry) = self.ledger.lookup_code(code) else {
            return false;
        };
        if !entry.active || entry.national_code != national_id {
            return false;
        }

        self.grant(user, code);
        true
    }

    /// Mark the user verified for the validity window.
    pub fn grant(&self, user: UserId, code: &str) {
        info!(user_id = user, "user verified");
        self.records.write().insert(
            user,
            AuthRecord {
                code: code.to_string(),
                verified: true,
                expires_at: Utc::now() + validity(),
            },
        );
    }
}

/// Whether a string is a well-formed 10-digit national id.
pub fn is_national_id(value: &str) -> bool {
    value.len() == 10 && value.bytes().all(|b| b.is_ascii_digit())
}
