//! Durable desk state: order counters, subscribe codes, deposit wallets,
//! and operator settings.
//!
//! Each table lives in its own human-readable JSON file under the data
//! directory, reloaded at process start and rewritten wholesale on every
//! mutation using a write-temp-then-rename so a crash never leaves a
//! half-written table. Mutation frequency is human-paced, so whole-file
//! rewrites are cheap.
//!
//! All read-modify-write sequences run under one mutex; the counter
//! increment-then-persist is the desk's only required mutual-exclusion
//! point and every session and the broadcaster share it.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::order::today_stamp;
use crate::domain::{Network, OrderKind};
use crate::error::LedgerError;

const SETTINGS_FILE: &str = "settings.json";
const COUNTERS_FILE: &str = "counters.json";
const CODES_FILE: &str = "codes.json";
const WALLETS_FILE: &str = "wallets.json";

/// Daily order numbers restart from these floors, so the first buy order of
/// a fresh day is 2001 and the first sell order is 1001.
const BUY_FLOOR: u64 = 2000;
const SELL_FLOOR: u64 = 1000;

/// Operator-tunable settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSettings {
    /// Whether completed orders are forwarded to the operator chat.
    pub order_notifications: bool,
    /// Minutes between channel quote broadcasts.
    pub channel_interval_minutes: u64,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            order_notifications: true,
            channel_interval_minutes: 60,
        }
    }
}

/// Daily order counters, scoped to the stored local date.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct OrderCounters {
    last_date: String,
    buy: u64,
    sell: u64,
}

impl OrderCounters {
    fn fresh() -> Self {
        Self {
            last_date: today_stamp(),
            buy: BUY_FLOOR,
            sell: SELL_FLOOR,
        }
    }
}

/// A pre-provisioned authorization token bound to one national id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscribeCode {
    pub national_code: String,
    pub active: bool,
}

#[derive(Debug)]
struct LedgerState {
    settings: AdminSettings,
    counters: OrderCounters,
    codes: BTreeMap<String, SubscribeCode>,
    wallets: BTreeMap<Network, String>,
}

/// The durable keyed tables behind the conversation engine.
pub struct Ledger {
    dir: PathBuf,
    state: Mutex<LedgerState>,
}

impl Ledger {
    /// Load (or initialize) the tables under `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| LedgerError::Write {
            table: "data directory",
            source: e,
        })?;

        let state = LedgerState {
            settings: load_table(&dir, SETTINGS_FILE)?.unwrap_or_default(),
            counters: load_table(&dir, COUNTERS_FILE)?.unwrap_or_else(OrderCounters::fresh),
            codes: load_table(&dir, CODES_FILE)?.unwrap_or_default(),
            wallets: load_table(&dir, WALLETS_FILE)?.unwrap_or_default(),
        };

        info!(
            dir = %dir.display(),
            codes = state.codes.len(),
            wallets = state.wallets.len(),
            "ledger loaded"
        );

        Ok(Self {
            dir,
            state: Mutex::new(state),
        })
    }

    /// Allocate the next order number for `kind` and persist it.
    ///
    /// If the stored date differs from today's local date the counters reset
    /// to their floors first; daily numbering restarting at the floor is
    /// intentional. Same-day calls return strictly increasing, gap-free
    /// numbers.
    pub fn next_order_number(&self, kind: OrderKind) -> Result<u64, LedgerError> {
        let mut state = self.state.lock();

        let today = today_stamp();
        if state.counters.last_date != today {
            info!(
                from = %state.counters.last_date,
                to = %today,
                "new local day, resetting order counters"
            );
            state.counters = OrderCounters {
                last_date: today,
                buy: BUY_FLOOR,
                sell: SELL_FLOOR,
            };
        }

        let number = match kind {
            OrderKind::Buy => {
                state.counters.buy += 1;
                state.counters.buy
            }
            OrderKind::Sell => {
                state.counters.sell += 1;
                state.counters.sell
            }
        };

        self.write_table(COUNTERS_FILE, &state.counters)?;
        Ok(number)
    }

    pub fn lookup_code(&self, code: &str) -> Option<SubscribeCode> {
        self.state.lock().codes.get(code).cloned()
    }

    pub fn upsert_code(
        &self,
        code: &str,
        national_code: &str,
        active: bool,
    ) -> Result<(), LedgerError> {
        let mut state = self.state.lock();
        state.codes.insert(
            code.to_string(),
            SubscribeCode {
                national_code: national_code.to_string(),
                active,
            },
        );
        self.write_table(CODES_FILE, &state.codes)
    }

    /// Remove a subscribe code. Returns whether it existed.
    pub fn remove_code(&self, code: &str) -> Result<bool, LedgerError> {
        let mut state = self.state.lock();
        let existed = state.codes.remove(code).is_some();
        if existed {
            self.write_table(CODES_FILE, &state.codes)?;
        }
        Ok(existed)
    }

    pub fn set_wallet(&self, network: Network, address: &str) -> Result<(), LedgerError> {
        let mut state = self.state.lock();
        state.wallets.insert(network, address.to_string());
        self.write_table(WALLETS_FILE, &state.wallets)
    }

    pub fn wallet(&self, network: Network) -> Option<String> {
        self.state.lock().wallets.get(&network).cloned()
    }

    pub fn settings(&self) -> AdminSettings {
        self.state.lock().settings.clone()
    }

    pub fn set_order_notifications(&self, enabled: bool) -> Result<(), LedgerError> {
        let mut state = self.state.lock();
        state.settings.order_notifications = enabled;
        self.write_table(SETTINGS_FILE, &state.settings)
    }

    pub fn set_channel_interval(&self, minutes: u64) -> Result<(), LedgerError> {
        let mut state = self.state.lock();
        state.settings.channel_interval_minutes = minutes;
        self.write_table(SETTINGS_FILE, &state.settings)
    }

    /// Rewrite one table file atomically via write-temp-then-rename.
    fn write_table<T: Serialize>(&self, file: &'static str, value: &T) -> Result<(), LedgerError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| LedgerError::Encode { table: file, source: e })?;

        let path = self.dir.join(file);
        let temp_path = path.with_extension("tmp");

        let write = |temp_path: &Path| -> std::io::Result<()> {
            let mut f = fs::File::create(temp_path)?;
            f.write_all(json.as_bytes())?;
            f.sync_all()?;
            fs::rename(temp_path, &path)
        };

        write(&temp_path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            LedgerError::Write { table: file, source: e }
        })
    }
}

fn load_table<T: DeserializeOwned>(
    dir: &Path,
    file: &'static str,
) -> Result<Option<T>, LedgerError> {
    let path = dir.join(file);
    if !path.exists() {
        return Ok(None);
    }

    let raw = fs::read_to_string(&path).map_err(|e| LedgerError::Read {
        table: file,
        source: e,
    })?;
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| LedgerError::Decode { table: file, source: e })
}
