//! Clearing the notification events this extension relayed to the accessory.
//!
//! The delete runs on its own worker thread; the screen awaits the single
//! outcome through a oneshot channel. Nothing cancels a running delete: if the
//! screen goes away first the outcome is simply dropped.

use crate::core::adb::{AdbError, Cmd as AdbCmd, PackId};
use futures::channel::oneshot;
use regex::Regex;
use static_init::dynamic;
use std::fmt;
use std::sync::Arc;
use std::thread;

/// What the delete-all primitive returns when nothing was deleted.
pub const INVALID_ID: i64 = -1;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Adb(#[from] AdbError),
}

/// The accessory's event store, seen from this extension.
pub trait EventStore: Send + Sync {
    /// Deletes every event belonging to this extension.
    ///
    /// Returns a valid id, or [`INVALID_ID`] if nothing was deleted.
    fn delete_all_events(&self) -> Result<i64, StoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearOutcome {
    Success,
    NothingToDelete,
    Failure,
}

impl ClearOutcome {
    fn from_reply(reply: Result<i64, StoreError>) -> Self {
        match reply {
            Ok(INVALID_ID) => Self::NothingToDelete,
            Ok(_) => Self::Success,
            Err(e) => {
                error!("[CLEAR] Deleting events failed: {e}");
                Self::Failure
            }
        }
    }
}

/// The transient message shown once a clear is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    Cleared,
    ClearFailed,
}

impl From<ClearOutcome> for Notice {
    fn from(outcome: ClearOutcome) -> Self {
        match outcome {
            ClearOutcome::Success => Self::Cleared,
            // the user can't act on the difference
            ClearOutcome::NothingToDelete | ClearOutcome::Failure => Self::ClearFailed,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Cleared => "History cleared",
            Self::ClearFailed => "Clearing history failed",
        };
        write!(f, "{s}")
    }
}

pub struct ClearOperation;

impl ClearOperation {
    /// Runs the delete on the calling thread. Blocks.
    pub fn execute(store: &dyn EventStore) -> ClearOutcome {
        let outcome = ClearOutcome::from_reply(store.delete_all_events());
        info!("[CLEAR] {outcome:?}");
        outcome
    }

    /// Runs the delete on a new worker thread.
    pub fn start(store: Arc<dyn EventStore>) -> ClearHandle {
        let (tx, rx) = oneshot::channel();
        let spawned = thread::Builder::new()
            .name("clear-events".to_string())
            .spawn(move || {
                let outcome = Self::execute(store.as_ref());
                if tx.send(outcome).is_err() {
                    debug!("[CLEAR] Nobody is waiting for {outcome:?} anymore");
                }
            });
        if let Err(e) = spawned {
            error!("[CLEAR] Couldn't start worker: {e}");
        }
        ClearHandle { rx }
    }
}

/// Pending result of [`ClearOperation::start`].
#[derive(Debug)]
#[must_use]
pub struct ClearHandle {
    rx: oneshot::Receiver<ClearOutcome>,
}

impl ClearHandle {
    /// Resolves once the worker is done.
    ///
    /// A worker that died without answering counts as a failure, so the
    /// caller always gets exactly one outcome.
    pub async fn outcome(self) -> ClearOutcome {
        self.rx.await.unwrap_or(ClearOutcome::Failure)
    }
}

/// The accessory notification provider, reached with `content` on the device.
#[derive(Debug, Clone)]
pub struct AdbEventStore {
    /// If empty, ADB chooses the default device.
    pub device_serial: String,
    pub extension: PackId,
    /// Base URI, without the `/source` or `/event` table
    pub provider: String,
}

impl AdbEventStore {
    fn query_ids(&self, table: &str, where_clause: &str) -> Result<Vec<u64>, AdbError> {
        let out = AdbCmd::new().sh(&self.device_serial).content().query(
            &format!("{}/{table}", self.provider),
            "_id",
            Some(where_clause),
        )?;
        Ok(row_ids(&out))
    }
}

impl EventStore for AdbEventStore {
    fn delete_all_events(&self) -> Result<i64, StoreError> {
        let sources = self.query_ids("source", &format!("packageName='{}'", self.extension))?;
        if sources.is_empty() {
            debug!("[CLEAR] {} has no registered source", self.extension);
            return Ok(INVALID_ID);
        }
        let in_sources = format!(
            "sourceId IN ({})",
            sources
                .iter()
                .map(u64::to_string)
                .collect::<Vec<_>>()
                .join(",")
        );
        let events = self.query_ids("event", &in_sources)?;
        if events.is_empty() {
            return Ok(INVALID_ID);
        }
        AdbCmd::new()
            .sh(&self.device_serial)
            .content()
            .delete(&format!("{}/event", self.provider), &in_sources)?;
        Ok(i64::try_from(events.len()).unwrap_or(i64::MAX))
    }
}

/// `_id` of every `Row:` printed by `content query`.
fn row_ids(out: &str) -> Vec<u64> {
    #[dynamic]
    static RE: Regex = Regex::new(r"\b_id=([0-9]+)").unwrap_or_else(|_| unreachable!());

    out.lines()
        .filter(|l| l.starts_with("Row:"))
        .filter_map(|l| RE.captures(l))
        .filter_map(|c| c[1].parse().ok())
        .collect()
}
