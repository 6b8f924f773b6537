//! In-memory reference data store with atomic swap-on-upload semantics.

use std::sync::Arc;

use aml_engine::{HighRiskCountry, Transaction, WatchlistEntry};
use parking_lot::RwLock;

/// One row of a work-instructions table: which BCN it applies to, and the
/// instruction text. Display passthrough only — never consulted by rules.
#[derive(Debug, Clone)]
pub struct WorkInstruction {
    /// BCN this instruction applies to, if the uploaded table carried one.
    pub business_contact_number: Option<String>,
    /// Free-text instruction.
    pub instruction: String,
}

/// The four uploaded tables, held together so a reader always sees a
/// consistent snapshot.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTables {
    /// All uploaded transactions, across every customer.
    pub transactions: Vec<Transaction>,
    /// Watchlist names.
    pub watchlist: Vec<WatchlistEntry>,
    /// High-risk country registry.
    pub high_risk_countries: Vec<HighRiskCountry>,
    /// Work instructions.
    pub work_instructions: Vec<WorkInstruction>,
}

/// Holds a single `Arc<ReferenceTables>` behind a lock, swapped wholesale on
/// every upload. Readers clone the `Arc` under a brief read lock and then
/// operate on their own snapshot lock-free, so a concurrent upload can never
/// hand back a torn intermediate state.
#[derive(Default)]
pub struct ReferenceStore {
    inner: RwLock<Arc<ReferenceTables>>,
}

impl ReferenceStore {
    /// Construct an empty store.
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Arc::new(ReferenceTables::default())),
        }
    }

    /// Take a cheap, consistent snapshot of the current tables.
    pub fn snapshot(&self) -> Arc<ReferenceTables> {
        self.inner.read().clone()
    }

    /// Replace the transactions table wholesale.
    pub fn set_transactions(&self, transactions: Vec<Transaction>) {
        let mut guard = self.inner.write();
        let mut next = (**guard).clone();
        next.transactions = transactions;
        *guard = Arc::new(next);
    }

    /// Replace the watchlist wholesale.
    pub fn set_watchlist(&self, watchlist: Vec<WatchlistEntry>) {
        let mut guard = self.inner.write();
        let mut next = (**guard).clone();
        next.watchlist = watchlist;
        *guard = Arc::new(next);
    }

    /// Replace the high-risk country registry wholesale.
    pub fn set_high_risk_countries(&self, high_risk_countries: Vec<HighRiskCountry>) {
        let mut guard = self.inner.write();
        let mut next = (**guard).clone();
        next.high_risk_countries = high_risk_countries;
        *guard = Arc::new(next);
    }

    /// Replace the work instructions table wholesale.
    pub fn set_work_instructions(&self, work_instructions: Vec<WorkInstruction>) {
        let mut guard = self.inner.write();
        let mut next = (**guard).clone();
        next.work_instructions = work_instructions;
        *guard = Arc::new(next);
    }

    /// Wipe all four tables.
    pub fn clear(&self) {
        let mut guard = self.inner.write();
        *guard = Arc::new(ReferenceTables::default());
    }
}
