//! In-memory collections standing in for a database.
//!
//! Each collection is a `Vec` behind its own async `RwLock`. Lookups are linear
//! scans and nothing survives a restart. Checked writes on one collection are
//! serialised through [`Collection::lock_writes`]; plain replaces stay
//! last-write-wins.

pub mod seed;

use tokio::sync::{Mutex, MutexGuard, RwLock};
use uuid::Uuid;

use crate::models::{Agent, Beneficiary, InsuredPerson, Policy, PremiumPayment, User};

/// Anything stored in a [`Collection`].
pub trait Record {
    fn id(&self) -> Uuid;
}

#[derive(Debug)]
pub struct Collection<T> {
    rows: RwLock<Vec<T>>,
    writer: Mutex<()>,
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(Vec::new()),
            writer: Mutex::new(()),
        }
    }
}

impl<T: Record + Clone> Collection<T> {
    pub fn new(rows: Vec<T>) -> Self {
        Self {
            rows: RwLock::new(rows),
            writer: Mutex::new(()),
        }
    }

    /// Held across a check-then-write so no other checked write on this
    /// collection interleaves. Readers are not blocked.
    pub async fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.writer.lock().await
    }

    /// Snapshot of every row in insertion order.
    pub async fn all(&self) -> Vec<T> {
        self.rows.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn find(&self, id: Uuid) -> Option<T> {
        self.find_by(|row| row.id() == id).await
    }

    pub async fn find_by<F>(&self, predicate: F) -> Option<T>
    where
        F: Fn(&T) -> bool,
    {
        self.rows.read().await.iter().find(|row| predicate(row)).cloned()
    }

    pub async fn filter_by<F>(&self, predicate: F) -> Vec<T>
    where
        F: Fn(&T) -> bool,
    {
        self.rows
            .read()
            .await
            .iter()
            .filter(|row| predicate(row))
            .cloned()
            .collect()
    }

    /// True when any row other than `exclude` satisfies the predicate.
    pub async fn exists_other<F>(&self, exclude: Uuid, predicate: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        self.rows
            .read()
            .await
            .iter()
            .any(|row| row.id() != exclude && predicate(row))
    }

    pub async fn insert(&self, row: T) -> T {
        self.rows.write().await.push(row.clone());
        row
    }

    /// Overwrites the row with the same id. `None` if it has gone away.
    pub async fn replace(&self, row: T) -> Option<T> {
        let mut rows = self.rows.write().await;
        let slot = rows.iter_mut().find(|existing| existing.id() == row.id())?;
        *slot = row.clone();
        Some(row)
    }

    pub async fn remove(&self, id: Uuid) -> Option<T> {
        let mut rows = self.rows.write().await;
        let index = rows.iter().position(|row| row.id() == id)?;
        Some(rows.remove(index))
    }
}

/// Every collection the service exposes.
#[derive(Debug, Default)]
pub struct Store {
    pub policies: Collection<Policy>,
    pub insured_persons: Collection<InsuredPerson>,
    pub premium_payments: Collection<PremiumPayment>,
    pub agents: Collection<Agent>,
    pub beneficiaries: Collection<Beneficiary>,
    pub users: Collection<User>,
}

impl Store {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Store pre-filled with the demo data set.
    pub fn seeded() -> Self {
        let data = seed::demo_data();
        Self {
            policies: Collection::new(data.policies),
            insured_persons: Collection::new(data.insured_persons),
            premium_payments: Collection::new(data.premium_payments),
            agents: Collection::new(data.agents),
            beneficiaries: Collection::new(data.beneficiaries),
            users: Collection::new(data.users),
        }
    }
}
