//! Binds an entity to its collection and write-time rules so the CRUD handlers
//! can be written once.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::listing::Listable;
use crate::store::{Collection, Record, Store};

#[async_trait]
pub trait Resource: Listable + Record + Clone + Serialize + Send + Sync + 'static {
    /// Human-readable name used in messages and logs.
    const LABEL: &'static str;

    type Create: DeserializeOwned + Send + 'static;
    type Update: DeserializeOwned + Send + 'static;

    fn collection(store: &Store) -> &Collection<Self>;

    /// Builds a record; the server owns `id` and both timestamps.
    fn from_create(input: Self::Create, id: Uuid, now: DateTime<Utc>) -> Self;

    /// Shallow merge: supplied fields replace, absent ones are kept.
    fn apply_update(&mut self, patch: Self::Update, now: DateTime<Utc>);

    /// Field-level rules, all failures reported together.
    fn validate(&self, today: NaiveDate) -> Result<(), AppError>;

    /// Uniqueness and foreign-key checks against the rest of the store.
    async fn check_references(&self, _store: &Store) -> Result<(), AppError> {
        Ok(())
    }
}

/// Unknown foreign key, reported as a validation failure.
pub fn missing_reference(field: &str, entity: &str, id: Uuid) -> AppError {
    AppError::Validation(format!("{field}: {entity} {id} does not exist"))
}
