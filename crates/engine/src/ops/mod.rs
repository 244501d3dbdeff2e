use sea_orm::DatabaseConnection;

use crate::{EngineError, ResultEngine, RecordStore, SqlStore};

mod records;
mod reports;
mod tags;

/// Query engine over a [`RecordStore`].
///
/// Holds no state besides the store handle, so a single instance can be shared
/// between concurrent requests.
#[derive(Debug)]
pub struct Engine<S = SqlStore> {
    store: S,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

impl<S: RecordStore> Engine<S> {
    /// Builds an engine over any store, e.g. a test double.
    pub fn with_store(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

fn require_organization(organization_id: i64) -> ResultEngine<i64> {
    if organization_id < 1 {
        return Err(EngineError::InvalidInput(format!(
            "organization id must be a positive integer, got {organization_id}"
        )));
    }
    Ok(organization_id)
}

fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            store: SqlStore::new(self.database),
        })
    }
}
