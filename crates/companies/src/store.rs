use std::sync::{Arc, RwLock};

use thiserror::Error;

use sheetbill_core::DomainError;

use crate::CompanyMap;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("registry storage io error: {0}")]
    Io(String),

    #[error("registry storage is corrupt: {0}")]
    Corrupt(String),
}

impl From<PersistenceError> for DomainError {
    fn from(err: PersistenceError) -> Self {
        DomainError::persistence(err.to_string())
    }
}

/// Durable storage port for the whole registry document.
///
/// `save` always receives the complete map; implementations must make the
/// write durable before returning `Ok`.
pub trait RegistryStore: Send + Sync {
    /// `Ok(None)` when nothing has been persisted yet.
    fn load(&self) -> Result<Option<CompanyMap>, PersistenceError>;
    fn save(&self, companies: &CompanyMap) -> Result<(), PersistenceError>;
}

impl<S> RegistryStore for Arc<S>
where
    S: RegistryStore + ?Sized,
{
    fn load(&self) -> Result<Option<CompanyMap>, PersistenceError> {
        (**self).load()
    }

    fn save(&self, companies: &CompanyMap) -> Result<(), PersistenceError> {
        (**self).save(companies)
    }
}

/// In-memory store for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryRegistryStore {
    inner: RwLock<Option<CompanyMap>>,
}

impl InMemoryRegistryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_companies(companies: CompanyMap) -> Self {
        Self {
            inner: RwLock::new(Some(companies)),
        }
    }

    /// Last saved snapshot, if any.
    pub fn snapshot(&self) -> Option<CompanyMap> {
        self.inner.read().ok().and_then(|guard| guard.clone())
    }
}

impl RegistryStore for InMemoryRegistryStore {
    fn load(&self) -> Result<Option<CompanyMap>, PersistenceError> {
        let guard = self
            .inner
            .read()
            .map_err(|_| PersistenceError::Io("lock poisoned".to_string()))?;
        Ok(guard.clone())
    }

    fn save(&self, companies: &CompanyMap) -> Result<(), PersistenceError> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| PersistenceError::Io("lock poisoned".to_string()))?;
        *guard = Some(companies.clone());
        Ok(())
    }
}
