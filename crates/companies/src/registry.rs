use std::sync::{Mutex, MutexGuard};

use thiserror::Error;
use tracing::{error, info};

use sheetbill_core::DomainError;

use crate::{default_companies, CompanyMap, CompanyProfile, PersistenceError, RegistryStore};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Company {0} not found")]
    UnknownCompany(String),

    #[error("Invoice numbers exhausted for company {0}")]
    CounterExhausted(String),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl From<RegistryError> for DomainError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownCompany(_) => DomainError::not_found(err.to_string()),
            RegistryError::CounterExhausted(_) => DomainError::persistence(err.to_string()),
            RegistryError::Persistence(e) => e.into(),
        }
    }
}

/// Company profiles plus their invoice counters, backed by a [`RegistryStore`].
///
/// All increments are serialized behind one lock that is held across the
/// store write, so two increments can never observe the same counter value.
/// The in-memory map only advances after the store reported success.
pub struct CompanyRegistry<S: RegistryStore> {
    store: S,
    companies: Mutex<CompanyMap>,
}

impl<S: RegistryStore> CompanyRegistry<S> {
    /// Load the registry, seeding and persisting the default profiles when the
    /// store is empty.
    pub fn open(store: S) -> Result<Self, PersistenceError> {
        Self::open_with_seed(store, default_companies())
    }

    pub fn open_with_seed(store: S, seed: CompanyMap) -> Result<Self, PersistenceError> {
        let companies = match store.load()? {
            Some(mut loaded) => {
                for (key, profile) in loaded.iter_mut() {
                    profile.key = key.clone();
                }
                info!(companies = loaded.len(), "company registry loaded");
                loaded
            }
            None => {
                let mut seeded = seed;
                for (key, profile) in seeded.iter_mut() {
                    profile.key = key.clone();
                }
                store.save(&seeded)?;
                info!(companies = seeded.len(), "company registry seeded with defaults");
                seeded
            }
        };

        Ok(Self {
            store,
            companies: Mutex::new(companies),
        })
    }

    fn lock(&self) -> MutexGuard<'_, CompanyMap> {
        // The map is only replaced after a successful save, so a poisoned
        // guard still holds a consistent snapshot.
        self.companies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn all(&self) -> CompanyMap {
        self.lock().clone()
    }

    pub fn get_by_key(&self, key: &str) -> Option<CompanyProfile> {
        self.lock().get(key).cloned()
    }

    /// First profile (in insertion order) whose sheet identifier matches.
    pub fn get_by_sheet_identifier(&self, identifier: &str) -> Option<CompanyProfile> {
        self.lock()
            .values()
            .find(|p| p.matches_sheet_identifier(identifier))
            .cloned()
    }

    /// Bump the counter for `key` by exactly one, persist the whole registry,
    /// and return the new number.
    pub fn increment_invoice_number(&self, key: &str) -> Result<u32, RegistryError> {
        let mut companies = self.lock();

        let current = companies
            .get(key)
            .map(|p| p.latest_invoice_number)
            .ok_or_else(|| RegistryError::UnknownCompany(key.to_string()))?;
        let next = current
            .checked_add(1)
            .ok_or_else(|| RegistryError::CounterExhausted(key.to_string()))?;

        let mut updated = companies.clone();
        if let Some(profile) = updated.get_mut(key) {
            profile.latest_invoice_number = next;
        }

        if let Err(e) = self.store.save(&updated) {
            error!(company = key, error = %e, "failed to persist invoice number increment");
            return Err(e.into());
        }

        *companies = updated;
        info!(company = key, invoice_number = next, "invoice number issued");
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::InMemoryRegistryStore;

    struct FlakyStore {
        inner: InMemoryRegistryStore,
        fail: AtomicBool,
    }

    impl RegistryStore for FlakyStore {
        fn load(&self) -> Result<Option<CompanyMap>, PersistenceError> {
            self.inner.load()
        }

        fn save(&self, companies: &CompanyMap) -> Result<(), PersistenceError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(PersistenceError::Io("disk full".to_string()));
            }
            self.inner.save(companies)
        }
    }

    fn seeded() -> (Arc<InMemoryRegistryStore>, CompanyRegistry<Arc<InMemoryRegistryStore>>) {
        let store = Arc::new(InMemoryRegistryStore::new());
        let registry = CompanyRegistry::open(store.clone()).unwrap();
        (store, registry)
    }

    #[test]
    fn empty_store_is_seeded_and_persisted() {
        let (store, registry) = seeded();
        let all = registry.all();
        assert_eq!(
            all.keys().collect::<Vec<_>>(),
            vec!["Velir", "Daily Kos", "McGowan", "travcoding"]
        );
        assert_eq!(store.snapshot().unwrap().len(), 4);
        assert_eq!(registry.get_by_key("Velir").unwrap().key, "Velir");
    }

    #[test]
    fn existing_state_is_loaded_not_reseeded() {
        let mut companies = default_companies();
        companies.get_mut("McGowan").unwrap().latest_invoice_number = 40;
        companies.shift_remove("travcoding");
        let store = InMemoryRegistryStore::with_companies(companies);

        let registry = CompanyRegistry::open(store).unwrap();
        assert_eq!(registry.all().len(), 3);
        assert_eq!(registry.get_by_key("McGowan").unwrap().latest_invoice_number, 40);
        assert_eq!(registry.get_by_key("McGowan").unwrap().key, "McGowan");
    }

    #[test]
    fn lookup_by_key_and_sheet_identifier() {
        let (_store, registry) = seeded();
        assert_eq!(
            registry.get_by_key("Velir").unwrap().legal_name,
            "Velir Studios, Inc."
        );
        assert!(registry.get_by_key("NonExistent").is_none());
        assert_eq!(
            registry.get_by_sheet_identifier("Daily Kos").unwrap().key,
            "Daily Kos"
        );
        assert!(registry.get_by_sheet_identifier("NonExistent").is_none());
    }

    #[test]
    fn sheet_identifier_lookup_returns_first_match() {
        let mut companies = default_companies();
        companies.get_mut("McGowan").unwrap().sheet_identifier = "Shared".to_string();
        companies.get_mut("travcoding").unwrap().sheet_identifier = "Shared".to_string();
        let store = InMemoryRegistryStore::with_companies(companies);
        let registry = CompanyRegistry::open(store).unwrap();

        assert_eq!(registry.get_by_sheet_identifier("Shared").unwrap().key, "McGowan");
    }

    #[test]
    fn sequential_increments_have_no_gaps_and_are_persisted() {
        let (store, registry) = seeded();
        let issued: Vec<u32> = (0..5)
            .map(|_| registry.increment_invoice_number("Velir").unwrap())
            .collect();

        assert_eq!(issued, vec![587, 588, 589, 590, 591]);
        assert_eq!(
            store.snapshot().unwrap()["Velir"].latest_invoice_number,
            591
        );
        // Other companies are untouched but still written as part of the whole map.
        assert_eq!(store.snapshot().unwrap()["Daily Kos"].latest_invoice_number, 14);
    }

    #[test]
    fn unknown_company_is_rejected_without_writing() {
        let (store, registry) = seeded();
        let before = store.snapshot();

        let err = registry.increment_invoice_number("InvalidCompany").unwrap_err();
        assert_eq!(err, RegistryError::UnknownCompany("InvalidCompany".to_string()));
        assert_eq!(store.snapshot(), before);

        let domain: DomainError = err.into();
        assert!(matches!(domain, DomainError::NotFound(_)));
    }

    #[test]
    fn exhausted_counter_is_rejected_without_writing() {
        let mut companies = default_companies();
        companies.get_mut("Velir").unwrap().latest_invoice_number = u32::MAX;
        let store = Arc::new(InMemoryRegistryStore::with_companies(companies));
        let registry = CompanyRegistry::open(store.clone()).unwrap();
        let before = store.snapshot();

        let err = registry.increment_invoice_number("Velir").unwrap_err();
        assert_eq!(err, RegistryError::CounterExhausted("Velir".to_string()));
        assert_eq!(store.snapshot(), before);
        assert_eq!(registry.get_by_key("Velir").unwrap().latest_invoice_number, u32::MAX);

        let domain: DomainError = err.into();
        assert!(matches!(domain, DomainError::Persistence(_)));
        // Other sequences keep going.
        assert_eq!(registry.increment_invoice_number("McGowan").unwrap(), 12);
    }

    #[test]
    fn failed_save_does_not_advance_the_counter() {
        let store = FlakyStore {
            inner: InMemoryRegistryStore::new(),
            fail: AtomicBool::new(false),
        };
        let registry = CompanyRegistry::open(store).unwrap();

        registry.store.fail.store(true, Ordering::SeqCst);
        let err = registry.increment_invoice_number("Velir").unwrap_err();
        assert!(matches!(err, RegistryError::Persistence(_)));
        assert_eq!(registry.get_by_key("Velir").unwrap().latest_invoice_number, 586);

        registry.store.fail.store(false, Ordering::SeqCst);
        assert_eq!(registry.increment_invoice_number("Velir").unwrap(), 587);
    }

    #[test]
    fn concurrent_increments_never_repeat_a_number() {
        let (store, registry) = seeded();
        let registry = Arc::new(registry);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    let key = if i % 2 == 0 { "Velir" } else { "McGowan" };
                    (0..25)
                        .map(|_| (key, registry.increment_invoice_number(key).unwrap()))
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut velir = Vec::new();
        let mut mcgowan = Vec::new();
        for h in handles {
            for (key, n) in h.join().unwrap() {
                if key == "Velir" {
                    velir.push(n);
                } else {
                    mcgowan.push(n);
                }
            }
        }
        velir.sort_unstable();
        mcgowan.sort_unstable();

        assert_eq!(velir, (587..687).collect::<Vec<_>>());
        assert_eq!(mcgowan, (12..112).collect::<Vec<_>>());

        let persisted = store.snapshot().unwrap();
        assert_eq!(persisted["Velir"].latest_invoice_number, 686);
        assert_eq!(persisted["McGowan"].latest_invoice_number, 111);
    }
}
