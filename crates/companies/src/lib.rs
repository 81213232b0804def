//! Company registry: client billing profiles and their invoice counters.
//!
//! The registry is the only shared mutable state of the system. It is accessed
//! exclusively through [`CompanyRegistry`]; persistence goes through the
//! [`RegistryStore`] port so the file-backed adapter lives in infra.

pub mod defaults;
pub mod profile;
pub mod registry;
pub mod store;

pub use defaults::default_companies;
pub use profile::{CompanyMap, CompanyProfile};
pub use registry::{CompanyRegistry, RegistryError};
pub use store::{InMemoryRegistryStore, PersistenceError, RegistryStore};
