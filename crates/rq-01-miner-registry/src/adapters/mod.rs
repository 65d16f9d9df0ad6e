//! Adapters layer - RegistryStore implementations

mod file_store;
mod memory_store;

pub use file_store::FileRegistryStore;
pub use memory_store::InMemoryRegistryStore;
