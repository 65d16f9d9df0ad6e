//! # rq-01-miner-registry
//!
//! Miner registry subsystem for Radquorum.
//!
//! ## Architecture
//!
//! Holds reputation, stake and availability state for every known miner.
//! It is the leaf of the orchestrator: selection reads it, the reputation
//! scorer mutates it, nothing else writes to it.
//!
//! ### Per-record atomicity
//!
//! Every `MinerRecord` sits behind its own mutex. Concurrent score updates
//! for different miners never contend, and two tasks resolving at the same
//! time for the same miner serialize on that miner only:
//!
//! ```text
//! records: RwLock<HashMap<MinerId, Arc<Mutex<MinerRecord>>>>
//!             │  (read lock: lookup only)
//!             └──► Mutex<MinerRecord>  (read-modify-write of one miner)
//! ```
//!
//! The outer `RwLock` is only taken for writing when miners join.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rq_01_miner_registry::{MinerRegistry, RegistryConfig, InMemoryRegistryStore};
//!
//! let registry = MinerRegistry::open(RegistryConfig::default(), Arc::new(InMemoryRegistryStore::new()))?;
//! registry.register(MinerId::new("m1"), 1_000)?;
//! registry.apply_delta(&MinerId::new("m1"), -0.1, true)?;
//! registry.flush()?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{FileRegistryStore, InMemoryRegistryStore};
pub use domain::{PopulationEntry, RegistryConfig, RegistryError, RegistryResult, SyncReport};
pub use ports::{MinerRegistryApi, RegistryStore, StoreError};
pub use service::MinerRegistry;
