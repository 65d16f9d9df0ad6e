//! # Radquorum Test Suite
//!
//! Unified test crate for behavior that spans several subsystems.
//!
//! ## Structure
//!
//! ```text
//! tests/
//! ├── src/
//! │   ├── fixtures.rs        # File-backed stack + scripted miner fleet
//! │   └── integration/
//! │       ├── scenarios.rs   # End-to-end task outcomes
//! │       ├── properties.rs  # Invariants under randomized input
//! │       └── persistence.rs # State across restarts
//! └── benches/               # Criterion benchmarks
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p rq-tests
//! cargo test -p rq-tests integration::scenarios::
//! cargo bench -p rq-tests
//! ```

pub mod fixtures;
pub mod integration;
