//! # rq-03-consensus-verifier
//!
//! Turns "N untrusted miners each claim a result" into one verdict.
//!
//! ## Algorithm
//!
//! Responses are grouped by result fingerprint. The canonical group is the
//! one with the largest cumulative stake (not the largest head count); ties
//! go to the group whose earliest response arrived first, then to the
//! smaller fingerprint. Quorum holds when the canonical group has more
//! members than half the task's redundancy factor. Every responder outside
//! the canonical group is divergent.
//!
//! ## Early resolution
//!
//! A verdict is *settled* before all responses are in only when no pending
//! response could change it: the canonical group already has a majority of
//! members and still beats every rival group even if all pending stake were
//! added to that rival.
//!
//! ```text
//! responses ──► group by fingerprint ──► order (stake ↓, first arrival ↑, fp ↑)
//!                                              │
//!                    canonical = head ─────────┤
//!                    quorum = |head| > rf / 2  │
//!                    settled = no pending  OR  head beats (rival + pending stake)
//! ```

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{group_responses, FingerprintGroup, VerifierConfig};
pub use ports::{ConsensusVerifier, Verdict, VerificationInput};
pub use service::StakeWeightedVerifier;
