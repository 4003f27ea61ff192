//! ledgerbook - client-side encrypted personal ledger
//!
//! This library provides the core of a personal ledger application whose
//! data lives entirely on the client, encrypted at rest with a
//! password held only in process memory, and merged across devices
//! through export/import envelopes.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path management
//! - `error`: Custom error types
//! - `models`: Core data models (entries, budgets, categories)
//! - `crypto`: AES-256-GCM encryption, key derivation, session key holder
//! - `storage`: Record codec and repositories over the key-value engine
//! - `merge`: Duplicate/conflict detection and the import orchestrator
//! - `csvio`: CSV import/export
//! - `audit`: Fire-and-forget operation logging

pub mod audit;
pub mod config;
pub mod crypto;
pub mod csvio;
pub mod error;
pub mod merge;
pub mod models;
pub mod storage;

pub use error::{LedgerError, LedgerResult};
