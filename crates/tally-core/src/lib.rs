//! Tally Core Library
//!
//! This crate provides the record persistence layer for Tally, a personal
//! finance ledger. Data lives in plain-text flat files: one file per entity
//! type, one colon-delimited record per line, human-inspectable and
//! append-friendly.
//!
//! # Architecture
//!
//! - **Store**: in-memory owner of one entity type, with id allocation,
//!   dirty tracking and atomic file replacement on save
//! - **Record reader/writer**: ordered, cursor-based field access over one
//!   line, built on a per-type field codec
//! - **Migrations**: versioned upgrades of on-disk records, applied during
//!   load when the file header is older than the code
//!
//! # Quick Start
//!
//! ```text
//! let mut debts: Store<Debt> = Store::load(&config.debts_path())?;
//!
//! let id = debts.add(Debt::new(true, "alice", Money::from_parts(100, 0)));
//!
//! let open = FilterView::new(debts.all(), |d| d.state == 0);
//! for debt in &open {
//!     // render elsewhere; the store never formats for display
//! }
//!
//! debts.save(&config.debts_path())?;
//! ```
//!
//! # Modules
//!
//! - `storage`: field codec, record reader/writer, generic store, migrations
//! - `models`: concrete entity types (debts, objectives)
//! - `money`: fixed-point currency amounts
//! - `filter`: lazy predicate-filtered views
//! - `config`: application configuration

pub mod config;
pub mod filter;
pub mod models;
pub mod money;
pub mod storage;

pub use config::Config;
pub use filter::{FilterIter, FilterView};
pub use models::{generate_guid, Debt, Objective};
pub use money::{Money, ParseMoneyError};
pub use storage::{
    DecodeError, EncodeError, Field, Migration, MigrationError, Record, RecordReader,
    RecordWriter, Store, StoreError, StoreResult,
};
