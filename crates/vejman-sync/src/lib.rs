//! Vejman folder synchronization
//!
//! Mirrors open Vejman permit cases into a SQL mapping table and a SharePoint
//! folder tree, and prunes folders whose cases have not been seen for a while.
//!
//! # Features
//! - Case reconciliation (create, rename or refresh one folder per case)
//! - Recursive folder deletion with an explicit stack
//! - Staleness sweep over the mapping table
//! - Bounded retry with fresh SharePoint sessions for bulk deletes
//! - Work queue elements for the downstream performer process

pub mod config;
pub mod db;
pub mod error;
pub mod migrations;
pub mod models;
pub mod queue;
pub mod remote;
pub mod sanitize;
pub mod services;
pub mod store;
pub mod vejman;

pub use config::Config;
pub use error::{SyncError, SyncResult};
pub use models::{Case, CaseId, FolderMapping, QueueElement};
