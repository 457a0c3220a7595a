//! # netaudit-core
//!
//! Core engine for auditing Cisco IOS / IOS-XE configuration captures.
//!
//! A raw capture (a `show running-config` dump, optionally mixed with other
//! `show` command output) goes through four stages:
//!
//! - [`block`] splits the text into typed blocks
//! - [`extract`] turns blocks into typed [`facts`] collected in a [`Document`]
//! - [`resolve`] links cross-references (ACLs, key chains, VRFs, peer groups)
//! - [`Auditor`] evaluates every registered [`Rule`] into a [`Verdict`]
//!
//! Parsing never fails: anything ambiguous is kept as an
//! [`Anomaly`](facts::Anomaly) on the document.
//!
//! ## Example
//!
//! ```ignore
//! use netaudit_core::{Auditor, Config};
//!
//! let auditor = Auditor::builder()
//!     .rules(netaudit_rules::all_rules())
//!     .config(Config::default())
//!     .build()?;
//!
//! let report = auditor.audit_text("core-sw1.log", &text);
//! for verdict in &report.verdicts {
//!     println!("{verdict}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod auditor;
mod config;
mod document;
mod rule;
mod types;

pub mod block;
pub mod extract;
pub mod facts;
pub mod resolve;
pub mod utils;

pub use auditor::{AuditError, Auditor, AuditorBuilder};
pub use config::{AuditorConfig, Config, ConfigError, RuleConfig};
pub use document::{canonical_interface_name, interface_key, Document};
pub use rule::{Category, Rule, RuleBox, RuleError};
pub use types::{
    Assessment, AuditResult, DetailValue, DocumentReport, Severity, Status, Verdict,
};
