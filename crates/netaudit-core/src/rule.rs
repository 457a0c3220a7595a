//! Rule trait for defining compliance checks.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::document::Document;
use crate::types::{Assessment, Severity};

/// Functional area a rule belongs to; presets select rules by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Firmware and platform identification.
    Platform,
    /// Port state and VLAN usage.
    Interfaces,
    /// Switching protections.
    Layer2,
    /// IGP, FHRP and VRF hygiene.
    Routing,
    /// BGP session and route hygiene.
    Bgp,
    /// Device management access.
    Management,
    /// AAA and local accounts.
    Accounts,
    /// Time and logging.
    Monitoring,
    /// SNMP.
    Snmp,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Platform => "platform",
            Self::Interfaces => "interfaces",
            Self::Layer2 => "layer2",
            Self::Routing => "routing",
            Self::Bgp => "bgp",
            Self::Management => "management",
            Self::Accounts => "accounts",
            Self::Monitoring => "monitoring",
            Self::Snmp => "snmp",
        };
        write!(f, "{name}")
    }
}

/// A rule's own failure while evaluating a document.
#[derive(Debug, Error)]
pub enum RuleError {
    /// A fact the rule depends on is missing from the document.
    #[error("missing fact: {0}")]
    MissingFact(String),

    /// Any other evaluation failure.
    #[error("{0}")]
    Failed(String),
}

/// A compliance rule evaluated against one [`Document`].
///
/// Rules never see raw text: they read the resolved document and return an
/// [`Assessment`]. The evaluator stamps rule metadata on it and turns it into
/// a [`Verdict`](crate::Verdict).
///
/// # Example
///
/// ```ignore
/// use netaudit_core::{Assessment, Category, Document, Rule, RuleError};
///
/// pub struct SshVersion2;
///
/// impl Rule for SshVersion2 {
///     fn name(&self) -> &'static str { "ssh-version-2" }
///     fn code(&self) -> &'static str { "NA532" }
///     fn title(&self) -> &'static str { "SSH is restricted to version 2" }
///     fn category(&self) -> Category { Category::Management }
///
///     fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
///         Ok(Assessment::from_check(doc.services.ssh_version == Some(2)))
///     }
/// }
/// ```
pub trait Rule: Send + Sync {
    /// Returns the kebab-case name of this rule (e.g., "disable-telnet").
    fn name(&self) -> &'static str;

    /// Returns the rule code (e.g., "NA533").
    fn code(&self) -> &'static str;

    /// Returns a one-line statement of the compliant state.
    fn title(&self) -> &'static str;

    /// Returns the functional area of this rule.
    fn category(&self) -> Category;

    /// Returns the default severity for non-compliant verdicts.
    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    /// Whether the rule applies to this device at all.
    fn is_applicable(&self, _doc: &Document) -> bool {
        true
    }

    /// Evidence line used when [`Rule::is_applicable`] returns false.
    fn not_applicable_reason(&self) -> &'static str {
        "rule does not apply to this configuration"
    }

    /// Evaluates an applicable document.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError`] when the rule cannot reach a conclusion; the
    /// evaluator reports it as a non-compliant verdict.
    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError>;
}

/// Type alias for boxed Rule trait objects.
pub type RuleBox = Box<dyn Rule>;
