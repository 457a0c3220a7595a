//! Rule evaluator: runs the registered rules against documents.

use crate::config::{Config, ConfigError, RuleConfig};
use crate::document::Document;
use crate::rule::{Rule, RuleBox};
use crate::types::{Assessment, AuditResult, DocumentReport, Status, Verdict};

use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur while setting up an audit.
#[derive(Debug, Error)]
pub enum AuditError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The worker pool could not be created.
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Builder for configuring an [`Auditor`].
#[derive(Default)]
pub struct AuditorBuilder {
    rules: Vec<RuleBox>,
    config: Option<Config>,
    parallelism: Option<usize>,
}

impl AuditorBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule to the auditor.
    #[must_use]
    pub fn rule<R: Rule + 'static>(mut self, rule: R) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Adds a boxed rule to the auditor.
    #[must_use]
    pub fn rule_box(mut self, rule: RuleBox) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds several boxed rules, keeping their order.
    #[must_use]
    pub fn rules<I>(mut self, rules: I) -> Self
    where
        I: IntoIterator<Item = RuleBox>,
    {
        self.rules.extend(rules);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the number of documents audited in parallel, overriding the config.
    #[must_use]
    pub fn parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }

    /// Builds the auditor.
    ///
    /// # Errors
    ///
    /// Returns an error if the worker pool cannot be created.
    pub fn build(self) -> Result<Auditor, AuditError> {
        let config = self.config.unwrap_or_default();
        let threads = self
            .parallelism
            .or(config.auditor.parallelism)
            .unwrap_or(0);

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("netaudit-{i}"))
            .build()?;

        debug!(
            "Auditor built with {} rules and {} worker(s)",
            self.rules.len(),
            pool.current_num_threads()
        );

        Ok(Auditor {
            rules: self.rules,
            config,
            pool,
        })
    }
}

/// Evaluates the rule catalog against configuration documents.
///
/// Use [`Auditor::builder()`] to construct an instance. Verdicts come back in
/// rule registration order; a rule that fails or panics yields a non-compliant
/// verdict and never stops the remaining rules.
pub struct Auditor {
    rules: Vec<RuleBox>,
    config: Config,
    pool: rayon::ThreadPool,
}

impl Auditor {
    /// Creates a new builder for configuring an auditor.
    #[must_use]
    pub fn builder() -> AuditorBuilder {
        AuditorBuilder::new()
    }

    /// Returns the number of registered rules.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    /// Returns the configuration in effect.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gets the configuration for a specific rule.
    #[must_use]
    pub fn rule_config(&self, rule_name: &str) -> Option<&RuleConfig> {
        self.config.rule_config(rule_name)
    }

    /// Evaluates every enabled rule against one document.
    #[must_use]
    pub fn evaluate(&self, doc: &Document) -> Vec<Verdict> {
        self.rules
            .iter()
            .filter(|rule| {
                let enabled = self.config.is_rule_enabled(rule.name());
                if !enabled {
                    debug!("Skipping disabled rule: {}", rule.name());
                }
                enabled
            })
            .map(|rule| self.evaluate_rule(rule.as_ref(), doc))
            .collect()
    }

    /// Parses and audits one capture.
    #[must_use]
    pub fn audit_text(&self, identifier: &str, text: &str) -> DocumentReport {
        let doc = Document::parse(text);
        info!(
            "Auditing {} ({} interfaces, {} anomalies)",
            identifier,
            doc.interfaces.len(),
            doc.anomalies.len()
        );
        DocumentReport {
            identifier: identifier.to_string(),
            verdicts: self.evaluate(&doc),
        }
    }

    /// Audits many `(identifier, text)` captures on the worker pool.
    ///
    /// Reports keep the order of `inputs`.
    #[must_use]
    pub fn audit_all(&self, inputs: &[(String, String)]) -> AuditResult {
        info!("Starting audit of {} document(s)", inputs.len());

        let reports: Vec<DocumentReport> = self.pool.install(|| {
            inputs
                .par_iter()
                .map(|(identifier, text)| self.audit_text(identifier, text))
                .collect()
        });

        let result = AuditResult {
            documents_checked: reports.len(),
            reports,
        };
        let (compliant, non_compliant, not_applicable) = result.count_by_status();
        info!(
            "Audit complete: {} compliant, {} non-compliant, {} not applicable",
            compliant, non_compliant, not_applicable
        );
        result
    }

    fn evaluate_rule(&self, rule: &dyn Rule, doc: &Document) -> Verdict {
        debug!("Evaluating {} ({})", rule.code(), rule.name());

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            if rule.is_applicable(doc) {
                rule.evaluate(doc)
            } else {
                Ok(Assessment::not_applicable(rule.not_applicable_reason()))
            }
        }));

        let mut assessment = match outcome {
            Ok(Ok(assessment)) => assessment,
            Ok(Err(e)) => {
                warn!("Rule {} failed: {}", rule.name(), e);
                evaluation_error(&e.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!("Rule {} panicked: {}", rule.name(), message);
                evaluation_error(&message)
            }
        };

        if assessment.evidence.is_empty() {
            match assessment.status {
                Status::Compliant => {}
                Status::NonCompliant => assessment
                    .evidence
                    .push(format!("not satisfied: {}", rule.title())),
                Status::NotApplicable => assessment
                    .evidence
                    .push(rule.not_applicable_reason().to_string()),
            }
        }

        Verdict {
            rule_id: rule.code().to_string(),
            rule: rule.name().to_string(),
            title: rule.title().to_string(),
            severity: self
                .config
                .rule_severity(rule.name())
                .unwrap_or_else(|| rule.default_severity()),
            status: assessment.status,
            evidence: assessment.evidence,
            details: assessment.details,
        }
    }
}

fn evaluation_error(message: &str) -> Assessment {
    Assessment::non_compliant()
        .with_evidence(format!("rule evaluation failed: {message}"))
        .with_detail("evaluation_error", message)
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "panic with a non-string payload".to_string()
    }
}
