//! Authentication servers, local accounts and password handling.

use netaudit_core::facts::PolicyPattern;
use netaudit_core::{Assessment, Document, Rule, RuleConfig, RuleError};

/// Requires at least one TACACS+ or RADIUS server.
#[derive(Debug, Clone, Copy, Default)]
pub struct AaaServers;

impl Rule for AaaServers {
    rule_identity!(
        "NA521",
        "aaa-servers",
        Accounts,
        "Centralized authentication servers are configured"
    );

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let aaa = &doc.aaa;
        let servers = aaa
            .tacacs_servers
            .iter()
            .map(|s| format!("tacacs server {s}"))
            .chain(aaa.radius_servers.iter().map(|s| format!("radius server {s}")));

        let assessment = if aaa.tacacs_servers.is_empty() && aaa.radius_servers.is_empty() {
            Assessment::non_compliant().with_evidence("no TACACS+ or RADIUS server configured")
        } else {
            Assessment::compliant().with_evidence_lines(servers)
        };
        Ok(assessment
            .with_detail("aaa_new_model", aaa.new_model)
            .with_detail("local_accounts", aaa.usernames.len()))
    }
}

/// Flags local accounts that keep a well-known default name.
///
/// # Configuration
///
/// - `names`: account names treated as defaults (default: `admin`, `cisco`)
#[derive(Debug, Clone)]
pub struct DefaultAccounts {
    names: Vec<String>,
}

impl Default for DefaultAccounts {
    fn default() -> Self {
        Self::new()
    }
}

impl DefaultAccounts {
    /// Creates a new rule flagging `admin` and `cisco`.
    #[must_use]
    pub fn new() -> Self {
        Self {
            names: vec!["admin".to_string(), "cisco".to_string()],
        }
    }

    /// Replaces the default-name list.
    #[must_use]
    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Reads the `names` option.
    #[must_use]
    pub fn from_config(config: &RuleConfig) -> Self {
        let names = config.get_str_array("names");
        if names.is_empty() {
            Self::new()
        } else {
            Self::new().names(names)
        }
    }
}

impl Rule for DefaultAccounts {
    rule_identity!(
        "NA522",
        "default-accounts",
        Accounts,
        "No local account uses a default name"
    );

    fn is_applicable(&self, doc: &Document) -> bool {
        !doc.aaa.accounts.is_empty()
    }

    fn not_applicable_reason(&self) -> &'static str {
        "no local accounts"
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let defaults: Vec<String> = doc
            .aaa
            .accounts
            .iter()
            .filter(|a| self.names.iter().any(|n| n.eq_ignore_ascii_case(&a.name)))
            .map(|a| match a.privilege {
                Some(level) => format!("username {} privilege {level}", a.name),
                None => format!("username {}", a.name),
            })
            .collect();

        let assessment = if defaults.is_empty() {
            Assessment::compliant().with_evidence(format!(
                "{} local account(s), none with a default name",
                doc.aaa.usernames.len()
            ))
        } else {
            Assessment::non_compliant().with_evidence_lines(defaults)
        };
        Ok(assessment.with_detail(
            "accounts",
            doc.aaa.usernames.iter().cloned().collect::<Vec<_>>(),
        ))
    }
}

/// Requires `service password-encryption` and a minimum password length.
///
/// # Configuration
///
/// - `min_length`: shortest accepted `security passwords min-length` (default: 8)
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    min_length: u32,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordPolicy {
    /// Creates a new rule requiring eight characters.
    #[must_use]
    pub fn new() -> Self {
        Self { min_length: 8 }
    }

    /// Sets the required minimum length.
    #[must_use]
    pub fn min_length(mut self, length: u32) -> Self {
        self.min_length = length;
        self
    }

    /// Reads the `min_length` option.
    #[must_use]
    pub fn from_config(config: &RuleConfig) -> Self {
        let rule = Self::new();
        let length = config.get_u32("min_length", rule.min_length);
        rule.min_length(length)
    }
}

impl Rule for PasswordPolicy {
    rule_identity!(
        "NA524",
        "password-policy",
        Accounts,
        "Passwords are encrypted and have a minimum length"
    );

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let aaa = &doc.aaa;
        let mut findings = Vec::new();
        let mut evidence = Vec::new();

        match aaa.sightings(PolicyPattern::PasswordEncryption).next() {
            Some(s) => evidence.push(s.line.clone()),
            None => findings.push("no service password-encryption".to_string()),
        }

        let length = aaa
            .sightings(PolicyPattern::MinLength)
            .filter_map(|s| s.value)
            .max();
        match length {
            Some(len) if len >= self.min_length => {
                evidence.push(format!("security passwords min-length {len}"));
            }
            Some(len) => findings.push(format!(
                "password min-length {len} is below {}",
                self.min_length
            )),
            None => findings.push("no security passwords min-length".to_string()),
        }

        evidence.extend(
            aaa.sightings(PolicyPattern::AaaPolicy)
                .chain(aaa.sightings(PolicyPattern::CommonCriteria))
                .map(|s| s.line.clone()),
        );

        let assessment = if findings.is_empty() {
            Assessment::compliant().with_evidence_lines(evidence)
        } else {
            Assessment::non_compliant()
                .with_evidence_lines(findings)
                .with_evidence_lines(evidence)
        };
        let mut assessment = assessment
            .with_detail("threshold", self.min_length)
            .with_detail(
                "aaa_policy_enabled",
                aaa.sightings(PolicyPattern::AaaPolicyEnabled).next().is_some(),
            );
        if let Some(len) = length {
            assessment = assessment.with_detail("min_length", len);
        }
        Ok(assessment)
    }
}

/// Requires `login block-for` with bounded attempts and a minimum block time.
///
/// # Configuration
///
/// - `max_attempts`: most failed attempts allowed before blocking (default: 5)
/// - `min_lockout_minutes`: shortest accepted block duration (default: 5)
#[derive(Debug, Clone)]
pub struct AccountLockout {
    max_attempts: u32,
    min_lockout_minutes: u32,
}

impl Default for AccountLockout {
    fn default() -> Self {
        Self::new()
    }
}

impl AccountLockout {
    /// Creates a new rule with thresholds of 5 attempts and 5 minutes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            max_attempts: 5,
            min_lockout_minutes: 5,
        }
    }

    /// Sets the highest accepted attempt count.
    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Sets the shortest accepted block duration.
    #[must_use]
    pub fn min_lockout_minutes(mut self, minutes: u32) -> Self {
        self.min_lockout_minutes = minutes;
        self
    }

    /// Reads the `max_attempts` and `min_lockout_minutes` options.
    #[must_use]
    pub fn from_config(config: &RuleConfig) -> Self {
        let rule = Self::new();
        let attempts = config.get_u32("max_attempts", rule.max_attempts);
        let minutes = config.get_u32("min_lockout_minutes", rule.min_lockout_minutes);
        rule.max_attempts(attempts).min_lockout_minutes(minutes)
    }
}

impl Rule for AccountLockout {
    rule_identity!(
        "NA525",
        "account-lockout",
        Accounts,
        "Repeated login failures lock the account"
    );

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let thresholds = |a: Assessment| {
            a.with_detail("threshold_attempts", self.max_attempts)
                .with_detail("threshold_minutes", self.min_lockout_minutes)
        };

        let Some(lockout) = doc.aaa.lockout_config else {
            return Ok(thresholds(
                Assessment::non_compliant().with_evidence("no login block-for directive"),
            ));
        };

        let attempts_ok = lockout.max_attempts <= self.max_attempts;
        let block_ok = lockout.lockout_minutes >= self.min_lockout_minutes;
        let assessment = Assessment::from_check(attempts_ok && block_ok)
            .with_evidence(format!(
                "login block-for {} attempts {} within {}",
                lockout.lockout_minutes, lockout.max_attempts, lockout.window
            ))
            .with_evidence(format!(
                "attempts {} ({} allowed at most)",
                lockout.max_attempts, self.max_attempts
            ))
            .with_evidence(format!(
                "block {} minute(s) ({} required at least)",
                lockout.lockout_minutes, self.min_lockout_minutes
            ))
            .with_detail("attempts", lockout.max_attempts)
            .with_detail("lockout_minutes", lockout.lockout_minutes);
        Ok(thresholds(assessment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::check;
    use netaudit_core::{Config, DetailValue, Status};

    // --- aaa-servers ---

    #[test]
    fn tacacs_or_radius_is_enough() {
        let a = check(&AaaServers, "aaa new-model\ntacacs server ISE\n address ipv4 192.0.2.5\n!\n");
        assert_eq!(a.status, Status::Compliant);
        assert_eq!(a.evidence, vec!["tacacs server ISE"]);
        assert_eq!(a.details.get("aaa_new_model"), Some(&DetailValue::Bool(true)));

        let a = check(&AaaServers, "radius-server host 192.0.2.6 key 7 0822455D0A16\n");
        assert_eq!(a.status, Status::Compliant);
    }

    #[test]
    fn no_servers_fails() {
        assert_eq!(check(&AaaServers, "hostname R1\n").status, Status::NonCompliant);
    }

    // --- default-accounts ---

    #[test]
    fn default_names_are_flagged() {
        let a = check(
            &DefaultAccounts::new(),
            "username admin privilege 15 secret 9 $9$abc\nusername noc secret 9 $9$def\n",
        );
        assert_eq!(a.status, Status::NonCompliant);
        assert_eq!(a.evidence, vec!["username admin privilege 15"]);
    }

    #[test]
    fn custom_names_replace_defaults() {
        let a = check(&DefaultAccounts::new().names(["noc"]), "username admin secret 5 $1$x\n");
        assert_eq!(a.status, Status::Compliant);
    }

    #[test]
    fn no_local_accounts_is_not_applicable() {
        let a = check(&DefaultAccounts::new(), "aaa new-model\n");
        assert_eq!(a.status, Status::NotApplicable);
    }

    // --- password-policy ---

    #[test]
    fn encryption_and_length_pass() {
        let a = check(
            &PasswordPolicy::new(),
            "service password-encryption\nsecurity passwords min-length 10\n",
        );
        assert_eq!(a.status, Status::Compliant);
        assert_eq!(a.details.get("min_length"), Some(&DetailValue::Int(10)));
    }

    #[test]
    fn short_minimum_fails() {
        let a = check(
            &PasswordPolicy::new(),
            "service password-encryption\nsecurity passwords min-length 6\n",
        );
        assert_eq!(a.status, Status::NonCompliant);
        assert_eq!(a.evidence[0], "password min-length 6 is below 8");
    }

    #[test]
    fn missing_encryption_fails() {
        let a = check(&PasswordPolicy::new(), "security passwords min-length 12\n");
        assert_eq!(a.status, Status::NonCompliant);
        assert_eq!(a.evidence[0], "no service password-encryption");
    }

    // --- account-lockout ---

    #[test]
    fn lockout_within_thresholds_passes() {
        let a = check(&AccountLockout::new(), "login block-for 5 attempts 3 within 120\n");
        assert_eq!(a.status, Status::Compliant);
        assert_eq!(a.details.get("attempts"), Some(&DetailValue::Int(3)));
        assert_eq!(a.details.get("threshold_attempts"), Some(&DetailValue::Int(5)));
        assert!(a.evidence.contains(&"attempts 3 (5 allowed at most)".to_string()));
    }

    #[test]
    fn too_many_attempts_fails() {
        let a = check(&AccountLockout::new(), "login block-for 2 attempts 10 within 120\n");
        assert_eq!(a.status, Status::NonCompliant);
        assert_eq!(a.details.get("lockout_minutes"), Some(&DetailValue::Int(2)));
    }

    #[test]
    fn missing_lockout_fails() {
        let a = check(&AccountLockout::new(), "hostname R1\n");
        assert_eq!(a.status, Status::NonCompliant);
        assert_eq!(a.evidence, vec!["no login block-for directive"]);
    }

    #[test]
    fn lockout_thresholds_from_config() {
        let config = Config::parse(
            "[rules.account-lockout]\nmax_attempts = 10\nmin_lockout_minutes = 1\n",
        )
        .expect("parses");
        let rule = AccountLockout::from_config(config.rule_config("account-lockout").expect("present"));
        let a = check(&rule, "login block-for 2 attempts 10 within 120\n");
        assert_eq!(a.status, Status::Compliant);
    }
}
