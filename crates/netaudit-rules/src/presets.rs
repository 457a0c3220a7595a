//! Rule presets for common device roles.

use netaudit_core::{Category, Config, RuleBox, RuleConfig};

use crate::{
    AaaServers, AccountLockout, ArpInspection, BgpAuthentication, BgpBogonFilter, BgpPrefixLimit,
    BgpPrivateAs, BgpTcpFilter, BpduGuard, CentralizedLogging, ConfigBackup, CredentialStrength,
    DefaultAccounts, DhcpSnooping, DisableHttp, DisableTelnet, Dot1x, FhrpAuthentication,
    FirmwareVersion, IgpAuthentication, ManagementAcl, ManagementInterface, NtpServer,
    PasswordPolicy, PortIsolation, PortSecurity, RouteFiltering, SessionTimeout,
    SnmpDefaultCommunity, SnmpHostRestriction, SnmpReadOnly, SnmpV3, SshVersion2,
    UnusedPortsShutdown, Vlan1OnPorts, VrfSeparation,
};

/// Preset rule selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Every rule.
    #[default]
    Full,
    /// Access and distribution switches.
    Switching,
    /// Routers and layer-3 edges.
    Routing,
    /// Management-plane checks only.
    Management,
}

impl Preset {
    /// Names accepted by [`Preset::parse`].
    pub const NAMES: &'static [&'static str] = &["full", "switching", "routing", "management"];

    /// Parses a preset name (case-insensitive).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "full" => Some(Self::Full),
            "switching" => Some(Self::Switching),
            "routing" => Some(Self::Routing),
            "management" => Some(Self::Management),
            _ => None,
        }
    }

    /// Categories selected by this preset.
    #[must_use]
    pub fn categories(self) -> &'static [Category] {
        use Category::{
            Accounts, Bgp, Interfaces, Layer2, Management, Monitoring, Platform, Routing, Snmp,
        };
        match self {
            Self::Full => &[
                Platform, Interfaces, Layer2, Routing, Bgp, Management, Accounts, Monitoring, Snmp,
            ],
            Self::Switching => &[Platform, Interfaces, Layer2, Management, Accounts, Monitoring, Snmp],
            Self::Routing => &[Platform, Routing, Bgp, Management, Accounts, Monitoring, Snmp],
            Self::Management => &[Management, Accounts, Monitoring, Snmp],
        }
    }

    /// Returns the rules of this preset with default thresholds.
    #[must_use]
    pub fn rules(self) -> Vec<RuleBox> {
        configured_rules(self, &Config::new())
    }
}

/// Returns every rule in catalog order with default thresholds.
#[must_use]
pub fn all_rules() -> Vec<RuleBox> {
    Preset::Full.rules()
}

/// Returns the rules of `preset` in catalog order, with thresholds taken
/// from the `[rules.<name>]` tables of `config`.
///
/// Disabled rules are still returned; the auditor skips them.
#[must_use]
pub fn configured_rules(preset: Preset, config: &Config) -> Vec<RuleBox> {
    let fallback = RuleConfig::default();
    let options = |name: &str| config.rule_config(name).unwrap_or(&fallback);

    let catalog: Vec<RuleBox> = vec![
        Box::new(FirmwareVersion),
        Box::new(UnusedPortsShutdown),
        Box::new(Vlan1OnPorts),
        Box::new(ArpInspection),
        Box::new(PortSecurity),
        Box::new(Dot1x),
        Box::new(BpduGuard),
        Box::new(PortIsolation),
        Box::new(DhcpSnooping),
        Box::new(FhrpAuthentication),
        Box::new(IgpAuthentication),
        Box::new(BgpAuthentication),
        Box::new(CredentialStrength),
        Box::new(RouteFiltering),
        Box::new(BgpBogonFilter::from_config(options("bgp-bogon-filter"))),
        Box::new(BgpPrefixLimit::from_config(options("bgp-prefix-limit"))),
        Box::new(BgpPrivateAs),
        Box::new(BgpTcpFilter),
        Box::new(VrfSeparation),
        Box::new(ConfigBackup::from_config(options("config-backup"))),
        Box::new(AaaServers),
        Box::new(DefaultAccounts::from_config(options("default-accounts"))),
        Box::new(PasswordPolicy::from_config(options("password-policy"))),
        Box::new(AccountLockout::from_config(options("account-lockout"))),
        Box::new(ManagementInterface),
        Box::new(SshVersion2),
        Box::new(DisableTelnet),
        Box::new(DisableHttp),
        Box::new(SessionTimeout::from_config(options("session-timeout"))),
        Box::new(ManagementAcl),
        Box::new(NtpServer),
        Box::new(CentralizedLogging),
        Box::new(SnmpV3),
        Box::new(SnmpReadOnly),
        Box::new(SnmpDefaultCommunity),
        Box::new(SnmpHostRestriction),
    ];

    let categories = preset.categories();
    catalog
        .into_iter()
        .filter(|rule| categories.contains(&rule.category()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn catalog_is_complete_and_unique() {
        let rules = all_rules();
        assert_eq!(rules.len(), 36);

        let names: HashSet<&str> = rules.iter().map(|r| r.name()).collect();
        let codes: HashSet<&str> = rules.iter().map(|r| r.code()).collect();
        assert_eq!(names.len(), rules.len());
        assert_eq!(codes.len(), rules.len());
    }

    #[test]
    fn catalog_is_in_code_order() {
        let codes: Vec<&str> = all_rules().iter().map(|r| r.code()).collect();
        let mut sorted = codes.clone();
        sorted.sort_unstable();
        assert_eq!(codes, sorted);
    }

    #[test]
    fn presets_select_by_category() {
        let switching = Preset::Switching.rules();
        assert!(switching.iter().all(|r| r.category() != Category::Bgp));
        assert!(switching.iter().any(|r| r.name() == "dhcp-snooping"));

        let routing = Preset::Routing.rules();
        assert!(routing.iter().all(|r| r.category() != Category::Layer2));
        assert!(routing.iter().any(|r| r.name() == "bgp-prefix-limit"));

        let management = Preset::Management.rules();
        assert!(management.iter().all(|r| Preset::Management.categories().contains(&r.category())));
        assert!(management.len() < switching.len());
    }

    #[test]
    fn preset_names_round_trip() {
        for name in Preset::NAMES {
            assert!(Preset::parse(name).is_some(), "{name}");
        }
        assert_eq!(Preset::parse("Routing"), Some(Preset::Routing));
        assert_eq!(Preset::parse("strict"), None);
        assert_eq!(Preset::default(), Preset::Full);
    }

    #[test]
    fn configured_thresholds_are_applied() {
        let config = Config::parse("[rules.session-timeout]\nmax_minutes = 60\n").expect("parses");
        let rules = configured_rules(Preset::Management, &config);
        let timeout = rules
            .iter()
            .find(|r| r.name() == "session-timeout")
            .expect("present");

        let doc = netaudit_core::Document::parse("line vty 0 4\n exec-timeout 30 0\n!\n");
        let assessment = timeout.evaluate(&doc).expect("evaluates");
        assert_eq!(assessment.status, netaudit_core::Status::Compliant);
    }
}
