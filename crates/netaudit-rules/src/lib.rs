//! # netaudit-rules
//!
//! Built-in compliance rules for netaudit.
//!
//! Rules are grouped by family; every rule reads a resolved
//! [`Document`](netaudit_core::Document) and never the raw capture.
//!
//! ## Available Rules
//!
//! | Code | Name | Checks |
//! |------|------|--------|
//! | NA110 | `firmware-version` | Firmware version is identified |
//! | NA210 | `unused-ports-shutdown` | Down ports are administratively shut down |
//! | NA310 | `vlan1-on-ports` | VLAN 1 is not used on access or trunk ports |
//! | NA321 | `arp-inspection` | Dynamic ARP inspection is enabled |
//! | NA322 | `port-security` | Port security is configured |
//! | NA323 | `dot1x` | 802.1X is enabled |
//! | NA324 | `bpdu-guard` | PortFast ports have BPDU guard |
//! | NA325 | `port-isolation` | Access ports are protected |
//! | NA330 | `dhcp-snooping` | DHCP snooping is enabled |
//! | NA411 | `fhrp-authentication` | HSRP/VRRP/GLBP groups authenticate |
//! | NA412 | `igp-authentication` | IGPs authenticate |
//! | NA413 | `bgp-authentication` | BGP sessions authenticate |
//! | NA414 | `credential-strength` | Routing credentials use strong digests |
//! | NA415 | `route-filtering` | End-user interfaces filter routing updates |
//! | NA421 | `bgp-bogon-filter` | Invalid prefixes are denied |
//! | NA422 | `bgp-prefix-limit` | Neighbors have a prefix limit |
//! | NA423 | `bgp-private-as` | Private AS numbers are not advertised |
//! | NA424 | `bgp-tcp-filter` | TCP/179 is filtered |
//! | NA430 | `vrf-separation` | Public and management interfaces are in VRFs |
//! | NA510 | `config-backup` | Configuration is archived remotely |
//! | NA521 | `aaa-servers` | TACACS+ or RADIUS is configured |
//! | NA522 | `default-accounts` | No default-named local accounts |
//! | NA524 | `password-policy` | Passwords are encrypted with a minimum length |
//! | NA525 | `account-lockout` | Login lockout is configured |
//! | NA531 | `management-interface` | A dedicated management interface exists |
//! | NA532 | `ssh-version-2` | SSH is restricted to version 2 |
//! | NA533 | `disable-telnet` | Telnet is disabled on vty lines |
//! | NA534 | `disable-http` | The HTTP server is disabled |
//! | NA535 | `session-timeout` | Sessions time out |
//! | NA536 | `management-acl` | Management access is IP-restricted |
//! | NA610 | `ntp-server` | An NTP server is configured |
//! | NA620 | `centralized-logging` | Logs go to a collector |
//! | NA631 | `snmp-v3` | SNMPv3 is used |
//! | NA632 | `snmp-read-only` | SNMP communities are read-only |
//! | NA633 | `snmp-default-community` | No default SNMP communities |
//! | NA634 | `snmp-host-restriction` | SNMP traps go to known hosts |
//!
//! ## Usage
//!
//! ```ignore
//! use netaudit_core::Auditor;
//! use netaudit_rules::all_rules;
//!
//! let auditor = Auditor::builder()
//!     .rules(all_rules())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Implements the identity methods of [`Rule`](netaudit_core::Rule).
macro_rules! rule_identity {
    ($code:literal, $name:literal, $category:ident, $title:literal) => {
        fn name(&self) -> &'static str {
            $name
        }

        fn code(&self) -> &'static str {
            $code
        }

        fn title(&self) -> &'static str {
            $title
        }

        fn category(&self) -> netaudit_core::Category {
            netaudit_core::Category::$category
        }
    };
}

mod accounts;
mod backup;
mod bgp_hygiene;
mod firmware;
mod interfaces;
mod layer2;
mod management_access;
mod monitoring;
mod presets;
mod route_filter;
mod routing_auth;
mod snmp;
mod vrf;

pub use accounts::{AaaServers, AccountLockout, DefaultAccounts, PasswordPolicy};
pub use backup::ConfigBackup;
pub use bgp_hygiene::{BgpBogonFilter, BgpPrefixLimit, BgpPrivateAs, BgpTcpFilter};
pub use firmware::FirmwareVersion;
pub use interfaces::{UnusedPortsShutdown, Vlan1OnPorts};
pub use layer2::{ArpInspection, BpduGuard, DhcpSnooping, Dot1x, PortIsolation, PortSecurity};
pub use management_access::{
    DisableHttp, DisableTelnet, ManagementAcl, ManagementInterface, SessionTimeout, SshVersion2,
};
pub use monitoring::{CentralizedLogging, NtpServer};
pub use presets::{all_rules, configured_rules, Preset};
pub use route_filter::RouteFiltering;
pub use routing_auth::{BgpAuthentication, CredentialStrength, FhrpAuthentication, IgpAuthentication};
pub use snmp::{SnmpDefaultCommunity, SnmpHostRestriction, SnmpReadOnly, SnmpV3};
pub use vrf::VrfSeparation;

/// Re-export core types for convenience.
pub use netaudit_core::{Assessment, Category, Document, Rule, Severity, Status};

#[cfg(test)]
pub(crate) mod test_support {
    use netaudit_core::{Assessment, Document, Rule};

    /// Parses `text` and evaluates `rule` the way the auditor does.
    pub fn check(rule: &dyn Rule, text: &str) -> Assessment {
        let doc = Document::parse(text);
        if rule.is_applicable(&doc) {
            rule.evaluate(&doc).expect("rule should evaluate")
        } else {
            Assessment::not_applicable(rule.not_applicable_reason())
        }
    }
}
