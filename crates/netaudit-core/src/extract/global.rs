//! Top-level directives.
//!
//! Every global line is tested against the whole pattern table, so one line
//! can contribute to several fact groups (a `username ... secret` line is both
//! an account and a sensitive-keyword sighting).

use regex::{Captures, Regex};
use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;
use std::sync::LazyLock;

use super::acl::{as_path_entry, parse_numbered_acl, parse_prefix_list_entry};
use super::parse_number;
use super::show::{detect_firmware, merge_firmware};
use crate::block::Block;
use crate::document::Document;
use crate::facts::{
    AclEntry, Anomaly, AsPathEntry, Backup, Firmware, LocalAccount, Lockout,
    PolicyPattern, PolicySighting, PrefixListEntry, Resolution, SnmpCommunity, SnmpPermission,
    SourceBinding,
};
use crate::facts::{Aaa, Layer2, Monitoring, Services, Snmp};
use crate::utils::{compile, parse_vlan_list};

type Apply = fn(&Captures<'_>, &str, &mut GlobalFacts);

struct GlobalPattern {
    regex: Regex,
    apply: Apply,
}

fn pattern(regex: &str, apply: Apply) -> GlobalPattern {
    GlobalPattern {
        regex: compile(&format!("(?i){regex}")),
        apply,
    }
}

static PATTERNS: LazyLock<Vec<GlobalPattern>> = LazyLock::new(|| {
    vec![
        pattern(r"^hostname\s+(\S+)", |c, _, f| {
            f.hostname.get_or_insert_with(|| c[1].to_string());
        }),
        // Lists referenced from elsewhere
        pattern(r"^access-list\s+(\S+)\s+(.*)$", |c, _, f| {
            let entry = parse_numbered_acl(&c[1], &c[2]);
            let list = f.acls.entry(c[1].to_string()).or_default();
            list.extend(entry);
        }),
        pattern(r"^ip(?:v6)?\s+prefix-list\s+(\S+)\s+(.*)$", |c, _, f| {
            let entry = parse_prefix_list_entry(&c[2]);
            f.prefix_lists
                .entry(c[1].to_string())
                .or_default()
                .extend(entry);
        }),
        pattern(
            r"^ip\s+as-path\s+access-list\s+(\S+)\s+(permit|deny)\s+(.*)$",
            |c, _, f| {
                let entry = as_path_entry(&c[2], &c[3]);
                f.as_path_lists
                    .entry(c[1].to_string())
                    .or_default()
                    .extend(entry);
            },
        ),
        pattern(r"^route-map\s+(\S+)", |c, _, f| {
            *f.route_maps.entry(c[1].to_string()).or_default() += 1;
        }),
        pattern(r"^(?:vrf\s+definition|ip\s+vrf)\s+(\S+)\s*$", |c, _, f| {
            f.vrfs.insert(c[1].to_string());
        }),
        // SNMP
        pattern(r"^snmp-server\b", |_, _, f| f.snmp.is_configured = true),
        pattern(r"^snmp-server\s+community\s+(\S+)(.*)$", |c, _, f| {
            f.snmp.communities.push(community(&c[1], &c[2]));
        }),
        pattern(r"^snmp-server\s+group\s+(\S+)\s+v3\b", |c, _, f| {
            f.snmp.groups_v3.push(c[1].to_string());
        }),
        pattern(r"^snmp-server\s+host\s+(\S+)", |c, _, f| {
            if let Ok(ip) = c[1].parse::<IpAddr>() {
                f.snmp.hosts.push(ip);
            }
        }),
        // AAA and accounts
        pattern(r"^aaa\s+new-model\b", |_, _, f| f.aaa.new_model = true),
        pattern(r"^(?:tacacs\s+server|tacacs-server\s+host)\s+(\S+)", |c, _, f| {
            f.aaa.tacacs_servers.push(c[1].to_string());
        }),
        pattern(r"^(?:radius\s+server|radius-server\s+host)\s+(\S+)", |c, _, f| {
            f.aaa.radius_servers.push(c[1].to_string());
        }),
        pattern(r"^username\s+(\S+)(.*)$", |c, line, f| {
            let account = account(&c[1], &c[2], line, &mut f.anomalies);
            f.aaa.usernames.insert(account.name.clone());
            f.aaa.accounts.push(account);
        }),
        pattern(r"^service\s+password-encryption\b", |_, line, f| {
            f.sighting(PolicyPattern::PasswordEncryption, line, None);
        }),
        pattern(r"^security\s+passwords\s+min-length\s*(\S*)", |c, line, f| {
            let value = parse_number(
                Some(&c[1]).filter(|v| !v.is_empty()),
                line,
                "min-length",
                &mut f.anomalies,
            );
            f.sighting(PolicyPattern::MinLength, line, value);
        }),
        pattern(r"^aaa\s+password\s+policy\s+enable\b", |_, line, f| {
            f.sighting(PolicyPattern::AaaPolicyEnabled, line, None);
        }),
        pattern(r"^aaa\s+password\s+policy\b", |_, line, f| {
            f.sighting(PolicyPattern::AaaPolicy, line, None);
        }),
        pattern(r"^aaa\s+common-criteria\s+policy\s+\S+", |_, line, f| {
            f.sighting(PolicyPattern::CommonCriteria, line, None);
        }),
        pattern(r"\b(?:key|secret|password)\b", |_, line, f| {
            f.sighting(PolicyPattern::SensitiveKeyword, line, None);
        }),
        pattern(
            r"^login\s+block-for\s+(\S+)\s+attempts\s+(\S+)\s+within\s+(\S+)",
            |c, line, f| {
                let block_for = parse_number(Some(&c[1]), line, "block-for", &mut f.anomalies);
                let attempts = parse_number(Some(&c[2]), line, "attempts", &mut f.anomalies);
                let window = parse_number(Some(&c[3]), line, "within", &mut f.anomalies);
                if let (Some(lockout_minutes), Some(max_attempts), Some(window)) =
                    (block_for, attempts, window)
                {
                    f.aaa.lockout_config.get_or_insert(Lockout {
                        max_attempts,
                        lockout_minutes,
                        window,
                    });
                }
            },
        ),
        // Services
        pattern(r"^ip\s+ssh\s+version\s+(\S+)", |c, line, f| {
            if let Some(version) = parse_number(Some(&c[1]), line, "ssh version", &mut f.anomalies)
            {
                f.services.ssh_version.get_or_insert(version);
            }
        }),
        pattern(r"^(no\s+)?ip\s+http\s+server\b", |c, _, f| {
            f.services.http_server = Some(c.get(1).is_none());
        }),
        pattern(r"^(no\s+)?ip\s+http\s+secure-server\b", |c, _, f| {
            f.services.https_server = Some(c.get(1).is_none());
        }),
        // Switching
        pattern(r"^ip\s+dhcp\s+snooping\s*$", |_, _, f| f.layer2.dhcp_snooping = true),
        pattern(r"^ip\s+dhcp\s+snooping\s+vlan\s+(.+)$", |c, _, f| {
            f.layer2
                .dhcp_snooping_vlans
                .extend(parse_vlan_list(&c[1]).unwrap_or_default());
        }),
        pattern(r"^ip\s+arp\s+inspection\s+vlan\s+(.+)$", |c, _, f| {
            f.layer2
                .arp_inspection_vlans
                .extend(parse_vlan_list(&c[1]).unwrap_or_default());
        }),
        pattern(
            r"^ip\s+source\s+binding\s+(\S+)\s+vlan\s+(\S+)\s+(\S+)(?:\s+interface\s+(\S+))?",
            |c, line, f| {
                if let Some(vlan) = parse_number(Some(&c[2]), line, "vlan", &mut f.anomalies) {
                    f.layer2.source_bindings.push(SourceBinding {
                        mac: c[1].to_string(),
                        vlan,
                        ip: c[3].to_string(),
                        interface: c.get(4).map(|m| m.as_str().to_string()),
                    });
                }
            },
        ),
        pattern(r"^dot1x\s+system-auth-control\b", |_, _, f| {
            f.layer2.dot1x_system_auth_control = true;
        }),
        pattern(r"^spanning-tree\s+portfast\s+(?:edge\s+)?default\b", |_, _, f| {
            f.layer2.portfast_default = true;
        }),
        pattern(
            r"^spanning-tree\s+portfast\s+(?:edge\s+)?bpduguard\s+default\b",
            |_, _, f| f.layer2.bpduguard_default = true,
        ),
        pattern(r"^vlan\s+([\d,\-\s]+)$", |c, _, f| {
            f.layer2
                .vlans
                .extend(parse_vlan_list(&c[1]).unwrap_or_default());
        }),
        // Monitoring
        pattern(
            r"^ntp\s+server\s+(?:vrf\s+\S+\s+)?(?:ip\s+|ipv6\s+)?(\S+)",
            |c, _, f| f.monitoring.ntp_servers.push(c[1].to_string()),
        ),
        pattern(r"^logging\s+(?:host|server)\s+(?:ipv6\s+)?(\S+)", |c, _, f| {
            f.monitoring.logging_hosts.push(c[1].to_string());
        }),
        pattern(r"^logging\s+(\d{1,3}(?:\.\d{1,3}){3})\b", |c, _, f| {
            f.monitoring.logging_hosts.push(c[1].to_string());
        }),
        pattern(r"^(no\s+)?logging\s+on\s*$", |c, _, f| {
            f.monitoring.logging_enabled = Some(c.get(1).is_none());
        }),
        // Archive settings written on one line
        pattern(r"^archive\s+path\s+(\S+)", |c, _, f| {
            f.backup.archive_path.get_or_insert_with(|| c[1].to_string());
        }),
        pattern(r"^archive\s+time-period\s+(\S+)", |c, line, f| {
            let minutes = parse_number(Some(&c[1]), line, "time-period", &mut f.anomalies);
            set_period(&mut f.backup, minutes);
        }),
    ]
});

static ARCHIVE_PATH: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)^path\s+(\S+)"));
static ARCHIVE_PERIOD: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^time-period\s*(\S*)"));
static WRITE_MEMORY: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)^write-memory\b"));

/// Facts collected from one global block.
#[derive(Debug, Default)]
pub(super) struct GlobalFacts {
    hostname: Option<String>,
    directives: Vec<String>,
    acls: BTreeMap<String, Vec<AclEntry>>,
    prefix_lists: BTreeMap<String, Vec<PrefixListEntry>>,
    as_path_lists: BTreeMap<String, Vec<AsPathEntry>>,
    route_maps: BTreeMap<String, usize>,
    vrfs: BTreeSet<String>,
    snmp: Snmp,
    aaa: Aaa,
    backup: Backup,
    services: Services,
    layer2: Layer2,
    monitoring: Monitoring,
    firmware: Option<Firmware>,
    anomalies: Vec<Anomaly>,
}

impl GlobalFacts {
    fn sighting(&mut self, pattern: PolicyPattern, line: &str, value: Option<u32>) {
        self.aaa.password_policy_lines.push(PolicySighting {
            pattern,
            line: line.to_string(),
            value,
        });
    }

    /// Folds the fragment into the document.
    ///
    /// Single-valued settings keep their first occurrence, except the HTTP
    /// server and `logging on` toggles where the last directive wins.
    pub(super) fn merge_into(self, doc: &mut Document) {
        if doc.hostname.is_none() {
            doc.hostname = self.hostname;
        }
        doc.global_directives.extend(self.directives);
        for (id, entries) in self.acls {
            doc.acls.entry(id).or_default().extend(entries);
        }
        for (name, entries) in self.prefix_lists {
            doc.prefix_lists.entry(name).or_default().extend(entries);
        }
        for (name, entries) in self.as_path_lists {
            doc.as_path_lists.entry(name).or_default().extend(entries);
        }
        for (name, clauses) in self.route_maps {
            *doc.route_maps.entry(name).or_default() += clauses;
        }
        doc.vrfs.declared.extend(self.vrfs);

        let snmp = &mut doc.snmp;
        snmp.is_configured |= self.snmp.is_configured;
        snmp.communities.extend(self.snmp.communities);
        snmp.groups_v3.extend(self.snmp.groups_v3);
        snmp.hosts.extend(self.snmp.hosts);

        let aaa = &mut doc.aaa;
        aaa.new_model |= self.aaa.new_model;
        aaa.tacacs_servers.extend(self.aaa.tacacs_servers);
        aaa.radius_servers.extend(self.aaa.radius_servers);
        aaa.usernames.extend(self.aaa.usernames);
        aaa.accounts.extend(self.aaa.accounts);
        aaa.password_policy_lines
            .extend(self.aaa.password_policy_lines);
        if aaa.lockout_config.is_none() {
            aaa.lockout_config = self.aaa.lockout_config;
        }

        merge_backup(&mut doc.backup, self.backup);

        let services = &mut doc.services;
        services.ssh_version = services.ssh_version.or(self.services.ssh_version);
        services.http_server = self.services.http_server.or(services.http_server);
        services.https_server = self.services.https_server.or(services.https_server);

        let l2 = &mut doc.layer2;
        l2.vlans.extend(self.layer2.vlans);
        l2.dhcp_snooping |= self.layer2.dhcp_snooping;
        l2.dhcp_snooping_vlans.extend(self.layer2.dhcp_snooping_vlans);
        l2.arp_inspection_vlans
            .extend(self.layer2.arp_inspection_vlans);
        l2.source_bindings.extend(self.layer2.source_bindings);
        l2.dot1x_system_auth_control |= self.layer2.dot1x_system_auth_control;
        l2.portfast_default |= self.layer2.portfast_default;
        l2.bpduguard_default |= self.layer2.bpduguard_default;

        let monitoring = &mut doc.monitoring;
        monitoring.ntp_servers.extend(self.monitoring.ntp_servers);
        monitoring
            .logging_hosts
            .extend(self.monitoring.logging_hosts);
        monitoring.logging_enabled = self
            .monitoring
            .logging_enabled
            .or(monitoring.logging_enabled);

        if let Some(firmware) = self.firmware {
            merge_firmware(&mut doc.firmware, firmware);
        }
        doc.anomalies.extend(self.anomalies);
    }
}

/// Scans every line of a global block against the pattern table.
pub(super) fn extract_global(lines: &[String]) -> GlobalFacts {
    let mut facts = GlobalFacts::default();
    for line in lines.iter().map(String::as_str) {
        if line.is_empty() || line.starts_with('!') {
            continue;
        }
        facts.directives.push(line.to_string());
        for p in PATTERNS.iter() {
            if let Some(caps) = p.regex.captures(line) {
                (p.apply)(&caps, line, &mut facts);
            }
        }
        if let Some(firmware) = detect_firmware(line) {
            merge_firmware(&mut facts.firmware, firmware);
        }
    }
    facts
}

/// Reads an `archive` block.
pub(super) fn extract_archive(block: &Block) -> (Backup, Vec<Anomaly>) {
    let mut backup = Backup::default();
    let mut anomalies = Vec::new();
    for line in block.lines() {
        if let Some(caps) = ARCHIVE_PATH.captures(line) {
            backup
                .archive_path
                .get_or_insert_with(|| caps[1].to_string());
        } else if let Some(caps) = ARCHIVE_PERIOD.captures(line) {
            let token = Some(&caps[1]).filter(|t| !t.is_empty());
            let minutes = parse_number(token, &block.header_line, "time-period", &mut anomalies);
            set_period(&mut backup, minutes);
        } else if WRITE_MEMORY.is_match(line) {
            backup.write_memory = true;
        }
    }
    (backup, anomalies)
}

/// Merges archive settings; values already present are kept.
pub(super) fn merge_backup(into: &mut Backup, from: Backup) {
    if into.archive_path.is_none() {
        into.archive_path = from.archive_path;
    }
    if into.archive_period_minutes.is_none() {
        into.archive_period_minutes = from.archive_period_minutes;
        into.archive_period_days = from.archive_period_days;
    }
    into.write_memory |= from.write_memory;
}

fn set_period(backup: &mut Backup, minutes: Option<u32>) {
    if let (None, Some(minutes)) = (backup.archive_period_minutes, minutes) {
        backup.archive_period_minutes = Some(minutes);
        backup.archive_period_days = Some(minutes.div_ceil(24 * 60));
    }
}

fn community(name: &str, rest: &str) -> SnmpCommunity {
    let mut permission = SnmpPermission::ReadOnly;
    let mut acl = None;
    let mut words = rest.split_whitespace();
    while let Some(word) = words.next() {
        match word.to_ascii_lowercase().as_str() {
            "view" | "ipv6" => {
                words.next();
            }
            "ro" => permission = SnmpPermission::ReadOnly,
            "rw" => permission = SnmpPermission::ReadWrite,
            _ => {
                acl.get_or_insert_with(|| word.to_string());
            }
        }
    }
    SnmpCommunity {
        name: name.to_string(),
        permission,
        acl,
        acl_entries: Resolution::Pending,
    }
}

fn account(name: &str, rest: &str, line: &str, anomalies: &mut Vec<Anomaly>) -> LocalAccount {
    let words: Vec<&str> = rest.split_whitespace().collect();
    let mut privilege = None;
    let mut uses_secret = false;
    for (i, word) in words.iter().enumerate() {
        if word.eq_ignore_ascii_case("privilege") {
            privilege = parse_number(words.get(i + 1).copied(), line, "privilege", anomalies);
        } else if word.eq_ignore_ascii_case("secret") {
            uses_secret = true;
        }
    }
    LocalAccount {
        name: name.to_string(),
        privilege,
        uses_secret,
    }
}
