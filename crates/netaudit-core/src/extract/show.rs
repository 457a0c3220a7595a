//! Output of show commands captured next to the configuration.

use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;
use tracing::debug;

use crate::block::Block;
use crate::document::{interface_key, Document};
use crate::facts::{Firmware, LinkStatus, Platform};
use crate::utils::{command_matches, compile, parse_vlan_list};

static IOS_XE_VERSION: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)Cisco IOS[ -]XE Software.*?Version\s+([^\s,]+)"));
static IOS_VERSION: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)Cisco IOS Software.*?Version\s+([^\s,]+)"));
static PORTFAST_DEFAULT: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^Portfast(?:\s+Edge)?\s+Default\s+is\s+enabled"));
static BPDUGUARD_DEFAULT: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)^Portfast(?:\s+Edge)?\s+BPDU\s+Guard\s+Default\s+is\s+enabled")
});
static SNOOPING_ENABLED: LazyLock<Regex> =
    LazyLock::new(|| compile(r"(?i)^Switch DHCP snooping is enabled"));
static SNOOPING_VLANS: LazyLock<Regex> = LazyLock::new(|| {
    compile(r"(?i)^DHCP snooping is configured on following VLANs:\s*(\S*)")
});
static TRUSTED_ROW: LazyLock<Regex> = LazyLock::new(|| compile(r"(?i)^(\S+)\s+yes\b"));

/// Identifies the platform and version from a `show version` banner line.
#[must_use]
pub fn detect_firmware(line: &str) -> Option<Firmware> {
    if let Some(caps) = IOS_XE_VERSION.captures(line) {
        return Some(Firmware {
            platform: Platform::IosXe,
            version: caps[1].to_string(),
        });
    }
    IOS_VERSION.captures(line).map(|caps| Firmware {
        platform: Platform::Ios,
        version: caps[1].to_string(),
    })
}

/// Keeps the first identification, except that IOS-XE replaces plain IOS.
pub(super) fn merge_firmware(slot: &mut Option<Firmware>, found: Firmware) {
    match slot {
        None => *slot = Some(found),
        Some(existing)
            if existing.platform == Platform::Ios && found.platform == Platform::IosXe =>
        {
            *existing = found;
        }
        Some(_) => {}
    }
}

/// Facts read from one command output block.
#[derive(Debug, Default)]
pub(super) struct OutputFacts {
    firmware: Option<Firmware>,
    interface_status: BTreeMap<String, LinkStatus>,
    portfast_default: bool,
    bpduguard_default: bool,
    dhcp_snooping: bool,
    dhcp_snooping_vlans: BTreeSet<u16>,
    dhcp_trusted_ports: BTreeSet<String>,
}

impl OutputFacts {
    pub(super) fn merge_into(self, doc: &mut Document) {
        if let Some(firmware) = self.firmware {
            merge_firmware(&mut doc.firmware, firmware);
        }
        for (key, row) in self.interface_status {
            doc.interface_status.entry(key).or_insert(row);
        }
        let l2 = &mut doc.layer2;
        l2.portfast_default |= self.portfast_default;
        l2.bpduguard_default |= self.bpduguard_default;
        l2.dhcp_snooping |= self.dhcp_snooping;
        l2.dhcp_snooping_vlans.extend(self.dhcp_snooping_vlans);
        l2.dhcp_trusted_ports.extend(self.dhcp_trusted_ports);
    }
}

/// Dispatches on the (possibly abbreviated) command that produced the block.
pub(super) fn extract_output(command: &str, block: &Block) -> OutputFacts {
    let mut facts = OutputFacts::default();
    if command_matches(command, &["show", "version"]) {
        for found in block.lines().filter_map(detect_firmware) {
            merge_firmware(&mut facts.firmware, found);
        }
    } else if command_matches(command, &["show", "ip", "interface", "brief"]) {
        facts.interface_status = interface_brief(block);
    } else if command_matches(command, &["show", "spanning-tree", "summary"]) {
        for line in block.lines().map(str::trim) {
            facts.portfast_default |= PORTFAST_DEFAULT.is_match(line);
            facts.bpduguard_default |= BPDUGUARD_DEFAULT.is_match(line);
        }
    } else if command_matches(command, &["show", "ip", "dhcp", "snooping"]) {
        dhcp_snooping(block, &mut facts);
    } else {
        debug!("no extractor for command output `{command}`");
    }
    facts
}

fn interface_brief(block: &Block) -> BTreeMap<String, LinkStatus> {
    let mut rows = BTreeMap::new();
    for line in block.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 6 || !matches!(tokens[2].to_ascii_uppercase().as_str(), "YES" | "NO") {
            continue;
        }
        let last = tokens.len() - 1;
        let row = LinkStatus {
            interface: tokens[0].to_string(),
            ip_address: tokens[1].to_string(),
            status: tokens[4..last].join(" "),
            protocol: tokens[last].to_string(),
        };
        rows.entry(interface_key(tokens[0])).or_insert(row);
    }
    rows
}

fn dhcp_snooping(block: &Block, facts: &mut OutputFacts) {
    let lines: Vec<&str> = block.lines().map(str::trim).collect();
    for (i, line) in lines.iter().enumerate() {
        if SNOOPING_ENABLED.is_match(line) {
            facts.dhcp_snooping = true;
        } else if let Some(caps) = SNOOPING_VLANS.captures(line) {
            let inline = &caps[1];
            let list = if inline.is_empty() {
                lines.get(i + 1).copied().unwrap_or_default()
            } else {
                inline
            };
            facts
                .dhcp_snooping_vlans
                .extend(parse_vlan_list(list).unwrap_or_default());
        } else if let Some(caps) = TRUSTED_ROW.captures(line) {
            facts.dhcp_trusted_ports.insert(interface_key(&caps[1]));
        }
    }
}
