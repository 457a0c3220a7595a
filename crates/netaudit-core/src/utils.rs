//! Small helpers shared by the tokenizer, extractors and resolver.

use regex::Regex;
use std::collections::BTreeSet;

/// Highest VLAN ID accepted on IOS.
pub const MAX_VLAN: u16 = 4094;

/// Compiles a pattern literal.
///
/// Only called from `LazyLock` initializers with patterns written in this crate.
#[allow(clippy::expect_used)]
pub(crate) fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern must compile")
}

/// Returns the number of leading whitespace characters of `line`.
pub(crate) fn indent_of(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Matches a possibly abbreviated IOS command against its canonical words.
///
/// Each typed word must be a prefix of the corresponding canonical word, so
/// `sh ip int br` matches `["show", "ip", "interface", "brief"]`. Anything
/// after an output pipe (`| include ...`) is ignored.
#[must_use]
pub fn command_matches(command: &str, canonical: &[&str]) -> bool {
    let command = command.split('|').next().unwrap_or_default();
    let words: Vec<&str> = command.split_whitespace().collect();
    words.len() >= canonical.len()
        && canonical.iter().zip(&words).all(|(full, word)| {
            full.get(..word.len())
                .is_some_and(|prefix| prefix.eq_ignore_ascii_case(word))
        })
}

/// Parses an IOS VLAN list such as `1,10-20,30`.
///
/// `all` expands to every VLAN and `none` to the empty set. Returns `None`
/// when any component is malformed or outside `1..=4094`.
#[must_use]
pub fn parse_vlan_list(text: &str) -> Option<BTreeSet<u16>> {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    if compact.eq_ignore_ascii_case("all") {
        return Some((1..=MAX_VLAN).collect());
    }
    if compact.eq_ignore_ascii_case("none") {
        return Some(BTreeSet::new());
    }

    let mut vlans = BTreeSet::new();
    for part in compact.split(',').filter(|p| !p.is_empty()) {
        let (start, end) = match part.split_once('-') {
            Some((a, b)) => (parse_vlan(a)?, parse_vlan(b)?),
            None => {
                let v = parse_vlan(part)?;
                (v, v)
            }
        };
        if start > end {
            return None;
        }
        vlans.extend(start..=end);
    }

    if vlans.is_empty() {
        None
    } else {
        Some(vlans)
    }
}

fn parse_vlan(text: &str) -> Option<u16> {
    text.parse::<u16>()
        .ok()
        .filter(|v| (1..=MAX_VLAN).contains(v))
}

/// Formats a VLAN set back into the compact IOS range notation.
#[must_use]
pub fn format_vlan_list(vlans: &BTreeSet<u16>) -> String {
    let mut ranges: Vec<String> = Vec::new();
    let mut iter = vlans.iter().copied().peekable();
    while let Some(start) = iter.next() {
        let mut end = start;
        while iter.peek() == Some(&(end + 1)) {
            end += 1;
            iter.next();
        }
        if start == end {
            ranges.push(start.to_string());
        } else {
            ranges.push(format!("{start}-{end}"));
        }
    }
    ranges.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviated_show_commands_match() {
        let canonical = ["show", "ip", "interface", "brief"];
        assert!(command_matches("sh ip int br", &canonical));
        assert!(command_matches("show ip interface brief | ex unassigned", &canonical));
        assert!(!command_matches("show ip route", &canonical));
        assert!(!command_matches("show ip", &canonical));
    }

    #[test]
    fn vlan_list_ranges_and_commas() {
        let vlans = parse_vlan_list("1,10-12, 30").expect("valid list");
        assert_eq!(vlans.into_iter().collect::<Vec<_>>(), vec![1, 10, 11, 12, 30]);
    }

    #[test]
    fn vlan_list_keywords() {
        assert_eq!(parse_vlan_list("all").map(|v| v.len()), Some(4094));
        assert_eq!(parse_vlan_list("none"), Some(BTreeSet::new()));
    }

    #[test]
    fn vlan_list_rejects_garbage() {
        assert!(parse_vlan_list("10-x").is_none());
        assert!(parse_vlan_list("5000").is_none());
        assert!(parse_vlan_list("20-10").is_none());
        assert!(parse_vlan_list("").is_none());
    }

    #[test]
    fn vlan_list_formats_ranges() {
        let vlans = parse_vlan_list("1,2,3,10,20-21").expect("valid list");
        assert_eq!(format_vlan_list(&vlans), "1-3,10,20-21");
    }
}
