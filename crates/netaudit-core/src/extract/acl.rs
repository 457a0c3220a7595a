//! Access lists, prefix lists and AS-path lists.

use std::net::Ipv4Addr;

use crate::block::Block;
use crate::facts::{AclAction, AclEntry, AsPathEntry, PrefixListEntry};

/// Classifies a numbered ACL: `Some(true)` for standard ranges,
/// `Some(false)` for extended ranges, `None` for names.
fn is_standard_number(id: &str) -> Option<bool> {
    let n: u32 = id.parse().ok()?;
    match n {
        1..=99 | 1300..=1999 => Some(true),
        100..=199 | 2000..=2699 => Some(false),
        _ => None,
    }
}

/// Parses the remainder of `access-list <id> ...`.
///
/// Returns `None` for remarks and other non-entry forms.
#[must_use]
pub fn parse_numbered_acl(id: &str, rest: &str) -> Option<AclEntry> {
    let words: Vec<&str> = rest.split_whitespace().collect();
    let mut i = 0;
    if words
        .first()
        .is_some_and(|w| w.eq_ignore_ascii_case("dynamic"))
    {
        i = 2;
        if words
            .get(i)
            .is_some_and(|w| w.eq_ignore_ascii_case("timeout"))
        {
            i += 2;
        }
    }
    let action = AclAction::parse(words.get(i)?)?;
    let standard = is_standard_number(id).unwrap_or(false);
    Some(entry_from_words(None, action, &words[i + 1..], standard))
}

/// Parses one body line of a named ACL (`10 permit tcp any any eq 179`).
#[must_use]
pub fn parse_acl_entry(line: &str, standard: bool) -> Option<AclEntry> {
    let words: Vec<&str> = line.split_whitespace().collect();
    let (sequence, start) = match words.first().and_then(|w| w.parse::<u32>().ok()) {
        Some(seq) => (Some(seq), 1),
        None => (None, 0),
    };
    let action = AclAction::parse(words.get(start)?)?;
    Some(entry_from_words(sequence, action, &words[start + 1..], standard))
}

pub(super) fn extract_named_acl(extended: bool, block: &Block) -> Vec<AclEntry> {
    block
        .lines()
        .filter_map(|line| parse_acl_entry(line, !extended))
        .collect()
}

fn entry_from_words(
    sequence: Option<u32>,
    action: AclAction,
    words: &[&str],
    standard: bool,
) -> AclEntry {
    let mut cursor = Cursor { words, pos: 0 };

    if standard {
        let source = cursor.address(true).unwrap_or_default();
        return AclEntry {
            sequence,
            action,
            protocol: "ip".to_string(),
            source,
            source_port: None,
            destination: None,
            destination_port: None,
            extra: cursor.rest(),
        };
    }

    let protocol = cursor.next().unwrap_or("ip").to_ascii_lowercase();
    let source = cursor.address(false).unwrap_or_default();
    let source_port = cursor.port();
    let destination = cursor.address(false);
    let destination_port = cursor.port();
    AclEntry {
        sequence,
        action,
        protocol,
        source,
        source_port,
        destination,
        destination_port,
        extra: cursor.rest(),
    }
}

struct Cursor<'a> {
    words: &'a [&'a str],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn peek(&self) -> Option<&'a str> {
        self.words.get(self.pos).copied()
    }

    fn next(&mut self) -> Option<&'a str> {
        let word = self.peek()?;
        self.pos += 1;
        Some(word)
    }

    fn rest(&self) -> String {
        self.words.get(self.pos..).unwrap_or_default().join(" ")
    }

    fn address(&mut self, standard: bool) -> Option<String> {
        let word = self.peek()?;
        let lower = word.to_ascii_lowercase();
        match lower.as_str() {
            "any" => {
                self.pos += 1;
                Some("any".to_string())
            }
            "host" | "object-group" | "addrgroup" => {
                self.pos += 1;
                let target = self.next()?;
                Some(format!("{lower} {target}"))
            }
            _ if word.parse::<Ipv4Addr>().is_ok() => {
                self.pos += 1;
                match self.peek() {
                    Some(wildcard) if wildcard.parse::<Ipv4Addr>().is_ok() => {
                        self.pos += 1;
                        Some(format!("{word} {wildcard}"))
                    }
                    _ if standard => Some(format!("host {word}")),
                    _ => Some(word.to_string()),
                }
            }
            _ if word.contains('/') => {
                self.pos += 1;
                Some(word.to_string())
            }
            _ => None,
        }
    }

    fn port(&mut self) -> Option<String> {
        let op = self.peek()?.to_ascii_lowercase();
        let arity = match op.as_str() {
            "eq" | "neq" | "lt" | "gt" => 1,
            "range" => 2,
            _ => return None,
        };
        self.pos += 1;
        let mut parts = vec![op];
        for _ in 0..arity {
            parts.push(self.next()?.to_ascii_lowercase());
        }
        Some(parts.join(" "))
    }
}

/// Parses the remainder of `ip prefix-list <name> ...`.
pub(super) fn parse_prefix_list_entry(rest: &str) -> Option<PrefixListEntry> {
    let words: Vec<&str> = rest.split_whitespace().collect();
    let mut i = 0;
    let mut sequence = None;
    if words.first().is_some_and(|w| w.eq_ignore_ascii_case("seq")) {
        sequence = words.get(1).and_then(|w| w.parse().ok());
        i = 2;
    }
    let action = AclAction::parse(words.get(i)?)?;
    let prefix = (*words.get(i + 1)?).to_string();

    let mut ge = None;
    let mut le = None;
    let mut j = i + 2;
    while j + 1 < words.len() {
        let value = words[j + 1].parse().ok();
        if words[j].eq_ignore_ascii_case("ge") {
            ge = value;
        } else if words[j].eq_ignore_ascii_case("le") {
            le = value;
        }
        j += 2;
    }

    Some(PrefixListEntry {
        sequence,
        action,
        prefix,
        ge,
        le,
    })
}

/// Builds an AS-path entry from its action and pattern.
pub(super) fn as_path_entry(action: &str, pattern: &str) -> Option<AsPathEntry> {
    Some(AsPathEntry {
        action: AclAction::parse(action)?,
        pattern: pattern.trim().to_string(),
    })
}
