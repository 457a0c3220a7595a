//! BGP route and session hygiene.

use regex::Regex;
use tracing::debug;

use netaudit_core::facts::{AclAction, AsPathEntry, Direction, FilterKind, Neighbor};
use netaudit_core::{Assessment, Document, Rule, RuleConfig, RuleError};

const NO_BGP: &str = "no router bgp block";

/// Prefixes that must never be accepted or advertised.
pub const DEFAULT_BOGONS: &[&str] = &[
    "10.0.0.0/8",
    "172.16.0.0/12",
    "192.168.0.0/16",
    "fc00::/7",
    "0.0.0.0/0 ge 25 le 32",
    "::/0 ge 49 le 128",
];

/// Private AS numbers probed against AS-path patterns.
const PRIVATE_AS_SAMPLES: &[u32] = &[64512, 64999, 65000, 65001, 65534, 65535];

fn active_neighbors(doc: &Document) -> impl Iterator<Item = &Neighbor> {
    doc.bgp()
        .into_iter()
        .flat_map(|bgp| bgp.neighbors.values())
        .filter(|n| !n.shutdown)
}

/// A prefix with the range of lengths it matches.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PrefixRange {
    network: String,
    length: u8,
    shortest: u8,
    longest: u8,
}

impl PrefixRange {
    fn new(prefix: &str, ge: Option<u8>, le: Option<u8>) -> Option<Self> {
        let (network, length) = prefix.split_once('/')?;
        let length: u8 = length.parse().ok()?;
        let max = if network.contains(':') { 128 } else { 32 };
        let (shortest, longest) = match (ge, le) {
            (None, None) => (length, length),
            (Some(ge), None) => (ge, max),
            (None, Some(le)) => (length, le),
            (Some(ge), Some(le)) => (ge, le),
        };
        Some(Self {
            network: network.to_ascii_lowercase(),
            length,
            shortest,
            longest,
        })
    }

    /// Parses `"10.0.0.0/8"`, `"0.0.0.0/0 ge 25 le 32"` and similar.
    fn parse(spec: &str) -> Option<Self> {
        let mut tokens = spec.split_whitespace();
        let prefix = tokens.next()?;
        let (mut ge, mut le) = (None, None);
        while let Some(keyword) = tokens.next() {
            let value = tokens.next()?.parse().ok()?;
            match keyword.to_ascii_lowercase().as_str() {
                "ge" => ge = Some(value),
                "le" => le = Some(value),
                _ => return None,
            }
        }
        Self::new(prefix, ge, le)
    }

    fn covers(&self, other: &Self) -> bool {
        self.network == other.network
            && self.length <= other.length
            && self.shortest <= other.shortest
            && self.longest >= other.longest
    }
}

/// Requires every bogon prefix to be denied by some prefix list.
#[derive(Debug, Clone)]
pub struct BgpBogonFilter {
    prefixes: Vec<String>,
}

impl Default for BgpBogonFilter {
    fn default() -> Self {
        Self::new()
    }
}

impl BgpBogonFilter {
    /// Creates a new rule with the default bogon list.
    #[must_use]
    pub fn new() -> Self {
        Self {
            prefixes: DEFAULT_BOGONS.iter().map(ToString::to_string).collect(),
        }
    }

    /// Replaces the required prefixes (`"0.0.0.0/0 ge 25 le 32"` style).
    #[must_use]
    pub fn prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Reads the `prefixes` option.
    #[must_use]
    pub fn from_config(config: &RuleConfig) -> Self {
        let prefixes = config.get_str_array("prefixes");
        if prefixes.is_empty() {
            Self::new()
        } else {
            Self::new().prefixes(prefixes)
        }
    }

    /// Finds a prefix list with a deny entry whose range covers `spec`.
    fn denying_list<'a>(doc: &'a Document, spec: &str) -> Option<&'a str> {
        let Some(wanted) = PrefixRange::parse(spec) else {
            debug!("bogon prefix `{spec}` not understood");
            return None;
        };
        doc.prefix_lists.iter().find_map(|(name, entries)| {
            entries
                .iter()
                .filter(|e| e.action == AclAction::Deny)
                .filter_map(|e| PrefixRange::new(&e.prefix, e.ge, e.le))
                .any(|range| range.covers(&wanted))
                .then_some(name.as_str())
        })
    }
}

impl Rule for BgpBogonFilter {
    rule_identity!(
        "NA421",
        "bgp-bogon-filter",
        Bgp,
        "Invalid address ranges are filtered from BGP"
    );

    fn is_applicable(&self, doc: &Document) -> bool {
        doc.bgp().is_some()
    }

    fn not_applicable_reason(&self) -> &'static str {
        NO_BGP
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let mut denied = Vec::new();
        let mut missing = Vec::new();
        for spec in &self.prefixes {
            match Self::denying_list(doc, spec) {
                Some(list) => denied.push(format!("prefix-list {list} denies {spec}")),
                None => missing.push(spec.clone()),
            }
        }

        let required = self.prefixes.len();
        Ok(if missing.is_empty() {
            Assessment::compliant().with_evidence_lines(denied)
        } else {
            Assessment::non_compliant()
                .with_evidence_lines(missing.iter().map(|p| format!("not denied: {p}")))
                .with_detail("missing", missing)
        }
        .with_detail("required", required))
    }
}

/// Requires `maximum-prefix` at or below a limit on every active neighbor.
///
/// # Configuration
///
/// - `limit`: highest accepted `maximum-prefix` value (default: 100)
#[derive(Debug, Clone)]
pub struct BgpPrefixLimit {
    limit: u32,
}

impl Default for BgpPrefixLimit {
    fn default() -> Self {
        Self::new()
    }
}

impl BgpPrefixLimit {
    /// Creates a new rule with the default limit of 100.
    #[must_use]
    pub fn new() -> Self {
        Self { limit: 100 }
    }

    /// Sets the highest accepted limit.
    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    /// Reads the `limit` option.
    #[must_use]
    pub fn from_config(config: &RuleConfig) -> Self {
        let rule = Self::new();
        let limit = config.get_u32("limit", rule.limit);
        rule.limit(limit)
    }
}

impl Rule for BgpPrefixLimit {
    rule_identity!(
        "NA422",
        "bgp-prefix-limit",
        Bgp,
        "Every BGP neighbor has a prefix limit"
    );

    fn is_applicable(&self, doc: &Document) -> bool {
        doc.bgp().is_some()
    }

    fn not_applicable_reason(&self) -> &'static str {
        NO_BGP
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let bgp = doc
            .bgp()
            .ok_or_else(|| RuleError::MissingFact("router bgp".to_string()))?;
        let mut findings = Vec::new();
        let mut limited = Vec::new();
        for neighbor in bgp.neighbors.values().filter(|n| !n.shutdown) {
            match neighbor.maximum_prefix {
                None => findings.push(format!("neighbor {}: no maximum-prefix", neighbor.address)),
                Some(max) if max > self.limit => findings.push(format!(
                    "neighbor {}: maximum-prefix {max} exceeds {}",
                    neighbor.address, self.limit
                )),
                Some(max) => limited.push(format!("neighbor {}: maximum-prefix {max}", neighbor.address)),
            }
        }

        let assessment = if findings.is_empty() {
            if limited.is_empty() {
                Assessment::compliant().with_evidence("no active BGP neighbors")
            } else {
                Assessment::compliant().with_evidence_lines(limited)
            }
        } else {
            Assessment::non_compliant().with_evidence_lines(findings)
        };
        Ok(assessment.with_detail("threshold", self.limit))
    }
}

/// Requires private AS numbers to be stripped or filtered outbound.
///
/// `remove-private-as` on any neighbor satisfies the rule on its own.
/// Otherwise an outbound `filter-list` must reference an AS-path list whose
/// deny entries match a private AS number.
#[derive(Debug, Clone, Copy, Default)]
pub struct BgpPrivateAs;

impl BgpPrivateAs {
    /// Compiles an IOS AS-path pattern; `_` matches a path delimiter.
    fn as_path_regex(pattern: &str) -> Option<Regex> {
        let translated = pattern.replace('_', r"(?:^|$|[\s,{}()])");
        match Regex::new(&translated) {
            Ok(re) => Some(re),
            Err(e) => {
                debug!("as-path pattern `{pattern}` not usable: {e}");
                None
            }
        }
    }

    fn matches_private_as(entry: &AsPathEntry) -> bool {
        Self::as_path_regex(&entry.pattern).is_some_and(|re| {
            PRIVATE_AS_SAMPLES
                .iter()
                .any(|asn| re.is_match(&asn.to_string()))
        })
    }
}

impl Rule for BgpPrivateAs {
    rule_identity!(
        "NA423",
        "bgp-private-as",
        Bgp,
        "Private AS numbers are not advertised"
    );

    fn is_applicable(&self, doc: &Document) -> bool {
        doc.bgp().is_some()
    }

    fn not_applicable_reason(&self) -> &'static str {
        NO_BGP
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let stripping: Vec<String> = active_neighbors(doc)
            .filter(|n| n.remove_private_as)
            .map(|n| format!("neighbor {} remove-private-as", n.address))
            .collect();
        if !stripping.is_empty() {
            return Ok(Assessment::compliant()
                .with_evidence_lines(stripping)
                .with_detail("method", "remove-private-as"));
        }

        let filtering: Vec<String> = active_neighbors(doc)
            .flat_map(|n| n.filters.iter().map(move |f| (n, f)))
            .filter(|(_, f)| f.kind == FilterKind::FilterList && f.direction == Direction::Out)
            .filter(|(_, f)| {
                doc.as_path_lists.get(&f.name).is_some_and(|entries| {
                    entries
                        .iter()
                        .any(|e| e.action == AclAction::Deny && Self::matches_private_as(e))
                })
            })
            .map(|(n, f)| format!("neighbor {} filter-list {} out", n.address, f.name))
            .collect();
        if !filtering.is_empty() {
            return Ok(Assessment::compliant()
                .with_evidence_lines(filtering)
                .with_detail("method", "filter-list"));
        }

        let leaking: Vec<String> = doc
            .as_path_lists
            .iter()
            .flat_map(|(name, entries)| entries.iter().map(move |e| (name, e)))
            .filter(|(_, e)| e.action == AclAction::Permit && Self::matches_private_as(e))
            .map(|(name, e)| format!("ip as-path access-list {name} permit {}", e.pattern))
            .collect();

        Ok(Assessment::non_compliant()
            .with_evidence("no remove-private-as and no outbound private-AS filter")
            .with_evidence_lines(leaking))
    }
}

/// Requires an ACL entry that matches BGP's TCP port 179.
#[derive(Debug, Clone, Copy, Default)]
pub struct BgpTcpFilter;

impl Rule for BgpTcpFilter {
    rule_identity!(
        "NA424",
        "bgp-tcp-filter",
        Bgp,
        "TCP port 179 is filtered by an access list"
    );

    fn is_applicable(&self, doc: &Document) -> bool {
        doc.bgp().is_some()
    }

    fn not_applicable_reason(&self) -> &'static str {
        NO_BGP
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let entries: Vec<String> = doc
            .acls
            .iter()
            .flat_map(|(id, entries)| entries.iter().map(move |e| (id, e)))
            .filter(|(_, e)| e.protocol.eq_ignore_ascii_case("tcp") && e.matches_port(&["179", "bgp"]))
            .map(|(id, e)| format!("access-list {id}: {e}"))
            .collect();

        Ok(if entries.is_empty() {
            Assessment::non_compliant().with_evidence("no access-list entry matches tcp port 179")
        } else {
            Assessment::compliant().with_evidence_lines(entries)
        })
    }
}
