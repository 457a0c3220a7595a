//! Typed facts held by a [`Document`](crate::Document).
//!
//! Records are filled by the extractors; fields documented as resolver
//! annotations stay at their default until [`resolve`](crate::resolve) runs.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};

/// Outcome of looking up a cross-referenced fact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum Resolution<T> {
    /// Not looked up: the resolver has not run, or nothing is referenced.
    Pending,
    /// The reference points at an existing definition.
    Resolved(T),
    /// The referenced definition does not exist.
    Unresolved,
}

impl<T> Default for Resolution<T> {
    fn default() -> Self {
        Self::Pending
    }
}

impl<T> Resolution<T> {
    /// Returns the resolved value, if any.
    #[must_use]
    pub fn resolved(&self) -> Option<&T> {
        match self {
            Self::Resolved(v) => Some(v),
            Self::Pending | Self::Unresolved => None,
        }
    }

    /// Returns true when the reference is known to be dangling.
    #[must_use]
    pub fn is_unresolved(&self) -> bool {
        matches!(self, Self::Unresolved)
    }
}

/// Traffic direction of a filter binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Inbound.
    In,
    /// Outbound.
    Out,
}

impl Direction {
    /// Parses `in`/`out`.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("in") {
            Some(Self::In)
        } else if token.eq_ignore_ascii_case("out") {
            Some(Self::Out)
        } else {
            None
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => write!(f, "in"),
            Self::Out => write!(f, "out"),
        }
    }
}

// --- Interfaces ---

/// `switchport mode` setting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchportMode {
    /// `switchport mode access`.
    Access,
    /// `switchport mode trunk`.
    Trunk,
    /// `switchport mode dynamic auto`.
    DynamicAuto,
    /// `switchport mode dynamic desirable`.
    DynamicDesirable,
    /// Any other mode (`private-vlan host`, ...).
    Other(String),
}

/// First-hop redundancy protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FhrpProtocol {
    /// `standby`.
    Hsrp,
    /// `vrrp`.
    Vrrp,
    /// `glbp`.
    Glbp,
}

impl fmt::Display for FhrpProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Hsrp => write!(f, "HSRP"),
            Self::Vrrp => write!(f, "VRRP"),
            Self::Glbp => write!(f, "GLBP"),
        }
    }
}

/// One HSRP/VRRP/GLBP group configured on an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FhrpGroup {
    /// Protocol.
    pub protocol: FhrpProtocol,
    /// Group number (HSRP defaults to 0 when omitted).
    pub group: u32,
    /// Virtual address, when configured.
    pub virtual_ip: Option<String>,
    /// Authentication directive remainder, when configured.
    pub authentication: Option<String>,
}

/// Strength of a routing credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStrength {
    /// No credential.
    None,
    /// Credential sent or stored without a digest.
    Cleartext,
    /// MD5 or SHA-1 based digest.
    Weak,
    /// SHA-2 family digest or TCP-AO.
    Strong,
}

impl fmt::Display for AuthStrength {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Cleartext => write!(f, "cleartext"),
            Self::Weak => write!(f, "weak"),
            Self::Strong => write!(f, "strong"),
        }
    }
}

/// A routing-protocol authentication directive with its classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credential {
    /// Protocol the credential protects.
    pub protocol: ProtocolKind,
    /// Where it is configured (`area 0`, `interface GigabitEthernet0/1`, ...).
    pub scope: String,
    /// The authentication directives, joined with `; `.
    pub directive: String,
    /// Referenced key chain, when any.
    pub key_chain: Option<String>,
    /// Resolver annotation: classified strength.
    pub strength: Option<AuthStrength>,
}

/// An `ip access-group` binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AclBinding {
    /// Referenced ACL identifier.
    pub acl_id: String,
    /// Direction of the binding.
    pub direction: Direction,
    /// Resolver annotation: the referenced ACL entries.
    pub entries: Resolution<Vec<AclEntry>>,
}

/// How routing updates are suppressed or filtered on an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "method", content = "list", rename_all = "snake_case")]
pub enum RouteFilterMethod {
    /// `passive-interface`, explicit or by default.
    Passive,
    /// Inbound `distribute-list` scoped to the interface.
    DistributeList(String),
}

/// A routing protocol that filters updates on an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteFilter {
    /// Protocol applying the filter.
    pub protocol: ProtocolKind,
    /// Filtering method.
    pub method: RouteFilterMethod,
}

/// An `interface` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Interface {
    /// Canonical interface name (abbreviations expanded).
    pub name: String,
    /// `description`.
    pub description: Option<String>,
    /// `switchport mode`; `None` when not explicitly set.
    pub admin_mode: Option<SwitchportMode>,
    /// `switchport access vlan`.
    pub access_vlan: Option<u16>,
    /// `switchport trunk native vlan`.
    pub native_vlan: Option<u16>,
    /// `switchport trunk allowed vlan`; `None` when never restricted.
    pub allowed_vlans: Option<BTreeSet<u16>>,
    /// `vrf forwarding` / `ip vrf forwarding`.
    pub vrf: Option<String>,
    /// Primary IPv4 address.
    pub ip_address: Option<Ipv4Addr>,
    /// Primary IPv4 mask.
    pub ip_mask: Option<Ipv4Addr>,
    /// Body lines as captured.
    pub raw_lines: Vec<String>,
    /// `shutdown` is configured.
    pub is_administratively_shutdown: bool,
    /// Any `switchport port-security` directive.
    pub port_security: bool,
    /// `spanning-tree portfast` (not `disable`).
    pub portfast: bool,
    /// `spanning-tree bpduguard enable|disable`.
    pub bpduguard: Option<bool>,
    /// `switchport protected`.
    pub protected: bool,
    /// `ip dhcp snooping trust`.
    pub dhcp_snooping_trust: bool,
    /// 802.1X port control is `auto`.
    pub dot1x_port_control: bool,
    /// `ip access-group` bindings.
    pub access_groups: Vec<AclBinding>,
    /// HSRP/VRRP/GLBP groups.
    pub fhrp_groups: Vec<FhrpGroup>,
    /// Interface-level routing credentials.
    pub routing_auth: Vec<Credential>,
    /// Resolver annotation: whether `vrf` names a declared VRF.
    pub vrf_declared: Option<bool>,
    /// Resolver annotation: protocols filtering updates on this interface.
    pub route_filters: Vec<RouteFilter>,
}

impl Interface {
    /// Returns true for `switchport mode access`.
    #[must_use]
    pub fn is_access(&self) -> bool {
        self.admin_mode == Some(SwitchportMode::Access)
    }

    /// Returns true for `switchport mode trunk`.
    #[must_use]
    pub fn is_trunk(&self) -> bool {
        self.admin_mode == Some(SwitchportMode::Trunk)
    }

    /// Returns true when the description contains any of `needles` (case-insensitive).
    #[must_use]
    pub fn description_mentions(&self, needles: &[&str]) -> bool {
        self.description.as_deref().is_some_and(|d| {
            let d = d.to_ascii_lowercase();
            needles.iter().any(|n| d.contains(n))
        })
    }
}

/// One row of `show ip interface brief`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkStatus {
    /// Interface name as printed.
    pub interface: String,
    /// IP address column.
    pub ip_address: String,
    /// Status column (`up`, `down`, `administratively down`).
    pub status: String,
    /// Protocol column.
    pub protocol: String,
}

impl LinkStatus {
    /// Down, but not administratively down.
    #[must_use]
    pub fn is_down_not_shutdown(&self) -> bool {
        let status = self.status.to_ascii_lowercase();
        status.contains("down") && !status.contains("administratively")
    }
}

// --- Management lines ---

/// Type of a `line` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    /// `line con`.
    Console,
    /// `line vty`.
    Vty,
    /// `line aux`.
    Aux,
    /// Anything else.
    Other(String),
}

impl LineKind {
    /// Maps the header token to a kind.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        let token = token.to_ascii_lowercase();
        if "console".starts_with(&token) && token.len() >= 3 {
            Self::Console
        } else if token == "vty" {
            Self::Vty
        } else if token == "aux" {
            Self::Aux
        } else {
            Self::Other(token)
        }
    }
}

impl fmt::Display for LineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Console => write!(f, "con"),
            Self::Vty => write!(f, "vty"),
            Self::Aux => write!(f, "aux"),
            Self::Other(s) => write!(f, "{s}"),
        }
    }
}

/// A `line con|vty|aux` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManagementLine {
    /// Line type.
    pub kind: LineKind,
    /// Line range (`0 4`).
    pub range: String,
    /// `transport input` protocols; `None` when not configured.
    pub transport_input: Option<BTreeSet<String>>,
    /// Minutes component of `exec-timeout`.
    pub exec_timeout_minutes: Option<u32>,
    /// Seconds component of `exec-timeout`.
    pub exec_timeout_seconds: Option<u32>,
    /// ACL referenced by `access-class`.
    pub access_class_acl_id: Option<String>,
    /// Direction of the `access-class`.
    pub access_class_direction: Option<Direction>,
    /// Resolver annotation: entries of the `access-class` ACL.
    pub access_class: Resolution<Vec<AclEntry>>,
    /// `login` directive remainder (`local`, `authentication X`).
    pub login: Option<String>,
    /// Body lines as captured.
    pub raw_lines: Vec<String>,
}

impl ManagementLine {
    /// Header label such as `line vty 0 4`.
    #[must_use]
    pub fn label(&self) -> String {
        if self.range.is_empty() {
            format!("line {}", self.kind)
        } else {
            format!("line {} {}", self.kind, self.range)
        }
    }

    /// Returns true when `transport input` explicitly allows `protocol` (or `all`).
    #[must_use]
    pub fn allows_transport(&self, protocol: &str) -> bool {
        self.transport_input
            .as_ref()
            .is_some_and(|set| set.contains(protocol) || set.contains("all"))
    }
}

// --- ACLs, prefix lists, key chains ---

/// Permit or deny.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AclAction {
    /// `permit`.
    Permit,
    /// `deny`.
    Deny,
}

impl AclAction {
    /// Parses `permit`/`deny`.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("permit") {
            Some(Self::Permit)
        } else if token.eq_ignore_ascii_case("deny") {
            Some(Self::Deny)
        } else {
            None
        }
    }
}

impl fmt::Display for AclAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Permit => write!(f, "permit"),
            Self::Deny => write!(f, "deny"),
        }
    }
}

/// One access-list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AclEntry {
    /// Sequence number in named lists.
    pub sequence: Option<u32>,
    /// Action.
    pub action: AclAction,
    /// Protocol (`ip` for standard lists).
    pub protocol: String,
    /// Source specification (`10.0.0.0 0.0.0.255`, `host 1.1.1.1`, `any`).
    pub source: String,
    /// Source port operator (`eq 179`).
    pub source_port: Option<String>,
    /// Destination specification; `None` for standard lists.
    pub destination: Option<String>,
    /// Destination port operator.
    pub destination_port: Option<String>,
    /// Remaining tokens (`log`, `established`, ...).
    pub extra: String,
}

impl AclEntry {
    /// Returns true when either port operator is `eq <port>`.
    #[must_use]
    pub fn matches_port(&self, names: &[&str]) -> bool {
        [&self.source_port, &self.destination_port]
            .into_iter()
            .flatten()
            .any(|op| {
                let mut words = op.split_whitespace();
                words.next().is_some_and(|w| w.eq_ignore_ascii_case("eq"))
                    && words.any(|p| names.iter().any(|n| p.eq_ignore_ascii_case(n)))
            })
    }
}

impl fmt::Display for AclEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.action, self.protocol, self.source)?;
        let rest = [
            self.source_port.as_deref(),
            self.destination.as_deref(),
            self.destination_port.as_deref(),
            Some(self.extra.as_str()).filter(|e| !e.is_empty()),
        ];
        for part in rest.into_iter().flatten() {
            write!(f, " {part}")?;
        }
        Ok(())
    }
}

/// One `ip prefix-list` / `ipv6 prefix-list` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrefixListEntry {
    /// `seq`.
    pub sequence: Option<u32>,
    /// Action.
    pub action: AclAction,
    /// Prefix in CIDR notation.
    pub prefix: String,
    /// `ge` bound.
    pub ge: Option<u8>,
    /// `le` bound.
    pub le: Option<u8>,
}

impl PrefixListEntry {
    /// The match part as written: prefix with optional `ge`/`le` bounds.
    #[must_use]
    pub fn match_spec(&self) -> String {
        let mut spec = self.prefix.clone();
        if let Some(ge) = self.ge {
            spec.push_str(&format!(" ge {ge}"));
        }
        if let Some(le) = self.le {
            spec.push_str(&format!(" le {le}"));
        }
        spec
    }
}

/// One `ip as-path access-list` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AsPathEntry {
    /// Action.
    pub action: AclAction,
    /// Regular expression as written.
    pub pattern: String,
}

/// One key in a key chain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChainKey {
    /// Key id.
    pub id: Option<u32>,
    /// `key-string` directive remainder.
    pub key_string: Option<String>,
    /// `cryptographic-algorithm`.
    pub algorithm: Option<String>,
}

/// A `key chain` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeyChain {
    /// Chain name.
    pub name: String,
    /// Keys in declaration order.
    pub keys: Vec<ChainKey>,
}

// --- Routing ---

/// Routing protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProtocolKind {
    /// RIP.
    Rip,
    /// OSPF.
    Ospf,
    /// IS-IS.
    Isis,
    /// BGP.
    Bgp,
    /// EIGRP.
    Eigrp,
}

impl ProtocolKind {
    /// Maps a `router <protocol>` token.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "rip" => Some(Self::Rip),
            "ospf" => Some(Self::Ospf),
            "isis" => Some(Self::Isis),
            "bgp" => Some(Self::Bgp),
            "eigrp" => Some(Self::Eigrp),
            _ => None,
        }
    }

    /// Interior gateway protocols.
    #[must_use]
    pub fn is_igp(self) -> bool {
        !matches!(self, Self::Bgp)
    }
}

impl fmt::Display for ProtocolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rip => write!(f, "RIP"),
            Self::Ospf => write!(f, "OSPF"),
            Self::Isis => write!(f, "ISIS"),
            Self::Bgp => write!(f, "BGP"),
            Self::Eigrp => write!(f, "EIGRP"),
        }
    }
}

/// Kind of a per-neighbor route filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterKind {
    /// `prefix-list`.
    PrefixList,
    /// `filter-list` (AS-path access list).
    FilterList,
    /// `distribute-list` (ACL).
    DistributeList,
    /// `route-map`.
    RouteMap,
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PrefixList => write!(f, "prefix-list"),
            Self::FilterList => write!(f, "filter-list"),
            Self::DistributeList => write!(f, "distribute-list"),
            Self::RouteMap => write!(f, "route-map"),
        }
    }
}

/// A route filter applied to a BGP neighbor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NeighborFilter {
    /// Filter kind.
    pub kind: FilterKind,
    /// Referenced list or map name.
    pub name: String,
    /// Direction.
    pub direction: Direction,
    /// Resolver annotation: number of entries in the referenced list.
    pub target: Resolution<usize>,
}

/// Per-neighbor attributes of a BGP (or other) neighbor statement set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Neighbor {
    /// Neighbor address or peer-group name.
    pub address: String,
    /// `remote-as`.
    pub remote_as: Option<u32>,
    /// Peer-group membership.
    pub peer_group: Option<String>,
    /// `description`.
    pub description: Option<String>,
    /// `password` directive remainder.
    pub password: Option<String>,
    /// `ao` (TCP-AO) key chain.
    pub tcp_ao: Option<String>,
    /// `maximum-prefix` limit.
    pub maximum_prefix: Option<u32>,
    /// `remove-private-as`.
    pub remove_private_as: bool,
    /// `shutdown`.
    pub shutdown: bool,
    /// Route filters.
    pub filters: Vec<NeighborFilter>,
    /// `neighbor <address> ...` lines as captured.
    pub raw_lines: Vec<String>,
    /// Resolver annotation: session authentication strength.
    pub auth_strength: Option<AuthStrength>,
}

/// A `distribute-list` statement inside a routing process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributeList {
    /// ACL, prefix list or route-map name.
    pub list: String,
    /// Direction.
    pub direction: Direction,
    /// Interface key the list is scoped to, when any.
    pub interface: Option<String>,
}

/// Facts of one routing protocol, merged across all of its `router` blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Protocol {
    /// Protocol.
    pub kind: ProtocolKind,
    /// Process ids / AS numbers, in block order.
    pub processes: Vec<String>,
    /// Local AS (BGP).
    pub local_as: Option<u32>,
    /// Process-level credentials (OSPF areas, IS-IS, EIGRP named mode).
    pub credentials: Vec<Credential>,
    /// Neighbors keyed by address.
    pub neighbors: BTreeMap<String, Neighbor>,
    /// BGP peer groups keyed by name.
    pub peer_groups: BTreeMap<String, Neighbor>,
    /// Interface keys made passive explicitly.
    pub passive_interfaces: BTreeSet<String>,
    /// `passive-interface default`.
    pub passive_default: bool,
    /// Interface keys excluded by `no passive-interface`.
    pub active_interfaces: BTreeSet<String>,
    /// `distribute-list` statements.
    pub distribute_lists: Vec<DistributeList>,
    /// Body lines as captured.
    pub raw_lines: Vec<String>,
}

impl Protocol {
    /// Creates an empty record.
    #[must_use]
    pub fn new(kind: ProtocolKind) -> Self {
        Self {
            kind,
            processes: Vec::new(),
            local_as: None,
            credentials: Vec::new(),
            neighbors: BTreeMap::new(),
            peer_groups: BTreeMap::new(),
            passive_interfaces: BTreeSet::new(),
            passive_default: false,
            active_interfaces: BTreeSet::new(),
            distribute_lists: Vec::new(),
            raw_lines: Vec::new(),
        }
    }

    /// Folds another block of the same protocol into this record.
    pub fn absorb(&mut self, other: Self) {
        self.processes.extend(other.processes);
        self.local_as = self.local_as.or(other.local_as);
        self.credentials.extend(other.credentials);
        for (address, neighbor) in other.neighbors {
            self.neighbors.entry(address).or_insert(neighbor);
        }
        for (name, group) in other.peer_groups {
            self.peer_groups.entry(name).or_insert(group);
        }
        self.passive_interfaces.extend(other.passive_interfaces);
        self.passive_default |= other.passive_default;
        self.active_interfaces.extend(other.active_interfaces);
        self.distribute_lists.extend(other.distribute_lists);
        self.raw_lines.extend(other.raw_lines);
    }

    /// Returns true when the protocol suppresses updates on `interface_key`.
    #[must_use]
    pub fn is_passive(&self, interface_key: &str) -> bool {
        self.passive_interfaces.contains(interface_key)
            || (self.passive_default && !self.active_interfaces.contains(interface_key))
    }
}

// --- VRF, SNMP, AAA, backup, services ---

/// Declared VRFs and interface bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VrfTable {
    /// `vrf definition X` / `ip vrf X`.
    pub declared: BTreeSet<String>,
    /// Interface key to bound VRF.
    pub bindings: BTreeMap<String, String>,
}

/// SNMP community access level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SnmpPermission {
    /// Read-only (also the IOS default).
    #[serde(rename = "RO")]
    ReadOnly,
    /// Read-write.
    #[serde(rename = "RW")]
    ReadWrite,
}

impl fmt::Display for SnmpPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ReadOnly => write!(f, "RO"),
            Self::ReadWrite => write!(f, "RW"),
        }
    }
}

/// `snmp-server community`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnmpCommunity {
    /// Community string.
    pub name: String,
    /// Access level.
    pub permission: SnmpPermission,
    /// Restricting ACL.
    pub acl: Option<String>,
    /// Resolver annotation: entries of the restricting ACL.
    pub acl_entries: Resolution<Vec<AclEntry>>,
}

/// SNMP facts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Snmp {
    /// Any `snmp-server` directive exists.
    pub is_configured: bool,
    /// Communities in declaration order.
    pub communities: Vec<SnmpCommunity>,
    /// `snmp-server group X v3` names.
    pub groups_v3: Vec<String>,
    /// `snmp-server host` targets.
    pub hosts: Vec<IpAddr>,
}

/// Password-policy pattern recognized in a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyPattern {
    /// `service password-encryption`.
    PasswordEncryption,
    /// `security passwords min-length N`.
    MinLength,
    /// `aaa password policy enable`.
    AaaPolicyEnabled,
    /// Any `aaa password policy ...` line.
    AaaPolicy,
    /// `aaa common-criteria policy X`.
    CommonCriteria,
    /// `key`, `secret` or `password` keyword.
    SensitiveKeyword,
}

/// A line that matched a password-policy pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PolicySighting {
    /// Pattern that matched.
    pub pattern: PolicyPattern,
    /// The line.
    pub line: String,
    /// Numeric value carried by the pattern (min-length).
    pub value: Option<u32>,
}

/// `login block-for D attempts A within W`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Lockout {
    /// Failed attempts before blocking.
    pub max_attempts: u32,
    /// Block duration, in minutes.
    pub lockout_minutes: u32,
    /// Observation window.
    pub window: u32,
}

/// A local `username` account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalAccount {
    /// Account name.
    pub name: String,
    /// `privilege` level.
    pub privilege: Option<u8>,
    /// Uses `secret` (hashed) rather than `password`.
    pub uses_secret: bool,
}

/// AAA facts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Aaa {
    /// `aaa new-model`.
    pub new_model: bool,
    /// TACACS+ servers.
    pub tacacs_servers: Vec<String>,
    /// RADIUS servers.
    pub radius_servers: Vec<String>,
    /// Local account names.
    pub usernames: BTreeSet<String>,
    /// Local accounts in declaration order.
    pub accounts: Vec<LocalAccount>,
    /// Password-policy sightings in line order.
    pub password_policy_lines: Vec<PolicySighting>,
    /// Login lockout.
    pub lockout_config: Option<Lockout>,
}

impl Aaa {
    /// Sightings of one pattern.
    pub fn sightings(&self, pattern: PolicyPattern) -> impl Iterator<Item = &PolicySighting> {
        self.password_policy_lines
            .iter()
            .filter(move |s| s.pattern == pattern)
    }
}

/// Configuration archive settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Backup {
    /// `path`.
    pub archive_path: Option<String>,
    /// `time-period`, rounded up to whole days.
    pub archive_period_days: Option<u32>,
    /// `time-period` as configured, in minutes.
    pub archive_period_minutes: Option<u32>,
    /// `write-memory`.
    pub write_memory: bool,
}

/// Management service settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Services {
    /// `ip ssh version`.
    pub ssh_version: Option<u8>,
    /// `ip http server` (true) or `no ip http server` (false); last one wins.
    pub http_server: Option<bool>,
    /// `ip http secure-server`, same convention.
    pub https_server: Option<bool>,
}

/// `ip source binding`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceBinding {
    /// MAC address.
    pub mac: String,
    /// VLAN.
    pub vlan: u16,
    /// IP address.
    pub ip: String,
    /// Interface, when given.
    pub interface: Option<String>,
}

/// Switching-related global facts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Layer2 {
    /// `vlan N` declarations.
    pub vlans: BTreeSet<u16>,
    /// DHCP snooping enabled globally.
    pub dhcp_snooping: bool,
    /// DHCP snooping VLANs.
    pub dhcp_snooping_vlans: BTreeSet<u16>,
    /// Ports listed as trusted by `show ip dhcp snooping`.
    pub dhcp_trusted_ports: BTreeSet<String>,
    /// Dynamic ARP inspection VLANs.
    pub arp_inspection_vlans: BTreeSet<u16>,
    /// Static IP-MAC bindings.
    pub source_bindings: Vec<SourceBinding>,
    /// `dot1x system-auth-control`.
    pub dot1x_system_auth_control: bool,
    /// PortFast enabled by default on access ports.
    pub portfast_default: bool,
    /// BPDU guard enabled by default on PortFast ports.
    pub bpduguard_default: bool,
}

/// Time and logging collectors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Monitoring {
    /// `ntp server` targets.
    pub ntp_servers: Vec<String>,
    /// Syslog targets.
    pub logging_hosts: Vec<String>,
    /// `logging on` (true) or `no logging on` (false).
    pub logging_enabled: Option<bool>,
}

/// Software platform reported by `show version`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Platform {
    /// Classic IOS.
    #[serde(rename = "IOS")]
    Ios,
    /// IOS-XE.
    #[serde(rename = "IOS-XE")]
    IosXe,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ios => write!(f, "IOS"),
            Self::IosXe => write!(f, "IOS-XE"),
        }
    }
}

/// Firmware identification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Firmware {
    /// Platform.
    pub platform: Platform,
    /// Version string.
    pub version: String,
}

// --- Anomalies ---

/// Kind of a recorded ambiguity or dangling reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// A block ran into the end of input.
    UnterminatedBlock,
    /// A numeric field could not be parsed; the directive is treated as absent.
    MalformedNumber,
    /// The same interface was declared by more than one block.
    DuplicateBlock,
    /// A `router` block for a protocol the model does not cover.
    UnknownProtocol,
    /// An ACL reference without a matching definition.
    UnresolvedAcl,
    /// An interface bound to a VRF that is not declared.
    UndeclaredVrf,
    /// A key chain reference without a matching definition.
    UnresolvedKeyChain,
    /// A neighbor in an undeclared peer group.
    UnresolvedPeerGroup,
    /// A neighbor filter pointing at a missing list.
    UnresolvedFilter,
}

impl AnomalyKind {
    /// Anomalies produced by the cross-reference resolver.
    #[must_use]
    pub fn is_resolution(self) -> bool {
        matches!(
            self,
            Self::UnresolvedAcl
                | Self::UndeclaredVrf
                | Self::UnresolvedKeyChain
                | Self::UnresolvedPeerGroup
                | Self::UnresolvedFilter
        )
    }
}

/// A structural ambiguity or dangling reference, kept as a fact.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Anomaly {
    /// Kind.
    pub kind: AnomalyKind,
    /// What it is about (`line vty 0 4`, `interface Gi0/1`).
    pub subject: String,
    /// Human-readable detail.
    pub detail: String,
}

impl Anomaly {
    /// Creates an anomaly.
    #[must_use]
    pub fn new(kind: AnomalyKind, subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            kind,
            subject: subject.into(),
            detail: detail.into(),
        }
    }
}

impl fmt::Display for Anomaly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.detail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_kind_accepts_console_abbreviations() {
        assert_eq!(LineKind::parse("con"), LineKind::Console);
        assert_eq!(LineKind::parse("console"), LineKind::Console);
        assert_eq!(LineKind::parse("VTY"), LineKind::Vty);
        assert_eq!(LineKind::parse("tty"), LineKind::Other("tty".to_string()));
    }

    #[test]
    fn acl_entry_port_match() {
        let entry = AclEntry {
            sequence: None,
            action: AclAction::Permit,
            protocol: "tcp".to_string(),
            source: "host 192.0.2.1".to_string(),
            source_port: None,
            destination: Some("any".to_string()),
            destination_port: Some("eq bgp".to_string()),
            extra: String::new(),
        };
        assert!(entry.matches_port(&["179", "bgp"]));
        assert!(!entry.matches_port(&["22"]));
    }

    #[test]
    fn passive_default_respects_exceptions() {
        let mut ospf = Protocol::new(ProtocolKind::Ospf);
        ospf.passive_default = true;
        ospf.active_interfaces.insert("gigabitethernet0/0".to_string());
        assert!(ospf.is_passive("gigabitethernet0/1"));
        assert!(!ospf.is_passive("gigabitethernet0/0"));
    }

    #[test]
    fn link_status_down_but_not_shutdown() {
        let row = |status: &str| LinkStatus {
            interface: "GigabitEthernet0/1".to_string(),
            ip_address: "unassigned".to_string(),
            status: status.to_string(),
            protocol: "down".to_string(),
        };
        assert!(row("down").is_down_not_shutdown());
        assert!(!row("administratively down").is_down_not_shutdown());
        assert!(!row("up").is_down_not_shutdown());
    }

    #[test]
    fn auth_strength_orders_weakest_first() {
        assert!(AuthStrength::None < AuthStrength::Cleartext);
        assert!(AuthStrength::Cleartext < AuthStrength::Weak);
        assert!(AuthStrength::Weak < AuthStrength::Strong);
    }
}
