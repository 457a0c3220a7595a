//! End-to-end properties of parsing and auditing realistic captures.

use netaudit_core::resolve::{resolve, resolve_with, PASSES};
use netaudit_core::{
    Assessment, Auditor, Category, Config, DetailValue, Document, Rule, RuleError, Status,
};
use netaudit_rules::{
    all_rules, configured_rules, AccountLockout, DisableTelnet, Preset, SshVersion2,
};

const EDGE_ROUTER: &str = r"R1#show version
Cisco IOS XE Software, Version 17.09.04a
R1#show running-config
Building configuration...
!
hostname R1
!
vrf definition INTERNET
!
vrf definition MGMT
!
aaa new-model
service password-encryption
security passwords min-length 10
login block-for 5 attempts 3 within 120
username netops privilege 15 secret 9 $9$abcdefgh
ip ssh version 2
no ip http server
!
key chain OSPF-KEYS
 key 1
  key-string 7 0822455D0A16
  cryptographic-algorithm hmac-sha-256
!
key chain BGP-AO
 key 1
  key-string 7 1511021F0725
  cryptographic-algorithm hmac-sha-256
!
interface GigabitEthernet0/0
 description transit to ISP
 vrf forwarding INTERNET
 ip address 203.0.113.2 255.255.255.252
!
interface GigabitEthernet0/1
 description customer A
 ip address 10.10.0.1 255.255.255.0
 ip ospf authentication key-chain OSPF-KEYS
!
interface GigabitEthernet0/3
 description OOB management
 vrf forwarding MGMT
 ip address 10.255.0.1 255.255.255.0
!
router ospf 1
 passive-interface default
 no passive-interface GigabitEthernet0/0
!
router bgp 65001
 neighbor 203.0.113.1 remote-as 64500
 neighbor 203.0.113.1 ao BGP-AO
 neighbor 203.0.113.1 maximum-prefix 50
 neighbor 203.0.113.1 remove-private-as
 neighbor 203.0.113.1 prefix-list BOGONS in
!
ip prefix-list BOGONS seq 5 deny 10.0.0.0/8
ip prefix-list BOGONS seq 10 deny 172.16.0.0/12
ip prefix-list BOGONS seq 15 deny 192.168.0.0/16
ip prefix-list BOGONS seq 20 deny 0.0.0.0/0 ge 25 le 32
ip prefix-list BOGONS seq 100 permit 0.0.0.0/0 le 24
ipv6 prefix-list BOGONS6 seq 5 deny fc00::/7
ipv6 prefix-list BOGONS6 seq 10 deny ::/0 ge 49 le 128
access-list 10 permit 10.0.0.0 0.0.0.255
access-list 110 permit tcp host 203.0.113.1 host 203.0.113.2 eq 179
!
archive
 path scp://backup@10.255.0.10/configs/$h
 time-period 1440
!
logging host 10.255.0.20
ntp server 10.255.0.30
snmp-server group OPS v3 priv
snmp-server host 10.255.0.40 version 3 priv opsuser
!
line con 0
 exec-timeout 5 0
line vty 0 4
 exec-timeout 10 0
 transport input ssh
 access-class 10 in
!
end
";

fn verdict_status(doc: &Document, rule: &dyn Rule) -> Status {
    if rule.is_applicable(doc) {
        rule.evaluate(doc).expect("rule evaluates").status
    } else {
        Status::NotApplicable
    }
}

// --- parsing ---

#[test]
fn parsing_is_deterministic() {
    assert_eq!(Document::parse(EDGE_ROUTER), Document::parse(EDGE_ROUTER));
}

#[test]
fn resolution_is_idempotent_and_order_independent() {
    let doc = Document::parse(EDGE_ROUTER);

    let mut again = doc.clone();
    resolve(&mut again);
    assert_eq!(again, doc);

    let mut reversed: Vec<_> = PASSES.to_vec();
    reversed.reverse();
    let mut reordered = doc.clone();
    resolve_with(&mut reordered, &reversed);
    assert_eq!(reordered, doc);
}

#[test]
fn malformed_input_never_fails() {
    let auditor = Auditor::builder().rules(all_rules()).build().expect("builds");
    for text in ["", "\n\n!\n", "interface\n", "router bgp\n neighbor\n", "\u{0}\u{1}garbage"] {
        let doc = Document::parse(text);
        assert_eq!(auditor.evaluate(&doc).len(), 36);
    }
}

// --- evaluation ---

#[test]
fn every_rule_yields_one_verdict_with_evidence() {
    let auditor = Auditor::builder().rules(all_rules()).build().expect("builds");
    let report = auditor.audit_text("R1.log", EDGE_ROUTER);

    assert_eq!(report.verdicts.len(), 36);
    for verdict in &report.verdicts {
        if verdict.status != Status::Compliant {
            assert!(!verdict.evidence.is_empty(), "{} has no evidence", verdict.rule);
        }
    }
}

#[test]
fn hardened_router_passes_routing_and_management_checks() {
    let doc = Document::parse(EDGE_ROUTER);
    let expected_compliant = [
        "firmware-version",
        "igp-authentication",
        "bgp-authentication",
        "credential-strength",
        "route-filtering",
        "bgp-bogon-filter",
        "bgp-prefix-limit",
        "bgp-private-as",
        "bgp-tcp-filter",
        "vrf-separation",
        "config-backup",
        "default-accounts",
        "password-policy",
        "account-lockout",
        "management-interface",
        "ssh-version-2",
        "disable-telnet",
        "disable-http",
        "session-timeout",
        "management-acl",
        "ntp-server",
        "centralized-logging",
        "snmp-v3",
        "snmp-read-only",
        "snmp-default-community",
        "snmp-host-restriction",
    ];
    let rules = all_rules();
    for name in expected_compliant {
        let rule = rules.iter().find(|r| r.name() == name).expect("rule exists");
        assert_eq!(verdict_status(&doc, rule.as_ref()), Status::Compliant, "{name}");
    }
}

#[test]
fn aaa_servers_missing_is_the_only_accounts_finding() {
    let doc = Document::parse(EDGE_ROUTER);
    let rules = configured_rules(Preset::Management, &Config::new());
    let failing: Vec<&str> = rules
        .iter()
        .filter(|r| r.category() == Category::Accounts)
        .filter(|r| verdict_status(&doc, r.as_ref()) == Status::NonCompliant)
        .map(|r| r.name())
        .collect();
    assert_eq!(failing, vec!["aaa-servers"]);
}

#[test]
fn telnet_fails_closed() {
    let doc = Document::parse("line vty 0 4\n transport input telnet\n!\n");
    assert_eq!(verdict_status(&doc, &DisableTelnet), Status::NonCompliant);

    let doc = Document::parse("line vty 0 4\n transport input telnet ssh\n!\n");
    assert_eq!(verdict_status(&doc, &DisableTelnet), Status::NonCompliant);
}

#[test]
fn lockout_threshold_boundary() {
    let rule = AccountLockout::new();

    let doc = Document::parse("login block-for 5 attempts 3 within 120\n");
    let a = rule.evaluate(&doc).expect("evaluates");
    assert_eq!(a.status, Status::Compliant);
    assert_eq!(a.details.get("attempts"), Some(&DetailValue::Int(3)));
    assert_eq!(a.details.get("threshold_attempts"), Some(&DetailValue::Int(5)));

    let doc = Document::parse("login block-for 2 attempts 10 within 120\n");
    assert_eq!(rule.evaluate(&doc).expect("evaluates").status, Status::NonCompliant);
}

#[test]
fn bgp_rules_are_not_applicable_without_bgp() {
    let auditor = Auditor::builder()
        .rules(configured_rules(Preset::Routing, &Config::new()))
        .build()
        .expect("builds");
    let report = auditor.audit_text("switch", "hostname SW1\ninterface Gi0/1\n switchport mode access\n!\n");
    let bgp: Vec<_> = report
        .verdicts
        .iter()
        .filter(|v| v.rule.starts_with("bgp-"))
        .collect();
    assert_eq!(bgp.len(), 5);
    assert!(bgp.iter().all(|v| v.status == Status::NotApplicable));
}

#[test]
fn access_class_evidence_names_permitted_sources() {
    let auditor = Auditor::builder().rule(netaudit_rules::ManagementAcl).build().expect("builds");

    let report = auditor.audit_text(
        "r",
        "access-list 10 permit 10.0.0.0 0.0.0.255\nline vty 0 4\n access-class 10 in\n!\n",
    );
    let verdict = &report.verdicts[0];
    assert_eq!(verdict.status, Status::Compliant);
    assert!(verdict.evidence[0].contains("10.0.0.0 0.0.0.255"));

    let report = auditor.audit_text("r", "access-list 10 permit 10.0.0.0 0.0.0.255\nline vty 0 4\n!\n");
    assert_eq!(report.verdicts[0].status, Status::NonCompliant);
}

// --- fault containment ---

struct Faulty;

impl Rule for Faulty {
    fn name(&self) -> &'static str {
        "faulty"
    }
    fn code(&self) -> &'static str {
        "NA999"
    }
    fn title(&self) -> &'static str {
        "Always panics"
    }
    fn category(&self) -> Category {
        Category::Platform
    }
    fn evaluate(&self, _doc: &Document) -> Result<Assessment, RuleError> {
        panic!("index out of range")
    }
}

#[test]
fn panicking_rule_does_not_stop_the_run() {
    let auditor = Auditor::builder()
        .rule(Faulty)
        .rules(all_rules())
        .build()
        .expect("builds");
    let report = auditor.audit_text("R1.log", EDGE_ROUTER);

    assert_eq!(report.verdicts.len(), 37);
    let faulty = &report.verdicts[0];
    assert_eq!(faulty.status, Status::NonCompliant);
    assert!(faulty.details.contains_key("evaluation_error"));
    assert!(faulty.evidence[0].contains("index out of range"));
    assert_eq!(report.verdicts[1].rule, "firmware-version");
}

// --- batch ---

#[test]
fn batch_audit_keeps_input_order() {
    let auditor = Auditor::builder()
        .rules(all_rules())
        .parallelism(4)
        .build()
        .expect("builds");
    let inputs: Vec<(String, String)> = (0..8)
        .map(|i| (format!("device-{i}.log"), EDGE_ROUTER.replace("R1", &format!("R{i}"))))
        .collect();
    let result = auditor.audit_all(&inputs);

    assert_eq!(result.documents_checked, 8);
    let ids: Vec<&str> = result.reports.iter().map(|r| r.identifier.as_str()).collect();
    assert_eq!(ids, inputs.iter().map(|(id, _)| id.as_str()).collect::<Vec<_>>());
    assert_eq!(result.reports[0].verdicts, result.reports[7].verdicts);
}

#[test]
fn verdict_lines_snapshot() {
    let auditor = Auditor::builder()
        .rule(SshVersion2)
        .rule(DisableTelnet)
        .rule(AccountLockout::new())
        .build()
        .expect("builds");
    let report = auditor.audit_text(
        "R9",
        "ip ssh version 2\nlogin block-for 5 attempts 3 within 120\nline vty 0 4\n transport input telnet\n!\n",
    );
    let rendered: Vec<String> = report.verdicts.iter().map(ToString::to_string).collect();

    insta::assert_snapshot!(rendered.join("\n"), @r"
    [NA532] ssh-version-2 compliant: SSH is restricted to version 2 (ip ssh version 2)
    [NA533] disable-telnet non-compliant: Telnet is disabled (line vty 0 4: transport input allows telnet)
    [NA525] account-lockout compliant: Repeated login failures lock the account (login block-for 5 attempts 3 within 120)
    ");
}
