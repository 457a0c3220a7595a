//! Routing-update filtering on end-user interfaces.

use netaudit_core::facts::{Interface, RouteFilterMethod};
use netaudit_core::{Assessment, Document, Rule, RuleError};

/// Description keywords that mark an interface as facing end users.
const END_USER_KEYWORDS: &[&str] = &["client", "end-user", "customer"];

/// Requires end-user interfaces to be passive or filtered inbound.
///
/// An interface faces end users when it is an access port or its
/// description mentions a client, end user or customer.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouteFiltering;

impl RouteFiltering {
    fn end_user_interfaces(doc: &Document) -> impl Iterator<Item = &Interface> {
        doc.interfaces
            .values()
            .filter(|i| i.is_access() || i.description_mentions(END_USER_KEYWORDS))
    }
}

impl Rule for RouteFiltering {
    rule_identity!(
        "NA415",
        "route-filtering",
        Routing,
        "End-user interfaces do not accept routing updates"
    );

    fn is_applicable(&self, doc: &Document) -> bool {
        !doc.routing_protocols.is_empty() && Self::end_user_interfaces(doc).next().is_some()
    }

    fn not_applicable_reason(&self) -> &'static str {
        "no routing protocol or no end-user interfaces"
    }

    fn evaluate(&self, doc: &Document) -> Result<Assessment, RuleError> {
        let mut filtered = Vec::new();
        let mut unfiltered = Vec::new();

        for iface in Self::end_user_interfaces(doc) {
            if iface.route_filters.is_empty() {
                unfiltered.push(format!("{}: routing updates not filtered", iface.name));
                continue;
            }
            let methods: Vec<String> = iface
                .route_filters
                .iter()
                .map(|f| match &f.method {
                    RouteFilterMethod::Passive => format!("{} passive-interface", f.protocol),
                    RouteFilterMethod::DistributeList(list) => {
                        format!("{} distribute-list {list} in", f.protocol)
                    }
                })
                .collect();
            filtered.push(format!("{}: {}", iface.name, methods.join(", ")));
        }

        Ok(if unfiltered.is_empty() {
            Assessment::compliant().with_evidence_lines(filtered)
        } else {
            Assessment::non_compliant()
                .with_detail("unfiltered_interfaces", unfiltered.len())
                .with_evidence_lines(unfiltered)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::check;
    use netaudit_core::Status;

    #[test]
    fn passive_default_covers_customer_ports() {
        let a = check(
            &RouteFiltering,
            "interface Gi0/1\n description customer A\n ip address 198.51.100.1 255.255.255.252\n!\nrouter ospf 1\n passive-interface default\n no passive-interface Gi0/0\n!\n",
        );
        assert_eq!(a.status, Status::Compliant);
        assert_eq!(a.evidence, vec!["GigabitEthernet0/1: OSPF passive-interface"]);
    }

    #[test]
    fn inbound_distribute_list_counts() {
        let a = check(
            &RouteFiltering,
            "interface Gi0/2\n description client uplink\n!\nrouter eigrp 100\n distribute-list 10 in Gi0/2\n!\n",
        );
        assert_eq!(a.status, Status::Compliant);
        assert!(a.evidence[0].contains("distribute-list 10 in"));
    }

    #[test]
    fn active_customer_interface_fails() {
        let a = check(
            &RouteFiltering,
            "interface Gi0/1\n description customer A\n!\nrouter ospf 1\n network 0.0.0.0 255.255.255.255 area 0\n!\n",
        );
        assert_eq!(a.status, Status::NonCompliant);
    }

    #[test]
    fn no_routing_is_not_applicable() {
        let a = check(&RouteFiltering, "interface Gi0/1\n switchport mode access\n!\n");
        assert_eq!(a.status, Status::NotApplicable);
    }
}
