use acl_core::{
    connected_components, covers, to_network, AclRule, AddressSpec, Network, ServiceTable,
};

fn rule(line: &str) -> AclRule {
    acl_core::parse_full(line, &ServiceTable::builtin())
        .rule()
        .expect("line should parse")
}

#[test]
fn network_containment_is_a_partial_order() {
    let nets: Vec<Network> = ["10.0.0.0/8", "10.1.0.0/16", "10.1.2.0/24", "10.1.2.3/32"]
        .iter()
        .map(|t| t.parse().expect("network"))
        .collect();
    for n in &nets {
        assert!(n.contains(n));
    }
    for i in 0..nets.len() {
        for j in i..nets.len() {
            assert!(nets[i].contains(&nets[j]), "{} ⊇ {}", nets[i], nets[j]);
        }
    }
}

#[test]
fn canonical_rendering_reparses_to_same_pair() {
    let net = to_network(AddressSpec::Wildcard {
        address: "172.16.33.9",
        wildcard: "0.0.15.255",
    })
    .expect("wildcard");
    let again: Network = net.to_string().parse().expect("reparse");
    assert_eq!(again, net);
    assert_eq!(again.to_string(), "172.16.32.0/20");
}

#[test]
fn netmask_on_host_yields_slash_24() {
    let net = to_network(AddressSpec::Netmask {
        address: "10.0.1.5",
        mask: "255.255.255.0",
    })
    .expect("netmask");
    assert_eq!(net.to_string(), "10.0.1.0/24");
}

#[test]
fn wider_rule_covers_narrower_one_way() {
    let a = rule("permit tcp 10.0.0.0/8 any eq 80");
    let b = rule("permit tcp 10.0.1.0/24 any eq 80");
    assert!(covers(&a, &a));
    assert!(covers(&a, &b));
    assert!(!covers(&b, &a));
}

#[test]
fn components_cluster_overlapping_rules() {
    let rules = [
        rule("permit ip 10.0.0.0/8 172.16.0.0/12"),
        rule("deny ip 192.168.0.0/16 any"),
        rule("deny tcp 10.1.0.0/16 172.16.1.0/24 eq 22"),
    ];
    let edges = (0..rules.len())
        .flat_map(|i| (i + 1..rules.len()).map(move |j| (i, j)))
        .filter(|&(i, j)| acl_core::addresses_overlap(&rules[i], &rules[j]));
    assert_eq!(
        connected_components(rules.len(), edges),
        vec![vec![0, 2], vec![1]]
    );
}
