//! Dialect grammar tables and detection.
//!
//! The three grammars share one token walker in [`crate::parser`]; what
//! differs between them is kept here as data:
//!
//! - **NXOS**: sequence-numbered entries under `ip access-list NAME`,
//!   CIDR addresses, address pairs read as wildcards.
//! - **IOSXE**: numbered `access-list N ...` lines or entries under
//!   `ip access-list extended|standard NAME`, `host`/wildcard addresses.
//! - **ASA**: `access-list NAME [line N] extended ...` lines, address pairs
//!   read as netmasks, `any4`/`any6` keywords.

use crate::rule::Dialect;

/// How an `<address> <mask>` pair is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PairForm {
    Wildcard,
    Netmask,
}

/// Per-dialect grammar row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialectGrammar {
    pub dialect: Dialect,
    pub pair_form: PairForm,
    /// Keywords standing for the IPv4 "any" network.
    pub any_v4: &'static [&'static str],
    /// Keywords standing for the IPv6 "any" network.
    pub any_v6: &'static [&'static str],
}

const GRAMMARS: [DialectGrammar; 3] = [
    DialectGrammar {
        dialect: Dialect::Nxos,
        pair_form: PairForm::Wildcard,
        any_v4: &["any"],
        any_v6: &[],
    },
    DialectGrammar {
        dialect: Dialect::Iosxe,
        pair_form: PairForm::Wildcard,
        any_v4: &["any"],
        any_v6: &[],
    },
    DialectGrammar {
        dialect: Dialect::Asa,
        pair_form: PairForm::Netmask,
        any_v4: &["any", "any4"],
        any_v6: &["any6"],
    },
];

pub fn grammar(dialect: Dialect) -> &'static DialectGrammar {
    match dialect {
        Dialect::Nxos => &GRAMMARS[0],
        Dialect::Iosxe => &GRAMMARS[1],
        Dialect::Asa => &GRAMMARS[2],
    }
}

/// Trailing options accepted after the destination, with how many value
/// tokens follow each one. `log`/`log-input` are handled by the parser.
pub const RULE_OPTIONS: &[(&str, usize)] = &[
    ("established", 0),
    ("fragments", 0),
    ("inactive", 0),
    ("time-range", 1),
    ("dscp", 1),
    ("precedence", 1),
    ("tos", 1),
    ("interval", 1),
    ("ttl", 2),
];

pub const LOG_KEYWORDS: &[&str] = &["log", "log-input"];

/// Numbered IOS ACLs in these ranges are standard (source-only) lists.
const STANDARD_NUMBER_RANGES: &[(u32, u32)] = &[(1, 99), (1300, 1999)];

pub fn option_arity(token: &str) -> Option<usize> {
    let lower = token.to_ascii_lowercase();
    RULE_OPTIONS
        .iter()
        .find(|(name, _)| *name == lower)
        .map(|(_, arity)| *arity)
}

pub fn is_log_keyword(token: &str) -> bool {
    LOG_KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(token))
}

pub fn is_standard_number(name: &str) -> bool {
    name.parse::<u32>().is_ok_and(|n| {
        STANDARD_NUMBER_RANGES
            .iter()
            .any(|(lo, hi)| (*lo..=*hi).contains(&n))
    })
}

/// Guess the dialect of a single line from its token shape.
///
/// `access-list <number>` is IOS-XE, `access-list <name>` is ASA. Other
/// lines are NX-OS when any field is written in CIDR form, IOS-XE otherwise.
pub fn detect_dialect(tokens: &[&str]) -> Dialect {
    if tokens
        .first()
        .is_some_and(|t| t.eq_ignore_ascii_case("access-list"))
    {
        let numbered = tokens
            .get(1)
            .is_some_and(|name| !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit()));
        return if numbered { Dialect::Iosxe } else { Dialect::Asa };
    }
    if tokens.iter().any(|t| t.contains('/')) {
        Dialect::Nxos
    } else {
        Dialect::Iosxe
    }
}

/// Address family an ACL heading introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingKind {
    Ip,
    Ipv6,
    Arp,
    Mac,
}

/// An ACL definition line such as `ip access-list extended EDGE-IN`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclHeading {
    pub name: String,
    pub kind: HeadingKind,
    /// Dialect pinned for the entries that follow, when the heading form
    /// makes it unambiguous.
    pub dialect: Option<Dialect>,
    pub standard: bool,
}

/// Recognize an ACL heading line.
pub fn parse_heading(text: &str) -> Option<AclHeading> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let lower: Vec<String> = tokens.iter().map(|t| t.to_ascii_lowercase()).collect();
    let lower: Vec<&str> = lower.iter().map(String::as_str).collect();
    match lower.as_slice() {
        ["ip", "access-list", "extended", _, ..] => Some(AclHeading {
            name: tokens[3].to_string(),
            kind: HeadingKind::Ip,
            dialect: Some(Dialect::Iosxe),
            standard: false,
        }),
        ["ip", "access-list", "standard", _, ..] => Some(AclHeading {
            name: tokens[3].to_string(),
            kind: HeadingKind::Ip,
            dialect: Some(Dialect::Iosxe),
            standard: true,
        }),
        ["ip", "access-list", _, ..] => Some(AclHeading {
            name: tokens[2].to_string(),
            kind: HeadingKind::Ip,
            dialect: Some(Dialect::Nxos),
            standard: false,
        }),
        ["ipv6", "access-list", _, ..] => Some(AclHeading {
            name: tokens.last().map(|t| t.to_string()).unwrap_or_default(),
            kind: HeadingKind::Ipv6,
            dialect: None,
            standard: false,
        }),
        ["arp", "access-list", _, ..] => Some(AclHeading {
            name: tokens[2].to_string(),
            kind: HeadingKind::Arp,
            dialect: Some(Dialect::Nxos),
            standard: false,
        }),
        ["mac", "access-list", _, ..] => Some(AclHeading {
            name: tokens.last().map(|t| t.to_string()).unwrap_or_default(),
            kind: HeadingKind::Mac,
            dialect: None,
            standard: false,
        }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{detect_dialect, grammar, is_standard_number, parse_heading, HeadingKind, PairForm};
    use crate::rule::Dialect;

    fn tokens(line: &str) -> Vec<&str> {
        line.split_whitespace().collect()
    }

    #[test]
    fn detects_dialect_from_token_shape() {
        assert_eq!(
            detect_dialect(&tokens("10 permit tcp 10.0.0.0/8 10.1.0.0/16 eq 80")),
            Dialect::Nxos
        );
        assert_eq!(
            detect_dialect(&tokens("access-list 101 permit ip any any")),
            Dialect::Iosxe
        );
        assert_eq!(
            detect_dialect(&tokens("access-list OUTSIDE extended permit ip any any")),
            Dialect::Asa
        );
        assert_eq!(
            detect_dialect(&tokens("20 permit tcp host 10.0.0.1 10.2.0.0 0.0.255.255")),
            Dialect::Iosxe
        );
    }

    #[test]
    fn asa_reads_pairs_as_netmasks() {
        assert_eq!(grammar(Dialect::Asa).pair_form, PairForm::Netmask);
        assert_eq!(grammar(Dialect::Iosxe).pair_form, PairForm::Wildcard);
    }

    #[test]
    fn standard_numbers() {
        assert!(is_standard_number("10"));
        assert!(is_standard_number("1300"));
        assert!(!is_standard_number("101"));
        assert!(!is_standard_number("MGMT"));
    }

    #[test]
    fn headings_pin_dialect() {
        let ext = parse_heading("ip access-list extended EDGE-IN").expect("heading");
        assert_eq!(ext.name, "EDGE-IN");
        assert_eq!(ext.dialect, Some(Dialect::Iosxe));

        let nx = parse_heading("ip access-list CORE-FILTER").expect("heading");
        assert_eq!(nx.dialect, Some(Dialect::Nxos));

        let arp = parse_heading("arp access-list ARP-GUARD").expect("heading");
        assert_eq!(arp.kind, HeadingKind::Arp);

        assert!(parse_heading("interface Ethernet1/1").is_none());
    }
}
