//! Single-line ACL parser.
//!
//! One token walker handles all three dialects; dialect differences come
//! from the [`crate::dialect`] grammar rows. A line that looks like an ACL
//! entry but cannot be read yields [`LineOutcome::Malformed`] instead of an
//! error, so callers can keep going with the next line.

use std::net::Ipv4Addr;

use thiserror::Error;
use tracing::trace;

use crate::dialect::{
    detect_dialect, grammar, is_log_keyword, is_standard_number, option_arity, AclHeading,
    DialectGrammar, HeadingKind, PairForm,
};
use crate::network::{to_network, AddressError, AddressSpec, Network};
use crate::port::{to_port, PortError, PortOp, PortSpec};
use crate::rule::{AclRule, Action, Dialect, Location, Protocol, RuleWarning, Side};
use crate::services::ServiceTable;

/// How much of a rule to keep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParseMode {
    /// Addresses and ports.
    #[default]
    Full,
    /// Addresses only; every rule comes back with any-port specs.
    NetworkOnly,
}

/// Why an ACL-looking line could not be turned into a rule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("no permit/deny action found")]
    MissingAction,
    #[error("missing {0}")]
    MissingField(&'static str),
    #[error("invalid {side} address: {error}")]
    Address {
        side: &'static str,
        error: AddressError,
    },
    #[error("invalid port match: {0}")]
    Port(PortError),
    #[error("object reference '{0}' cannot be resolved")]
    ObjectReference(String),
    #[error("unexpected token '{0}'")]
    UnexpectedToken(String),
}

/// Result of feeding one line to the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Rule(AclRule),
    /// Blank, comment/remark, or non-ACL configuration.
    NotARule,
    Malformed(ParseError),
}

impl LineOutcome {
    pub fn rule(self) -> Option<AclRule> {
        match self {
            LineOutcome::Rule(rule) => Some(rule),
            _ => None,
        }
    }
}

/// True when `text` is an ACL entry in one of the supported grammars.
///
/// Accepted shapes:
/// - `permit ...` / `deny ...`
/// - `<seq> permit ...`
/// - `access-list <name|number> [line N] [extended|standard] permit ...`
pub fn is_acl_rule(text: &str) -> bool {
    let tokens: Vec<String> = text
        .split_whitespace()
        .take(8)
        .map(str::to_ascii_lowercase)
        .collect();
    let Some(first) = tokens.first() else {
        return false;
    };
    let is_action = |t: &String| t == "permit" || t == "deny";
    if first.starts_with('!') || first.starts_with('#') {
        return false;
    }
    if is_action(first) {
        return true;
    }
    if first.bytes().all(|b| b.is_ascii_digit()) {
        return tokens.get(1).is_some_and(is_action);
    }
    if first == "access-list" {
        let mut idx = 2;
        if tokens.get(idx).is_some_and(|t| t == "line") {
            idx += 2;
        }
        if tokens
            .get(idx)
            .is_some_and(|t| t == "extended" || t == "standard")
        {
            idx += 1;
        }
        return tokens.get(idx).is_some_and(is_action);
    }
    false
}

/// Parse one line, auto-detecting the dialect unless a hint pins it.
pub fn parse_line(
    text: &str,
    dialect_hint: Option<Dialect>,
    mode: ParseMode,
    services: &ServiceTable,
) -> LineOutcome {
    LineParser::new(services)
        .dialect(dialect_hint)
        .mode(mode)
        .parse(text, Location::default())
}

pub fn parse_full(text: &str, services: &ServiceTable) -> LineOutcome {
    LineParser::new(services).parse(text, Location::default())
}

pub fn parse_network_only(text: &str, services: &ServiceTable) -> LineOutcome {
    LineParser::new(services)
        .mode(ParseMode::NetworkOnly)
        .parse(text, Location::default())
}

/// Reusable parser carrying block-level context (pinned dialect, ACL name,
/// standard/ARP list kind).
#[derive(Debug, Clone)]
pub struct LineParser<'a> {
    services: &'a ServiceTable,
    mode: ParseMode,
    dialect: Option<Dialect>,
    acl_name: Option<String>,
    standard: bool,
    arp: bool,
    ipv6: bool,
}

impl<'a> LineParser<'a> {
    pub fn new(services: &'a ServiceTable) -> Self {
        Self {
            services,
            mode: ParseMode::Full,
            dialect: None,
            acl_name: None,
            standard: false,
            arp: false,
            ipv6: false,
        }
    }

    pub fn mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn dialect(mut self, dialect: Option<Dialect>) -> Self {
        self.dialect = dialect;
        self
    }

    /// Apply the context of the ACL heading the following lines belong to.
    pub fn heading(mut self, heading: &AclHeading) -> Self {
        if heading.dialect.is_some() {
            self.dialect = heading.dialect;
        }
        self.acl_name = Some(heading.name.clone());
        self.standard = heading.standard;
        self.arp = heading.kind == HeadingKind::Arp;
        self.ipv6 = heading.kind == HeadingKind::Ipv6;
        self
    }

    pub fn parse(&self, text: &str, location: Location) -> LineOutcome {
        let line = text.trim();
        if !is_acl_rule(line) {
            return LineOutcome::NotARule;
        }
        match self.parse_rule(line, location) {
            Ok(rule) => LineOutcome::Rule(rule),
            Err(err) => {
                trace!(line, %err, "malformed ACL line");
                LineOutcome::Malformed(err)
            }
        }
    }

    fn parse_rule(&self, line: &str, location: Location) -> Result<AclRule, ParseError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let dialect = self.dialect.unwrap_or_else(|| detect_dialect(&tokens));
        let grammar = grammar(dialect);
        let mut cur = Cursor::new(&tokens);
        let mut acl_name = self.acl_name.clone();
        let mut standard = self.standard;
        let mut sequence = None;

        if cur.peek_is("access-list") {
            cur.advance();
            let name = cur.advance().ok_or(ParseError::MissingField("ACL name"))?;
            standard |= is_standard_number(name);
            acl_name = Some(name.to_string());
            if cur.peek_is("line") {
                cur.advance();
                sequence = cur.advance().and_then(|t| t.parse().ok());
            }
            if cur.peek_is("extended") {
                cur.advance();
            } else if cur.peek_is("standard") {
                cur.advance();
                standard = true;
            }
        } else if let Some(seq) = cur.peek().and_then(|t| t.parse::<u32>().ok()) {
            sequence = Some(seq);
            cur.advance();
        }

        let action = cur
            .advance()
            .and_then(Action::from_keyword)
            .ok_or(ParseError::MissingAction)?;

        let mut body = Body::default();
        let arp = self.arp || tokens.iter().any(|t| t.eq_ignore_ascii_case("mac"));
        if arp {
            self.arp_body(&mut cur, grammar, &mut body)?;
        } else if standard || cur.peek().is_some_and(|t| self.starts_address(t, grammar)) {
            self.standard_body(&mut cur, grammar, &mut body)?;
        } else {
            self.extended_body(&mut cur, grammar, &mut body)?;
        }

        if self.mode == ParseMode::NetworkOnly {
            body.src_ports.clear();
            body.dst_ports.clear();
            body.warnings
                .retain(|w| !matches!(w, RuleWarning::ServiceResolution { .. }));
        }

        Ok(AclRule {
            dialect,
            action,
            protocol: body.protocol,
            source: body.source,
            destination: body.destination,
            src_ports: body.src_ports,
            dst_ports: body.dst_ports,
            log: body.log,
            raw: line.to_string(),
            location,
            sequence,
            acl_name,
            warnings: body.warnings,
        })
    }

    fn extended_body(
        &self,
        cur: &mut Cursor<'_, '_>,
        grammar: &DialectGrammar,
        body: &mut Body,
    ) -> Result<(), ParseError> {
        let proto = cur.advance().ok_or(ParseError::MissingField("protocol"))?;
        if is_object_keyword(proto) {
            return Err(object_reference(proto, cur));
        }
        body.protocol = Protocol::from_token(proto);
        body.source = self.address(cur, grammar, Side::Source, body)?;
        body.src_ports = self.ports(cur, grammar, Side::Source, body)?;
        body.destination = self.address(cur, grammar, Side::Destination, body)?;
        body.dst_ports = self.ports(cur, grammar, Side::Destination, body)?;
        if body.protocol == Protocol::Icmp {
            // icmp type and code names are not modelled
            while cur
                .peek()
                .is_some_and(|t| !is_log_keyword(t) && option_arity(t).is_none())
            {
                cur.advance();
            }
        }
        trailing_options(cur, body)
    }

    fn standard_body(
        &self,
        cur: &mut Cursor<'_, '_>,
        grammar: &DialectGrammar,
        body: &mut Body,
    ) -> Result<(), ParseError> {
        body.protocol = Protocol::Ip;
        body.source = self.address(cur, grammar, Side::Source, body)?;
        body.destination = self.any_for(&body.source);
        trailing_options(cur, body)
    }

    /// `permit [request|response] ip <sender> mac <sender-mac>`.
    fn arp_body(
        &self,
        cur: &mut Cursor<'_, '_>,
        grammar: &DialectGrammar,
        body: &mut Body,
    ) -> Result<(), ParseError> {
        // sender addresses in ARP lists are always address plus netmask
        let grammar = &DialectGrammar {
            pair_form: PairForm::Netmask,
            ..*grammar
        };
        body.protocol = Protocol::Arp;
        if cur.peek_is("request") || cur.peek_is("response") {
            cur.advance();
        }
        match cur.advance() {
            Some(t) if t.eq_ignore_ascii_case("ip") || t.eq_ignore_ascii_case("arp") => {}
            Some(t) => return Err(ParseError::UnexpectedToken(t.to_string())),
            None => return Err(ParseError::MissingField("protocol")),
        }
        body.source = self.address(cur, grammar, Side::Source, body)?;
        body.destination = Network::any();
        match cur.peek() {
            None => Ok(()),
            Some(t) if t.eq_ignore_ascii_case("mac") => {
                while let Some(token) = cur.advance() {
                    body.log |= is_log_keyword(token);
                }
                Ok(())
            }
            Some(_) => trailing_options(cur, body),
        }
    }

    fn starts_address(&self, token: &str, grammar: &DialectGrammar) -> bool {
        token.eq_ignore_ascii_case("host")
            || is_any_keyword(token, grammar)
            || token.contains('.')
            || token.contains('/')
    }

    fn any_for(&self, source: &Network) -> Network {
        if self.ipv6 || source.base().is_ipv6() {
            Network::any_v6()
        } else {
            Network::any()
        }
    }

    fn address(
        &self,
        cur: &mut Cursor<'_, '_>,
        grammar: &DialectGrammar,
        side: Side,
        body: &mut Body,
    ) -> Result<Network, ParseError> {
        let field = side_name(side);
        let token = cur.advance().ok_or(ParseError::MissingField(field))?;
        let lower = token.to_ascii_lowercase();
        let spec = if grammar.any_v4.contains(&lower.as_str()) {
            if self.ipv6 {
                AddressSpec::AnyV6
            } else {
                AddressSpec::Any
            }
        } else if grammar.any_v6.contains(&lower.as_str()) {
            AddressSpec::AnyV6
        } else if lower == "host" {
            AddressSpec::Host(cur.advance().ok_or(ParseError::MissingField(field))?)
        } else if is_object_keyword(token) {
            return Err(object_reference(token, cur));
        } else if token.contains('/') {
            AddressSpec::Cidr(token)
        } else if cur.peek().is_some_and(is_dotted_quad) && token.parse::<Ipv4Addr>().is_ok() {
            let mask = cur.advance().unwrap_or_default();
            match grammar.pair_form {
                PairForm::Wildcard => AddressSpec::Wildcard {
                    address: token,
                    wildcard: mask,
                },
                PairForm::Netmask => AddressSpec::Netmask {
                    address: token,
                    mask,
                },
            }
        } else {
            AddressSpec::Host(token)
        };

        let network = to_network(spec).map_err(|error| ParseError::Address { side: field, error })?;
        if network.non_contiguous_mask() {
            body.warnings.push(RuleWarning::NonContiguousMask { side });
        }
        Ok(network)
    }

    fn ports(
        &self,
        cur: &mut Cursor<'_, '_>,
        grammar: &DialectGrammar,
        side: Side,
        body: &mut Body,
    ) -> Result<Vec<PortSpec>, ParseError> {
        if !body.protocol.carries_ports() {
            return Ok(Vec::new());
        }
        let Some(op) = cur.peek().and_then(PortOp::from_keyword) else {
            return Ok(Vec::new());
        };
        cur.advance();
        let values = match op.arity() {
            Some(n) => cur.take(n),
            None => cur.take_while(|t| is_port_value(t, grammar)),
        };
        match to_port(op, &values, self.services) {
            Ok(specs) => Ok(specs.into_iter().filter(|s| !s.is_any()).collect()),
            Err(_) if self.mode == ParseMode::NetworkOnly => Ok(Vec::new()),
            Err(PortError::Service(err)) => {
                body.warnings.push(RuleWarning::ServiceResolution {
                    side,
                    name: err.name,
                });
                Ok(Vec::new())
            }
            Err(err) => Err(ParseError::Port(err)),
        }
    }
}

/// Fields collected while walking one rule body.
#[derive(Debug, Default)]
struct Body {
    protocol: Protocol,
    source: Network,
    destination: Network,
    src_ports: Vec<PortSpec>,
    dst_ports: Vec<PortSpec>,
    log: bool,
    warnings: Vec<RuleWarning>,
}

fn trailing_options(cur: &mut Cursor<'_, '_>, body: &mut Body) -> Result<(), ParseError> {
    while let Some(token) = cur.advance() {
        if is_log_keyword(token) {
            // ASA allows a level and interval after `log`
            body.log = true;
            return Ok(());
        }
        match option_arity(token) {
            Some(arity) => {
                cur.take(arity);
            }
            None => return Err(ParseError::UnexpectedToken(token.to_string())),
        }
    }
    Ok(())
}

fn side_name(side: Side) -> &'static str {
    match side {
        Side::Source => "source address",
        Side::Destination => "destination address",
    }
}

fn is_any_keyword(token: &str, grammar: &DialectGrammar) -> bool {
    let lower = token.to_ascii_lowercase();
    grammar.any_v4.contains(&lower.as_str()) || grammar.any_v6.contains(&lower.as_str())
}

fn is_object_keyword(token: &str) -> bool {
    matches!(
        token.to_ascii_lowercase().as_str(),
        "object" | "object-group" | "interface" | "addrgroup" | "portgroup"
    )
}

fn object_reference(keyword: &str, cur: &mut Cursor<'_, '_>) -> ParseError {
    match cur.advance() {
        Some(name) => ParseError::ObjectReference(format!("{keyword} {name}")),
        None => ParseError::ObjectReference(keyword.to_string()),
    }
}

fn is_dotted_quad(token: &str) -> bool {
    token.parse::<Ipv4Addr>().is_ok()
}

fn is_port_value(token: &str, grammar: &DialectGrammar) -> bool {
    !(token.contains('.')
        || token.contains('/')
        || token.contains(':')
        || token.eq_ignore_ascii_case("host")
        || is_any_keyword(token, grammar)
        || is_object_keyword(token)
        || is_log_keyword(token)
        || option_arity(token).is_some()
        || PortOp::from_keyword(token).is_some())
}

struct Cursor<'t, 'a> {
    tokens: &'t [&'a str],
    pos: usize,
}

impl<'t, 'a> Cursor<'t, 'a> {
    fn new(tokens: &'t [&'a str]) -> Self {
        Self { tokens, pos: 0 }
    }

    fn peek(&self) -> Option<&'a str> {
        self.tokens.get(self.pos).copied()
    }

    fn peek_is(&self, keyword: &str) -> bool {
        self.peek().is_some_and(|t| t.eq_ignore_ascii_case(keyword))
    }

    fn advance(&mut self) -> Option<&'a str> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn take(&mut self, n: usize) -> Vec<&'a str> {
        let mut out = Vec::with_capacity(n);
        for _ in 0..n {
            match self.advance() {
                Some(token) => out.push(token),
                None => break,
            }
        }
        out
    }

    fn take_while(&mut self, pred: impl Fn(&str) -> bool) -> Vec<&'a str> {
        let mut out = Vec::new();
        while let Some(token) = self.peek() {
            if !pred(token) {
                break;
            }
            out.push(token);
            self.pos += 1;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::{
        is_acl_rule, parse_full, parse_line, parse_network_only, LineOutcome, LineParser,
        ParseError, ParseMode,
    };
    use crate::dialect::parse_heading;
    use crate::port::PortSpec;
    use crate::rule::{Action, AclRule, Dialect, Location, Protocol, RuleWarning, Side};
    use crate::services::ServiceTable;

    fn rule(line: &str) -> AclRule {
        match parse_full(line, &ServiceTable::builtin()) {
            LineOutcome::Rule(rule) => rule,
            other => panic!("expected rule for {line:?}, got {other:?}"),
        }
    }

    fn malformed(line: &str) -> ParseError {
        match parse_full(line, &ServiceTable::builtin()) {
            LineOutcome::Malformed(err) => err,
            other => panic!("expected malformed for {line:?}, got {other:?}"),
        }
    }

    #[test]
    fn recognizes_rule_shapes() {
        assert!(is_acl_rule("permit ip any any"));
        assert!(is_acl_rule("  10 deny tcp 10.0.0.0/8 any"));
        assert!(is_acl_rule("access-list 101 permit ip any any"));
        assert!(is_acl_rule("access-list OUTSIDE line 3 extended deny ip any any"));
        assert!(!is_acl_rule("access-list OUTSIDE remark allow web"));
        assert!(!is_acl_rule("10 remark web servers"));
        assert!(!is_acl_rule("! permit ip any any"));
        assert!(!is_acl_rule("ip prefix-list LAN seq 5 permit 10.0.0.0/8"));
        assert!(!is_acl_rule("route-map RM permit 10"));
        assert!(!is_acl_rule(""));
    }

    #[test]
    fn nxos_sequence_numbered_cidr() {
        let r = rule("10 permit tcp 10.0.0.0/8 10.1.0.0/16 eq 80");
        assert_eq!(r.dialect, Dialect::Nxos);
        assert_eq!(r.sequence, Some(10));
        assert_eq!(r.action, Action::Permit);
        assert_eq!(r.protocol, Protocol::Tcp);
        assert_eq!(r.source.to_string(), "10.0.0.0/8");
        assert_eq!(r.destination.to_string(), "10.1.0.0/16");
        assert_eq!(r.dst_ports, vec![PortSpec::Eq(80)]);
        assert!(r.src_ports.is_empty());
    }

    #[test]
    fn nxos_source_port_and_range() {
        let r = rule("162 permit tcp 10.10.100.31/32 eq 55888 10.10.108.63/32");
        assert_eq!(r.src_ports, vec![PortSpec::Eq(55888)]);
        assert!(r.dst_ports.is_empty());

        let r = rule("182 permit tcp 10.10.106.40/32 range 8001 8002 10.10.62.32/31");
        assert_eq!(r.src_ports, vec![PortSpec::Range { lo: 8001, hi: 8002 }]);
        assert_eq!(r.destination.to_string(), "10.10.62.32/31");
    }

    #[test]
    fn iosxe_host_wildcard_and_multi_eq() {
        let r = rule("180 permit tcp 10.65.88.192 0.0.0.63 eq www 443 8400 10.62.80.0 0.0.0.7 log");
        assert_eq!(r.dialect, Dialect::Iosxe);
        assert_eq!(r.source.to_string(), "10.65.88.192/26");
        assert_eq!(
            r.src_ports,
            vec![PortSpec::Eq(80), PortSpec::Eq(443), PortSpec::Eq(8400)]
        );
        assert_eq!(r.destination.to_string(), "10.62.80.0/29");
        assert!(r.log);

        let r = rule("permit udp host 10.65.16.53 eq domain ntp 10.70.130.0 0.0.0.255");
        assert_eq!(r.source.to_string(), "10.65.16.53/32");
        assert_eq!(r.src_ports, vec![PortSpec::Eq(53), PortSpec::Eq(123)]);
    }

    #[test]
    fn iosxe_numbered_access_list_line() {
        let r = rule("access-list 101 deny tcp any host 192.168.1.10 eq 22 log-input");
        assert_eq!(r.dialect, Dialect::Iosxe);
        assert_eq!(r.acl_name.as_deref(), Some("101"));
        assert!(r.source.is_any());
        assert_eq!(r.dst_ports, vec![PortSpec::Eq(22)]);
        assert!(r.log);
    }

    #[test]
    fn standard_numbered_list_is_source_only() {
        let r = rule("access-list 10 permit 10.1.1.0 0.0.0.255");
        assert_eq!(r.protocol, Protocol::Ip);
        assert_eq!(r.source.to_string(), "10.1.1.0/24");
        assert!(r.destination.is_any());
    }

    #[test]
    fn asa_named_list_uses_netmasks() {
        let r = rule(
            "access-list OUTSIDE_IN line 4 extended permit tcp 10.0.0.0 255.255.0.0 host 172.16.1.1 gt 1023 log 6 interval 300",
        );
        assert_eq!(r.dialect, Dialect::Asa);
        assert_eq!(r.acl_name.as_deref(), Some("OUTSIDE_IN"));
        assert_eq!(r.sequence, Some(4));
        assert_eq!(r.source.to_string(), "10.0.0.0/16");
        assert_eq!(r.dst_ports, vec![PortSpec::Range { lo: 1024, hi: 65535 }]);
        assert!(r.log);
    }

    #[test]
    fn asa_any4_keyword() {
        let r = rule("access-list OUT extended deny ip any4 any4");
        assert!(r.source.is_any() && r.destination.is_any());
    }

    #[test]
    fn unknown_service_degrades_to_any_with_warning() {
        let r = rule("permit tcp 10.0.0.0/8 10.1.0.0/16 eq frobnicate");
        assert!(r.dst_ports.is_empty());
        assert_eq!(
            r.warnings,
            vec![RuleWarning::ServiceResolution {
                side: Side::Destination,
                name: "frobnicate".to_string()
            }]
        );
    }

    #[test]
    fn non_contiguous_wildcard_is_annotated() {
        let r = rule("permit ip 10.1.0.1 0.0.255.0 any");
        assert!(r.has_non_contiguous_mask());
        assert_eq!(r.warnings, vec![RuleWarning::NonContiguousMask { side: Side::Source }]);
    }

    #[test]
    fn network_only_mode_drops_ports() {
        let LineOutcome::Rule(r) =
            parse_network_only("permit tcp 10.0.0.0/8 any eq nosuch", &ServiceTable::builtin())
        else {
            panic!("expected rule");
        };
        assert!(r.dst_ports.is_empty());
        assert!(r.warnings.is_empty());
    }

    #[test]
    fn malformed_lines_are_reported_not_thrown() {
        assert_eq!(
            malformed("permit tcp 10.0.0.0/8"),
            ParseError::MissingField("destination address")
        );
        assert!(matches!(
            malformed("permit tcp 10.0.0.0/33 any"),
            ParseError::Address { .. }
        ));
        assert!(matches!(
            malformed("access-list OUT extended permit tcp object-group WEB any"),
            ParseError::ObjectReference(_)
        ));
        assert_eq!(
            malformed("permit tcp any any gt 1023 bogus"),
            ParseError::UnexpectedToken("bogus".to_string())
        );
        assert!(matches!(
            malformed("permit tcp any any neq 80"),
            ParseError::Port(_)
        ));
    }

    #[test]
    fn comments_and_config_are_not_rules() {
        let services = ServiceTable::builtin();
        assert_eq!(parse_line("remark web", None, ParseMode::Full, &services), LineOutcome::NotARule);
        assert_eq!(parse_line("   ", None, ParseMode::Full, &services), LineOutcome::NotARule);
        assert_eq!(
            parse_line("interface Ethernet1/1", None, ParseMode::Full, &services),
            LineOutcome::NotARule
        );
    }

    #[test]
    fn icmp_type_names_are_skipped() {
        let r = rule("permit icmp any 10.0.0.0 0.255.255.255 echo-reply log");
        assert_eq!(r.protocol, Protocol::Icmp);
        assert!(r.log);
    }

    #[test]
    fn arp_heading_parses_arp_entries() {
        let services = ServiceTable::builtin();
        let heading = parse_heading("arp access-list ARP-GUARD").expect("heading");
        let parser = LineParser::new(&services).heading(&heading);
        let r = parser
            .parse("10 permit ip 10.1.1.0 255.255.255.0 mac any", Location::row(3, 1))
            .rule()
            .expect("arp rule");
        assert!(r.is_arp());
        assert_eq!(r.acl_name.as_deref(), Some("ARP-GUARD"));
        assert_eq!(r.location, Location::row(3, 1));
    }

    #[test]
    fn dialect_hint_pins_pair_interpretation() {
        let services = ServiceTable::builtin();
        let r = parse_line(
            "permit ip 10.0.0.0 255.0.0.0 any",
            Some(Dialect::Asa),
            ParseMode::Full,
            &services,
        )
        .rule()
        .expect("rule");
        assert_eq!(r.source.to_string(), "10.0.0.0/8");
    }
}
