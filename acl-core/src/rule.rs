use std::fmt;

use serde::Serialize;

use crate::network::Network;
use crate::port::PortSpec;

/// Vendor grammar a rule line was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Dialect {
    #[serde(rename = "NXOS")]
    Nxos,
    #[serde(rename = "IOSXE")]
    Iosxe,
    #[serde(rename = "ASA")]
    Asa,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dialect::Nxos => "NXOS",
            Dialect::Iosxe => "IOSXE",
            Dialect::Asa => "ASA",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Permit,
    Deny,
}

impl Action {
    pub fn from_keyword(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "permit" => Some(Action::Permit),
            "deny" => Some(Action::Deny),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Permit => "permit",
            Action::Deny => "deny",
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    #[default]
    Ip,
    Tcp,
    Udp,
    Icmp,
    Arp,
    Other(String),
}

impl Protocol {
    pub fn from_token(token: &str) -> Self {
        match token.to_ascii_lowercase().as_str() {
            "ip" | "ipv4" | "ipv6" => Protocol::Ip,
            "tcp" | "6" => Protocol::Tcp,
            "udp" | "17" => Protocol::Udp,
            "icmp" | "1" => Protocol::Icmp,
            "arp" => Protocol::Arp,
            other => Protocol::Other(other.to_string()),
        }
    }

    /// Only TCP and UDP rules take port operators.
    pub fn carries_ports(&self) -> bool {
        matches!(self, Protocol::Tcp | Protocol::Udp)
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Ip => f.write_str("ip"),
            Protocol::Tcp => f.write_str("tcp"),
            Protocol::Udp => f.write_str("udp"),
            Protocol::Icmp => f.write_str("icmp"),
            Protocol::Arp => f.write_str("arp"),
            Protocol::Other(name) => f.write_str(name),
        }
    }
}

/// Where in the source table a rule or line was found. Rows are 1-based.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Location {
    pub start_row: usize,
    pub end_row: usize,
    pub column: usize,
}

impl Location {
    pub fn row(row: usize, column: usize) -> Self {
        Self {
            start_row: row,
            end_row: row,
            column,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start_row == self.end_row {
            write!(f, "col{}:row{}", self.column, self.start_row)
        } else {
            write!(
                f,
                "col{}:rows{}-{}",
                self.column, self.start_row, self.end_row
            )
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Source,
    Destination,
}

/// Non-fatal anomaly recorded while parsing a rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RuleWarning {
    /// A port name did not resolve; that side was widened to any port.
    ServiceResolution { side: Side, name: String },
    /// A wildcard/netmask was not a contiguous run of bits.
    NonContiguousMask { side: Side },
}

impl fmt::Display for RuleWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleWarning::ServiceResolution { side, name } => {
                write!(f, "unknown service '{name}' on {side:?} treated as any port")
            }
            RuleWarning::NonContiguousMask { side } => {
                write!(f, "non-contiguous mask on {side:?}, network is approximate")
            }
        }
    }
}

/// One parsed ACL entry. Analyses only ever borrow it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AclRule {
    pub dialect: Dialect,
    pub action: Action,
    pub protocol: Protocol,
    pub source: Network,
    pub destination: Network,
    /// Empty means any source port.
    pub src_ports: Vec<PortSpec>,
    /// Empty means any destination port.
    pub dst_ports: Vec<PortSpec>,
    pub log: bool,
    pub raw: String,
    pub location: Location,
    pub sequence: Option<u32>,
    pub acl_name: Option<String>,
    pub warnings: Vec<RuleWarning>,
}

impl AclRule {
    pub fn has_any_address(&self) -> bool {
        self.source.is_any() || self.destination.is_any()
    }

    pub fn is_arp(&self) -> bool {
        self.protocol == Protocol::Arp
    }

    pub fn has_non_contiguous_mask(&self) -> bool {
        self.source.non_contiguous_mask() || self.destination.non_contiguous_mask()
    }
}

impl fmt::Display for AclRule {
    /// Canonical one-line rendering, independent of the source dialect.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.action, self.protocol, self.source)?;
        for port in &self.src_ports {
            write!(f, " {port}")?;
        }
        write!(f, " {}", self.destination)?;
        for port in &self.dst_ports {
            write!(f, " {port}")?;
        }
        if self.log {
            f.write_str(" log")?;
        }
        Ok(())
    }
}
