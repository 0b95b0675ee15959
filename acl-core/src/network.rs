//! Canonical address networks.
//!
//! Every address form found in vendor ACL text (CIDR, `host X`, address plus
//! wildcard, address plus netmask, `any`) is normalized into a [`Network`]:
//! a base address with no host bits set below the prefix. Containment is a
//! plain prefix-subset test and is only defined inside one address family.

use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use ipnet::{IpNet, Ipv4Net, Ipv6Net};
use serde::Serialize;
use thiserror::Error;

/// Errors produced while normalizing an address field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("invalid address '{0}'")]
    InvalidAddress(String),
    #[error("invalid prefix in '{0}'")]
    InvalidPrefix(String),
    #[error("invalid mask '{0}'")]
    InvalidMask(String),
}

/// One address field as written in a rule, before normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressSpec<'a> {
    /// `any` / `any4`.
    Any,
    /// `any6`.
    AnyV6,
    /// `host X`, or a bare address without a mask.
    Host(&'a str),
    /// `10.0.0.0/8`.
    Cidr(&'a str),
    /// `10.0.0.0 0.255.255.255` (NX-OS / IOS-XE).
    Wildcard { address: &'a str, wildcard: &'a str },
    /// `10.0.0.0 255.0.0.0` (ASA).
    Netmask { address: &'a str, mask: &'a str },
}

/// A canonical `(base, prefix)` network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Network {
    net: IpNet,
    /// Set when the network came from a wildcard or netmask whose bits were
    /// not one contiguous run. The network is then a best-effort guess.
    non_contiguous_mask: bool,
}

impl Network {
    /// IPv4 `any`, `0.0.0.0/0`.
    pub fn any() -> Self {
        Self::from_net(IpNet::V4(Ipv4Net::default()))
    }

    /// IPv6 `any`, `::/0`.
    pub fn any_v6() -> Self {
        Self::from_net(IpNet::V6(Ipv6Net::default()))
    }

    /// Build from any `IpNet`, clearing host bits.
    pub fn from_net(net: IpNet) -> Self {
        Self {
            net: net.trunc(),
            non_contiguous_mask: false,
        }
    }

    pub fn base(&self) -> IpAddr {
        self.net.network()
    }

    pub fn prefix_len(&self) -> u8 {
        self.net.prefix_len()
    }

    pub fn net(&self) -> IpNet {
        self.net
    }

    pub fn is_any(&self) -> bool {
        self.net.prefix_len() == 0
    }

    pub fn non_contiguous_mask(&self) -> bool {
        self.non_contiguous_mask
    }

    /// True when every address of `other` is inside `self`.
    ///
    /// `(b1, p1)` contains `(b2, p2)` iff `p1 <= p2` and the top `p1` bits of
    /// both bases agree. Networks of different families never contain each
    /// other.
    pub fn contains(&self, other: &Network) -> bool {
        match (self.net, other.net) {
            (IpNet::V4(a), IpNet::V4(b)) => {
                a.prefix_len() <= b.prefix_len()
                    && top_bits_v4(a.network(), a.prefix_len())
                        == top_bits_v4(b.network(), a.prefix_len())
            }
            (IpNet::V6(a), IpNet::V6(b)) => {
                a.prefix_len() <= b.prefix_len()
                    && top_bits_v6(a.network(), a.prefix_len())
                        == top_bits_v6(b.network(), a.prefix_len())
            }
            _ => false,
        }
    }

    /// True when the two networks share at least one address.
    ///
    /// Prefix networks either nest or are disjoint, so this is containment in
    /// either direction.
    pub fn intersects(&self, other: &Network) -> bool {
        self.contains(other) || other.contains(self)
    }
}

impl Default for Network {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.net.network(), self.net.prefix_len())
    }
}

impl FromStr for Network {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" | "any4" => Ok(Self::any()),
            "any6" => Ok(Self::any_v6()),
            _ => to_network(AddressSpec::Cidr(s.trim())),
        }
    }
}

/// Normalize one address field into a canonical [`Network`].
///
/// Discontiguous wildcards and netmasks still produce a network (prefix from
/// the bit count, base masked accordingly) with the
/// [`Network::non_contiguous_mask`] flag set.
pub fn to_network(spec: AddressSpec<'_>) -> Result<Network, AddressError> {
    match spec {
        AddressSpec::Any => Ok(Network::any()),
        AddressSpec::AnyV6 => Ok(Network::any_v6()),
        AddressSpec::Host(address) => {
            let ip = parse_ip(address)?;
            let net = match ip {
                IpAddr::V4(v4) => IpNet::V4(Ipv4Net::from(v4)),
                IpAddr::V6(v6) => IpNet::V6(Ipv6Net::from(v6)),
            };
            Ok(Network::from_net(net))
        }
        AddressSpec::Cidr(text) => {
            let Some((address, prefix)) = text.trim().split_once('/') else {
                return to_network(AddressSpec::Host(text));
            };
            let ip = parse_ip(address)?;
            let prefix: u8 = prefix
                .trim()
                .parse()
                .map_err(|_| AddressError::InvalidPrefix(text.to_string()))?;
            let net = IpNet::new(ip, prefix)
                .map_err(|_| AddressError::InvalidPrefix(text.to_string()))?;
            Ok(Network::from_net(net))
        }
        AddressSpec::Wildcard { address, wildcard } => {
            let ip = parse_v4(address)?;
            let wildcard = parse_mask(wildcard)?;
            Ok(from_v4_mask(ip, !wildcard))
        }
        AddressSpec::Netmask { address, mask } => {
            let ip = parse_v4(address)?;
            let mask = parse_mask(mask)?;
            Ok(from_v4_mask(ip, mask))
        }
    }
}

fn from_v4_mask(ip: Ipv4Addr, netmask: u32) -> Network {
    // count_ones is at most 32
    let prefix = netmask.count_ones() as u8;
    let contiguous = netmask == prefix_mask_v4(prefix);
    let base = Ipv4Addr::from(u32::from(ip) & netmask);
    let net = Ipv4Net::new(base, prefix)
        .map(IpNet::V4)
        .unwrap_or_else(|_| IpNet::V4(Ipv4Net::default()));
    Network {
        net: net.trunc(),
        non_contiguous_mask: !contiguous,
    }
}

fn prefix_mask_v4(prefix: u8) -> u32 {
    if prefix == 0 {
        0
    } else {
        u32::MAX << (32 - u32::from(prefix))
    }
}

fn top_bits_v4(address: Ipv4Addr, prefix: u8) -> u32 {
    u32::from(address) & prefix_mask_v4(prefix)
}

fn top_bits_v6(address: Ipv6Addr, prefix: u8) -> u128 {
    let mask = if prefix == 0 {
        0
    } else {
        u128::MAX << (128 - u32::from(prefix))
    };
    u128::from(address) & mask
}

fn parse_ip(text: &str) -> Result<IpAddr, AddressError> {
    text.trim()
        .parse::<IpAddr>()
        .map_err(|_| AddressError::InvalidAddress(text.to_string()))
}

fn parse_v4(text: &str) -> Result<Ipv4Addr, AddressError> {
    text.trim()
        .parse::<Ipv4Addr>()
        .map_err(|_| AddressError::InvalidAddress(text.to_string()))
}

fn parse_mask(text: &str) -> Result<u32, AddressError> {
    text.trim()
        .parse::<Ipv4Addr>()
        .map(u32::from)
        .map_err(|_| AddressError::InvalidMask(text.to_string()))
}
