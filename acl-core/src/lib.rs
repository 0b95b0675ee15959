//! Vendor ACL parsing, address/port normalization and rule coverage
//! primitives used by higher-level analysis tools.

pub mod components;
pub mod coverage;
pub mod dialect;
pub mod network;
pub mod parser;
pub mod port;
pub mod rule;
pub mod services;

pub use components::{connected_components, UnionFind};
pub use coverage::{addresses_overlap, covers, equivalent, matches_superset, protocol_covers};
pub use dialect::{detect_dialect, parse_heading, AclHeading, HeadingKind};
pub use network::{to_network, AddressError, AddressSpec, Network};
pub use parser::{
    is_acl_rule, parse_full, parse_line, parse_network_only, LineOutcome, LineParser, ParseError,
    ParseMode,
};
pub use port::{ports_cover, to_port, PortError, PortOp, PortSpec};
pub use rule::{AclRule, Action, Dialect, Location, Protocol, RuleWarning, Side};
pub use services::{ServiceResolutionError, ServiceTable};
