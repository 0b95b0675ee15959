//! ACL policy analysis for device configuration backups.
//!
//! Device configurations arrive as columns of text lines. This crate finds
//! the ACL blocks in each column, parses them with `acl-core`, and runs the
//! analyses that operations teams review before a clean-up: redundant and
//! shadowed rules inside a block, conflicts between two device categories,
//! rules matching any address, and rules whose networks hold no live ARP
//! entry.
//!
//! # Architecture
//!
//! ## Input & Configuration
//!
//! - [`input`]: Load device columns from text files, JSON or directories
//! - [`config`]: TOML engine configuration (services, ignore-any, pairings)
//! - [`category`]: Device categories and name-based classification
//!
//! ## Extraction
//!
//! - [`blocks`]: Split a column into ACL blocks and parse their rules
//!
//! ## Analysis
//!
//! - [`duplicate`]: Redundant and shadowed rules, coverage groups
//! - [`cross_check`]: Conflicts and duplicates between two categories
//! - [`any_rules`]: ARP rules and any-address rules
//! - [`arp`]: ARP liveness of rule networks
//! - [`check`]: Run tasks and assemble a [`check::Report`]
//!
//! ## Reporting
//!
//! - [`finding`]: Findings and the rule references they carry
//! - [`report`]: Colored terminal rendering
//!
//! # Examples
//!
//! ```ignore
//! use fleet_acl::check::{build_report, Task};
//! use fleet_acl::config::default_config;
//! use fleet_acl::input::{assign_categories, load_path};
//!
//! let config = default_config();
//! let mut columns = load_path("backups/".as_ref())?;
//! assign_categories(&mut columns, &config.categories, None);
//! let report = build_report(&columns, &config, Task::Check);
//! println!("Errors: {}, Warnings: {}", report.errors, report.warnings);
//! ```

pub mod any_rules;
pub mod arp;
pub mod blocks;
pub mod category;
pub mod check;
pub mod config;
pub mod cross_check;
pub mod duplicate;
pub mod finding;
pub mod input;
pub mod report;
