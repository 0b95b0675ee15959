//! Engine configuration loaded from TOML.
//!
//! The parsed [`EngineConfig`] is immutable and handed to every task by
//! reference: service table, ignore-any overrides, device classification,
//! cross-check pairing, block skip patterns and ARP liveness scoping.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::net::IpAddr;
use std::path::Path;

use acl_core::{Network, ServiceTable};
use ipnet::IpNet;
use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::category::{CategoryRule, CategoryRules, DeviceCategory};

const EMBEDDED_CONFIG: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/config/default.toml"
));

/// Errors returned when loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
    #[error("invalid pattern '{pattern}' in {path}: {source}")]
    Pattern {
        path: String,
        pattern: String,
        source: regex::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    services: BTreeMap<String, u16>,
    #[serde(default)]
    ignore_any: IgnoreAny,
    #[serde(default)]
    blocks: BlocksSection,
    #[serde(default)]
    category: Vec<CategorySection>,
    #[serde(default)]
    cross_check: Vec<CrossCheckPair>,
    #[serde(default)]
    arp: ArpSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ArpSection {
    #[serde(default)]
    ignore_third_octet: BTreeSet<u8>,
    #[serde(default)]
    unused_prefixes: Vec<String>,
    #[serde(default)]
    platform_networks: BTreeMap<String, Vec<IpNet>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct BlocksSection {
    #[serde(default)]
    skip_acl_patterns: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CategorySection {
    id: DeviceCategory,
    #[serde(default)]
    name: String,
    #[serde(default)]
    patterns: Vec<String>,
}

/// Devices and categories whose `any` rules are not reported.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IgnoreAny {
    #[serde(default)]
    pub devices: BTreeSet<String>,
    #[serde(default)]
    pub categories: BTreeSet<DeviceCategory>,
}

impl IgnoreAny {
    /// Device names compare case-insensitively.
    pub fn applies(&self, device: &str, category: Option<DeviceCategory>) -> bool {
        self.devices.iter().any(|d| d.eq_ignore_ascii_case(device))
            || category.is_some_and(|c| self.categories.contains(&c))
    }
}

/// One pair of categories compared by the cross-check task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrossCheckPair {
    pub left: DeviceCategory,
    pub right: DeviceCategory,
}

/// Scope of the ARP liveness check.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArpSettings {
    /// IPv4 third octets whose ARP entries and rule networks are ignored.
    pub ignore_third_octet: BTreeSet<u8>,
    /// Address prefixes (`10.10.5.`) of ranges known to be unused.
    pub unused_prefixes: Vec<String>,
    /// Platform networks per lower-cased device name; `*` applies to
    /// devices without an entry of their own.
    pub platform_networks: BTreeMap<String, Vec<Network>>,
}

impl ArpSettings {
    /// Networks the liveness check is scoped to for `device`. Empty means
    /// nothing on the device is checked.
    pub fn platform_networks(&self, device: &str) -> &[Network] {
        self.platform_networks
            .get(&device.to_ascii_lowercase())
            .or_else(|| self.platform_networks.get("*"))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_unused(&self, network: &Network) -> bool {
        let base = network.base().to_string();
        self.unused_prefixes
            .iter()
            .any(|prefix| base.starts_with(prefix.as_str()))
    }

    pub fn ignores_octet(&self, network: &Network) -> bool {
        match network.base() {
            IpAddr::V4(addr) => self.ignore_third_octet.contains(&addr.octets()[2]),
            IpAddr::V6(_) => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub services: ServiceTable,
    pub ignore_any: IgnoreAny,
    pub categories: CategoryRules,
    pub cross_check: Vec<CrossCheckPair>,
    pub skip_acl_patterns: Vec<Regex>,
    pub arp: ArpSettings,
    /// Where the configuration came from: `embedded` or `file:<path>`.
    pub source: String,
}

impl EngineConfig {
    /// Built-in services only, no classification, no pairing, no skips.
    pub fn minimal() -> Self {
        Self {
            services: ServiceTable::builtin(),
            ignore_any: IgnoreAny::default(),
            categories: CategoryRules::default(),
            cross_check: Vec::new(),
            skip_acl_patterns: Vec::new(),
            arp: ArpSettings::default(),
            source: "builtin".to_string(),
        }
    }

    /// True when an ACL with this name is excluded from analysis.
    pub fn skips_acl(&self, name: &str) -> bool {
        self.skip_acl_patterns.iter().any(|p| p.is_match(name))
    }
}

/// Load configuration from `path`, or the embedded defaults when `None`.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, ConfigLoadError> {
    match path {
        Some(path) => load_config_file(path),
        None => Ok(default_config()),
    }
}

pub fn load_config_file(path: &Path) -> Result<EngineConfig, ConfigLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigLoadError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&raw, &path.display().to_string())
        .map(|config| with_source(config, format!("file:{}", path.display())))
}

/// Embedded defaults, falling back to [`EngineConfig::minimal`] if they do
/// not parse.
pub fn default_config() -> EngineConfig {
    match parse_config(EMBEDDED_CONFIG, "embedded config") {
        Ok(config) => with_source(config, "embedded".to_string()),
        Err(err) => {
            warn!(%err, "embedded config rejected, using built-in minimal config");
            EngineConfig::minimal()
        }
    }
}

pub fn parse_config(raw: &str, path: &str) -> Result<EngineConfig, ConfigLoadError> {
    let file: ConfigFile = toml::from_str(raw).map_err(|source| ConfigLoadError::Parse {
        path: path.to_string(),
        source,
    })?;

    let mut rules = Vec::with_capacity(file.category.len());
    for section in &file.category {
        let rule = CategoryRule::new(section.id, section.name.clone(), &section.patterns)
            .map_err(|source| pattern_error(path, &section.patterns, source))?;
        rules.push(rule);
    }

    let skip_acl_patterns = file
        .blocks
        .skip_acl_patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map_err(|source| ConfigLoadError::Pattern {
                    path: path.to_string(),
                    pattern: p.clone(),
                    source,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let arp = ArpSettings {
        ignore_third_octet: file.arp.ignore_third_octet,
        unused_prefixes: file.arp.unused_prefixes,
        platform_networks: file
            .arp
            .platform_networks
            .into_iter()
            .map(|(device, nets)| {
                (
                    device.to_ascii_lowercase(),
                    nets.into_iter().map(Network::from_net).collect(),
                )
            })
            .collect(),
    };

    Ok(EngineConfig {
        services: ServiceTable::builtin().with_overrides(file.services),
        ignore_any: file.ignore_any,
        categories: CategoryRules::new(rules),
        cross_check: file.cross_check,
        skip_acl_patterns,
        arp,
        source: String::new(),
    })
}

fn with_source(mut config: EngineConfig, source: String) -> EngineConfig {
    config.source = source;
    config
}

fn pattern_error(path: &str, patterns: &[String], source: regex::Error) -> ConfigLoadError {
    // regex::Error does not say which pattern failed; find the first one
    // that does not compile on its own.
    let pattern = patterns
        .iter()
        .find(|p| Regex::new(p).is_err())
        .cloned()
        .unwrap_or_default();
    ConfigLoadError::Pattern {
        path: path.to_string(),
        pattern,
        source,
    }
}

#[cfg(test)]
mod tests {
    use acl_core::Network;

    use super::{default_config, parse_config, ConfigLoadError, CrossCheckPair};
    use crate::category::DeviceCategory;

    #[test]
    fn embedded_defaults_parse() {
        let config = default_config();
        assert_eq!(config.source, "embedded");
        assert_eq!(
            config.cross_check,
            vec![CrossCheckPair {
                left: DeviceCategory::Cat1,
                right: DeviceCategory::Cat2
            }]
        );
        assert!(config.skips_acl("VTY-ACL-IP"));
        assert_eq!(
            config.categories.classify("dc1-fw01-frp"),
            Some(DeviceCategory::Cat3)
        );
    }

    #[test]
    fn services_overlay_builtin_table() {
        let config = parse_config(
            r#"
            [services]
            mgmt-api = 9443
            www = 8080
            "#,
            "test",
        )
        .expect("config");
        assert_eq!(config.services.resolve("mgmt-api"), Ok(9443));
        assert_eq!(config.services.resolve("www"), Ok(8080));
        assert_eq!(config.services.resolve("ssh"), Ok(22));
    }

    #[test]
    fn ignore_any_matches_device_or_category() {
        let config = parse_config(
            r#"
            [ignore_any]
            devices = ["Core-Lab-01"]
            categories = ["cat5"]
            "#,
            "test",
        )
        .expect("config");
        assert!(config.ignore_any.applies("core-lab-01", None));
        assert!(config
            .ignore_any
            .applies("edge-bgp-01", Some(DeviceCategory::Cat5)));
        assert!(!config
            .ignore_any
            .applies("edge-bgp-01", Some(DeviceCategory::Cat4)));
    }

    #[test]
    fn rejects_unknown_category_and_bad_regex() {
        let err = parse_config("[[category]]\nid = \"cat9\"\n", "test").expect_err("cat9");
        assert!(matches!(err, ConfigLoadError::Parse { .. }));

        let err = parse_config(
            "[[category]]\nid = \"cat1\"\npatterns = [\"ok\", \"(bad\"]\n",
            "test",
        )
        .expect_err("regex");
        match err {
            ConfigLoadError::Pattern { pattern, .. } => assert_eq!(pattern, "(bad"),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn arp_section_scopes_liveness_per_device() {
        let config = parse_config(
            r#"
            [arp]
            ignore_third_octet = [108]
            unused_prefixes = ["10.99."]

            [arp.platform_networks]
            "DC1-CS01-N9K" = ["10.20.0.0/16"]
            "*" = ["10.0.0.0/8"]
            "#,
            "test",
        )
        .expect("config");
        let arp = &config.arp;
        let scoped: Vec<String> = arp
            .platform_networks("dc1-cs01-n9k")
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(scoped, vec!["10.20.0.0/16".to_string()]);
        assert_eq!(arp.platform_networks("other").len(), 1);

        let net = |cidr: &str| Network::from_net(cidr.parse().expect("cidr"));
        assert!(arp.is_unused(&net("10.99.4.0/24")));
        assert!(!arp.is_unused(&net("10.9.0.0/16")));
        assert!(arp.ignores_octet(&net("10.1.108.0/24")));
        assert!(!arp.ignores_octet(&net("10.1.8.0/24")));
    }

    #[test]
    fn missing_arp_section_checks_nothing() {
        let config = parse_config("", "test").expect("config");
        assert!(config.arp.platform_networks("any-device").is_empty());
        let err = parse_config(
            "[arp.platform_networks]\nlab = [\"10.0.0.0/33\"]\n",
            "test",
        );
        assert!(matches!(err, Err(ConfigLoadError::Parse { .. })));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse_config("[blocks]\nskip = []\n", "test").is_err());
    }
}
