//! ACL block extraction from one device column.
//!
//! A block is a run of rule lines uninterrupted by a boundary: an ACL
//! heading, a blank line, a non-ACL configuration line or the start of the
//! column. Comment and remark lines inside a run are skipped without
//! closing it, and so are NX-OS ACL sub-mode directives such as
//! `statistics per-entry`, which also keep the current heading. Under ASA,
//! where every entry repeats the ACL name, a change of name also starts a
//! new block. MAC ACLs are recognised but never analysed.

use acl_core::{
    is_acl_rule, parse_heading, AclHeading, AclRule, Dialect, HeadingKind, LineOutcome,
    LineParser, Location, ParseMode,
};
use serde::Serialize;
use tracing::debug;

use crate::category::DeviceCategory;
use crate::config::EngineConfig;
use crate::finding::{Finding, RuleRef};
use crate::input::DeviceColumn;

/// Coarse classification of one cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineClass {
    Rule,
    Comment,
    /// ACL sub-mode setting that is not an entry.
    Directive,
    Blank,
    Heading(AclHeading),
    Other,
}

pub fn classify_line(text: &str) -> LineClass {
    let line = text.trim();
    if line.is_empty() {
        return LineClass::Blank;
    }
    if line.starts_with('!') || line.starts_with('#') || is_remark(line) {
        return LineClass::Comment;
    }
    if let Some(heading) = parse_heading(line) {
        return LineClass::Heading(heading);
    }
    if is_acl_directive(line) {
        return LineClass::Directive;
    }
    if is_acl_rule(line) {
        return LineClass::Rule;
    }
    LineClass::Other
}

/// NX-OS `ip access-list` sub-mode settings.
fn is_acl_directive(line: &str) -> bool {
    let mut tokens = line.split_whitespace().map(str::to_ascii_lowercase);
    let (Some(first), Some(second)) = (tokens.next(), tokens.next()) else {
        return false;
    };
    matches!(
        (first.as_str(), second.as_str()),
        ("statistics", "per-entry")
            | ("ignore", "routable")
            | ("fragments", "permit-all" | "deny-all")
    )
}

/// `remark ...`, `10 remark ...` and `access-list NAME [line N] remark ...`.
fn is_remark(line: &str) -> bool {
    let tokens: Vec<&str> = line.split_whitespace().take(5).collect();
    let idx = match tokens.first() {
        Some(t) if t.eq_ignore_ascii_case("access-list") => {
            if tokens.get(2).is_some_and(|t| t.eq_ignore_ascii_case("line")) {
                4
            } else {
                2
            }
        }
        Some(t) if t.bytes().all(|b| b.is_ascii_digit()) => 1,
        _ => 0,
    };
    tokens
        .get(idx)
        .is_some_and(|t| t.eq_ignore_ascii_case("remark"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AclBlock {
    pub name: Option<String>,
    pub dialect: Option<Dialect>,
    pub start_row: usize,
    pub end_row: usize,
    pub column: usize,
    pub rules: Vec<AclRule>,
}

/// Blocks recovered from one column plus the parse findings produced along
/// the way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlockScan {
    pub blocks: Vec<AclBlock>,
    pub findings: Vec<Finding>,
    /// Blocks excluded by the skip patterns.
    pub skipped: usize,
}

/// A device column after block extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedDevice {
    pub device: String,
    pub category: Option<DeviceCategory>,
    pub column: usize,
    pub scan: BlockScan,
}

impl ParsedDevice {
    pub fn rules(&self) -> impl Iterator<Item = &AclRule> {
        self.scan.blocks.iter().flat_map(|b| b.rules.iter())
    }

    pub fn rule_ref(&self, rule: &AclRule) -> RuleRef {
        RuleRef::of(&self.device, self.category, rule)
    }
}

pub struct BlockExtractor<'a> {
    config: &'a EngineConfig,
    mode: ParseMode,
}

struct PendingBlock<'c> {
    heading: Option<AclHeading>,
    asa_name: Option<String>,
    lines: Vec<(usize, &'c str)>,
}

impl<'a> BlockExtractor<'a> {
    pub fn new(config: &'a EngineConfig) -> Self {
        Self {
            config,
            mode: ParseMode::Full,
        }
    }

    pub fn mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }

    /// Extract and parse every block of `column`. `index` is the 1-based
    /// column number used in rule locations.
    pub fn parse_device(&self, column: &DeviceColumn, index: usize) -> ParsedDevice {
        ParsedDevice {
            device: column.device.clone(),
            category: column.category,
            column: index,
            scan: self.find_blocks(column, index),
        }
    }

    pub fn find_blocks(&self, column: &DeviceColumn, index: usize) -> BlockScan {
        let mut scan = BlockScan::default();
        let mut heading: Option<AclHeading> = None;
        let mut pending: Option<PendingBlock<'_>> = None;

        for (offset, cell) in column.cells.iter().enumerate() {
            let row = offset + 1;
            match classify_line(cell) {
                LineClass::Comment | LineClass::Directive => {}
                LineClass::Blank => {
                    self.close(&mut pending, column, index, &mut scan);
                }
                LineClass::Heading(next) => {
                    self.close(&mut pending, column, index, &mut scan);
                    heading = Some(next);
                }
                LineClass::Other => {
                    self.close(&mut pending, column, index, &mut scan);
                    heading = None;
                }
                LineClass::Rule => {
                    let asa_name = asa_acl_name(cell);
                    let renamed = pending
                        .as_ref()
                        .is_some_and(|p| asa_name.is_some() && p.asa_name != asa_name);
                    if renamed {
                        self.close(&mut pending, column, index, &mut scan);
                    }
                    pending
                        .get_or_insert_with(|| PendingBlock {
                            heading: heading.clone(),
                            asa_name,
                            lines: Vec::new(),
                        })
                        .lines
                        .push((row, cell.trim()));
                }
            }
        }
        self.close(&mut pending, column, index, &mut scan);

        debug!(
            device = %column.device,
            blocks = scan.blocks.len(),
            findings = scan.findings.len(),
            skipped = scan.skipped,
            "scanned device column"
        );
        scan
    }

    fn close(
        &self,
        pending: &mut Option<PendingBlock<'_>>,
        column: &DeviceColumn,
        index: usize,
        scan: &mut BlockScan,
    ) {
        let Some(block) = pending.take() else {
            return;
        };
        let (Some(&(start_row, _)), Some(&(end_row, _))) = (block.lines.first(), block.lines.last())
        else {
            return;
        };
        let name = block
            .heading
            .as_ref()
            .map(|h| h.name.clone())
            .or_else(|| block.asa_name.clone());
        if block
            .heading
            .as_ref()
            .is_some_and(|h| h.kind == HeadingKind::Mac)
        {
            debug!(
                device = %column.device,
                acl = name.as_deref().unwrap_or(""),
                "skipping MAC ACL"
            );
            scan.skipped += 1;
            return;
        }
        if let Some(name) = name.as_deref() {
            if self.config.skips_acl(name) {
                debug!(device = %column.device, acl = name, "skipping excluded ACL");
                scan.skipped += 1;
                return;
            }
        }

        let mut parser = LineParser::new(&self.config.services).mode(self.mode);
        if let Some(heading) = block.heading.as_ref() {
            parser = parser.heading(heading);
        }

        let mut rules = Vec::with_capacity(block.lines.len());
        for (row, text) in &block.lines {
            let location = Location::row(*row, index);
            match parser.parse(text, location) {
                LineOutcome::Rule(rule) => rules.push(rule),
                LineOutcome::Malformed(err) => {
                    debug!(device = %column.device, %location, %err, "malformed ACL line");
                    scan.findings.push(Finding::parse_error(
                        RuleRef::new(&column.device, column.category, text, location),
                        "malformed_acl_line",
                        format!("unparsable ACL line: {err}"),
                    ));
                }
                LineOutcome::NotARule => {}
            }
        }

        let location = Location {
            start_row,
            end_row,
            column: index,
        };
        if rules.is_empty() {
            debug!(device = %column.device, %location, "dropping block with no parsable rules");
            scan.findings.push(Finding::parse_error(
                RuleRef::new(
                    &column.device,
                    column.category,
                    name.as_deref().unwrap_or(""),
                    location,
                ),
                "empty_acl_block",
                format!(
                    "ACL block {} recovered no rules from {} line(s)",
                    name.as_deref().unwrap_or("(unnamed)"),
                    block.lines.len()
                ),
            ));
            return;
        }

        let dialect = block
            .heading
            .as_ref()
            .and_then(|h| h.dialect)
            .or_else(|| rules.first().map(|r| r.dialect));
        scan.blocks.push(AclBlock {
            name,
            dialect,
            start_row,
            end_row,
            column: index,
            rules,
        });
    }
}

/// The ACL name of an `access-list NAME ...` line.
fn asa_acl_name(line: &str) -> Option<String> {
    let mut tokens = line.split_whitespace();
    let first = tokens.next()?;
    if !first.eq_ignore_ascii_case("access-list") {
        return None;
    }
    tokens.next().map(ToOwned::to_owned)
}
