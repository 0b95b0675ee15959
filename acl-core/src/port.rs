//! Port match normalization.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::services::{ServiceResolutionError, ServiceTable};

pub const MAX_PORT: u16 = u16::MAX;

/// A single port restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PortSpec {
    Any,
    Eq(u16),
    /// Inclusive on both ends.
    Range { lo: u16, hi: u16 },
}

impl PortSpec {
    /// Inclusive `(lo, hi)` bounds.
    pub fn bounds(&self) -> (u16, u16) {
        match *self {
            PortSpec::Any => (0, MAX_PORT),
            PortSpec::Eq(port) => (port, port),
            PortSpec::Range { lo, hi } => (lo, hi),
        }
    }

    pub fn is_any(&self) -> bool {
        self.bounds() == (0, MAX_PORT)
    }

    /// True when every port matched by `other` is matched by `self`.
    pub fn covers(&self, other: &PortSpec) -> bool {
        let (alo, ahi) = self.bounds();
        let (blo, bhi) = other.bounds();
        alo <= blo && bhi <= ahi
    }

    fn range(lo: u16, hi: u16) -> Self {
        if lo == 0 && hi == MAX_PORT {
            PortSpec::Any
        } else if lo == hi {
            PortSpec::Eq(lo)
        } else {
            PortSpec::Range { lo, hi }
        }
    }
}

impl fmt::Display for PortSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortSpec::Any => f.write_str("any"),
            PortSpec::Eq(port) => write!(f, "eq {port}"),
            PortSpec::Range { lo, hi } => write!(f, "range {lo} {hi}"),
        }
    }
}

/// Port operator keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortOp {
    Eq,
    Range,
    Gt,
    Lt,
    Neq,
}

impl PortOp {
    pub fn from_keyword(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "eq" => Some(PortOp::Eq),
            "range" => Some(PortOp::Range),
            "gt" => Some(PortOp::Gt),
            "lt" => Some(PortOp::Lt),
            "neq" => Some(PortOp::Neq),
            _ => None,
        }
    }

    /// How many value tokens the operator takes; `None` means one or more.
    pub fn arity(&self) -> Option<usize> {
        match self {
            PortOp::Eq => None,
            PortOp::Range => Some(2),
            PortOp::Gt | PortOp::Lt | PortOp::Neq => Some(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PortError {
    #[error(transparent)]
    Service(#[from] ServiceResolutionError),
    #[error("port operator expects {expected} value(s), found {found}")]
    Arity { expected: usize, found: usize },
    #[error("port range {lo}-{hi} matches nothing")]
    EmptyRange { lo: u32, hi: u32 },
    #[error("'neq' port matches are not supported")]
    Unsupported,
}

/// Normalize one port operator and its values.
///
/// `eq` yields one spec per value. `gt`/`lt` become ranges clipped to
/// 0–65535. Unknown service names fail with [`PortError::Service`].
pub fn to_port(
    op: PortOp,
    values: &[&str],
    services: &ServiceTable,
) -> Result<Vec<PortSpec>, PortError> {
    if let Some(expected) = op.arity() {
        if values.len() != expected {
            return Err(PortError::Arity {
                expected,
                found: values.len(),
            });
        }
    } else if values.is_empty() {
        return Err(PortError::Arity {
            expected: 1,
            found: 0,
        });
    }

    match op {
        PortOp::Eq => values
            .iter()
            .map(|v| services.resolve(v).map(PortSpec::Eq).map_err(Into::into))
            .collect(),
        PortOp::Range => {
            let lo = services.resolve(values[0])?;
            let hi = services.resolve(values[1])?;
            if lo > hi {
                return Err(PortError::EmptyRange {
                    lo: u32::from(lo),
                    hi: u32::from(hi),
                });
            }
            Ok(vec![PortSpec::range(lo, hi)])
        }
        PortOp::Gt => {
            let n = services.resolve(values[0])?;
            if n == MAX_PORT {
                return Err(PortError::EmptyRange {
                    lo: u32::from(n) + 1,
                    hi: u32::from(MAX_PORT),
                });
            }
            Ok(vec![PortSpec::range(n + 1, MAX_PORT)])
        }
        PortOp::Lt => {
            let n = services.resolve(values[0])?;
            if n == 0 {
                return Err(PortError::EmptyRange { lo: 0, hi: 0 });
            }
            Ok(vec![PortSpec::range(0, n - 1)])
        }
        PortOp::Neq => Err(PortError::Unsupported),
    }
}

/// True when the union of `outer` matches every port of every spec in
/// `inner`. An empty list means "any port".
pub fn ports_cover(outer: &[PortSpec], inner: &[PortSpec]) -> bool {
    if outer.is_empty() || outer.iter().any(PortSpec::is_any) {
        return true;
    }
    if inner.is_empty() || inner.iter().any(PortSpec::is_any) {
        return false;
    }
    let merged = merge_intervals(outer);
    inner.iter().all(|spec| {
        let (lo, hi) = spec.bounds();
        merged
            .iter()
            .any(|&(mlo, mhi)| u32::from(lo) >= mlo && u32::from(hi) <= mhi)
    })
}

fn merge_intervals(specs: &[PortSpec]) -> Vec<(u32, u32)> {
    let mut intervals: Vec<(u32, u32)> = specs
        .iter()
        .map(|s| {
            let (lo, hi) = s.bounds();
            (u32::from(lo), u32::from(hi))
        })
        .collect();
    intervals.sort_unstable();
    let mut merged: Vec<(u32, u32)> = Vec::with_capacity(intervals.len());
    for (lo, hi) in intervals {
        match merged.last_mut() {
            Some(last) if lo <= last.1 + 1 => last.1 = last.1.max(hi),
            _ => merged.push((lo, hi)),
        }
    }
    merged
}
