//! Loading device text columns from disk.
//!
//! A text file is one device: the file stem is the device name and every
//! line is one cell. A JSON file holds an array of
//! `{"device", "category", "cells"}` objects. A directory loads every
//! `.txt`, `.cfg`, `.log` and `.json` file directly inside it, sorted by
//! file name.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::arp::ArpTable;
use crate::category::{CategoryRules, DeviceCategory};
use crate::config::ArpSettings;

const TEXT_EXTENSIONS: &[&str] = &["txt", "cfg", "log"];

/// One device's raw configuration lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceColumn {
    pub device: String,
    #[serde(default)]
    pub category: Option<DeviceCategory>,
    pub cells: Vec<String>,
}

impl DeviceColumn {
    pub fn from_text(device: impl Into<String>, text: &str) -> Self {
        Self {
            device: device.into(),
            category: None,
            cells: text.lines().map(ToOwned::to_owned).collect(),
        }
    }
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },
    #[error("no input files found in {path}")]
    EmptyDirectory { path: String },
}

pub fn load_inputs(paths: &[PathBuf]) -> Result<Vec<DeviceColumn>, InputError> {
    let mut columns = Vec::new();
    for path in paths {
        columns.extend(load_path(path)?);
    }
    Ok(columns)
}

pub fn load_path(path: &Path) -> Result<Vec<DeviceColumn>, InputError> {
    if path.is_dir() {
        return load_dir(path);
    }
    load_file(path)
}

fn load_dir(dir: &Path) -> Result<Vec<DeviceColumn>, InputError> {
    let entries = fs::read_dir(dir).map_err(|source| io_error(dir, source))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|source| io_error(dir, source))?.path();
        if path.is_file() && is_supported(&path) {
            files.push(path);
        }
    }
    if files.is_empty() {
        return Err(InputError::EmptyDirectory {
            path: dir.display().to_string(),
        });
    }
    files.sort();

    let mut columns = Vec::new();
    for file in files {
        columns.extend(load_file(&file)?);
    }
    Ok(columns)
}

fn load_file(path: &Path) -> Result<Vec<DeviceColumn>, InputError> {
    let raw = fs::read_to_string(path).map_err(|source| io_error(path, source))?;
    if extension(path).as_deref() == Some("json") {
        let columns: Vec<DeviceColumn> =
            serde_json::from_str(&raw).map_err(|source| InputError::Json {
                path: path.display().to_string(),
                source,
            })?;
        debug!(path = %path.display(), devices = columns.len(), "loaded JSON input");
        return Ok(columns);
    }
    let device = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    debug!(path = %path.display(), %device, "loaded text input");
    Ok(vec![DeviceColumn::from_text(device, &raw)])
}

/// Fill in missing categories from the classification table. A forced
/// category replaces whatever the input said.
pub fn assign_categories(
    columns: &mut [DeviceColumn],
    rules: &CategoryRules,
    forced: Option<DeviceCategory>,
) {
    for column in columns {
        if forced.is_some() {
            column.category = forced;
        } else if column.category.is_none() {
            column.category = rules.classify(&column.device);
        }
    }
}

fn is_supported(path: &Path) -> bool {
    extension(path).is_some_and(|ext| ext == "json" || TEXT_EXTENSIONS.contains(&ext.as_str()))
}

/// Read an ARP table dump, dropping addresses whose third octet the
/// settings ignore.
pub fn load_arp_table(path: &Path, settings: &ArpSettings) -> Result<ArpTable, InputError> {
    let raw = fs::read_to_string(path).map_err(|source| io_error(path, source))?;
    let table = ArpTable::parse(&raw, &settings.ignore_third_octet);
    debug!(path = %path.display(), live = table.len(), "loaded ARP table");
    Ok(table)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
}

fn io_error(path: &Path, source: std::io::Error) -> InputError {
    InputError::Io {
        path: path.display().to_string(),
        source,
    }
}
