//! Environment sink persisted as a shell-sourceable file.
//!
//! Used on hosts without a registry-backed user environment. The file holds
//! one `export NAME='value'` line per set variable and is rewritten on every
//! change (write to a temporary file, then rename).

use std::collections::BTreeMap;
use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::{ALL_VARS, EnvironmentError, EnvironmentSink};

const HEADER: &str = "# Managed by proxysync. Changes are overwritten.\n";

/// Persists managed variables to a file such as `~/.config/proxysync/proxy.env`.
#[derive(Debug)]
pub struct EnvFileSink {
    path: PathBuf,
    vars: Mutex<BTreeMap<&'static str, String>>,
}

impl EnvFileSink {
    /// Opens the sink, loading any variables already in the file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, EnvironmentError> {
        let path = path.into();
        let vars = match std::fs::read_to_string(&path) {
            Ok(content) => parse(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self {
            path,
            vars: Mutex::new(vars),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current value of `name`.
    pub fn get(&self, name: &str) -> Option<String> {
        self.vars
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(name)
            .cloned()
    }

    fn persist(&self, vars: &BTreeMap<&'static str, String>) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut content = String::from(HEADER);
        for (name, value) in vars {
            content.push_str(&format!("export {name}={}\n", quote(value)));
        }

        let tmp = self.path.with_extension("tmp");
        {
            let mut f = std::fs::File::create(&tmp)?;
            f.write_all(content.as_bytes())?;
            f.sync_all()?;
        }
        std::fs::rename(&tmp, &self.path)
    }
}

impl EnvironmentSink for EnvFileSink {
    fn set(&self, name: &'static str, value: &str) -> Result<(), EnvironmentError> {
        let mut vars = self.vars.lock().unwrap_or_else(|e| e.into_inner());
        if vars.get(name).map(String::as_str) == Some(value) {
            return Ok(());
        }
        let mut next = vars.clone();
        next.insert(name, value.to_string());
        self.persist(&next)
            .map_err(|source| EnvironmentError::Write { name, source })?;
        *vars = next;
        Ok(())
    }

    fn remove(&self, name: &'static str) -> Result<(), EnvironmentError> {
        let mut vars = self.vars.lock().unwrap_or_else(|e| e.into_inner());
        if !vars.contains_key(name) {
            return Ok(());
        }
        let mut next = vars.clone();
        next.remove(name);
        self.persist(&next)
            .map_err(|source| EnvironmentError::Clear { name, source })?;
        *vars = next;
        Ok(())
    }
}

/// Single-quotes a value for POSIX shells.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

fn unquote(raw: &str) -> String {
    let raw = raw.trim();
    match raw.strip_prefix('\'').and_then(|r| r.strip_suffix('\'')) {
        Some(inner) => inner.replace(r"'\''", "'"),
        None => raw.to_string(),
    }
}

/// Parses `export NAME='value'` lines, keeping only managed variables.
fn parse(content: &str) -> BTreeMap<&'static str, String> {
    let mut vars = BTreeMap::new();
    for line in content.lines() {
        let Some(rest) = line.trim().strip_prefix("export ") else {
            continue;
        };
        let Some((name, value)) = rest.split_once('=') else {
            continue;
        };
        if let Some(known) = ALL_VARS.iter().find(|v| **v == name.trim()) {
            vars.insert(*known, unquote(value));
        }
    }
    vars
}
