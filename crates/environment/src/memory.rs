//! In-memory environment sink for tests and dry runs.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use crate::{EnvironmentError, EnvironmentSink};

/// A recorded sink operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkOp {
    Set(&'static str, String),
    Remove(&'static str),
}

#[derive(Debug, Default)]
struct SinkState {
    vars: BTreeMap<&'static str, String>,
    ops: Vec<SinkOp>,
    failing: HashSet<&'static str>,
}

/// An [`EnvironmentSink`] that keeps variables in a map and logs every write.
#[derive(Debug, Default)]
pub struct MemorySink {
    state: Mutex<SinkState>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SinkState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current value of `name`.
    pub fn get(&self, name: &str) -> Option<String> {
        self.state().vars.get(name).cloned()
    }

    /// Every operation applied so far, oldest first.
    pub fn ops(&self) -> Vec<SinkOp> {
        self.state().ops.clone()
    }

    pub fn clear_ops(&self) {
        self.state().ops.clear();
    }

    /// Makes writes to `name` fail until [`MemorySink::heal`] is called.
    pub fn fail_on(&self, name: &'static str) {
        self.state().failing.insert(name);
    }

    pub fn heal(&self) {
        self.state().failing.clear();
    }
}

impl EnvironmentSink for MemorySink {
    fn set(&self, name: &'static str, value: &str) -> Result<(), EnvironmentError> {
        let mut state = self.state();
        if state.failing.contains(name) {
            return Err(EnvironmentError::Write {
                name,
                source: std::io::Error::other("injected failure"),
            });
        }
        state.vars.insert(name, value.to_string());
        state.ops.push(SinkOp::Set(name, value.to_string()));
        Ok(())
    }

    fn remove(&self, name: &'static str) -> Result<(), EnvironmentError> {
        let mut state = self.state();
        if state.failing.contains(name) {
            return Err(EnvironmentError::Clear {
                name,
                source: std::io::Error::other("injected failure"),
            });
        }
        state.vars.remove(name);
        state.ops.push(SinkOp::Remove(name));
        Ok(())
    }
}
