//! YAML-backed admin store.
//!
//! The backing file maps a caller id to `{ display-name, role }`. It is read once when the
//! store is opened and rewritten in full after every successful grant. Edits made to the file
//! while the process runs are not picked up until restart.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::{debug, info, warn};

use super::authorizer::Role;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to serialize admins: {0}")]
    Encode(#[from] serde_yaml::Error),
    #[error("failed to write admins file {path}: {source}")]
    Write { path: PathBuf, source: std::io::Error },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminRecord {
    #[serde(rename = "display-name", default)]
    pub display_name: String,
    pub role: Role,
}

pub struct AdminStore {
    path: PathBuf,
    admins: Mutex<BTreeMap<String, AdminRecord>>,
    // Serializes grants across check, write and publish. Readers never take it.
    writes: Mutex<()>,
}

fn key_to_identity(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn read_admins(path: &Path) -> BTreeMap<String, AdminRecord> {
    let mut out = BTreeMap::new();
    if !path.exists() { return out; }
    let text = match std::fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            warn!(target: "minecord::admins", "could not read {}: {}; starting with no admins", path.display(), e);
            return out;
        }
    };
    let doc: Value = match serde_yaml::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            warn!(target: "minecord::admins", "malformed admins file {}: {}; starting with no admins", path.display(), e);
            return out;
        }
    };
    let map = match doc {
        Value::Mapping(m) => m,
        Value::Null => return out,
        _ => {
            warn!(target: "minecord::admins", "admins file {} is not a mapping; starting with no admins", path.display());
            return out;
        }
    };
    for (k, v) in map {
        let Some(identity) = key_to_identity(&k) else {
            warn!(target: "minecord::admins", "skipping admin entry with non-scalar key {:?}", k);
            continue;
        };
        match serde_yaml::from_value::<AdminRecord>(v) {
            Ok(rec) => { out.insert(identity, rec); }
            Err(e) => warn!(target: "minecord::admins", "skipping admin entry {}: {}", identity, e),
        }
    }
    out
}

fn write_admins(path: &Path, admins: &BTreeMap<String, AdminRecord>) -> Result<(), StoreError> {
    let mut doc = Mapping::new();
    for (id, rec) in admins {
        doc.insert(Value::String(id.clone()), serde_yaml::to_value(rec)?);
    }
    let text = serde_yaml::to_string(&Value::Mapping(doc))?;
    let werr = |source| StoreError::Write { path: path.to_path_buf(), source };
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(werr)?;
    }
    // Write beside the target and rename over it so a reader never sees a half-written file.
    let mut tmp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    let written = std::fs::File::create(&tmp)
        .and_then(|mut f| {
            f.write_all(text.as_bytes())?;
            f.sync_all()
        })
        .and_then(|()| std::fs::rename(&tmp, path));
    if let Err(e) = written {
        if let Err(rm) = std::fs::remove_file(&tmp) {
            if rm.kind() != std::io::ErrorKind::NotFound {
                warn!(target: "minecord::admins", "could not remove {}: {}", tmp.display(), rm);
            }
        }
        return Err(werr(e));
    }
    Ok(())
}

impl AdminStore {
    /// Open the store at `path`. A missing, empty or malformed file yields an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let admins = read_admins(&path);
        info!(target: "minecord::admins", "Loaded {} admins from {}.", admins.len(), path.display());
        Self { path, admins: Mutex::new(admins), writes: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path { &self.path }

    pub fn len(&self) -> usize { self.admins.lock().len() }

    pub fn is_empty(&self) -> bool { self.admins.lock().is_empty() }

    pub fn get(&self, identity: &str) -> Option<AdminRecord> {
        self.admins.lock().get(identity).cloned()
    }

    pub fn role_of(&self, identity: &str) -> Option<Role> {
        self.admins.lock().get(identity).map(|r| r.role)
    }

    /// Sorted snapshot of all records.
    pub fn records(&self) -> Vec<(String, AdminRecord)> {
        self.admins.lock().iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// True when `identity` has any record, whatever its role.
    pub fn is_authorized(&self, identity: &str) -> bool {
        self.admins.lock().contains_key(identity)
    }

    /// True only for identities holding the root role.
    pub fn can_grant(&self, identity: &str) -> bool {
        self.role_of(identity) == Some(Role::Root)
    }

    /// Create a delegate record for `identity` unless one already exists. Returns whether a
    /// record was created.
    ///
    /// Grants are serialized so concurrent calls never overwrite each other's file contents.
    /// The file is written before the record becomes visible, so a failed write leaves the
    /// store unchanged. Lookups only wait on the in-memory map, never on file I/O; this call
    /// blocks on disk and belongs off the async runtime.
    pub fn grant(&self, identity: &str, display_name: &str) -> Result<bool, StoreError> {
        let _writer = self.writes.lock();
        let mut next = {
            let admins = self.admins.lock();
            if admins.contains_key(identity) {
                debug!(target: "minecord::admins", "grant no-op: {} already present", identity);
                return Ok(false);
            }
            admins.clone()
        };
        let record = AdminRecord { display_name: display_name.to_string(), role: Role::Delegate };
        next.insert(identity.to_string(), record.clone());
        write_admins(&self.path, &next)?;
        self.admins.lock().insert(identity.to_string(), record);
        info!(target: "minecord::admins", "granted delegate to {} ({})", display_name, identity);
        Ok(true)
    }

    #[cfg(test)]
    pub(crate) fn hold_writes(&self) -> parking_lot::MutexGuard<'_, ()> {
        self.writes.lock()
    }
}

#[cfg(test)]
#[path = "admins_tests.rs"]
mod admins_tests;
