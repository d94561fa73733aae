//! Process-local blobs addressed by reference handles.
//!
//! A merge result is kept in memory and handed out as a
//! [`ReferenceHandle`] shaped like an object URL
//! (`blob:pdfstack/<session>/<id>`). Handles are persisted in history
//! but the bytes are not, so every handle carries the session that
//! created it. After a restart the registry has a new session id and old
//! handles resolve to nothing instead of dangling.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

const SCHEME: &str = "blob:pdfstack/";

/// Opaque, process-local reference to merged bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceHandle(String);

impl ReferenceHandle {
    fn new(session: &str, id: u64) -> Self {
        Self(format!("{SCHEME}{session}/{id}"))
    }

    /// Wrap a stored URL string. Anything may come back from storage, so
    /// no validation happens here; unparseable handles never resolve.
    pub fn from_url(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// The URL form of this handle.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split into (session, blob id).
    fn parts(&self) -> Option<(&str, u64)> {
        let rest = self.0.strip_prefix(SCHEME)?;
        let (session, id) = rest.split_once('/')?;
        Some((session, id.parse().ok()?))
    }
}

impl fmt::Display for ReferenceHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// In-memory store of merged outputs for the current session.
#[derive(Debug)]
pub struct BlobRegistry {
    session: String,
    next_id: u64,
    blobs: HashMap<u64, Arc<[u8]>>,
}

impl BlobRegistry {
    /// Create a registry with a fresh session id.
    pub fn new() -> Self {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();

        Self::with_session(format!("{nanos:x}-{:x}", std::process::id()))
    }

    /// Create a registry with a fixed session id.
    pub fn with_session(session: impl Into<String>) -> Self {
        Self {
            session: session.into(),
            next_id: 1,
            blobs: HashMap::new(),
        }
    }

    /// Session id stamped into every handle this registry issues.
    pub fn session_id(&self) -> &str {
        &self.session
    }

    /// Keep `bytes` for the rest of the session and return a handle to them.
    pub fn register(&mut self, bytes: Vec<u8>) -> ReferenceHandle {
        let id = self.next_id;
        self.next_id += 1;
        self.blobs.insert(id, Arc::from(bytes));

        let handle = ReferenceHandle::new(&self.session, id);
        tracing::debug!(handle = %handle, "registered blob");
        handle
    }

    /// Bytes behind `handle`, if it was issued by this session and not revoked.
    pub fn resolve(&self, handle: &ReferenceHandle) -> Option<Arc<[u8]>> {
        let (session, id) = handle.parts()?;
        if session != self.session {
            return None;
        }
        self.blobs.get(&id).cloned()
    }

    /// Whether `handle` still resolves.
    pub fn is_live(&self, handle: &ReferenceHandle) -> bool {
        self.resolve(handle).is_some()
    }

    /// Drop the bytes behind `handle`. Returns whether anything was freed.
    pub fn revoke(&mut self, handle: &ReferenceHandle) -> bool {
        match handle.parts() {
            Some((session, id)) if session == self.session => self.blobs.remove(&id).is_some(),
            _ => false,
        }
    }

    /// Number of live blobs.
    pub fn len(&self) -> usize {
        self.blobs.len()
    }

    /// Whether no blobs are held.
    pub fn is_empty(&self) -> bool {
        self.blobs.is_empty()
    }
}

impl Default for BlobRegistry {
    fn default() -> Self {
        Self::new()
    }
}
