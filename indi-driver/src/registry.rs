//! The driver-local table of every property this driver has defined.
//!
//! The table is a sanity cache: inbound writes are checked against it
//! so a peer can never touch a property the driver hasn't defined, or
//! one it defined read-only. Entries are created on first definition
//! and never removed, even when the property is deleted from the
//! peer's view; the guarantee is against the driver's own wiring, not
//! the peer's bookkeeping.

use crate::types::property::{
    BlobVector, NumberVector, Permission, PropertyKind, SwitchVector,
    TextVector,
};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// A back-reference to the driver-owned vector behind a registered
/// property. Lights never appear here: they are output-only, so a
/// peer write to one must fail the "not defined" check.
pub(crate) enum Property {
    Number(Arc<Mutex<NumberVector>>),
    Switch(Arc<Mutex<SwitchVector>>),
    Text(Arc<Mutex<TextVector>>),
    Blob(Arc<Mutex<BlobVector>>),
}

impl Property {
    pub(crate) fn kind(&self) -> PropertyKind {
        match self {
            Property::Number(_) => PropertyKind::Number,
            Property::Switch(_) => PropertyKind::Switch,
            Property::Text(_) => PropertyKind::Text,
            Property::Blob(_) => PropertyKind::Blob,
        }
    }
}

pub(crate) struct Entry {
    pub(crate) perm: Permission,
    pub(crate) property: Property,
}

/// Keyed by `(device, name)`. Entries are individually boxed so a
/// looked-up entry stays valid after the table lock is released.
pub(crate) struct Registry {
    table: Mutex<HashMap<(String, String), Arc<Entry>>>,
}

impl Registry {
    pub(crate) fn new() -> Registry {
        Registry {
            table: Mutex::new(HashMap::new()),
        }
    }

    /// Records a definition. Re-registering an existing `(device,
    /// name)` key leaves the original entry untouched.
    pub(crate) async fn register_once(
        &self,
        device: &str,
        name: &str,
        perm: Permission,
        property: Property,
    ) {
        self.table
            .lock()
            .await
            .entry((String::from(device), String::from(name)))
            .or_insert_with(|| Arc::new(Entry { perm, property }));
    }

    pub(crate) async fn lookup(
        &self,
        device: &str,
        name: &str,
    ) -> Option<Arc<Entry>> {
        self.table
            .lock()
            .await
            .get(&(String::from(device), String::from(name)))
            .cloned()
    }
}
