//! Process-wide registry of named [`Group`]s.
//!
//! Grounded in `original_source/cache.go`'s package-level `groups` map and
//! `NewGroup`/`GetGroup` functions. The original guards the map with a
//! `sync.RWMutex`; this restates that as a `parking_lot::RwLock` behind a
//! lazily-initialized `once_cell::Lazy`, matching how the rest of this
//! crate's `concurrent` module reaches for `parking_lot` over the standard
//! library's own lock types.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::error::RegistryError;
use crate::group::{Group, Loader};

static GROUPS: Lazy<RwLock<HashMap<String, Arc<Group>>>> = Lazy::new(|| RwLock::new(HashMap::new()));

/// Creates and registers a new group named `name`.
///
/// # Errors
///
/// Returns [`RegistryError::AlreadyRegistered`] if `name` is already
/// registered. The original panics here
/// (`panic("RegisterNewGroup called more than once")`); a library should
/// not abort its caller's process for a condition the caller can recover
/// from.
pub fn new_group(
    name: impl Into<String>,
    cache_bytes: u64,
    loader: Arc<dyn Loader>,
) -> Result<Arc<Group>, RegistryError> {
    let name = name.into();
    let mut groups = GROUPS.write();
    if groups.contains_key(&name) {
        return Err(RegistryError::AlreadyRegistered(name));
    }
    let group = Arc::new(Group::new(name.clone(), cache_bytes, loader));
    groups.insert(name, Arc::clone(&group));
    Ok(group)
}

/// Looks up a previously registered group by name.
///
/// # Errors
///
/// Returns [`RegistryError::NotFound`] if no group named `name` was ever
/// registered with [`new_group`].
pub fn get_group(name: &str) -> Result<Arc<Group>, RegistryError> {
    GROUPS
        .read()
        .get(name)
        .cloned()
        .ok_or_else(|| RegistryError::NotFound(name.to_string()))
}
