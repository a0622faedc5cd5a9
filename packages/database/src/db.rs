//! Store selection from the environment.

use std::path::PathBuf;
use std::sync::Arc;

use crate::memory::MemoryStore;
use crate::supabase::{SupabaseConfig, SupabaseStore};
use crate::{PropertyStore, StoreError};

/// Creates the property store described by the environment.
///
/// When `PROPERTY_FIXTURE` points at a JSON file, rows are served from
/// memory and Supabase is never contacted. Otherwise the Supabase
/// settings are read via [`SupabaseConfig::from_env`].
///
/// # Errors
///
/// Returns [`StoreError`] if the fixture cannot be loaded or the Supabase
/// settings are missing.
pub fn connect_from_env() -> Result<Arc<dyn PropertyStore>, StoreError> {
    if let Some(path) = std::env::var_os("PROPERTY_FIXTURE").filter(|p| !p.is_empty()) {
        let path = PathBuf::from(path);
        log::info!("Serving properties from fixture {}", path.display());
        return Ok(Arc::new(MemoryStore::from_json_file(&path)?));
    }

    let store = SupabaseStore::new(SupabaseConfig::from_env()?)?;
    log::info!("Serving properties from {}", store.config().endpoint());
    Ok(Arc::new(store))
}
