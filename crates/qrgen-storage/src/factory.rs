#[cfg(feature = "store-local")]
use crate::{FileDeviceStorage, LocalCodeStore};
#[cfg(feature = "store-remote")]
use crate::RemoteCodeStore;
use crate::{CodeStore, StoreBackend, StoreError, StoreResult};
use qrgen_core::Config;
use std::sync::Arc;

/// Create a code store based on configuration.
///
/// The remote store reuses `hosted` when given so that table calls carry the
/// session established by the auth provider; otherwise a client is built
/// from the hosted settings.
#[cfg(feature = "store-remote")]
pub fn create_code_store(
    config: &Config,
    hosted: Option<qrgen_hosted::HostedClient>,
) -> StoreResult<Arc<dyn CodeStore>> {
    match config.store_backend() {
        StoreBackend::Local => create_local(config),
        StoreBackend::Remote => {
            let client = match hosted {
                Some(client) => client,
                None => qrgen_hosted::HostedClient::from_config(config)
                    .map_err(|e| StoreError::ConfigError(e.to_string()))?,
            };
            let store = RemoteCodeStore::new(Arc::new(client), config.hosted_table());
            tracing::info!(table = config.hosted_table(), "Using remote code store");
            Ok(Arc::new(store))
        }
    }
}

/// Create a code store based on configuration.
#[cfg(not(feature = "store-remote"))]
pub fn create_code_store(config: &Config) -> StoreResult<Arc<dyn CodeStore>> {
    match config.store_backend() {
        StoreBackend::Local => create_local(config),
        StoreBackend::Remote => Err(StoreError::ConfigError(
            "Remote store backend not available (store-remote feature not enabled)".to_string(),
        )),
    }
}

#[cfg(feature = "store-local")]
fn create_local(config: &Config) -> StoreResult<Arc<dyn CodeStore>> {
    let device = FileDeviceStorage::new(config.local_storage_path())?;
    tracing::info!(path = config.local_storage_path(), "Using local code store");
    Ok(Arc::new(LocalCodeStore::new(Arc::new(device))))
}

#[cfg(not(feature = "store-local"))]
fn create_local(_config: &Config) -> StoreResult<Arc<dyn CodeStore>> {
    Err(StoreError::ConfigError(
        "Local store backend not available (store-local feature not enabled)".to_string(),
    ))
}
