//! qrgen Storage Library
//!
//! Persistence backends for saved codes behind the [`CodeStore`] trait:
//!
//! - **Local**: a JSON array under the `savedCodes` key of a [`DeviceStorage`]
//!   (one file per key on disk, or in memory).
//! - **Remote**: rows of a hosted table reached through a [`TableStore`],
//!   scoped by `user_id`.
//!
//! Each backend owns its wire shape (see [`rows`]) and maps it to
//! [`qrgen_core::SavedCodeRecord`].

pub mod device;
pub mod factory;
#[cfg(feature = "store-local")]
pub mod local;
#[cfg(feature = "store-remote")]
pub mod remote;
pub mod rows;
pub mod table;
pub mod traits;

// Re-export commonly used types
pub use device::{DeviceStorage, FileDeviceStorage, MemoryDeviceStorage};
pub use factory::create_code_store;
#[cfg(feature = "store-local")]
pub use local::LocalCodeStore;
pub use qrgen_core::StoreBackend;
#[cfg(feature = "store-remote")]
pub use remote::RemoteCodeStore;
pub use table::{MemoryTableStore, TableFilter, TableOrder, TableStore};
pub use traits::{CodeStore, StoreError, StoreResult};
