//! qrgen Services Layer
//!
//! Orchestration on top of the renderer and the stores: the generation
//! workflow (render, blank-check, materialize, download, share), the
//! persistence gateway (identity-scoped save/list/delete with duplicate
//! suppression) and the identity context. The HTTP and CLI front-ends depend
//! on this crate only.

pub mod gateway;
pub mod generation;
pub mod identity;

pub use gateway::{save_message, ConfirmPrompt, PersistenceGateway, CLEAR_ALL_PROMPT};
pub use generation::download::{download, download_file_name, download_record, DownloadArtifact};
pub use generation::share::{share, ShareError, ShareOutcome, SharePayload, ShareTarget};
pub use generation::{GenerationState, GenerationWorkflow};
pub use identity::{
    AuthError, AuthProvider, HostedAuthProvider, IdentityContext, IdentityListener,
    ListenerHandle, MemoryAuthProvider,
};
pub use qrgen_hosted::HostedClient;
pub use qrgen_render::{CodeRenderer, RasterSurface, RenderOptions, RenderSurface, SymbolRenderer};
pub use qrgen_storage::{
    create_code_store, CodeStore, LocalCodeStore, MemoryDeviceStorage, MemoryTableStore,
    RemoteCodeStore, StoreBackend, StoreError,
};
