//! HTTP server for vitrine sites.
//!
//! Serves live sites and editor previews, the editing API for admins and
//! clients, and the public contact endpoint. Previews reload over a WebSocket
//! whenever a draft changes or the file store is touched.

pub mod error;
pub mod reload;
pub mod routes;
pub mod server;
pub mod state;
pub mod watcher;

pub use error::{ApiError, ApiResult};
pub use reload::{ReloadHub, ReloadMessage};
pub use routes::build_router;
pub use server::{ServerConfig, ServerError, VitrineServer};
pub use state::AppState;
pub use watcher::{StoreWatcher, WatchEvent};
