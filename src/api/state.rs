//! Shared state threaded through the publish/upload/graph handlers.

use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use tokio::sync::RwLock;

use crate::config_loader::ConfigLoader;
use crate::core::storage::AppStorage;
use crate::topics::TopicRegistry;

/// Handler-visible application state.
///
/// `topology_lock` is the "single `tokio::sync::Mutex` held by `CoreApp`" from spec
/// §4.10, generalized to an `RwLock` so concurrent `/publish` and `/graph` reads don't
/// serialize against each other, only against an in-flight `/upload` rebuild (spec §3:
/// "Topology upload is atomic from the reader's perspective").
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<TopicRegistry>,
    pub loader: Arc<ConfigLoader>,
    pub topology_lock: Arc<RwLock<()>>,
    pub storage: Arc<AppStorage>,
    pub debug: bool,
    pub upload_seq: Arc<AtomicU64>,
}
