//! API server and routes

mod embedded;
pub mod middleware;
pub mod routes;
mod server;
pub mod state;
pub mod types;

pub use server::ApiServer;
pub use state::AppState;
