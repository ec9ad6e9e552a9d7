pub mod config;
pub mod error;
mod handlers;
mod routes;
pub mod state;
pub mod types;

pub use config::ApiConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
