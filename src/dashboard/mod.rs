//! HTTP: HTML-страницы и JSON API, который они опрашивают.

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::AppState;
