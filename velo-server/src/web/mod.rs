//! Web layer for the bike availability viewer.
//!
//! Provides HTML pages and JSON endpoints for browsing a city's stations
//! and finding the one nearest to the user.

mod dto;
mod routes;
mod state;
pub mod templates;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
pub use templates::*;
