use axum::Router;

use crate::state::AppState;

pub mod generate;
pub mod health;

/// All application routes, mounted at the root.
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(generate::router())
}
