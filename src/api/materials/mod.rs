mod handlers;

use axum::{
    routing::{get, patch},
    Router,
};

use crate::core::state::AppState;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::list_materials).post(handlers::create_material))
        .route(
            "/:material_id",
            patch(handlers::update_material).delete(handlers::delete_material),
        )
}
