use axum::{http::Method, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod deliveries;
pub mod disputes;
pub mod error;
pub mod extract;
pub mod orders;
pub mod products;
pub mod quotes;
pub mod rfqs;
pub mod state;
pub mod suppliers;

pub use state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::HeaderName::from_static(extract::ORGANIZATION_HEADER),
            axum::http::HeaderName::from_static(extract::ROLE_HEADER),
        ]);

    Router::new()
        .merge(rfqs::routes())
        .merge(quotes::routes())
        .merge(orders::routes())
        .merge(deliveries::routes())
        .merge(disputes::routes())
        .merge(products::routes())
        .merge(suppliers::routes())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
