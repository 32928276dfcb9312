//! HTTP server for the order tracker API.
//!
//! Routes live under `/api`. When a static directory is configured, every
//! other path is served from it.

use axum::{
	extract::{
		rejection::{JsonRejection, PathRejection, QueryRejection},
		DefaultBodyLimit, Path, Query, State,
	},
	http::{HeaderValue, StatusCode},
	response::{IntoResponse, Json},
	routing::{get, put},
	Router,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
	cors::{AllowOrigin, Any, CorsLayer},
	services::ServeDir,
	timeout::TimeoutLayer,
};
use tracker_config::{ApiConfig, CorsConfig};
use tracker_core::OrderTracker;
use tracker_types::{APIError, ListOrdersQuery, Order};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	/// Tracker that owns every order operation.
	pub tracker: Arc<OrderTracker>,
}

/// Builds the application router with its middleware stack.
pub fn create_router(tracker: Arc<OrderTracker>, api_config: &ApiConfig) -> Router {
	let app_state = AppState { tracker };

	let mut app = Router::new().nest(
		"/api",
		Router::new()
			.route("/orders", get(handle_list_orders).post(handle_create_order))
			.route(
				"/orders/{order_id}",
				get(handle_get_order).delete(handle_delete_order),
			)
			.route("/orders/{order_id}/status", put(handle_update_status)),
	);

	if let Some(static_dir) = &api_config.static_dir {
		tracing::info!(path = %static_dir, "Serving static files");
		app = app.fallback_service(ServeDir::new(static_dir));
	}

	app.layer(
		ServiceBuilder::new()
			.layer(TimeoutLayer::with_status_code(
				StatusCode::REQUEST_TIMEOUT,
				Duration::from_secs(api_config.timeout_seconds),
			))
			.layer(cors_layer(api_config.cors.as_ref()))
			.layer(DefaultBodyLimit::max(api_config.max_request_size)),
	)
	.with_state(app_state)
}

/// Permissive unless specific origins are configured.
fn cors_layer(cors: Option<&CorsConfig>) -> CorsLayer {
	let Some(cors) = cors else {
		return CorsLayer::permissive();
	};

	if cors.allowed_origins.iter().any(|origin| origin == "*") {
		return CorsLayer::permissive();
	}

	let origins: Vec<HeaderValue> = cors
		.allowed_origins
		.iter()
		.filter_map(|origin| match HeaderValue::from_str(origin) {
			Ok(value) => Some(value),
			Err(_) => {
				tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
				None
			},
		})
		.collect();

	CorsLayer::new()
		.allow_origin(AllowOrigin::list(origins))
		.allow_methods(Any)
		.allow_headers(Any)
}

/// Starts the HTTP server and runs until Ctrl-C.
pub async fn start_server(
	api_config: ApiConfig,
	tracker: Arc<OrderTracker>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = create_router(tracker, &api_config);

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Order tracker API server starting on {}", bind_address);

	axum::serve(listener, app)
		.with_graceful_shutdown(async {
			let _ = tokio::signal::ctrl_c().await;
			tracing::info!("Shutting down API server");
		})
		.await?;

	Ok(())
}

/// Extracts the `{order_id}` segment, reporting rejections as JSON errors.
fn order_path(order_id: Result<Path<String>, PathRejection>) -> Result<String, APIError> {
	match order_id {
		Ok(Path(order_id)) => Ok(order_id),
		Err(rejection) => {
			tracing::warn!("Rejected order path: {}", rejection);
			Err(crate::apis::order::path_error(rejection))
		},
	}
}

/// Handles POST /api/orders requests.
async fn handle_create_order(
	State(state): State<AppState>,
	payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Order>), APIError> {
	match crate::apis::order::create_order(&state.tracker, payload).await {
		Ok(order) => {
			tracing::info!(order_id = %order.order_id, "Order created");
			Ok((StatusCode::CREATED, Json(order)))
		},
		Err(e) => {
			tracing::warn!("Order creation failed: {}", e);
			Err(e)
		},
	}
}

/// Handles GET /api/orders requests, optionally filtered by `status`.
async fn handle_list_orders(
	State(state): State<AppState>,
	query: Result<Query<ListOrdersQuery>, QueryRejection>,
) -> Result<Json<Vec<Order>>, APIError> {
	let Query(query) = query.map_err(|rejection| {
		tracing::warn!("Rejected order listing query: {}", rejection);
		crate::apis::order::query_error(rejection)
	})?;

	match crate::apis::order::list_orders(&state.tracker, query).await {
		Ok(orders) => Ok(Json(orders)),
		Err(e) => {
			tracing::warn!("Order listing failed: {}", e);
			Err(e)
		},
	}
}

/// Handles GET /api/orders/{order_id} requests.
async fn handle_get_order(
	order_id: Result<Path<String>, PathRejection>,
	State(state): State<AppState>,
) -> Result<Json<Order>, APIError> {
	let order_id = order_path(order_id)?;

	match crate::apis::order::get_order(&state.tracker, &order_id).await {
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			tracing::warn!("Order retrieval failed: {}", e);
			Err(e)
		},
	}
}

/// Handles PUT /api/orders/{order_id}/status requests.
async fn handle_update_status(
	order_id: Result<Path<String>, PathRejection>,
	State(state): State<AppState>,
	payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Order>, APIError> {
	let order_id = order_path(order_id)?;

	match crate::apis::order::update_order_status(&state.tracker, &order_id, payload).await {
		Ok(order) => Ok(Json(order)),
		Err(e) => {
			tracing::warn!("Status update failed: {}", e);
			Err(e)
		},
	}
}

/// Handles DELETE /api/orders/{order_id} requests.
async fn handle_delete_order(
	order_id: Result<Path<String>, PathRejection>,
	State(state): State<AppState>,
) -> Result<impl IntoResponse, APIError> {
	let order_id = order_path(order_id)?;

	match crate::apis::order::delete_order(&state.tracker, &order_id).await {
		Ok(()) => {
			tracing::info!(order_id = %order_id, "Order removed");
			Ok(StatusCode::NO_CONTENT)
		},
		Err(e) => {
			tracing::warn!("Order deletion failed: {}", e);
			Err(e)
		},
	}
}
