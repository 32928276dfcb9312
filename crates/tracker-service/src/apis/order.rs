//! Order API implementation.
//!
//! Validates request payloads, calls the [`OrderTracker`], and maps tracker
//! errors onto HTTP errors. Malformed input is rejected here and never reaches
//! the tracker.

use axum::{
	extract::rejection::{JsonRejection, PathRejection, QueryRejection},
	Json,
};
use serde_json::{Map, Value};
use tracker_core::{OrderTracker, TrackerError};
use tracker_types::{
	APIError, CreateOrderRequest, ListOrdersQuery, NewOrder, Order, UpdateStatusRequest,
};

/// Handles `POST /api/orders`.
pub async fn create_order(
	tracker: &OrderTracker,
	payload: Result<Json<Value>, JsonRejection>,
) -> Result<Order, APIError> {
	let body = json_object(payload)?;

	let missing: Vec<&str> = CreateOrderRequest::REQUIRED_FIELDS
		.into_iter()
		.filter(|field| !body.contains_key(*field))
		.collect();
	if !missing.is_empty() {
		return Err(APIError::BadRequest {
			error_type: "MISSING_FIELDS".to_string(),
			message: format!("Missing required fields: {}", missing.join(", ")),
		});
	}

	let request: CreateOrderRequest = parse_body(body)?;
	let order = tracker
		.add(NewOrder::from(request))
		.await
		.map_err(tracker_error)?;
	Ok(order)
}

/// Handles `GET /api/orders/{order_id}`.
pub async fn get_order(tracker: &OrderTracker, order_id: &str) -> Result<Order, APIError> {
	tracker
		.get(order_id)
		.await
		.map_err(tracker_error)?
		.ok_or_else(|| APIError::NotFound {
			error_type: "ORDER_NOT_FOUND".to_string(),
			message: format!("Order with ID '{}' not found.", order_id),
		})
}

/// Handles `PUT /api/orders/{order_id}/status`.
pub async fn update_order_status(
	tracker: &OrderTracker,
	order_id: &str,
	payload: Result<Json<Value>, JsonRejection>,
) -> Result<Order, APIError> {
	let body = json_object(payload)?;

	// Non-string values are passed on as their JSON text so a missing order is
	// still reported before an invalid status.
	let new_status = match body.get(UpdateStatusRequest::REQUIRED_FIELD) {
		Some(Value::String(status)) => status.clone(),
		Some(other) => other.to_string(),
		None => {
			return Err(APIError::BadRequest {
				error_type: "MISSING_FIELDS".to_string(),
				message: format!(
					"Missing required field: {}",
					UpdateStatusRequest::REQUIRED_FIELD
				),
			});
		},
	};

	let request = UpdateStatusRequest { new_status };
	tracker
		.update_status(order_id, &request.new_status)
		.await
		.map_err(tracker_error)
}

/// Handles `GET /api/orders`. An empty `status` value lists every order.
pub async fn list_orders(
	tracker: &OrderTracker,
	query: ListOrdersQuery,
) -> Result<Vec<Order>, APIError> {
	let orders = match query.status.as_deref() {
		Some(status) if !status.is_empty() => tracker.list_by_status(status).await,
		_ => tracker.list_all().await,
	};
	orders.map_err(tracker_error)
}

/// Handles `DELETE /api/orders/{order_id}`.
pub async fn delete_order(tracker: &OrderTracker, order_id: &str) -> Result<(), APIError> {
	tracker.delete(order_id).await.map_err(tracker_error)
}

/// Unwraps a JSON body that must be an object.
fn json_object(payload: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, APIError> {
	match payload {
		Ok(Json(Value::Object(body))) => Ok(body),
		Ok(Json(_)) => Err(APIError::BadRequest {
			error_type: "BAD_REQUEST".to_string(),
			message: "Request body must be a JSON object".to_string(),
		}),
		Err(JsonRejection::MissingJsonContentType(_)) => Err(APIError::UnsupportedMediaType {
			error_type: "UNSUPPORTED_MEDIA_TYPE".to_string(),
			message: "Content-Type must be application/json".to_string(),
		}),
		Err(rejection) => Err(APIError::BadRequest {
			error_type: "BAD_REQUEST".to_string(),
			message: rejection.body_text(),
		}),
	}
}

/// Maps a rejected query string to a JSON error.
pub fn query_error(rejection: QueryRejection) -> APIError {
	APIError::BadRequest {
		error_type: "BAD_REQUEST".to_string(),
		message: rejection.body_text(),
	}
}

/// Maps a rejected path parameter to a JSON error.
pub fn path_error(rejection: PathRejection) -> APIError {
	APIError::BadRequest {
		error_type: "BAD_REQUEST".to_string(),
		message: rejection.body_text(),
	}
}

fn parse_body<T: serde::de::DeserializeOwned>(body: Map<String, Value>) -> Result<T, APIError> {
	serde_json::from_value(Value::Object(body)).map_err(|e| APIError::BadRequest {
		error_type: "BAD_REQUEST".to_string(),
		message: format!("Invalid request body: {}", e),
	})
}

/// Maps a tracker error to its HTTP representation.
fn tracker_error(err: TrackerError) -> APIError {
	let message = err.to_string();
	match err {
		TrackerError::DuplicateOrder(_) => APIError::Conflict {
			error_type: "DUPLICATE_ORDER".to_string(),
			message,
		},
		TrackerError::InvalidStatus(_) => APIError::BadRequest {
			error_type: "INVALID_STATUS".to_string(),
			message,
		},
		TrackerError::InvalidQuantity(_) => APIError::BadRequest {
			error_type: "INVALID_QUANTITY".to_string(),
			message,
		},
		TrackerError::OrderNotFound(_) => APIError::NotFound {
			error_type: "ORDER_NOT_FOUND".to_string(),
			message,
		},
		TrackerError::Storage(_) => APIError::InternalServerError {
			error_type: "STORAGE_ERROR".to_string(),
			message,
		},
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use axum::http::StatusCode;
	use serde_json::json;
	use std::sync::Arc;
	use tracker_storage::{implementations::memory::MemoryStorage, StorageService};

	fn tracker() -> OrderTracker {
		OrderTracker::new(Arc::new(StorageService::new(Box::new(MemoryStorage::new()))))
	}

	#[tokio::test]
	async fn test_missing_fields_listed_in_order() {
		let err = create_order(&tracker(), Ok(Json(json!({ "item_name": "Pen" }))))
			.await
			.unwrap_err();

		assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
		let body = err.to_error_response();
		assert_eq!(body.error, "MISSING_FIELDS");
		assert_eq!(
			body.message,
			"Missing required fields: order_id, quantity, customer_id"
		);
	}

	#[tokio::test]
	async fn test_non_object_body_rejected() {
		let err = create_order(&tracker(), Ok(Json(json!(["A1"]))))
			.await
			.unwrap_err();
		assert_eq!(err.to_error_response().error, "BAD_REQUEST");
	}

	#[tokio::test]
	async fn test_wrong_quantity_type_rejected() {
		let body = json!({
			"order_id": "A1",
			"item_name": "Pen",
			"quantity": "five",
			"customer_id": "C1"
		});
		let err = create_order(&tracker(), Ok(Json(body))).await.unwrap_err();
		assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
		assert_eq!(err.to_error_response().error, "BAD_REQUEST");
	}

	#[tokio::test]
	async fn test_update_requires_new_status() {
		let tracker = tracker();
		let err = update_order_status(&tracker, "A1", Ok(Json(json!({ "status": "shipped" }))))
			.await
			.unwrap_err();
		assert_eq!(
			err.to_error_response().message,
			"Missing required field: new_status"
		);
	}

	#[tokio::test]
	async fn test_update_missing_order_checked_before_status_type() {
		let tracker = tracker();

		for new_status in [json!(null), json!(5)] {
			let err = update_order_status(
				&tracker,
				"NOPE",
				Ok(Json(json!({ "new_status": new_status }))),
			)
			.await
			.unwrap_err();
			assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
			assert_eq!(err.to_error_response().error, "ORDER_NOT_FOUND");
		}
	}

	#[tokio::test]
	async fn test_update_non_string_status_is_invalid_status() {
		let tracker = tracker();
		tracker
			.add(NewOrder::new("A1", "Pen", 1, "C1"))
			.await
			.unwrap();

		let err = update_order_status(&tracker, "A1", Ok(Json(json!({ "new_status": 5 }))))
			.await
			.unwrap_err();
		assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
		let body = err.to_error_response();
		assert_eq!(body.error, "INVALID_STATUS");
		assert_eq!(body.message, "Status '5' is not a valid status.");
	}

	#[tokio::test]
	async fn test_empty_status_filter_lists_all() {
		let tracker = tracker();
		tracker
			.add(NewOrder::new("A1", "Pen", 1, "C1").with_status("shipped"))
			.await
			.unwrap();

		let all = list_orders(
			&tracker,
			ListOrdersQuery {
				status: Some(String::new()),
			},
		)
		.await
		.unwrap();
		assert_eq!(all.len(), 1);

		let pending = list_orders(
			&tracker,
			ListOrdersQuery {
				status: Some("pending".into()),
			},
		)
		.await
		.unwrap();
		assert!(pending.is_empty());
	}

	#[test]
	fn test_tracker_error_mapping() {
		let cases = [
			(
				TrackerError::DuplicateOrder("A1".into()),
				StatusCode::CONFLICT,
				"DUPLICATE_ORDER",
			),
			(
				TrackerError::InvalidStatus("lost".into()),
				StatusCode::BAD_REQUEST,
				"INVALID_STATUS",
			),
			(
				TrackerError::InvalidQuantity(0),
				StatusCode::BAD_REQUEST,
				"INVALID_QUANTITY",
			),
			(
				TrackerError::OrderNotFound("A1".into()),
				StatusCode::NOT_FOUND,
				"ORDER_NOT_FOUND",
			),
			(
				TrackerError::Storage("disk".into()),
				StatusCode::INTERNAL_SERVER_ERROR,
				"STORAGE_ERROR",
			),
		];

		for (err, status, code) in cases {
			let message = err.to_string();
			let api_error = tracker_error(err);
			assert_eq!(api_error.status_code(), status);
			let body = api_error.to_error_response();
			assert_eq!(body.error, code);
			assert_eq!(body.message, message);
		}
	}
}
