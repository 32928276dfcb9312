//! API types for the order tracker HTTP API.
//!
//! Request bodies, query parameters, and the structured error returned by
//! every endpoint.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::NewOrder;

/// Body of `POST /api/orders`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
	pub order_id: String,
	pub item_name: String,
	pub quantity: u32,
	pub customer_id: String,
	/// Initial status; `pending` when omitted.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub status: Option<String>,
}

impl CreateOrderRequest {
	/// Fields that must be present in the request body.
	pub const REQUIRED_FIELDS: [&'static str; 4] =
		["order_id", "item_name", "quantity", "customer_id"];
}

impl From<CreateOrderRequest> for NewOrder {
	fn from(request: CreateOrderRequest) -> Self {
		NewOrder {
			order_id: request.order_id,
			item_name: request.item_name,
			quantity: request.quantity,
			customer_id: request.customer_id,
			status: request.status,
		}
	}
}

/// Body of `PUT /api/orders/{order_id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
	pub new_status: String,
}

impl UpdateStatusRequest {
	pub const REQUIRED_FIELD: &'static str = "new_status";
}

/// Query parameters of `GET /api/orders`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListOrdersQuery {
	/// Only return orders whose status equals this value.
	pub status: Option<String>,
}

/// API error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Error type/code
	pub error: String,
	/// Human-readable description
	pub message: String,
}

/// Structured API error type with appropriate HTTP status mapping.
#[derive(Debug)]
pub enum APIError {
	/// Malformed request or rejected value (400)
	BadRequest { error_type: String, message: String },
	/// Target order does not exist (404)
	NotFound { error_type: String, message: String },
	/// Request conflicts with stored state (409)
	Conflict { error_type: String, message: String },
	/// Body is not JSON (415)
	UnsupportedMediaType { error_type: String, message: String },
	/// Internal server error (500)
	InternalServerError { error_type: String, message: String },
}

impl APIError {
	/// Get the HTTP status code for this error.
	pub fn status_code(&self) -> StatusCode {
		match self {
			APIError::BadRequest { .. } => StatusCode::BAD_REQUEST,
			APIError::NotFound { .. } => StatusCode::NOT_FOUND,
			APIError::Conflict { .. } => StatusCode::CONFLICT,
			APIError::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
			APIError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// Convert to ErrorResponse for JSON serialization.
	pub fn to_error_response(&self) -> ErrorResponse {
		let (error_type, message) = match self {
			APIError::BadRequest { error_type, message }
			| APIError::NotFound { error_type, message }
			| APIError::Conflict { error_type, message }
			| APIError::UnsupportedMediaType { error_type, message }
			| APIError::InternalServerError { error_type, message } => (error_type, message),
		};

		ErrorResponse {
			error: error_type.clone(),
			message: message.clone(),
		}
	}
}

impl fmt::Display for APIError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			APIError::BadRequest { message, .. } => write!(f, "Bad Request: {}", message),
			APIError::NotFound { message, .. } => write!(f, "Not Found: {}", message),
			APIError::Conflict { message, .. } => write!(f, "Conflict: {}", message),
			APIError::UnsupportedMediaType { message, .. } => {
				write!(f, "Unsupported Media Type: {}", message)
			},
			APIError::InternalServerError { message, .. } => {
				write!(f, "Internal Server Error: {}", message)
			},
		}
	}
}

impl std::error::Error for APIError {}

impl IntoResponse for APIError {
	fn into_response(self) -> axum::response::Response {
		(self.status_code(), Json(self.to_error_response())).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_create_request_status_optional() {
		let request: CreateOrderRequest = serde_json::from_value(serde_json::json!({
			"order_id": "A1",
			"item_name": "Pen",
			"quantity": 5,
			"customer_id": "C1"
		}))
		.unwrap();

		let input = NewOrder::from(request);
		assert_eq!(input, NewOrder::new("A1", "Pen", 5, "C1"));
	}

	#[test]
	fn test_negative_quantity_rejected() {
		let result = serde_json::from_value::<CreateOrderRequest>(serde_json::json!({
			"order_id": "A1",
			"item_name": "Pen",
			"quantity": -1,
			"customer_id": "C1"
		}));
		assert!(result.is_err());
	}

	#[test]
	fn test_api_error_status_mapping() {
		let cases = [
			(
				APIError::BadRequest {
					error_type: "MISSING_FIELDS".into(),
					message: "m".into(),
				},
				StatusCode::BAD_REQUEST,
			),
			(
				APIError::NotFound {
					error_type: "ORDER_NOT_FOUND".into(),
					message: "m".into(),
				},
				StatusCode::NOT_FOUND,
			),
			(
				APIError::Conflict {
					error_type: "DUPLICATE_ORDER".into(),
					message: "m".into(),
				},
				StatusCode::CONFLICT,
			),
			(
				APIError::UnsupportedMediaType {
					error_type: "UNSUPPORTED_MEDIA_TYPE".into(),
					message: "m".into(),
				},
				StatusCode::UNSUPPORTED_MEDIA_TYPE,
			),
			(
				APIError::InternalServerError {
					error_type: "STORAGE_ERROR".into(),
					message: "m".into(),
				},
				StatusCode::INTERNAL_SERVER_ERROR,
			),
		];

		for (error, status) in cases {
			assert_eq!(error.status_code(), status);
			assert_eq!(error.into_response().status(), status);
		}
	}

	#[test]
	fn test_error_response_body() {
		let error = APIError::Conflict {
			error_type: "DUPLICATE_ORDER".into(),
			message: "Order with ID 'A1' already exists.".into(),
		};
		assert_eq!(
			error.to_error_response(),
			ErrorResponse {
				error: "DUPLICATE_ORDER".into(),
				message: "Order with ID 'A1' already exists.".into(),
			}
		);
		assert_eq!(
			error.to_string(),
			"Conflict: Order with ID 'A1' already exists."
		);
	}
}
