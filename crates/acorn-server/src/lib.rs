#![forbid(unsafe_code)]
//! acorn-server: the HTTP boundary around the association core.
//!
//! A deliberately thin layer: it parses a request into a count table, a
//! binary term selection, and a normalization scalar, forwards them to
//! [`acorn_core::ConnectionBlock`], and returns the scores. A fresh block is
//! built per request — no computed state survives between calls. Input
//! errors come back to the caller for correction; nothing is retried here.
//!
//! Endpoints:
//!   POST /associations  → document association scores for a term selection
//!   GET  /health        → liveness probe

use std::net::SocketAddr;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use acorn_core::{AcornError, ConnectionBlock};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// The three fields of an association request.
#[derive(Debug, Clone, Deserialize)]
pub struct AssociationRequest {
    /// Document-term counts, one row per document.
    pub dtm: Vec<Vec<u64>>,
    /// Term selection: one slot per DTM column, each 0 or 1.
    pub query: Vec<f64>,
    /// Leak-resistance scalar in [0, 1].
    #[serde(rename = "normBy", default = "default_norm_by")]
    pub norm_by: f64,
}

const fn default_norm_by() -> f64 {
    1.0
}

/// Successful response: per-document scores aligned with the DTM's rows.
#[derive(Debug, Clone, Serialize)]
pub struct AssociationResponse {
    pub status: &'static str,
    pub associations: Vec<f64>,
}

/// Error payload mirrored from the core's error text.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub error: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Run an association query end to end.
///
/// Kept free of axum types so the mapping is unit-testable without a
/// server.
///
/// # Errors
///
/// Maps malformed input ([`AcornError::Dimension`], `InvalidQuery`,
/// `InvalidParameter`) to 400 and an unsolvable system
/// ([`AcornError::SingularMatrix`]) to 422.
#[allow(clippy::cast_precision_loss)]
pub fn associations(
    request: &AssociationRequest,
) -> Result<AssociationResponse, (StatusCode, ErrorResponse)> {
    let table: Vec<Vec<f64>> = request
        .dtm
        .iter()
        .map(|row| row.iter().map(|&v| v as f64).collect())
        .collect();

    let block = ConnectionBlock::new(&table).map_err(error_response)?;
    let scores = block
        .query(&request.query, request.norm_by)
        .map_err(error_response)?;

    debug!(
        docs = block.doc_count(),
        terms = block.term_count(),
        norm_by = request.norm_by,
        "association query answered"
    );

    Ok(AssociationResponse {
        status: "success",
        associations: scores.iter().copied().collect(),
    })
}

fn error_response(err: AcornError) -> (StatusCode, ErrorResponse) {
    let status = match err {
        AcornError::SingularMatrix(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::BAD_REQUEST,
    };
    (
        status,
        ErrorResponse {
            status: "error",
            error: err.to_string(),
        },
    )
}

async fn associations_handler(Json(request): Json<AssociationRequest>) -> Response {
    match associations(&request) {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err((status, body)) => (status, Json(body)).into_response(),
    }
}

async fn health() -> &'static str {
    "ok"
}

// ---------------------------------------------------------------------------
// Router and entry point
// ---------------------------------------------------------------------------

/// Build the application router.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/associations", post(associations_handler))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
}

/// Serve the association endpoint on the given port until shutdown.
///
/// # Errors
///
/// Returns an error if the listener cannot bind or the server fails.
pub async fn serve(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!(%addr, "acorn-server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router()).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> AssociationRequest {
        AssociationRequest {
            dtm: vec![vec![1, 0, 1], vec![0, 1, 1]],
            query: vec![1.0, 0.0, 1.0],
            norm_by: 1.0,
        }
    }

    #[test]
    fn valid_request_yields_scores() {
        let response = associations(&sample_request()).expect("request succeeds");
        assert_eq!(response.status, "success");
        assert_eq!(response.associations.len(), 2);
        assert!(response.associations.iter().all(|s| s.is_finite()));
    }

    #[test]
    fn wrong_length_query_is_bad_request() {
        let request = AssociationRequest {
            query: vec![1.0, 0.0],
            ..sample_request()
        };
        let (status, body) = associations(&request).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.status, "error");
        assert!(body.error.contains("query length"));
    }

    #[test]
    fn non_binary_query_is_bad_request() {
        let request = AssociationRequest {
            query: vec![1.0, 0.5, 0.0],
            ..sample_request()
        };
        let (status, _body) = associations(&request).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn out_of_range_norm_by_is_bad_request() {
        let request = AssociationRequest {
            norm_by: 1.5,
            ..sample_request()
        };
        let (status, body) = associations(&request).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.error.contains("norm_by"));
    }

    #[test]
    fn ragged_table_is_bad_request() {
        let request = AssociationRequest {
            dtm: vec![vec![1, 0, 1], vec![0, 1]],
            ..sample_request()
        };
        let (status, _body) = associations(&request).unwrap_err();
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn norm_by_defaults_to_one() {
        let json = r#"{"dtm": [[1, 0, 1], [0, 1, 1]], "query": [1, 0, 1]}"#;
        let request: AssociationRequest = serde_json::from_str(json).expect("valid JSON");
        assert!((request.norm_by - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn norm_by_accepts_camel_case_field() {
        let json = r#"{"dtm": [[1]], "query": [1], "normBy": 0.5}"#;
        let request: AssociationRequest = serde_json::from_str(json).expect("valid JSON");
        assert!((request.norm_by - 0.5).abs() < f64::EPSILON);
    }
}
