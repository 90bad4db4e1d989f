use crate::config::AppConfig;
use crate::notify::{EstimateEmail, Mailer};
use anyhow::Result;
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub struct AppState {
    pub mailer: Mailer,
}

/// Payload posted by the estimate form once the PDF is rendered. Field
/// names are camelCase on the wire.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailRequest {
    pub email: String,
    pub customer_name: String,
    pub address: String,
    pub pdf_base64: String,
}

pub async fn start_server(config: AppConfig) -> Result<()> {
    let state = Arc::new(AppState {
        mailer: Mailer::new(&config.email),
    });

    let addr = SocketAddr::from(([127, 0, 0, 1], config.server.port));
    println!("Starting notification endpoint on http://{}", addr);

    // Non-POST requests to the route get a 405 from the method router.
    let app = Router::new()
        .route("/api/send-email", post(send_email_handler))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn send_email_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SendEmailRequest>,
) -> Response {
    let email = EstimateEmail {
        to: &request.email,
        customer_name: &request.customer_name,
        address: &request.address,
        pdf_base64: &request.pdf_base64,
    };

    match state.mailer.send_estimate(&email).await {
        Ok(provider_response) => {
            tracing::info!(to = %request.email, "estimate email sent");
            (StatusCode::OK, Json(provider_response)).into_response()
        }
        Err(err) => {
            tracing::error!(to = %request.email, "estimate email failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_payload_is_camel_case() {
        let request: SendEmailRequest = serde_json::from_value(json!({
            "email": "pat@example.com",
            "customerName": "Pat Doyle",
            "address": "12 Ocean Dr",
            "pdfBase64": "JVBERi0xLjQ=",
        }))
        .unwrap();
        assert_eq!(request.customer_name, "Pat Doyle");
        assert_eq!(request.pdf_base64, "JVBERi0xLjQ=");
    }
}
