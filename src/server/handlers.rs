//! HTTP request handlers

use std::sync::Arc;
use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    response::Html,
    Json,
};
use tracing::info;

use crate::inference::Prediction;

use super::error::{Result, ServerError};
use super::state::AppState;

/// Multipart field carrying the uploaded image
pub const IMAGE_FIELD: &str = "image";

// ============================================================================
// Inference Handlers
// ============================================================================

/// Classify the image uploaded in the `image` multipart field.
///
/// A request that is not multipart at all is treated like one without the
/// field.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<Prediction>> {
    let mut multipart = multipart.map_err(|_| ServerError::no_image())?;

    let mut image = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }
        // a plain form value named `image` is not a file upload
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let data = field.bytes().await?;
        info!(file = %file_name, bytes = data.len(), "Received image");
        image = Some(data);
        break;
    }

    let bytes = image.ok_or_else(ServerError::no_image)?;
    let prediction = state.classify(bytes).await?;

    info!(
        emergency_type = %prediction.label,
        confidence = prediction.confidence,
        inference_ms = prediction.inference_time * 1000.0,
        "Prediction served"
    );
    Ok(Json(prediction))
}

// ============================================================================
// System Handlers
// ============================================================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let classifier = &state.classifier;
    let shape = classifier.input_shape();

    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_secs": state.uptime_secs(),
        "model": {
            "path": state.config.model_path,
            "input_shape": shape.batch_dims(),
            "layout": shape.layout,
            "labels": classifier.labels(),
        },
        "stats": classifier.stats(),
    }))
}

// ============================================================================
// UI Handler
// ============================================================================

pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Emergency Classification API</title>
    <style>
        body { font-family: Arial, sans-serif; max-width: 800px; margin: 0 auto; padding: 20px; }
        h1 { color: #e11d48; }
        pre { background-color: #f1f1f1; padding: 10px; border-radius: 5px; }
    </style>
</head>
<body>
    <h1>Emergency Classification API</h1>
    <p>Classifies photos of emergency situations with a pre-trained image model.</p>
    <h2>Endpoints</h2>
    <h3>POST /predict</h3>
    <p>Upload an image in the <code>image</code> form field.</p>
    <pre>curl -X POST -F "image=@scene.jpg" http://localhost:5000/predict</pre>
    <p>Response:</p>
    <pre>{"emergency_type": "fire-burn", "confidence": 0.97, "inference_time": 0.012}</pre>
    <h3>GET /health</h3>
    <p>Model input shape, label set and running inference statistics.</p>
</body>
</html>
"#;
