use axum::routing::{get, post};
use faultline::prelude::*;
use serde::Deserialize;
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;

#[derive(Debug, Deserialize)]
struct NewOrder {
    sku: String,
    quantity: u32,
}

async fn get_order(Path(id): Path<u64>) -> std::result::Result<Json<Value>, ApiException> {
    match id {
        0 => Err(ApiException::validation("Order ids start at 1.")),
        1 => Ok(Json(json!({ "id": 1, "sku": "tea-001", "quantity": 2 }))),
        _ => Err(ApiException::object_does_not_exist("Order")),
    }
}

async fn create_order(
    Json(order): Json<NewOrder>,
) -> std::result::Result<(StatusCode, Json<Value>), ApiException> {
    let mut errors = Vec::new();
    if order.sku.trim().is_empty() {
        errors.push(("sku", vec!["This field may not be blank."]));
    }
    if order.quantity == 0 {
        errors.push(("quantity", vec!["Ensure this value is greater than or equal to 1."]));
    }
    if !errors.is_empty() {
        return Err(ApiException::field_errors(errors));
    }

    Ok((
        StatusCode::CREATED,
        Json(json!({ "id": 2, "sku": order.sku, "quantity": order.quantity })),
    ))
}

async fn me() -> std::result::Result<Json<Value>, ApiException> {
    Err(ApiException::not_authenticated())
}

async fn admin() -> std::result::Result<Json<Value>, ApiException> {
    Err(ApiException::permission_denied())
}

async fn report() -> std::result::Result<Json<Value>, ApiException> {
    Err(ApiException::throttled(Some(30)))
}

async fn crash() -> std::result::Result<Json<Value>, ApiException> {
    let cause = std::io::Error::other("upstream connection reset");
    Err(ApiException::Unhandled(cause.into()))
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    tracing::info!("🚀 Starting Example Server...");

    let config = ConfigService::new();
    let exceptions = match ExceptionLayer::from_config(&config) {
        Ok(layer) => layer.with_authenticate_header("Bearer realm=\"orders\""),
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let router = Router::new()
        .route("/orders", post(create_order))
        .route("/orders/{id}", get(get_order))
        .route("/me", get(me))
        .route("/admin", get(admin))
        .route("/reports", get(report))
        .route("/crash", get(crash))
        .route_layer(exceptions)
        .layer(TraceLayer::new_for_http());

    let host = config.get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
    let port = config.get("PORT").unwrap_or_else(|| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!("✅ Server running on http://127.0.0.1:{}", port);

    let server = axum::serve(listener, router).with_graceful_shutdown(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
        tracing::info!("🛑 Initiating graceful shutdown...");
    });

    if let Err(e) = server.await {
        tracing::error!("Server error: {}", e);
    }

    tracing::info!("👋 Server stopped");
}
