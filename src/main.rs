use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use landlord_api::state::AppState;

fn setup_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    setup_logging();

    let state = match AppState::new().await {
        Ok(state) => state,
        Err(err) => {
            error!(error = %err, "failed to initialise application state");
            std::process::exit(1);
        }
    };

    let bind_addr = format!("0.0.0.0:{}", state.config().port());
    let app = landlord_api::app(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|_| panic!("failed to bind to {}", bind_addr));
    info!(%bind_addr, "listening");

    axum::serve(listener, app)
        .await
        .expect("server error");
}
