//! Standalone Pounce server binary.
//!
//! The HTTP side of a deployment (static assets, lobby REST endpoints)
//! lives in front of this; the binary only runs the game socket.

use pounce::{PounceError, PounceServerBuilder};

#[tokio::main]
async fn main() -> Result<(), PounceError> {
    pounce::init_tracing();

    let port = std::env::var("PORT").unwrap_or_else(|_| "8080".to_string());
    let addr = format!("0.0.0.0:{port}");

    let server = PounceServerBuilder::new().bind(&addr).build().await?;
    tracing::info!(%addr, "pounce server listening");
    server.run().await
}
