//! Admin portal front door.
//!
//! Serves the sign-in callback, session API and guarded dashboard routes,
//! trading identity tokens for session tokens at `WARDEN_EXCHANGE_URL`.
//!
//! ```text
//! WARDEN_EXCHANGE_URL=http://localhost:4000/auth/session \
//! WARDEN_ENV=development \
//! RUST_LOG=warden=debug,info \
//!     cargo run -p admin-portal
//! ```

use warden::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    warden::init_tracing();

    let config = WardenConfig::from_env()?;
    let Some(exchange_url) = config.exchange_url.clone() else {
        return Err("WARDEN_EXCHANGE_URL must name the session-exchange endpoint".into());
    };

    tracing::info!(
        bind = %config.bind_addr,
        environment = %config.environment,
        exchange = %exchange_url,
        "starting admin portal"
    );

    let server = WardenServer::builder()
        .config(config)
        .build(HttpSessionExchange::new(exchange_url))
        .await?;

    server.run().await?;
    Ok(())
}
