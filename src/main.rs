use dotenvy::dotenv;
use tracing::info;

use std::net::SocketAddr;
use tourney_verify::infra::{
    app::create_app,
    error::InfraError,
    setup::{init_app_state, init_tracing},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    init_tracing();

    let runtime = init_app_state().await?;
    runtime.spawn_background_loops();

    // Read bind address from config before moving app_state
    let bind_addr = runtime.state.config.bind_addr;

    let app = create_app(runtime.state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(InfraError::TcpBind)?;

    info!("Verification API listening at {}", &listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .map_err(InfraError::Server)?;

    Ok(())
}
