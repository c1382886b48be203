use std::net::SocketAddr;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    rolodex_observability::init();

    let config = rolodex_api::config::Config::from_env();
    let bind_addr = config.bind_addr.clone();

    let app = rolodex_api::app::build_app(config).await?;

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
