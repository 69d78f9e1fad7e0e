use extgate_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (store, storage, services, routes)
    let (_state, router) = extgate_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    extgate_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
