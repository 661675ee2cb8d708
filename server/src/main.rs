use seolens_core::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    seolens_server::init_tracing();

    let config = AppConfig::load_with_env()?;
    seolens_server::run(config).await
}
