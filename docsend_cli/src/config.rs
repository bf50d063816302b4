use anyhow::anyhow;
use docsend_api::ApiClient;
use docsend_core::config::ConfigFile;

pub fn config_path() -> String {
    std::env::var("DOCSEND_CONFIG_PATH").unwrap_or_else(|_| "docsend.toml".to_string())
}

pub async fn load() -> anyhow::Result<(String, ConfigFile)> {
    let path = config_path();
    let text = tokio::fs::read_to_string(&path)
        .await
        .map_err(|_| anyhow!("No {} found!", path))?;
    let config = toml::from_str(&text)?;
    Ok((path, config))
}

pub async fn save(path: &str, config: &ConfigFile) -> anyhow::Result<()> {
    let text = toml::to_string(config)?;
    tokio::fs::write(path, text.as_bytes()).await?;
    Ok(())
}

pub fn api(config: &ConfigFile) -> anyhow::Result<ApiClient> {
    Ok(ApiClient::new(&config.server_url, config.token.as_deref())?)
}
