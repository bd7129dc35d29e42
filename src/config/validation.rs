use crate::config::types::{Config, CrawlerConfig, DownloadConfig, OutputConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_seeds(&config.seeds)?;
    validate_crawler_config(&config.crawler)?;
    validate_download_config(&config.download)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates seed locations: absolute http(s) URLs only
fn validate_seeds(seeds: &[String]) -> Result<(), ConfigError> {
    for seed in seeds {
        let url = Url::parse(seed)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid seed URL '{}': {}", seed, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "Seed URL '{}' must use http or https",
                seed
            )));
        }
    }

    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 256 {
        return Err(ConfigError::Validation(format!(
            "max-concurrent-fetches must be between 1 and 256, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.document_extensions.is_empty() {
        return Err(ConfigError::Validation(
            "document-extensions cannot be empty".to_string(),
        ));
    }

    for ext in config
        .document_extensions
        .iter()
        .chain(config.page_extensions.iter())
    {
        validate_extension(ext)?;
    }

    if let Some(ext) = config.document_extensions.iter().find(|ext| {
        config
            .page_extensions
            .iter()
            .any(|page| page.eq_ignore_ascii_case(ext))
    }) {
        return Err(ConfigError::Validation(format!(
            "extension '{}' cannot be both a document and a page extension",
            ext
        )));
    }

    Ok(())
}

/// Validates download pipeline configuration
fn validate_download_config(config: &DownloadConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 || config.concurrency > 64 {
        return Err(ConfigError::Validation(format!(
            "download concurrency must be between 1 and 64, got {}",
            config.concurrency
        )));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "download timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler-name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler-name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.root_dir.is_empty() {
        return Err(ConfigError::Validation(
            "root-dir cannot be empty".to_string(),
        ));
    }

    if config.manifest_path.is_empty() {
        return Err(ConfigError::Validation(
            "manifest-path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a bare file extension (no leading dot, no separators)
fn validate_extension(ext: &str) -> Result<(), ConfigError> {
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ConfigError::Validation(format!(
            "extension '{}' must be non-empty and alphanumeric (no leading dot)",
            ext
        )));
    }
    Ok(())
}
