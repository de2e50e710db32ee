//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};
use stall_data::FixtureApi;
use stall_observability::LogFormat;

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, StallConfig};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    let session = &ctx.config.session;
    ctx.output.info("[session]");
    ctx.output.kv("cdn_url", &session.cdn_url);
    ctx.output.kv("currency_label", &session.currency_label);
    ctx.output.kv("priceless_label", &session.priceless_label);
    if let Some(fallback) = &session.fallback_catalog {
        ctx.output
            .kv("fallback_catalog", &format!("{} products", fallback.len()));
    }

    let api = &ctx.config.api;
    ctx.output.info("[api]");
    ctx.output.kv(
        "catalog_path",
        api.catalog_path.as_deref().unwrap_or("(bundled)"),
    );
    ctx.output.kv("reject_orders", &api.reject_orders.to_string());
    if api.reject_orders {
        ctx.output.kv("reject_message", &api.reject_message);
    }
    ctx.output.kv("fail_catalog", &api.fail_catalog.to_string());

    let logging = &ctx.config.logging;
    ctx.output.info("[logging]");
    ctx.output.kv("level", logging.level.as_str());
    ctx.output.kv(
        "format",
        match logging.format {
            LogFormat::Json => "json",
            LogFormat::Human => "human",
        },
    );

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("stall.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;
    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let (errors, warnings) = check(&ctx.config, ctx);

    if errors.is_empty() && warnings.is_empty() {
        ctx.output.success("Configuration is valid");
        return Ok(());
    }

    for error in &errors {
        ctx.output.error(&format!("Error: {}", error));
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if !errors.is_empty() {
        bail!("Configuration has {} error(s)", errors.len());
    }

    ctx.output.success("Configuration is valid (with warnings)");

    Ok(())
}

/// Collect errors and warnings for a configuration.
fn check(config: &StallConfig, ctx: &Context) -> (Vec<String>, Vec<String>) {
    let mut errors: Vec<String> = Vec::new();
    let mut warnings: Vec<String> = Vec::new();

    let session = &config.session;
    if session.currency_label.trim().is_empty() {
        errors.push("session.currency_label must not be empty".to_string());
    }
    if session.priceless_label.trim().is_empty() {
        errors.push("session.priceless_label must not be empty".to_string());
    }
    if !session.cdn_url.is_empty()
        && !session.cdn_url.starts_with("http://")
        && !session.cdn_url.starts_with("https://")
    {
        warnings.push(format!(
            "session.cdn_url '{}' is not an http(s) URL",
            session.cdn_url
        ));
    }
    if let Some(fallback) = &session.fallback_catalog {
        if fallback.is_empty() {
            warnings.push("session.fallback_catalog is empty".to_string());
        }
    }

    let api = &config.api;
    if let Some(path) = &api.catalog_path {
        let path = ctx.resolve_path(path);
        if let Err(e) = FixtureApi::from_path(path.clone()).list_response() {
            errors.push(format!("api.catalog_path {}: {}", path.display(), e));
        }
    }
    if api.reject_orders && api.reject_message.trim().is_empty() {
        errors.push("api.reject_message must not be empty".to_string());
    }
    if api.fail_catalog && session.fallback_catalog.is_none() {
        warnings.push(
            "api.fail_catalog is set without session.fallback_catalog; the catalog will be empty"
                .to_string(),
        );
    }

    (errors, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::Output;
    use std::path::PathBuf;

    fn context(config: StallConfig) -> Context {
        Context {
            config,
            config_path: None,
            output: Output::new(false, true),
            cwd: PathBuf::from("/"),
        }
    }

    #[test]
    fn test_defaults_are_clean() {
        let ctx = context(StallConfig::default());
        let (errors, warnings) = check(&ctx.config, &ctx);
        assert!(errors.is_empty());
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_reports_problems() {
        let mut config = StallConfig::default();
        config.session.currency_label = " ".to_string();
        config.session.cdn_url = "cdn.example.com".to_string();
        config.api.catalog_path = Some("/definitely/missing/catalog.json".to_string());
        config.api.fail_catalog = true;
        let ctx = context(config);

        let (errors, warnings) = check(&ctx.config, &ctx);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("currency_label"));
        assert!(errors[1].contains("catalog_path"));
        assert_eq!(warnings.len(), 2);
    }
}
