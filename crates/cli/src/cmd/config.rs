//! Configuration management command
//!
//! Provides CLI interface to view and edit the configuration file.

use crate::system_config::{self, SystemConfig};
use anyhow::{Context, Result};
use owo_colors::OwoColorize;

/// List all configuration values
pub async fn run_list() -> Result<()> {
    let config = system_config::load()?;
    let config_path = system_config::config_file_path()
        .context("Could not determine config file path")?;

    println!("{}", "Death Link Counter Configuration".bold());
    println!("{}: {}\n", "Location".dimmed(), config_path.display().dimmed());

    println!("{}", "[reporter]".yellow());
    println!(
        "  {} = {} {}",
        "debounce_secs".cyan(),
        config.reporter.debounce_secs,
        format!("({}s quiet before reporting)", config.reporter.debounce_secs).dimmed()
    );
    println!(
        "  {} = {}",
        "echo_deaths".cyan(),
        config.reporter.echo_deaths
    );

    println!("\n{}", "[connection]".yellow());
    println!(
        "  {} = {}",
        "default_port".cyan(),
        config.connection.default_port
    );

    println!("\n{}", "[logging]".yellow());
    println!("  {} = {}", "level".cyan(), config.logging.level);
    println!(
        "  {} = {}",
        "file".cyan(),
        match &config.logging.file {
            Some(path) => path.display().to_string(),
            None => "(none)".dimmed().to_string(),
        }
    );

    println!("\n{}", "Valid Ranges:".bold());
    println!("  debounce_secs: 0.1-3600");
    println!("  default_port: 1-65535");

    Ok(())
}

/// Get a single configuration value
pub async fn run_get(key: &str) -> Result<()> {
    let config = system_config::load()?;
    println!("{}", get_value(&config, key)?);
    Ok(())
}

/// Set a configuration value and write the file
pub async fn run_set(key: &str, value: &str) -> Result<()> {
    let mut config = system_config::load()?;
    set_value(&mut config, key, value)?;
    config
        .validate()
        .with_context(|| format!("Refusing to save {} = {}", key, value))?;

    let config_path = system_config::config_file_path()
        .context("Could not determine config file path")?;
    system_config::save_to(&config, &config_path)?;

    println!(
        "{} = {} {}",
        key.cyan(),
        get_value(&config, key)?,
        format!("(saved to {})", config_path.display()).dimmed()
    );
    println!("{}", "Clients already connected keep their old settings".yellow());

    Ok(())
}

/// Print the config file path, creating the file on request
pub async fn run_path(create: bool) -> Result<()> {
    let config_path = system_config::config_file_path()
        .context("Could not determine config file path")?;

    match (config_path.exists(), create) {
        (true, _) => println!("{}", config_path.display()),
        (false, true) => {
            system_config::save_to(&SystemConfig::default(), &config_path)?;
            println!("{} {}", "Created".green(), config_path.display());
        }
        (false, false) => {
            println!("{}", config_path.display());
            println!(
                "{}",
                "File does not exist yet; defaults apply. Pass --create to write it.".yellow()
            );
        }
    }

    Ok(())
}

/// Print a commented example config file
pub async fn run_example() -> Result<()> {
    print!("{}", system_config::example_config());
    Ok(())
}

fn get_value(config: &SystemConfig, key: &str) -> Result<String> {
    let value = match key {
        "reporter.debounce_secs" => config.reporter.debounce_secs.to_string(),
        "reporter.echo_deaths" => config.reporter.echo_deaths.to_string(),
        "connection.default_port" => config.connection.default_port.to_string(),
        "logging.level" => config.logging.level.clone(),
        "logging.file" => config
            .logging
            .file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default(),
        _ => anyhow::bail!(
            "Unknown config key: {}. Use 'deathlink-counter config --list' to see available keys.",
            key
        ),
    };
    Ok(value)
}

fn set_value(config: &mut SystemConfig, key: &str, value: &str) -> Result<()> {
    match key {
        "reporter.debounce_secs" => {
            config.reporter.debounce_secs = value.parse()
                .context("Invalid value: must be a number of seconds")?;
        }
        "reporter.echo_deaths" => {
            config.reporter.echo_deaths = value.parse()
                .context("Invalid value: must be 'true' or 'false'")?;
        }
        "connection.default_port" => {
            config.connection.default_port = value.parse()
                .context("Invalid value: must be a port number")?;
        }
        "logging.level" => {
            config.logging.level = value.to_string();
        }
        "logging.file" => {
            // An empty value turns file logging off
            config.logging.file = if value.is_empty() {
                None
            } else {
                Some(value.into())
            };
        }
        _ => anyhow::bail!(
            "Unknown config key: {}. Use 'deathlink-counter config --list' to see available keys.",
            key
        ),
    }
    Ok(())
}
