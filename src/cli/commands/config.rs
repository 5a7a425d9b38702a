use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Print the effective configuration with secrets hidden")]
    Show,
}

pub async fn handle(cmd: ConfigCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ConfigCommands::Show => {
            let config = config();
            match output_format {
                OutputFormat::Json => {
                    let mut value = serde_json::to_value(config)?;
                    value["database"]["url"] = json!(config.redacted_database_url());
                    output_success(&output_format, "Effective configuration", Some(value))
                }
                OutputFormat::Text => {
                    println!("Environment:   {:?}", config.environment);
                    println!("Listen:        {}:{}", config.server.host, config.server.port);
                    println!("Log filter:    {}", config.server.log_filter);
                    println!("Database:      {}", config.redacted_database_url());
                    println!("Migrations:    {}", config.database.run_migrations);
                    println!("Page size:     {} (max {})", config.api.default_page_size, config.api.max_page_size);
                    println!("JWT expiry:    {}h", config.security.jwt_expiry_hours);
                    println!("JWT secret:    {}", if config.security.jwt_secret.is_empty() { "<unset>" } else { "<set>" });
                    println!("CORS origins:  {}", config.security.cors_origins.join(", "));
                    println!("Upload dir:    {}", config.storage.upload_dir.display());
                    Ok(())
                }
            }
        }
    }
}
