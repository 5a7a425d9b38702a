use clap::Subcommand;
use serde_json::json;

use crate::auth::permissions::PERMISSIONS;
use crate::cli::utils::{connect, output_success};
use crate::cli::OutputFormat;
use crate::services::role_service::RoleService;

#[derive(Subcommand)]
pub enum PermissionCommands {
    #[command(about = "Insert catalog permissions missing from the database")]
    Sync,

    #[command(about = "Print the built-in permission catalog")]
    List,
}

pub async fn handle(cmd: PermissionCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        PermissionCommands::Sync => {
            let pool = connect().await?;
            let inserted = RoleService::new(pool).sync_permissions().await?;
            output_success(
                &output_format,
                &format!("Permission catalog synced ({} added)", inserted),
                Some(json!({ "inserted": inserted, "total": PERMISSIONS.len() })),
            )
        }
        PermissionCommands::List => match output_format {
            OutputFormat::Json => {
                let catalog: Vec<_> = PERMISSIONS
                    .iter()
                    .map(|(name, label)| json!({ "name": name, "label": label }))
                    .collect();
                output_success(&output_format, "Permission catalog", Some(json!(catalog)))
            }
            OutputFormat::Text => {
                for (name, label) in PERMISSIONS {
                    println!("{:<32} {}", name, label);
                }
                Ok(())
            }
        },
    }
}
