use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{connect, output_error, output_success};
use crate::cli::OutputFormat;
use crate::services::user_service::UserService;
use crate::services::ServiceError;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "Create an active superuser account")]
    CreateSuperuser {
        #[arg(long, help = "Login email")]
        email: String,
        #[arg(long, help = "Password (min 6 characters)")]
        password: String,
    },
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        UserCommands::CreateSuperuser { email, password } => {
            let pool = connect().await?;
            match UserService::new(pool).create_superuser(&email, &password).await {
                Ok(user) => output_success(
                    &output_format,
                    &format!("Created superuser {}", user.email),
                    Some(json!({ "id": user.id, "email": user.email })),
                ),
                Err(ServiceError::Conflict(message)) => {
                    output_error(&output_format, &message, Some("CONFLICT"))?;
                    anyhow::bail!(message)
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}
