use anyhow::Context;
use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::rbac::Role;

#[derive(Args)]
pub struct TokenArgs {
    #[arg(long, help = "User id (the token subject)")]
    pub user_id: Uuid,

    #[arg(long, help = "User email")]
    pub email: String,

    #[arg(long, help = "EXECUTIVE, PROJECT_MANAGER or INSPECTOR")]
    pub role: String,

    #[arg(long, help = "Lifetime in hours (defaults to the configured expiry)")]
    pub hours: Option<u64>,
}

pub fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = config();
    let role: Role = args.role.to_uppercase().parse()?;
    let hours = args.hours.unwrap_or(config.security.jwt_expiry_hours);

    let claims = Claims::new(args.user_id, args.email, role, hours);
    let token = generate_jwt(&claims, &config.security.jwt_secret).context("failed to sign token")?;

    match output_format {
        OutputFormat::Text => println!("{}", token),
        OutputFormat::Json => output_success(
            &output_format,
            "Token generated",
            Some(json!({ "token": token, "role": role, "expiresAt": claims.exp })),
        )?,
    }
    Ok(())
}
