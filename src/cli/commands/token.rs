use anyhow::anyhow;
use clap::Args;
use serde_json::json;

use crate::auth::{generate_jwt, Claims};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config;

#[derive(Args, Debug)]
pub struct TokenArgs {
    #[arg(long, help = "Token subject, usually the operator's name")]
    pub subject: String,

    #[arg(long, help = "Role claim (defaults to SECURITY_ADMIN_ROLE)")]
    pub role: Option<String>,

    #[arg(long, help = "Validity in hours (defaults to SECURITY_JWT_EXPIRY_HOURS)")]
    pub hours: Option<u64>,
}

pub async fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let security = &config::config().security;
    let secret = security
        .jwt_secret
        .as_deref()
        .ok_or_else(|| anyhow!("JWT_SECRET is not set; the server would accept any bearer token"))?;

    let role = args.role.unwrap_or_else(|| security.admin_role.clone());
    let hours = args.hours.unwrap_or(security.jwt_expiry_hours);
    let claims = Claims::new(args.subject, role, hours);
    let token = generate_jwt(&claims, secret)?;

    match output_format {
        OutputFormat::Json => output_success(
            &output_format,
            &format!("Token issued for '{}'", claims.sub),
            Some(json!({ "token": token, "expires_at": claims.exp, "role": claims.role })),
        ),
        // Bare token so it can be captured with $(thansohoc token ...)
        OutputFormat::Text => {
            println!("{}", token);
            Ok(())
        }
    }
}
