//! rtc-token CLI entry point

mod cli;

use crate::cli::{Cli, Commands};
use anyhow::{Context, Result};
use clap::Parser;
use rtc_token::auth::{Privilege, PrivilegeKind, PrivilegeSet};
use rtc_token::{unix_now, AccessTokenService, InvalidToken, Role, TokenConfig};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize minimal tracing for CLI
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().without_time().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = token_config(cli.app_id, cli.app_certificate)?;

    match cli.command {
        Commands::Issue {
            channel,
            uid,
            role,
            privilege,
            ttl,
            allow_wildcard_uid,
            json,
        } => {
            let config = if allow_wildcard_uid {
                config.allow_wildcard_uid()
            } else {
                config
            };
            let config = match ttl {
                Some(ttl) => config.with_ttl(ttl),
                None => config,
            };
            issue(config, channel, uid, role, privilege, json)
        }

        Commands::Verify {
            token,
            privilege,
            channel,
            uid,
            allow_wildcard_uid,
        } => {
            let config = if allow_wildcard_uid {
                config.allow_wildcard_uid()
            } else {
                config
            };
            verify(config, token, privilege, channel.zip(uid))
        }
    }
}

/// Credentials from the command line, else from the environment
fn token_config(app_id: Option<String>, app_certificate: Option<String>) -> Result<TokenConfig> {
    match (app_id, app_certificate) {
        (Some(app_id), Some(app_certificate)) => {
            TokenConfig::from_parts(&app_id, app_certificate.into_bytes())
                .context("Invalid configuration")
        }
        (None, None) => TokenConfig::from_env()
            .context("Set RTC_APP_ID and RTC_APP_CERTIFICATE or pass both credential flags"),
        _ => anyhow::bail!("--app-id and --app-certificate must be given together"),
    }
}

fn build_privileges(privileges: &[String], expire_at: u32) -> Result<PrivilegeSet> {
    let mut set = PrivilegeSet::new();

    for name in privileges {
        let kinds = PrivilegeKind::parse_all(name)
            .ok_or_else(|| anyhow::anyhow!("Invalid privilege: {}", name))?;

        for kind in kinds {
            set.add(Privilege::new(kind, expire_at));
        }
    }

    Ok(set)
}

fn issue(
    config: TokenConfig,
    channel: String,
    uid: u32,
    role: Role,
    privileges: Vec<String>,
    json: bool,
) -> Result<()> {
    let service = AccessTokenService::new(config);
    let now = unix_now();
    let expire_at = now.saturating_add(service.default_ttl());

    let privileges = if privileges.is_empty() {
        role.privileges(expire_at)
    } else {
        build_privileges(&privileges, expire_at)?
    };

    let token = service
        .issue(&channel, uid, privileges, now)
        .context("Failed to issue token")?;

    info!(channel = %channel, uid, "token issued");

    if json {
        println!("{}", serde_json::json!({ "token": token.as_str() }));
        return Ok(());
    }

    println!("{}", token);
    println!();
    println!("Channel: {}", token.claims().channel);
    println!("UID: {}", token.claims().uid);
    println!("Privileges:");
    for privilege in token.claims().privileges.iter() {
        println!("  {} until {}", privilege.kind, privilege.expire_at);
    }

    Ok(())
}

fn verify(
    config: TokenConfig,
    token: String,
    required: PrivilegeKind,
    expected: Option<(String, u32)>,
) -> Result<()> {
    let service = AccessTokenService::new(config);
    let now = unix_now();

    let result = match &expected {
        Some((channel, uid)) => service.verify_for(&token, channel, *uid, now, required),
        None => service.verify(&token, now, required),
    };

    match result {
        Ok(claims) => {
            println!("{}", serde_json::to_string_pretty(&claims)?);
            Ok(())
        }
        Err(e) => {
            warn!(reason = e.reason(), error = %e, "token rejected");
            Err(InvalidToken::from(e).into())
        }
    }
}
