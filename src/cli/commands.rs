//! CLI command definitions

use clap::{Parser, Subcommand};
use rtc_token::auth::PrivilegeKind;
use rtc_token::config::parse_ttl;
use rtc_token::Role;

#[derive(Parser)]
#[command(name = "rtc-token")]
#[command(about = "Issue and verify real-time channel access tokens", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Public app identifier (read from RTC_APP_ID when neither credential flag is given)
    #[arg(long, global = true, requires = "app_certificate")]
    pub app_id: Option<String>,

    /// App certificate used to sign and verify tokens (read from RTC_APP_CERTIFICATE
    /// when neither credential flag is given)
    #[arg(long, global = true, requires = "app_id")]
    pub app_certificate: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Issue a token
    ///
    /// Examples:
    ///   rtc-token issue --channel room42 --uid 7
    ///   rtc-token issue --channel room42 --uid 7 --role subscriber --ttl 600
    ///   rtc-token issue --channel room42 --uid 7 -p join -p publish-audio --json
    Issue {
        /// Channel to grant access to
        #[arg(short, long)]
        channel: String,

        /// User id the token is bound to
        #[arg(short, long)]
        uid: u32,

        /// Role preset, used when no explicit privilege is given
        #[arg(short, long, default_value_t = Role::Publisher)]
        role: Role,

        /// Privilege: join, publish-audio, publish-video, publish-data, or all (can be repeated)
        #[arg(short, long = "privilege", value_parser = parse_privilege)]
        privilege: Vec<String>,

        /// Lifetime of every granted privilege, in seconds
        ///
        /// Defaults to RTC_TOKEN_TTL when credentials come from the environment, else 3600.
        #[arg(long, value_parser = parse_ttl)]
        ttl: Option<u32>,

        /// Let uid 0 stand for any user
        #[arg(long)]
        allow_wildcard_uid: bool,

        /// Print `{"token": ...}` instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Verify a token and print its claims
    ///
    /// Examples:
    ///   rtc-token verify <token>
    ///   rtc-token verify <token> -p publish-video --channel room42 --uid 7
    Verify {
        /// The token to check
        token: String,

        /// Privilege the token must grant
        #[arg(short, long, default_value = "join", value_parser = parse_required)]
        privilege: PrivilegeKind,

        /// Channel the token must name
        #[arg(long, requires = "uid")]
        channel: Option<String>,

        /// User id the token must be bound to
        #[arg(long, requires = "channel")]
        uid: Option<u32>,

        /// Let a token issued for uid 0 admit any user
        #[arg(long)]
        allow_wildcard_uid: bool,
    },
}

fn parse_privilege(s: &str) -> Result<String, String> {
    match PrivilegeKind::parse_all(s) {
        Some(_) => Ok(s.to_lowercase()),
        None => Err(format!(
            "Invalid privilege: '{}'. Must be: join, publish-audio, publish-video, publish-data, or all",
            s
        )),
    }
}

fn parse_required(s: &str) -> Result<PrivilegeKind, String> {
    match PrivilegeKind::parse_all(s).as_deref() {
        Some([kind]) => Ok(*kind),
        _ => Err(format!(
            "Invalid privilege: '{}'. Must be one of: join, publish-audio, publish-video, publish-data",
            s
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_required() {
        assert_eq!(parse_required("publish-video"), Ok(PrivilegeKind::PublishVideo));
        assert!(parse_required("all").is_err());
        assert!(parse_required("root").is_err());
    }

    #[test]
    fn test_parse_issue() {
        let cli = Cli::try_parse_from([
            "rtc-token",
            "--app-id",
            "app1",
            "--app-certificate",
            "s3cr3t",
            "issue",
            "--channel",
            "room42",
            "--uid",
            "7",
            "-p",
            "join",
            "-p",
            "publish-audio",
        ])
        .unwrap();

        match cli.command {
            Commands::Issue {
                channel,
                uid,
                privilege,
                ttl,
                ..
            } => {
                assert_eq!(channel, "room42");
                assert_eq!(uid, 7);
                assert_eq!(privilege, vec!["join", "publish-audio"]);
                assert_eq!(ttl, None);
            }
            _ => panic!("expected issue"),
        }
        assert_eq!(cli.app_id.as_deref(), Some("app1"));
    }

    #[test]
    fn test_credentials_given_together() {
        let only_id = Cli::try_parse_from(["rtc-token", "--app-id", "app1", "verify", "abc"]);
        assert!(only_id.is_err());

        let neither = Cli::try_parse_from(["rtc-token", "verify", "abc"]).unwrap();
        assert!(neither.app_id.is_none());
        assert!(neither.app_certificate.is_none());
    }
}
