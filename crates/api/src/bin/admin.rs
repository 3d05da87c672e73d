//! Operator CLI. Talks to MongoDB directly, so it bypasses the admin gate.

use chrono::Utc;
use clap::{Parser, Subcommand};
use invitegate_config::Settings;
use invitegate_db::{connect, indexes::ensure_indexes};
use invitegate_services::{
    AuthService, InviteService, Stores,
    invite::{CreateInvite, Identity},
};

#[derive(Parser)]
#[command(name = "invitegate-admin")]
#[command(about = "Invite administration for operators")]
struct Cli {
    /// Email recorded as the operator on audit fields
    #[arg(long, global = true, env = "INVITEGATE_OPERATOR", default_value = "operator@localhost")]
    operator: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Invite management commands
    Invite {
        #[command(subcommand)]
        invite_cmd: InviteCommand,
    },
    /// Grant admin rights to a user
    GrantAdmin {
        /// Identity-provider uid
        uid: String,
        /// Email of the user
        email: String,
    },
    /// Mint a bearer token for local testing
    Token {
        uid: String,
        email: String,
        /// Lifetime in seconds
        #[arg(long, default_value = "3600")]
        ttl: i64,
    },
}

#[derive(Subcommand)]
enum InviteCommand {
    /// Create a new invite code
    Create {
        /// Days until expiry (clamped to 1..=30)
        #[arg(long)]
        days: Option<i64>,
        /// Number of uses; -1 for unlimited
        #[arg(long)]
        max_uses: Option<i64>,
        /// Role granted on redemption (admin or user)
        #[arg(long)]
        role: Option<String>,
        #[arg(long)]
        note: Option<String>,
        /// Output only the code (for scripts)
        #[arg(long)]
        plain: bool,
    },
    /// List all invites, newest first
    List,
    /// Revoke an invite
    Revoke {
        /// Invite code to revoke
        code: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "invitegate_services=warn".into()),
        )
        .init();
    let cli = Cli::parse();
    let settings = Settings::load()?;

    // Token minting needs no database.
    if let Command::Token { uid, email, ttl } = &cli.command {
        let auth = AuthService::new(settings.jwt.clone());
        println!("{}", auth.issue_token(&Identity::new(uid, email), *ttl)?);
        return Ok(());
    }

    let db = connect(&settings).await?;
    ensure_indexes(&db).await?;
    let service = InviteService::new(Stores::mongo(&db), &settings);

    match cli.command {
        Command::Invite { invite_cmd } => match invite_cmd {
            InviteCommand::Create {
                days,
                max_uses,
                role,
                note,
                plain,
            } => {
                let request = CreateInvite {
                    expires_in_days: days,
                    max_uses,
                    role,
                    note,
                };
                let invite = service
                    .create_system_invite(request, &cli.operator, Utc::now())
                    .await?;
                if plain {
                    println!("{}", invite.code);
                } else {
                    println!("Invite created\n");
                    println!("Code:     {}", invite.code);
                    println!("Role:     {}", invite.role);
                    println!("Uses:     {}", format_uses(invite.max_uses));
                    println!("Expires:  {}", invite.expires_at.to_chrono());
                    println!("URL:      {}", service.invite_url(&invite.code));
                }
            }
            InviteCommand::List => {
                let now = Utc::now();
                let invites = service.list_all_invites().await?;
                if invites.is_empty() {
                    println!("No invites found.");
                }
                for invite in invites {
                    println!(
                        "{}  {:<9}  {:<5}  {}/{}  expires {}",
                        invite.code,
                        format!("{:?}", invite.status(now.into())).to_lowercase(),
                        invite.role,
                        invite.current_uses,
                        format_uses(invite.max_uses),
                        invite.expires_at.to_chrono(),
                    );
                }
            }
            InviteCommand::Revoke { code } => {
                let revoked = service
                    .revoke_system_invite(&code, &cli.operator, Utc::now())
                    .await?;
                println!("Invite {} revoked", revoked);
            }
        },
        Command::GrantAdmin { uid, email } => {
            service
                .grant_admin(&uid, &email, &cli.operator, Utc::now())
                .await?;
            println!("{} ({}) is now an admin", email, uid);
        }
        Command::Token { .. } => {}
    }

    Ok(())
}

fn format_uses(max_uses: i64) -> String {
    if max_uses < 0 {
        "unlimited".to_string()
    } else {
        max_uses.to_string()
    }
}
