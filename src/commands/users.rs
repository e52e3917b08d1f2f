//! `tilectl users` — account listings and password changes.

use crate::error::{ErrorKind, Result};
use clap::{Args, Subcommand};
use exn::ResultExt;
use tilectl_config::Config;
use tilectl_db::{AccountsRepository, Database};

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List user accounts.
    List(ListArgs),
    /// Set a user's password (hashed locally, written directly).
    SetPassword(SetPasswordArgs),
    /// Check a password against the stored hash without logging in.
    CheckPassword(CheckPasswordArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Also show role memberships and access-action grants.
    #[arg(long)]
    pub roles: bool,
}

#[derive(Debug, Args)]
pub struct SetPasswordArgs {
    /// Email address of the account.
    pub email: String,
    /// The new password. Reads from the environment rather than an
    /// argument so it stays out of shell history.
    #[arg(long, env = "TILECTL_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct CheckPasswordArgs {
    /// Email address of the account.
    pub email: String,
    /// The password to check, read from the environment like
    /// `set-password`.
    #[arg(long, env = "TILECTL_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(config: &Config, command: UsersCommand) -> Result<()> {
    let db = Database::connect(&config.database.url).await.or_raise(|| ErrorKind::Database)?;
    let accounts = AccountsRepository::from(&db);
    let result = match command {
        UsersCommand::List(args) => list(&accounts, args).await,
        UsersCommand::SetPassword(args) => set_password(&accounts, args).await,
        UsersCommand::CheckPassword(args) => check_password(&accounts, args).await,
    };
    db.close().await;
    result
}

async fn list(accounts: &AccountsRepository, args: ListArgs) -> Result<()> {
    let users = accounts.list_users().await.or_raise(|| ErrorKind::Database)?;
    for user in &users {
        let active = if user.active { "active" } else { "inactive" };
        let confirmed = if user.confirmed { "confirmed" } else { "unconfirmed" };
        println!("{} {} ({active}, {confirmed})", user.id, user.email);
    }
    println!("{} user(s)", users.len());

    if args.roles {
        println!();
        for role in accounts.list_roles().await.or_raise(|| ErrorKind::Database)? {
            let description = role.description.as_deref().unwrap_or("-");
            println!("role {}: {description}", role.name);
        }
        for membership in accounts.list_user_roles().await.or_raise(|| ErrorKind::Database)? {
            println!("{} has role {}", membership.email, membership.role_name);
        }
        for grant in accounts.list_action_grants().await.or_raise(|| ErrorKind::Database)? {
            println!("action {} granted to {} ({})", grant.action, grant.holder, grant.via);
        }
    }
    Ok(())
}

async fn set_password(accounts: &AccountsRepository, args: SetPasswordArgs) -> Result<()> {
    if args.password.len() < 8 {
        exn::bail!(ErrorKind::Usage("password must be at least 8 characters"));
    }
    accounts.set_password(&args.email, &args.password).await.or_raise(|| ErrorKind::Database)?;
    println!("password updated for {}", args.email);
    Ok(())
}

async fn check_password(accounts: &AccountsRepository, args: CheckPasswordArgs) -> Result<()> {
    let matches =
        accounts.check_password(&args.email, &args.password).await.or_raise(|| ErrorKind::Database)?;
    if matches {
        println!("password matches for {}", args.email);
    } else {
        println!("password does NOT match for {}", args.email);
        exn::bail!(ErrorKind::Usage("password mismatch"));
    }
    Ok(())
}
