use anyhow::Context;
use sea_orm::DatabaseConnection;
use sea_orm_migration::MigratorTrait;
use yamdb_db::entities::user;
use yamdb_db::services::users::{self, UserExtra};
use yamdb_db::DatabaseConfig;
use yamdb_migration::Migrator;

use crate::{Cli, Command, UserArgs};

/// Connect, bring the schema up to date and run one command.
///
/// Returns the line to print on success.
pub async fn run(cli: Cli) -> anyhow::Result<String> {
    let mut config = DatabaseConfig::from_env();
    if let Some(url) = cli.database_url {
        config = config.with_url(url);
    }

    tracing::info!("connecting to database...");
    let db = yamdb_db::connect(&config)
        .await
        .context("failed to connect to database")?;

    let pending = Migrator::get_pending_migrations(&db)
        .await
        .context("failed to read migration state")?
        .len();
    if pending > 0 {
        tracing::info!(pending, "running database migrations...");
        Migrator::up(&db, None)
            .await
            .context("failed to run migrations")?;
        tracing::info!("migrations complete");
    }

    execute(&db, cli.command, pending).await
}

async fn execute(
    db: &DatabaseConnection,
    command: Command,
    applied: usize,
) -> anyhow::Result<String> {
    match command {
        Command::Migrate => Ok(format!("applied {applied} migration(s)")),
        Command::Createuser(args) => {
            let (email, username, extra) = split(args);
            let created = users::create_user(db, &email, &username, extra).await?;
            Ok(describe(&created))
        }
        Command::Createsuperuser(args) => {
            let (email, username, extra) = split(args);
            let created = users::create_superuser(db, &email, &username, extra).await?;
            Ok(describe(&created))
        }
        Command::Createstaff(args) => {
            let (email, username, extra) = split(args);
            let created = users::create_staff(db, &email, &username, extra).await?;
            Ok(describe(&created))
        }
    }
}

fn split(args: UserArgs) -> (String, String, UserExtra) {
    let extra = UserExtra {
        password: args.password,
        bio: args.bio,
        ..Default::default()
    };
    (args.email, args.username, extra)
}

fn describe(created: &user::Model) -> String {
    let account = created.account();
    format!(
        "created {} <{}> with role {}",
        account.username,
        account.email,
        created.profile().role
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_parse_createsuperuser() {
        let cli = parse(&[
            "yamdb",
            "--database-url",
            "sqlite::memory:",
            "createsuperuser",
            "--email",
            "root@example.com",
            "--username",
            "root",
        ]);
        assert_eq!(cli.database_url.as_deref(), Some("sqlite::memory:"));
        match cli.command {
            Command::Createsuperuser(args) => {
                assert_eq!(args.email, "root@example.com");
                assert_eq!(args.username, "root");
                assert!(args.password.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_requires_username() {
        let result = Cli::try_parse_from(["yamdb", "createuser", "--email", "a@b.io"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_migrate() {
        let cli = parse(&["yamdb", "migrate"]);
        assert_eq!(cli.command, Command::Migrate);
    }

    #[tokio::test]
    async fn test_run_createstaff_on_fresh_database() {
        let cli = parse(&[
            "yamdb",
            "createstaff",
            "--database-url",
            "sqlite::memory:",
            "--email",
            "mod@Example.com",
            "--username",
            "mod",
        ]);
        let report = run(cli).await.unwrap();
        assert_eq!(report, "created mod <mod@example.com> with role moderator");
    }

    #[tokio::test]
    async fn test_run_reports_validation_error() {
        let cli = parse(&[
            "yamdb",
            "--database-url",
            "sqlite::memory:",
            "createuser",
            "--email",
            "",
            "--username",
            "nobody",
        ]);
        let err = run(cli).await.unwrap_err();
        assert!(err.to_string().contains("email"));
    }
}
