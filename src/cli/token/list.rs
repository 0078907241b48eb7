use clap::Args;
use stockroom_app::{auth::PgAuthService, database};

#[derive(Debug, Args)]
pub(crate) struct ListTokensArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,
}

pub(crate) async fn run(args: ListTokensArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgAuthService::new(pool);

    let tokens = service
        .list_tokens()
        .await
        .map_err(|error| format!("failed to list tokens: {error}"))?;

    for token in tokens {
        let state = if token.revoked_at.is_some() {
            "revoked"
        } else {
            "active"
        };

        println!(
            "{} {} role={} created_at={} [{state}]",
            token.uuid,
            token.username,
            token.role.as_str(),
            token.created_at
        );
    }

    Ok(())
}
