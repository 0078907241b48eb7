use clap::Args;
use stockroom_app::{auth::PgAuthService, database};
use uuid::Uuid;

#[derive(Debug, Args)]
pub(crate) struct RevokeTokenArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// UUID of the token to revoke
    #[arg(long)]
    token_uuid: Uuid,
}

pub(crate) async fn run(args: RevokeTokenArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgAuthService::new(pool);

    let was_active = service
        .revoke_token(args.token_uuid.into())
        .await
        .map_err(|error| format!("failed to revoke token: {error}"))?;

    if was_active {
        println!("token revoked");
    } else {
        println!("token was not active");
    }

    Ok(())
}
