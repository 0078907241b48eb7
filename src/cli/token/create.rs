use clap::Args;
use stockroom_app::{
    auth::{PgAuthService, Role},
    database,
};

#[derive(Debug, Args)]
pub(crate) struct CreateTokenArgs {
    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: String,

    /// Username the token belongs to
    #[arg(long)]
    username: String,

    /// Grant the administrative role instead of the customer role
    #[arg(long)]
    admin: bool,
}

pub(crate) async fn run(args: CreateTokenArgs) -> Result<(), String> {
    let pool = database::connect(&args.database_url)
        .await
        .map_err(|error| format!("failed to connect to database: {error}"))?;

    let service = PgAuthService::new(pool);

    let role = if args.admin {
        Role::Admin
    } else {
        Role::Customer
    };

    let issued = service
        .issue_token(&args.username, role)
        .await
        .map_err(|error| format!("failed to create token: {error}"))?;

    println!("token_uuid: {}", issued.metadata.uuid);
    println!("username: {}", issued.metadata.username);
    println!("role: {}", issued.metadata.role.as_str());
    println!("token: {}", issued.token);
    println!("store this token now; it is only shown once");

    Ok(())
}
