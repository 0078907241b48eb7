use clap::{Args, Subcommand};

mod apply;
mod deactivate;
mod list;
mod upload_image;
mod upsert;

#[derive(Debug, Args)]
pub(crate) struct CatalogCommand {
    #[command(subcommand)]
    command: CatalogSubcommand,
}

#[derive(Debug, Subcommand)]
enum CatalogSubcommand {
    /// List active products, most recently modified first
    List(list::ListArgs),
    /// Create a product or overwrite the one with the same name
    Upsert(upsert::UpsertArgs),
    /// Apply a JSON write request (create, update, or rename)
    Apply(apply::ApplyArgs),
    /// Soft-delete a product by name
    Deactivate(deactivate::DeactivateArgs),
    /// Upload a product image and print its stable URL
    UploadImage(upload_image::UploadImageArgs),
}

pub(crate) async fn run(command: CatalogCommand) -> Result<(), String> {
    match command.command {
        CatalogSubcommand::List(args) => list::run(args).await,
        CatalogSubcommand::Upsert(args) => upsert::run(args).await,
        CatalogSubcommand::Apply(args) => apply::run(args).await,
        CatalogSubcommand::Deactivate(args) => deactivate::run(args).await,
        CatalogSubcommand::UploadImage(args) => upload_image::run(args).await,
    }
}
