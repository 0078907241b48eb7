use std::path::PathBuf;

use clap::Args;
use stockroom_app::storage::{HttpImageStore, ImageStore, ImageStoreConfig};

#[derive(Debug, Args)]
pub(crate) struct UploadImageArgs {
    /// Object-store endpoint
    #[arg(long, env = "STORAGE_ENDPOINT")]
    storage_endpoint: String,

    /// Bucket holding product images
    #[arg(long, env = "STORAGE_BUCKET")]
    storage_bucket: String,

    /// Object-store bearer credential
    #[arg(long, env = "STORAGE_TOKEN", hide_env_values = true)]
    storage_token: String,

    /// Object key to store the image under
    #[arg(long)]
    key: String,

    /// MIME type of the image
    #[arg(long, default_value = "image/webp")]
    content_type: String,

    /// Path to the image file
    #[arg(long)]
    file: PathBuf,
}

pub(crate) async fn run(args: UploadImageArgs) -> Result<(), String> {
    let bytes = std::fs::read(&args.file)
        .map_err(|error| format!("failed to read {}: {error}", args.file.display()))?;

    let store = HttpImageStore::new(ImageStoreConfig {
        endpoint: args.storage_endpoint,
        bucket: args.storage_bucket,
        token: args.storage_token,
    });

    let url = store
        .store_image(&args.key, bytes, &args.content_type)
        .await
        .map_err(|error| format!("failed to upload image: {error}"))?;

    println!("{url}");

    Ok(())
}
