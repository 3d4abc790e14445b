use anyhow::Result;
use clap::Parser;
use hutao_cdn_uploader::app::App;
use hutao_cdn_uploader::models::{Config, PostAction, UploadRequest};
use std::path::PathBuf;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "hutao-cdn-upload")]
#[command(about = "Upload a file or directory to the Snap Hutao CDN")]
struct CliArgs {
    /// File or directory to upload.
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// CDN key for a single file. Defaults to the file name; directories
    /// always use their own name.
    #[arg(long, short = 'k')]
    key: Option<String>,

    /// Cache action after a successful upload: none, preheat or refresh.
    #[arg(long, short = 'p', default_value = "none")]
    post_action: String,

    /// CDN token. Falls back to SNAP_HUTAO_CDN_TOKEN.
    #[arg(long)]
    token: Option<String>,

    /// Override the control-plane API base URL.
    #[arg(long)]
    api_base: Option<String>,

    /// Show which keys would be uploaded without uploading anything.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "hutao_cdn_uploader=info,hutao_cdn_upload=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = CliArgs::parse();

    let mut config = match Config::from_env(args.token.clone()) {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };
    if let Some(api_base) = &args.api_base {
        config = config.with_api_base(api_base.clone());
    }

    let mut request = UploadRequest::new(args.path)
        .with_post_action(PostAction::from_selector(&args.post_action))
        .with_dry_run(args.dry_run);
    if let Some(key) = args.key {
        request = request.with_key(key);
    }

    let app = App::new(&config)?;
    match app.run(&request).await {
        Ok(summary) => {
            info!(
                "Upload completed successfully: {} file(s) under key {}",
                summary.files, summary.key
            );
            Ok(())
        }
        Err(e) => {
            error!("Action failed with error: {}", e);
            std::process::exit(1);
        }
    }
}
