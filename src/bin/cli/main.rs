use anyhow::{Context, Result};
use artifact_object_store::{
    app::{AppBuilder, LABELS_KEY},
    services::{credential_resolver, resilience_policy},
    ArtifactObjectStore, BucketName, ObjectKey, ObjectReader, ObjectStore,
};
use clap::{Parser, Subcommand};
use std::{collections::HashMap, path::PathBuf, time::Duration};
use tokio::io::AsyncWriteExt;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "artifact-store-cli")]
#[command(about = "Bucket/key object storage on top of an Artifactory repository", long_about = None)]
struct Cli {
    /// Repository service base URL
    #[arg(long, env = "ARTIFACTORY_URL")]
    url: Option<String>,

    /// User name for the repository service
    #[arg(long, env = "ARTIFACTORY_USER")]
    user: Option<String>,

    /// Labels scoping every operation, as `name=value;name=value`
    #[arg(long, env = "ARTIFACTORY_LABELS")]
    labels: Option<String>,

    /// Log mutating requests instead of sending them
    #[arg(long, env = "ARTIFACTORY_DRY_RUN")]
    dry_run: Option<String>,

    /// Concurrent transfers per bulk call
    #[arg(long, env = "ARTIFACTORY_THREADS")]
    threads: Option<String>,

    /// Connect timeout in seconds
    #[arg(long, env = "ARTIFACTORY_DIAL_TIMEOUT")]
    dial_timeout: Option<String>,

    /// Whole-request timeout in seconds
    #[arg(long, env = "ARTIFACTORY_REQUEST_TIMEOUT")]
    request_timeout: Option<String>,

    /// Re-attempts for transient failures
    #[arg(long, env = "ARTIFACTORY_RETRIES")]
    retries: Option<String>,

    /// Local staging folder for object bodies
    #[arg(long, env = "STAGING_DIR", default_value = artifact_object_store::adapters::outbound::DEFAULT_STAGING_ROOT)]
    staging_dir: PathBuf,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload a file (or stdin with `-`) as an object
    Put {
        bucket: String,
        key: String,
        /// File path to upload
        file: String,
    },

    /// Download an object
    Get {
        bucket: String,
        key: String,
        /// Output file path; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check whether an object exists
    Exists { bucket: String, key: String },

    /// List common prefixes below a prefix
    Ls {
        bucket: String,
        #[arg(default_value = "")]
        prefix: String,
        #[arg(short, long, default_value = "/")]
        delimiter: String,
    },

    /// Delete an object and everything beneath it
    Rm { bucket: String, key: String },

    /// Print a direct download URL
    Sign {
        bucket: String,
        key: String,
        /// Requested lifetime in seconds; advisory only
        #[arg(long, default_value = "3600")]
        ttl: u64,
    },
}

impl Cli {
    /// Forward flags into the configuration map so they go through the same validation
    fn to_config(&self) -> HashMap<String, String> {
        [
            (credential_resolver::URL_KEY, &self.url),
            (credential_resolver::USER_KEY, &self.user),
            (LABELS_KEY, &self.labels),
            (resilience_policy::DRY_RUN_KEY, &self.dry_run),
            (resilience_policy::THREADS_KEY, &self.threads),
            (resilience_policy::DIAL_TIMEOUT_KEY, &self.dial_timeout),
            (resilience_policy::REQUEST_TIMEOUT_KEY, &self.request_timeout),
            (resilience_policy::RETRIES_KEY, &self.retries),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.clone().map(|v| (key.to_string(), v)))
        .collect()
    }

    fn init_logging(&self) {
        let level = self
            .log_level
            .parse::<tracing::Level>()
            .unwrap_or(tracing::Level::INFO);

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn names(bucket: &str, key: &str) -> Result<(BucketName, ObjectKey)> {
    let bucket = BucketName::new(bucket.to_string()).context("Invalid bucket name")?;
    let key = ObjectKey::new(key.to_string()).context("Invalid object key")?;
    Ok((bucket, key))
}

async fn run(store: &ArtifactObjectStore, command: Commands) -> Result<()> {
    match command {
        Commands::Put { bucket, key, file } => {
            let (bucket, key) = names(&bucket, &key)?;
            let body: ObjectReader = if file == "-" {
                Box::new(tokio::io::stdin())
            } else {
                Box::new(
                    tokio::fs::File::open(&file)
                        .await
                        .with_context(|| format!("Failed to open {}", file))?,
                )
            };
            let summary = store.put_object(&bucket, &key, body).await?;
            println!("uploaded: {}, failed: {}", summary.succeeded, summary.failed);
        }
        Commands::Get {
            bucket,
            key,
            output,
        } => {
            let (bucket, key) = names(&bucket, &key)?;
            let mut reader = store.get_object(&bucket, &key).await?;
            match output {
                Some(path) => {
                    let mut file = tokio::fs::File::create(&path)
                        .await
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    tokio::io::copy(&mut reader, &mut file).await?;
                    file.flush().await?;
                }
                None => {
                    let mut stdout = tokio::io::stdout();
                    tokio::io::copy(&mut reader, &mut stdout).await?;
                    stdout.flush().await?;
                }
            }
        }
        Commands::Exists { bucket, key } => {
            let (bucket, key) = names(&bucket, &key)?;
            println!("{}", store.object_exists(&bucket, &key).await?);
        }
        Commands::Ls {
            bucket,
            prefix,
            delimiter,
        } => {
            let bucket = BucketName::new(bucket).context("Invalid bucket name")?;
            for entry in store
                .list_common_prefixes(&bucket, &prefix, &delimiter)
                .await?
            {
                println!("{}", entry);
            }
        }
        Commands::Rm { bucket, key } => {
            let (bucket, key) = names(&bucket, &key)?;
            let summary = store.delete_object(&bucket, &key).await?;
            println!("deleted: {}, failed: {}", summary.succeeded, summary.failed);
        }
        Commands::Sign { bucket, key, ttl } => {
            let (bucket, key) = names(&bucket, &key)?;
            let url = store
                .create_signed_url(&bucket, &key, Duration::from_secs(ttl))
                .await?;
            println!("{}", url);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.init_logging();

    let store = AppBuilder::new()
        .with_config(cli.to_config())
        .with_staging_root(&cli.staging_dir)
        .build()
        .context("Failed to initialize object store")?;

    info!(staging_dir = %cli.staging_dir.display(), "Object store ready");

    run(&store, cli.command).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "artifact-store-cli",
            "--url",
            "https://repo.example.com/artifactory",
            "--user",
            "velero",
            "--threads",
            "8",
            "ls",
            "backups",
            "x/",
        ]);

        let config = cli.to_config();
        assert_eq!(config.get("threads").map(String::as_str), Some("8"));
        assert_eq!(config.get("user").map(String::as_str), Some("velero"));
        assert!(!config.contains_key("retries"));

        match cli.command {
            Commands::Ls {
                bucket,
                prefix,
                delimiter,
            } => {
                assert_eq!(bucket, "backups");
                assert_eq!(prefix, "x/");
                assert_eq!(delimiter, "/");
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
