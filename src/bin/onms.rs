use anyhow::Context;
use clap::{Parser, Subcommand};
use onms::config;
use onms::core::manifest::load_manifest;
use onms::crypto::{self, DigestMode};
use onms::reconcile::report::Reporter;
use onms::store::http::HttpStore;
use onms::wire::XmlSerializer;
use onms::{Reconciler, Settings};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Manage OpenNMS users and groups
#[derive(Parser)]
#[command(name = "onms", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Bring the server's users and groups in line with a manifest
    Apply {
        /// Path to the manifest file
        manifest: PathBuf,

        /// Path to the connection settings file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Report what would change without changing anything
        #[arg(long)]
        check: bool,

        /// Fail instead of creating when a resource can't be found
        #[arg(long)]
        strict: bool,
    },

    /// Print the digest of a password
    Password {
        plaintext: String,

        /// plain-md5 or salted
        #[arg(short, long, default_value_t = DigestMode::PlainMd5)]
        mode: DigestMode,

        /// Derive the salt from this string instead of generating one
        #[arg(short, long)]
        salt: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Apply {
            manifest,
            config,
            check,
            strict,
        } => {
            let manifest = load_manifest(&manifest)?;
            let connection = config::load(config.as_deref())?;
            let store = HttpStore::new(&connection)
                .with_context(|| format!("failed to set up a client for {}", connection.host))?;
            let settings = Settings {
                dry_run: check,
                ignore_not_found: !strict,
            };

            tracing::info!(manifest = %manifest.name, host = %connection.host, "applying");
            Reconciler::new(store, XmlSerializer, settings).apply(&manifest, &mut Reporter)?;
        }
        Commands::Password {
            plaintext,
            mode,
            salt,
        } => {
            let mut source = crypto::OsSalt;
            let digest = crypto::digest_with(&plaintext, mode, salt.as_deref(), &mut source);
            println!("{digest}");
        }
    }
    Ok(())
}
