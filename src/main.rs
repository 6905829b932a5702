use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::Dispatch;
use tracing_subscriber::EnvFilter;

use eudccverify::config::{DEFAULT_CERT_DIR, DEFAULT_KEY_DB};
use eudccverify::render::render_report;
use eudccverify::{
    DecoderConfig, KeyStore, PayloadDecoder, Pipeline, TrustStoreConfig, DEFAULT_PREFIX,
};

/// Decode an EU Digital COVID Certificate and verify its signature.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Credential text (as scanned from the QR code).
    #[arg(long, conflicts_with = "file")]
    text: Option<String>,

    /// Read the credential text from a file instead of stdin.
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Directory of `<hex key id>.pem` signer certificates.
    #[arg(long, env = "EUDCC_CERT_DIR", default_value = DEFAULT_CERT_DIR)]
    cert_dir: PathBuf,

    /// JSON key database.
    #[arg(long, env = "EUDCC_KEY_DB", default_value = DEFAULT_KEY_DB)]
    key_db: PathBuf,

    /// Credential scheme prefix.
    #[arg(long, env = "EUDCC_PREFIX", default_value = DEFAULT_PREFIX)]
    prefix: String,

    /// Write the JSON report here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Keep the short claim codes instead of descriptive names.
    #[arg(long)]
    raw: bool,

    /// Log resolution and verification details.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    let log = Dispatch::new(
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new(default_level)),
            )
            .with_writer(io::stderr)
            .finish(),
    );

    let data = match (&args.text, &args.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("can't read {}", path.display()))?,
        (None, None) => {
            let mut data = String::new();
            io::stdin().read_to_string(&mut data)?;
            data
        }
    };
    if data.trim().is_empty() {
        bail!("no credential supplied");
    }

    let trust_store = TrustStoreConfig {
        cert_dir: args.cert_dir,
        key_db: args.key_db,
    };
    let store = KeyStore::from_config(&trust_store, &log)?;
    let decoder = PayloadDecoder::new(&DecoderConfig {
        prefix: args.prefix,
    });

    let report = Pipeline::new(&decoder, &store, &log).run(&data)?;
    let json = serde_json::to_string_pretty(&render_report(&report, !args.raw)?)?;

    match args.output {
        Some(path) => fs::write(&path, json + "\n")
            .with_context(|| format!("can't write {}", path.display()))?,
        None => println!("{}", json),
    }

    Ok(())
}
