//! Prints the SHA-256, or HMAC-SHA256, of a file or of standard input.

use clap::Parser;
use log::error;
use otp_core::{Digest, hmac, sha256, stream};
use std::io;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "otp-digest", author, version, about, long_about = None)]
struct Cli {
    /// Compute HMAC-SHA256 with this key instead of a plain SHA-256.
    #[arg(long, value_name = "KEY")]
    hmac_key: Option<String>,

    /// File to hash. Defaults to standard input.
    input: Option<PathBuf>,
}

fn compute(cli: &Cli) -> otp_core::Result<Digest> {
    let message = match &cli.input {
        Some(path) => stream::read_file(path)?,
        None => stream::read_all(io::stdin().lock())?,
    };
    match &cli.hmac_key {
        Some(key) => hmac::hmac_sha256(key.as_bytes(), &message),
        None => Ok(sha256::digest(&message)),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match compute(&cli) {
        Ok(value) => println!("{value}"),
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
    }
}
