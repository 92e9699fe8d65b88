//! Generates fresh key files for `otp`.

use clap::Parser;
use log::{error, info};
use otp_core::pad_generator;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "otp-keygen", author, version, about, long_about = None)]
#[command(
    after_help = "EXAMPLES:\n  \n# Generate a 1 MiB key file\notp-keygen ./alice.pad\n\n# Generate a 64 KiB key file\notp-keygen ./alice.pad --size 65536"
)]
struct Cli {
    /// The path of the key file to create. Existing files are never overwritten.
    path: PathBuf,

    /// The size of the key file in bytes
    #[arg(short, long, default_value_t = 1024 * 1024)]
    size: usize,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    info!(
        "Generating a new key file at '{}' with {} bytes.",
        cli.path.display(),
        cli.size
    );
    match pad_generator::generate_pad(&cli.path, cli.size) {
        Ok(()) => println!("{}", cli.path.display()),
        Err(e) => {
            error!("Failed to generate key file '{}': {e}", cli.path.display());
            std::process::exit(1);
        }
    }
}
