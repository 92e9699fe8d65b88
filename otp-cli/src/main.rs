//! A command-line one-time-pad tool.
//!
//! `otp [-t] <keyfile> [<inputfile> [<outputfile>]]` XORs the input with the
//! same number of bytes taken from the end of the key file. With `-t` those
//! key bytes are cut off the key file afterwards.

use clap::{CommandFactory, Parser};
use log::{error, info};
use otp_core::protocol::{Reading, Truncation};
use otp_core::receipt::Receipt;
use otp_core::{Error, stream};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Parser)]
#[command(name = "otp", author, version, about, long_about = None)]
#[command(
    after_help = "EXAMPLES:\n  \n# Encrypt a file, destroying the key bytes used\notp -t ./alice.pad ./letter.txt ./letter.otp\n\n# Decrypt on the other side with the matching key file\notp -t ./bob.pad ./letter.otp ./letter.txt\n\n# Filter standard input to standard output\ncat letter.txt | otp -t ./alice.pad > letter.otp"
)]
struct Cli {
    /// Remove the used key bytes from the key file. Without this flag the
    /// same key bytes are used again on the next run.
    #[arg(short = 't', long)]
    truncate: bool,

    /// Key file; key material is taken from its end
    #[arg(value_name = "KEYFILE")]
    keyfile: Option<PathBuf>,

    /// File to encrypt or decrypt. Defaults to standard input.
    #[arg(value_name = "INPUTFILE")]
    input: Option<PathBuf>,

    /// Where to write the result. Defaults to standard output.
    #[arg(value_name = "OUTPUTFILE")]
    output: Option<PathBuf>,

    /// Write a JSON receipt of the run to this path.
    #[arg(long, value_name = "RECEIPT_FILE")]
    receipt: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let Some(keyfile) = cli.keyfile.as_deref() else {
        if let Err(e) = Cli::command().print_help() {
            error!("Failed to print usage: {e}");
        }
        println!();
        return;
    };

    if let Err(e) = run(&cli, keyfile) {
        match e {
            Error::KeyTooShort { .. } => {
                error!("No key available: {e}. Nothing was written and the key file is unchanged.");
            }
            _ => error!("{e}"),
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli, keyfile: &Path) -> otp_core::Result<()> {
    let message = match &cli.input {
        Some(path) => stream::read_file(path)?,
        None => stream::read_all(io::stdin().lock())?,
    };

    let validated = Reading::open(keyfile, message, Truncation::from_flag(cli.truncate))?.validate()?;

    let consumed = match &cli.output {
        Some(path) => {
            // The output is complete on disk before any key byte is removed;
            // the rename afterwards stays within one directory.
            let (consumed, staged) = validated.consume_with(|output| stage_output(path, output))?;
            staged.persist(path).map_err(|e| e.error)?;
            info!(
                "Wrote {} bytes to '{}'.",
                consumed.output().len(),
                path.display()
            );
            consumed
        }
        None => {
            let consumed = validated.consume()?;
            let mut stdout = io::stdout().lock();
            stdout.write_all(consumed.output())?;
            stdout.flush()?;
            consumed
        }
    };

    if let Some(path) = &cli.receipt {
        Receipt::from_consumed(&consumed).save(path)?;
        info!("Receipt saved to '{}'.", path.display());
    }

    Ok(())
}

/// Writes `output` to a temporary file in the same directory as `path`.
fn stage_output(path: &Path, output: &[u8]) -> otp_core::Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(output)?;
    staged.as_file().sync_all()?;
    Ok(staged)
}
