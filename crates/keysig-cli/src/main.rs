//! keysig - create and verify SSH detached signatures.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod keyfile;
mod options;
mod output;

use commands::{check_novalidate, find_principals, match_principals, sign, verify};

#[derive(Parser)]
#[command(name = "keysig")]
#[command(about = "Create and verify SSH detached signatures")]
struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign files (or standard input) with a private key
    Sign {
        /// Private key file (unencrypted OpenSSH format)
        #[arg(short = 'f', long = "key")]
        key: PathBuf,
        /// Certificate to present instead of the plain public key
        #[arg(long)]
        certificate: Option<PathBuf>,
        /// Signature namespace
        #[arg(short = 'n', long)]
        namespace: String,
        /// Options: hashalg=sha256|sha512
        #[arg(short = 'O', long = "option")]
        options: Vec<String>,
        /// Files to sign; "-" or none reads standard input
        files: Vec<PathBuf>,
    },
    /// Verify a signature over standard input and check it against allowed signers
    Verify {
        /// Allowed signers file
        #[arg(short = 'f', long = "allowed-signers")]
        allowed_signers: PathBuf,
        /// Identity (principal) expected to have signed
        #[arg(short = 'I', long)]
        identity: String,
        /// Signature namespace
        #[arg(short = 'n', long)]
        namespace: String,
        /// Armored signature file
        #[arg(short = 's', long)]
        signature: PathBuf,
        /// File of revoked public keys
        #[arg(short = 'r', long = "revoked-keys")]
        revoked_keys: Option<PathBuf>,
        /// Options: verify-time=TIME, print-pubkey
        #[arg(short = 'O', long = "option")]
        options: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check a signature over standard input without consulting allowed signers
    CheckNovalidate {
        /// Signature namespace
        #[arg(short = 'n', long)]
        namespace: String,
        /// Armored signature file
        #[arg(short = 's', long)]
        signature: PathBuf,
        /// Options: print-pubkey
        #[arg(short = 'O', long = "option")]
        options: Vec<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the principals allowed to have made a signature
    FindPrincipals {
        /// Armored signature file
        #[arg(short = 's', long)]
        signature: PathBuf,
        /// Allowed signers file
        #[arg(short = 'f', long = "allowed-signers")]
        allowed_signers: PathBuf,
        /// Options: verify-time=TIME
        #[arg(short = 'O', long = "option")]
        options: Vec<String>,
    },
    /// List the allowed-signers principal patterns that match an identity
    MatchPrincipals {
        /// Identity to match
        #[arg(short = 'I', long)]
        identity: String,
        /// Allowed signers file
        #[arg(short = 'f', long = "allowed-signers")]
        allowed_signers: PathBuf,
    },
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Sign {
            key,
            certificate,
            namespace,
            options,
            files,
        } => sign::run(key, certificate, namespace, options, files),
        Commands::Verify {
            allowed_signers,
            identity,
            namespace,
            signature,
            revoked_keys,
            options,
            json,
        } => verify::run(verify::VerifyArgs {
            allowed_signers,
            identity,
            namespace,
            signature,
            revoked_keys,
            options,
            json,
        }),
        Commands::CheckNovalidate {
            namespace,
            signature,
            options,
            json,
        } => check_novalidate::run(namespace, signature, options, json),
        Commands::FindPrincipals {
            signature,
            allowed_signers,
            options,
        } => find_principals::run(signature, allowed_signers, options),
        Commands::MatchPrincipals {
            identity,
            allowed_signers,
        } => match_principals::run(allowed_signers, identity),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
