//! Clap derive structures for the `vlansync` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// vlansync -- keep switch VLANs in step with NetBox VLAN tags
#[derive(Debug, Parser)]
#[command(
    name = "vlansync",
    version,
    about = "Reconcile NetBox VLAN tags onto managed switches",
    long_about = "Receives NetBox VLAN change webhooks, queues them in Redis, and pushes\n\
        VLAN adds, renames and removals to every active switch whose tags\n\
        match the VLAN's tags. Runs the worker when no subcommand is given.",
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// TOML configuration file (environment variables override it)
    #[arg(long, env = "VLANSYNC_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the reconciliation worker until SIGINT/SIGTERM (default)
    Worker,

    /// Receive NetBox webhooks on POST /webhook/vlan and queue accepted ones
    Serve,

    /// Pass a webhook payload through the ingestion checks onto the queue
    Enqueue(EnqueueArgs),

    /// Print the HMAC-SHA512 signature NetBox would send for a payload
    Sign(SignArgs),

    /// Validate configuration and print a redacted summary
    CheckConfig,
}

#[derive(Debug, Args)]
pub struct EnqueueArgs {
    /// Webhook body as NetBox sends it (`-` for stdin)
    #[arg(long, short = 'p')]
    pub payload: PathBuf,

    /// Hex signature from the X-Hook-Signature header
    #[arg(long, short = 's', conflicts_with = "sign")]
    pub signature: Option<String>,

    /// Sign the payload with the configured secret instead
    #[arg(long)]
    pub sign: bool,
}

#[derive(Debug, Args)]
pub struct SignArgs {
    /// Payload file (`-` for stdin)
    #[arg(long, short = 'p')]
    pub payload: PathBuf,
}
