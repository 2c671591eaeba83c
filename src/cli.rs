//! CLI argument surfaces for the two binaries (`astm-server`, `astm-sim`).

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::session::MessageFormat;

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum MessageFormatArg {
    Lis2a,
    Astm,
}

impl From<MessageFormatArg> for MessageFormat {
    fn from(value: MessageFormatArg) -> Self {
        match value {
            MessageFormatArg::Lis2a => MessageFormat::Lis2a,
            MessageFormatArg::Astm => MessageFormat::Astm,
        }
    }
}

/// ASTM server: listens for instrument connections and dispatches
/// completed transfers to a LIMS and/or a capture directory.
#[derive(Debug, Parser)]
#[command(name = "astm-server", version, about)]
pub struct ServerArgs {
    /// Listen IP address
    #[arg(short, long, default_value = "0.0.0.0")]
    pub listen: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = crate::constants::DEFAULT_PORT)]
    pub port: u16,

    /// Output directory to write captured ASTM files
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// LIMS URL (http(s)://user:pass@host[/path]); pre-flight-authenticated
    /// at start-up, failure exits with status 1
    #[arg(short, long)]
    pub url: Option<String>,

    /// Consumer identifier reported to the LIMS
    #[arg(short, long, default_value = "senaite.core.lis2a.import")]
    pub consumer: String,

    /// Payload shape enqueued for the consumer
    #[arg(short = 'm', long, value_enum, default_value_t = MessageFormatArg::Lis2a)]
    pub message_format: MessageFormatArg,

    /// Number of LIMS delivery retries
    #[arg(short, long, default_value_t = 3)]
    pub retries: u32,

    /// Delay in seconds between LIMS delivery retries
    #[arg(short, long, default_value_t = 5)]
    pub delay: u64,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub logfile: Option<PathBuf>,
}

impl std::fmt::Display for MessageFormatArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageFormatArg::Lis2a => write!(f, "lis2a"),
            MessageFormatArg::Astm => write!(f, "astm"),
        }
    }
}

/// ASTM simulator/sender: replays captured messages against a running
/// server.
#[derive(Debug, Parser)]
#[command(name = "astm-sim", version, about)]
pub struct SimulatorArgs {
    /// ASTM server address
    #[arg(short, long, default_value = "127.0.0.1")]
    pub address: String,

    /// ASTM server port
    #[arg(short, long, default_value_t = crate::constants::DEFAULT_PORT)]
    pub port: u16,

    /// Captured ASTM file(s) to send
    #[arg(short, long, num_args = 1.., required = true)]
    pub infile: Vec<PathBuf>,

    /// Delay in seconds between two frames
    #[arg(short, long, default_value_t = 0.1)]
    pub delay: f64,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
