use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use astm_lis::cli::SimulatorArgs;
use astm_lis::simulator::{self, split_into_lines};

#[tokio::main]
async fn main() -> ExitCode {
    let args = SimulatorArgs::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut messages = Vec::with_capacity(args.infile.len());
    for path in &args.infile {
        let bytes = match std::fs::read(path) {
            Ok(b) => b,
            Err(e) => {
                log::error!("failed to read {}: {e}", path.display());
                return ExitCode::FAILURE;
            }
        };
        messages.push(split_into_lines(&bytes));
    }

    let delay = Duration::from_secs_f64(args.delay);
    if let Err(e) = simulator::send_messages(&args.address, args.port, &messages, delay).await {
        log::error!("simulation failed: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
