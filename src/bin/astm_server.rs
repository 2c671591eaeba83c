use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use tokio::sync::mpsc;

use astm_lis::cli::ServerArgs;
use astm_lis::consumer::{self, ConsumerConfig};
use astm_lis::lims::{LimsClient, LimsConfig};
use astm_lis::server::{self, ServerConfig};

#[tokio::main]
async fn main() -> ExitCode {
    let args = ServerArgs::parse();
    init_logging(args.verbose, args.logfile.as_deref());

    if let Some(dir) = args.output.as_deref() {
        if !dir.is_dir() {
            log::error!("output directory {} does not exist", dir.display());
            return ExitCode::FAILURE;
        }
    }

    let lims = match args.url.as_deref() {
        Some(url) => match LimsConfig::parse(url, args.retries, Duration::from_secs(args.delay)) {
            Ok(config) => {
                let client = LimsClient::new(config);
                if let Err(e) = client.auth().await {
                    log::error!("failed to authenticate against LIMS at {url}: {e}");
                    return ExitCode::FAILURE;
                }
                Some(client)
            }
            Err(e) => {
                log::error!("invalid LIMS url {url}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => None,
    };

    let config = ServerConfig {
        listen: args.listen.clone(),
        port: args.port,
        message_format: args.message_format.into(),
        timeout: Duration::from_secs(astm_lis::constants::DEFAULT_TIMEOUT_SECS),
        capture_dir: args.output.clone(),
    };

    let (tx, rx) = mpsc::channel(32);
    let consumer_config = ConsumerConfig {
        consumer_name: args.consumer.clone(),
        lims,
    };

    let consumer_task = tokio::spawn(consumer::run(rx, consumer_config));

    tokio::select! {
        result = server::run(config, tx) => {
            if let Err(e) = result {
                log::error!("server error: {e}");
                return ExitCode::FAILURE;
            }
        }
        _ = tokio::signal::ctrl_c() => {
            log::info!("received interrupt, shutting down");
        }
    }

    drop(consumer_task);
    ExitCode::SUCCESS
}

fn init_logging(verbose: bool, logfile: Option<&std::path::Path>) {
    let level = if verbose { "debug" } else { "info" };
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    if let Some(path) = logfile {
        if let Ok(file) = std::fs::OpenOptions::new().create(true).append(true).open(path) {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
    }
    builder.init();
}
