use color_eyre::Result;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

use parley::adapters::{FileCredentialsProvider, ReqwestHttpClient};
use parley::app::SelectionStore;
use parley::cli::{parse_args, run_command, version_line, CliCommand, CommandContext, USAGE};
use parley::config::ClientConfig;
use parley::error::AppError;

/// Log filter variable, e.g. `PARLEY_LOG=parley=debug`.
const LOG_ENV: &str = "PARLEY_LOG";

fn init_tracing() {
    let env_filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(env_filter);

    let _ = tracing_subscriber::registry().with(fmt_layer).try_init();
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let command = parse_args(std::env::args());
    match command {
        CliCommand::Version => {
            println!("{}", version_line());
            return Ok(());
        }
        CliCommand::Help => {
            print!("{}", USAGE);
            return Ok(());
        }
        _ => {}
    }

    let config = ClientConfig::from_env()?;
    let ctx = CommandContext {
        http: ReqwestHttpClient::with_connect_timeout(config.connect_timeout)?,
        credentials: FileCredentialsProvider::new()?,
        config,
        selection: SelectionStore::new(),
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(async {
        let mut stdout = std::io::stdout();
        run_command(command, ctx, &mut stdout).await
    });

    if let Err(report) = result {
        if let Some(err) = report.downcast_ref::<AppError>() {
            eprintln!("Error: {}", err.user_message());
            eprintln!("Hint: {}", err.category().recovery_hint());
            std::process::exit(1);
        }
        return Err(report);
    }
    Ok(())
}
