use clap::Parser;
use daqlog_core::cancel::CancelToken;
use eyre::{Result, WrapErr};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod output;
mod progress;
mod run;

use cli::{Cli, FILE_GUARD};

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();
    init_tracing(&args)?;

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        if handler_token.is_cancelled() {
            // Second Ctrl+C: the loop is not responding, bail hard.
            std::process::exit(130);
        }
        eprintln!("\nstopping...");
        handler_token.cancel();
    })
    .wrap_err("installing Ctrl+C handler")?;

    run::run(&args, cancel)
}

/// Console logging on stderr (rows and progress own stdout), optional file
/// copy, RUST_LOG wins over --log-level.
fn init_tracing(args: &Cli) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.clone()));
    let registry = tracing_subscriber::registry().with(filter);

    let file_layer = match &args.log_file {
        Some(path) => {
            let dir = match path.parent() {
                Some(d) if !d.as_os_str().is_empty() => d.to_path_buf(),
                _ => std::path::PathBuf::from("."),
            };
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "daqlog.log".to_string());
            let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, name));
            let _ = FILE_GUARD.set(guard);
            Some(fmt::layer().with_ansi(false).with_writer(writer))
        }
        None => None,
    };

    if args.json {
        registry
            .with(file_layer)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(file_layer)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }
    Ok(())
}
