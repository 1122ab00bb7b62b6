use clap::Parser;

use ollama_stream_client::OllamaClient;
use ollama_stream_client::logging::LogConfig;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cfg = cli::Config::parse();

    setup_logging(&cfg.log_level)?;

    let debug_enabled =
        cfg.log_level.eq_ignore_ascii_case("debug") || cfg.log_level.eq_ignore_ascii_case("trace");
    LogConfig::init(debug_enabled);

    let mut client = OllamaClient::from_config(cfg.client_config()?)?;
    client.options(cfg.payload_options()?);
    if cfg.stream {
        client.callback(cli::StreamPrinter::new(cfg.raw));
    }

    let cancellation_token = client.cancellation_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("interrupt received, cancelling request");
            cancellation_token.cancel();
        }
    });

    let value = cli::run(&mut client, &cfg.command).await?;

    if let Some(stats) = client.last_stream() {
        log::debug!(
            "stream finished: {} events, {} skipped, {} bytes",
            stats.events,
            stats.skipped,
            stats.bytes_received
        );
    } else {
        println!("{}", serde_json::to_string_pretty(&value)?);
    }

    Ok(())
}

fn setup_logging(log_level: &str) -> Result<(), Box<dyn std::error::Error>> {
    let level = log_level
        .to_lowercase()
        .parse::<log::LevelFilter>()
        .unwrap_or(log::LevelFilter::Warn);

    fern::Dispatch::new()
        .format(|out, message, record| {
            let level_str = match record.level() {
                log::Level::Error => "\x1b[1;31merror:\x1b[0m",
                log::Level::Warn => "\x1b[1;33mwarn:\x1b[0m",
                log::Level::Info => "\x1b[1;32minfo:\x1b[0m",
                log::Level::Debug => "\x1b[1;34mdebug:\x1b[0m",
                log::Level::Trace => "\x1b[1;35mtrace:\x1b[0m",
            };
            out.finish(format_args!("{} {}", level_str, message))
        })
        .level(level)
        .level_for("reqwest", log::LevelFilter::Warn)
        .level_for("hyper_util", log::LevelFilter::Warn)
        .chain(std::io::stderr())
        .apply()?;

    Ok(())
}
