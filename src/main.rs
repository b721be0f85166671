use clap::Parser;
use collect_console::cli::commands::{
    cmd_begin, cmd_discard, cmd_end, cmd_gesture, cmd_history, cmd_hit_test, cmd_input, cmd_next,
    cmd_snapshot, cmd_swipe, cmd_tap, cmd_watch,
};
use collect_console::cli::config::{Cli, Commands, load_config, log_level, resolve_config};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level(cli.verbose)));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    // Resolve settings: CLI > config > defaults
    let config = resolve_config(&cli, load_config(cli.config.as_deref()));

    match cli.command {
        Commands::Snapshot { clickable } => cmd_snapshot(&config, clickable).await?,
        Commands::HitTest { x, y } => cmd_hit_test(&config, x, y).await?,
        Commands::Tap { x, y } => cmd_tap(&config, x, y).await?,
        Commands::Swipe {
            start_x,
            start_y,
            end_x,
            end_y,
        } => cmd_swipe(&config, start_x, start_y, end_x, end_y).await?,
        Commands::Gesture {
            from,
            to,
            duration_ms,
            display,
        } => cmd_gesture(&config, &from, &to, duration_ms, &display).await?,
        Commands::Input { text } => cmd_input(&config, &text).await?,
        Commands::History => cmd_history(&config).await?,
        Commands::Begin { task } => cmd_begin(&config, task.into()).await?,
        Commands::End => cmd_end(&config).await?,
        Commands::Next { task } => cmd_next(&config, task.into()).await?,
        Commands::Discard { task } => cmd_discard(&config, task.into()).await?,
        Commands::Watch { task, seconds } => cmd_watch(&config, task.into(), seconds).await?,
    }

    Ok(())
}
