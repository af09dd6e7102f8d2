use anyhow::Context;
use clap::Parser;
use trickle::cli::Cli;
use trickle::demo;
use trickle::logging::init_logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.logging_config())?;

    tracing::info!(api_base = %cli.api_base, model = %cli.model, interval = ?cli.flush_interval, output = ?cli.output, "starting");

    let replies = demo::run(cli.provider(), &cli.demo_config(), || cli.output.sink())
        .await
        .with_context(|| format!("chat against {} failed", cli.api_base))?;

    tracing::info!(generations = replies.len(), "done");
    Ok(())
}
