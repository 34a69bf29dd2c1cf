// src/main.rs
use clap::Parser;
use hashvault_bot::publisher::{ErrorReporting, MissingMessagePolicy};
use hashvault_bot::{self, *};
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Main entry point for the stats bot
///
/// # Flow
/// 1. Parses command line arguments
/// 2. Delegates to appropriate subcommand handler
/// 3. Propagates any errors upward
fn main() -> Result<(), BotError> {
    let cli = cli::Commands::parse();

    match cli.action {
        cli::Action::Start(opts) => start_bot(opts),
        cli::Action::Config(opts) => generate_config(opts),
    }
}

/// Runs the bot until Ctrl-C
///
/// # Operations
/// 1. Initializes logging
/// 2. Loads and validates configuration (fatal if incomplete)
/// 3. Starts the liveness endpoint if enabled
/// 4. Logs in and runs the publishing loop
fn start_bot(opts: cli::StartOptions) -> Result<(), BotError> {
    utils::init_logging(opts.verbose);

    let mut config = config::load(opts.config.as_deref())?;
    // Apply CLI overrides
    if let Some(interval) = opts.interval {
        config.poll_interval_secs = interval;
    }
    if opts.report_errors {
        config.report_errors = true;
    }
    if opts.no_health {
        config.health_enabled = false;
    }
    config.validate()?;
    log::debug!("Loaded {:?}", config);

    let source = Arc::new(StatsClient::new(
        &config.api_base_url,
        &config.wallet_address,
    )?);
    log::info!("Polling {}", source.endpoint());

    let discord = Arc::new(DiscordClient::new(
        &config.discord_api_url,
        config.token.clone(),
    )?);
    let sink = MessageSink::new(discord, config.channel_id.clone());

    let mut scheduler = Scheduler::new(
        source,
        sink,
        Renderer::new(config.show_last_share),
        config.poll_interval(),
    )
    .with_error_reporting(if config.report_errors {
        ErrorReporting::NotifyChannel
    } else {
        ErrorReporting::LogOnly
    })
    .with_missing_message_policy(if config.recreate_missing_message {
        MissingMessagePolicy::Recreate
    } else {
        MissingMessagePolicy::Report
    });

    let rt = Runtime::new()?;
    rt.block_on(async {
        let mut health = if config.health_enabled {
            Some(network::health::spawn(
                network::health::bind(config.port).await?,
            ))
        } else {
            None
        };

        let run = scheduler.run(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                log::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        });
        tokio::pin!(run);

        let result = tokio::select! {
            result = &mut run => result,
            _ = network::health::supervise(health.as_mut()) => {
                // Publishing carries on without the liveness endpoint
                run.await
            }
        };

        if let Some(health) = health {
            health.abort();
        }
        result
    })
}

/// Writes a configuration template to the requested path
fn generate_config(opts: cli::ConfigOptions) -> Result<(), BotError> {
    let template = config::generate_template();
    std::fs::write(&opts.output, template)?;
    println!("Wrote {}", opts.output.display());
    Ok(())
}
