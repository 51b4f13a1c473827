//! Flywheel - Creator-Fee Buyback Engine for Solana
//!
//! Harvests accumulated creator fees on a fixed epoch cadence, buys back the
//! protocol token, burns a share, and deepens liquidity.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use flywheel::adapters::cli::{CliApp, Command, EpochCmd, RunCmd, StatusCmd};
use flywheel::adapters::dex::{MockLiquidityProvider, MockSwapProvider, MockTokenBurner};
use flywheel::adapters::fee_source::{
    ApiFeeSource, MockFeeSource, QueueFeeSource, WalletWatcherFeeSource,
};
use flywheel::adapters::report::FileReportSink;
use flywheel::adapters::solana::{SolanaClient, SplTokenBurner, WalletManager};
use flywheel::adapters::webhook::{self, WebhookSettings};
use flywheel::application::{EpochOutcome, EpochScheduler, ExecutionEngine};
use flywheel::config::{load_config, Config, DexProviderKind, FeeSourceKind};
use flywheel::domain::format_sol;
use flywheel::domain::risk::RiskManager;
use flywheel::ports::dex::{LiquidityProvider, SwapProvider};
use flywheel::ports::fee_source::FeeSource;

#[tokio::main]
async fn main() -> Result<()> {
    // Secrets come from the environment; .env is a convenience in dev
    dotenvy::dotenv().ok();

    let app = CliApp::parse();
    match app.command {
        Command::Run(cmd) => run_command(cmd, app.verbose, app.debug).await,
        Command::Epoch(cmd) => epoch_command(cmd, app.verbose, app.debug).await,
        Command::Status(cmd) => status_command(cmd, app.verbose, app.debug).await,
    }
}

fn init_logging(verbose: bool, debug: bool, config_level: &str) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_level))
    };

    fmt().with_env_filter(filter).init();
}

/// Everything the commands need, wired per configuration
struct Assembled {
    engine: Arc<ExecutionEngine>,
    fee_source: Arc<dyn FeeSource>,
    swap: Arc<dyn SwapProvider>,
    liquidity: Arc<dyn LiquidityProvider>,
    /// Present when the webhook ingress should run
    webhook_queue: Option<QueueFeeSource>,
}

async fn assemble(config: &Config, dry_run_override: bool) -> Result<Assembled> {
    let rpc = SolanaClient::new(config.solana.rpc_url());
    let settings = config.engine_settings(dry_run_override);

    // Fee source variant is explicit configuration, never runtime detection
    let mut webhook_queue = None;
    let fee_source: Arc<dyn FeeSource> = match config.fee_source.kind {
        FeeSourceKind::Mock => {
            tracing::info!("using MockFeeSource (synthetic fees)");
            Arc::new(MockFeeSource::generating(
                config.fee_source.mock_base_amount_lamports,
            ))
        }
        FeeSourceKind::Webhook => {
            tracing::info!("using QueueFeeSource (webhook ingress)");
            let queue = QueueFeeSource::new();
            webhook_queue = Some(queue.clone());
            Arc::new(queue)
        }
        FeeSourceKind::Api => {
            let api_url = config
                .fee_source
                .api_url
                .clone()
                .context("fee_source.api_url missing")?;
            tracing::info!(%api_url, "using ApiFeeSource");
            Arc::new(ApiFeeSource::new(api_url, config.fee_source.api_key()))
        }
        FeeSourceKind::Wallet => {
            let collector = config
                .fee_source
                .collector_wallet
                .clone()
                .context("fee_source.collector_wallet missing")?;
            tracing::info!(%collector, "using WalletWatcherFeeSource");
            Arc::new(WalletWatcherFeeSource::new(rpc.clone(), collector))
        }
    };
    fee_source.initialize().await?;

    let (swap, liquidity): (Arc<dyn SwapProvider>, Arc<dyn LiquidityProvider>) =
        match config.dex.provider {
            DexProviderKind::Mock => {
                tracing::info!("using mock DEX provider");
                (
                    Arc::new(MockSwapProvider::new()),
                    Arc::new(MockLiquidityProvider::new()),
                )
            }
        };
    swap.initialize().await?;
    liquidity.initialize().await?;

    // Live runs burn through the operator wallet; dry runs never call the
    // burner, so a mock stands in and no key material is loaded
    let burner: Arc<dyn flywheel::ports::burner::TokenBurner> = if settings.dry_run {
        Arc::new(MockTokenBurner::new())
    } else {
        let wallet = load_operator_wallet(config)?;
        tracing::info!(operator = %wallet.public_key(), "operator wallet loaded");
        Arc::new(SplTokenBurner::new(rpc.clone(), wallet))
    };

    let report_sink = Arc::new(FileReportSink::new(&config.reporting.reports_dir));

    let engine = Arc::new(ExecutionEngine::new(
        fee_source.clone(),
        swap.clone(),
        liquidity.clone(),
        burner,
        report_sink,
        RiskManager::new(config.risk_parameters()),
        config.circuit_breaker(),
        settings,
    ));

    Ok(Assembled {
        engine,
        fee_source,
        swap,
        liquidity,
        webhook_queue,
    })
}

/// Operator keypair from `OPERATOR_SECRET_KEY` (base58) or the configured
/// keypair file
fn load_operator_wallet(config: &Config) -> Result<WalletManager> {
    if let Ok(secret) = std::env::var("OPERATOR_SECRET_KEY") {
        return WalletManager::from_base58(&secret)
            .context("OPERATOR_SECRET_KEY is not a valid base58 keypair");
    }

    let keypair_path = shellexpand::tilde(&config.solana.keypair_path()).to_string();
    WalletManager::from_file(&keypair_path).with_context(|| {
        format!(
            "failed to load operator keypair from '{keypair_path}'; \
             create one with: solana-keygen new --outfile {keypair_path}"
        )
    })
}

async fn run_command(cmd: RunCmd, verbose: bool, debug: bool) -> Result<()> {
    let config = load_config(&cmd.config).context("failed to load configuration")?;
    init_logging(verbose, debug, &config.logging.level);

    tracing::info!("flywheel engine starting");
    let assembled = assemble(&config, cmd.dry_run).await?;

    if config.engine.dry_run || cmd.dry_run {
        tracing::warn!("DRY RUN MODE - no transactions will be executed");
    }

    // Webhook ingress feeds the queue fee source in its own task
    if let Some(queue) = assembled.webhook_queue.clone() {
        let settings = WebhookSettings {
            port: config.webhook.port,
            secret: config.webhook.secret(),
        };
        tokio::spawn(async move {
            if let Err(err) = webhook::serve(settings, queue).await {
                tracing::error!(error = %err, "webhook ingress failed");
            }
        });
    }

    let scheduler = EpochScheduler::new(
        assembled.engine.clone(),
        config.scheduler.interval_seconds,
    );
    scheduler.start();
    tracing::info!("flywheel engine started");

    tokio::signal::ctrl_c()
        .await
        .context("failed to listen for shutdown signal")?;
    tracing::info!("shutdown signal received");

    scheduler.stop();
    assembled.fee_source.shutdown().await.ok();
    assembled.swap.shutdown().await.ok();
    assembled.liquidity.shutdown().await.ok();
    tracing::info!("shutdown complete");
    Ok(())
}

async fn epoch_command(cmd: EpochCmd, verbose: bool, debug: bool) -> Result<()> {
    let config = load_config(&cmd.config).context("failed to load configuration")?;
    init_logging(verbose, debug, &config.logging.level);

    let assembled = assemble(&config, cmd.dry_run).await?;
    let outcome = assembled.engine.run_epoch(1).await?;

    match outcome {
        EpochOutcome::Completed(report) => {
            println!("{}", report.summary);
        }
        EpochOutcome::Skipped(reason) => {
            println!("epoch skipped: {reason}");
        }
    }

    assembled.fee_source.shutdown().await.ok();
    assembled.swap.shutdown().await.ok();
    assembled.liquidity.shutdown().await.ok();
    Ok(())
}

async fn status_command(cmd: StatusCmd, verbose: bool, debug: bool) -> Result<()> {
    let config = load_config(&cmd.config).context("failed to load configuration")?;
    init_logging(verbose, debug, &config.logging.level);

    let wallet = load_operator_wallet(&config)?;
    let rpc = SolanaClient::new(config.solana.rpc_url());
    let balance = rpc
        .get_balance(&wallet.public_key())
        .await
        .context("failed to fetch operator balance")?;

    println!("Operator: {}", wallet.public_key());
    println!("Balance: {} lamports ({} SOL)", balance, format_sol(balance));
    println!("Token mint: {}", config.engine.token_mint);
    println!("Dry run: {}", config.engine.dry_run);
    Ok(())
}
