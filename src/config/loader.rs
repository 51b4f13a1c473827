//! Configuration Loader
//!
//! Loads and validates configuration from TOML files. Secrets (webhook
//! shared secret, fee API key) and deployment overrides (RPC URL, keypair
//! path) come from the environment, never from the file.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::application::engine::EngineSettings;
use crate::domain::circuit_breaker::CircuitBreaker;
use crate::domain::planner::AllocationConfig;
use crate::domain::risk::RiskParameters;
use crate::domain::sol_to_lamports;

/// Main configuration structure matching config.toml
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub engine: EngineSection,
    pub allocation: AllocationConfig,
    pub risk: RiskSection,
    pub circuit_breaker: CircuitBreakerSection,
    pub scheduler: SchedulerSection,
    pub fee_source: FeeSourceSection,
    pub dex: DexSection,
    pub solana: SolanaSection,
    #[serde(default)]
    pub webhook: WebhookSection,
    #[serde(default)]
    pub reporting: ReportingSection,
    #[serde(default)]
    pub logging: LoggingSection,
}

/// Engine configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct EngineSection {
    /// Mint address of the protocol token bought back and burned
    pub token_mint: String,
    /// Plan and validate without touching any provider
    pub dry_run: bool,
}

/// Risk limit section, SOL-denominated where human-facing
#[derive(Debug, Clone, Deserialize)]
pub struct RiskSection {
    /// Hard cap on SOL allocated per epoch
    pub max_budget_per_epoch_sol: f64,
    /// Minimum seconds between two successful epochs
    pub min_interval_seconds: u64,
    /// Maximum swap slippage in basis points
    pub max_slippage_bps: u32,
    /// Maximum swap price impact in basis points
    pub max_price_impact_bps: u32,
    /// Minimum pool liquidity in SOL for a liquidity add to be sane
    pub min_liquidity_threshold_sol: f64,
}

/// Circuit breaker section
#[derive(Debug, Clone, Deserialize)]
pub struct CircuitBreakerSection {
    /// Consecutive failures before the breaker trips
    pub failure_threshold: u32,
    /// Seconds the breaker stays open before allowing a trial
    pub timeout_seconds: u64,
}

/// Scheduler section
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerSection {
    /// Seconds between epoch attempts; sub-minute intervals are supported
    pub interval_seconds: u64,
}

/// Fee source selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeeSourceKind {
    /// Synthetic generator (development)
    Mock,
    /// In-memory queue fed by the webhook ingress
    Webhook,
    /// Cursor-based HTTP polling
    Api,
    /// Collector-wallet balance watcher
    Wallet,
}

/// Fee source section
#[derive(Debug, Clone, Deserialize)]
pub struct FeeSourceSection {
    pub kind: FeeSourceKind,
    /// Fee API endpoint; required when kind = "api"
    #[serde(default)]
    pub api_url: Option<String>,
    /// Collector wallet address; required when kind = "wallet"
    #[serde(default)]
    pub collector_wallet: Option<String>,
    /// Base lamports per generated mock fee
    #[serde(default = "default_mock_base_amount")]
    pub mock_base_amount_lamports: u64,
}

fn default_mock_base_amount() -> u64 {
    100_000_000 // 0.1 SOL
}

impl FeeSourceSection {
    /// Fee API key from the environment, when set
    pub fn api_key(&self) -> Option<String> {
        std::env::var("FEE_API_KEY").ok()
    }
}

/// DEX provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DexProviderKind {
    /// Deterministic simulated fills; real AMM adapters plug in externally
    Mock,
}

/// DEX section
#[derive(Debug, Clone, Deserialize)]
pub struct DexSection {
    pub provider: DexProviderKind,
    /// Slippage bound handed to the swap provider, in basis points
    pub swap_slippage_bps: u32,
}

/// Solana RPC section
#[derive(Debug, Clone, Deserialize)]
pub struct SolanaSection {
    /// RPC endpoint (use a private RPC for production)
    pub rpc_url: String,
    /// Operator keypair path (never commit this file)
    pub keypair_path: String,
}

impl SolanaSection {
    /// RPC URL with `SOLANA_RPC_URL` environment override
    pub fn rpc_url(&self) -> String {
        std::env::var("SOLANA_RPC_URL").unwrap_or_else(|_| self.rpc_url.clone())
    }

    /// Keypair path with `SOLANA_KEYPAIR_PATH` environment override
    pub fn keypair_path(&self) -> String {
        std::env::var("SOLANA_KEYPAIR_PATH").unwrap_or_else(|_| self.keypair_path.clone())
    }
}

/// Webhook ingress section
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookSection {
    /// Port the ingress listens on
    pub port: u16,
}

impl Default for WebhookSection {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

impl WebhookSection {
    /// Shared secret from the `WEBHOOK_SECRET` environment variable
    pub fn secret(&self) -> Option<String> {
        std::env::var("WEBHOOK_SECRET").ok().filter(|s| !s.is_empty())
    }
}

/// Report output section
#[derive(Debug, Clone, Deserialize)]
pub struct ReportingSection {
    pub reports_dir: String,
}

impl Default for ReportingSection {
    fn default() -> Self {
        Self {
            reports_dir: "./reports".to_string(),
        }
    }
}

/// Logging section
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("validation failed: {0}")]
    Validation(String),
}

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.allocation
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))?;

        if self.engine.token_mint.is_empty() {
            return Err(ConfigError::Validation(
                "engine.token_mint must not be empty".to_string(),
            ));
        }

        if self.risk.max_budget_per_epoch_sol <= 0.0 {
            return Err(ConfigError::Validation(format!(
                "risk.max_budget_per_epoch_sol must be > 0, got {}",
                self.risk.max_budget_per_epoch_sol
            )));
        }

        if self.risk.min_liquidity_threshold_sol < 0.0 {
            return Err(ConfigError::Validation(format!(
                "risk.min_liquidity_threshold_sol must be >= 0, got {}",
                self.risk.min_liquidity_threshold_sol
            )));
        }

        for (name, bps) in [
            ("risk.max_slippage_bps", self.risk.max_slippage_bps),
            ("risk.max_price_impact_bps", self.risk.max_price_impact_bps),
            ("dex.swap_slippage_bps", self.dex.swap_slippage_bps),
        ] {
            if bps == 0 || bps > 10_000 {
                return Err(ConfigError::Validation(format!(
                    "{name} must be in 1..=10000, got {bps}"
                )));
            }
        }

        if self.circuit_breaker.failure_threshold == 0 {
            return Err(ConfigError::Validation(
                "circuit_breaker.failure_threshold must be >= 1".to_string(),
            ));
        }

        if self.circuit_breaker.timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "circuit_breaker.timeout_seconds must be >= 1".to_string(),
            ));
        }

        if self.scheduler.interval_seconds == 0 {
            return Err(ConfigError::Validation(
                "scheduler.interval_seconds must be >= 1".to_string(),
            ));
        }

        match self.fee_source.kind {
            FeeSourceKind::Api if self.fee_source.api_url.is_none() => {
                return Err(ConfigError::Validation(
                    "fee_source.api_url required when fee_source.kind = \"api\"".to_string(),
                ));
            }
            FeeSourceKind::Wallet if self.fee_source.collector_wallet.is_none() => {
                return Err(ConfigError::Validation(
                    "fee_source.collector_wallet required when fee_source.kind = \"wallet\""
                        .to_string(),
                ));
            }
            _ => {}
        }

        Ok(())
    }

    /// Domain risk parameters, lamport-denominated
    pub fn risk_parameters(&self) -> RiskParameters {
        RiskParameters {
            max_budget_per_epoch_lamports: sol_to_lamports(self.risk.max_budget_per_epoch_sol),
            min_interval_seconds: self.risk.min_interval_seconds,
            max_slippage_bps: self.risk.max_slippage_bps,
            max_price_impact_bps: self.risk.max_price_impact_bps,
            min_liquidity_threshold_lamports: sol_to_lamports(
                self.risk.min_liquidity_threshold_sol,
            ),
        }
    }

    /// Fresh circuit breaker built from the configured thresholds
    pub fn circuit_breaker(&self) -> CircuitBreaker {
        CircuitBreaker::new(
            self.circuit_breaker.failure_threshold,
            self.circuit_breaker.timeout_seconds,
        )
    }

    /// Engine settings; `dry_run_override` forces dry-run from the CLI
    pub fn engine_settings(&self, dry_run_override: bool) -> EngineSettings {
        EngineSettings {
            token_mint: self.engine.token_mint.clone(),
            allocation: self.allocation.clone(),
            swap_slippage_bps: self.dex.swap_slippage_bps,
            dry_run: self.engine.dry_run || dry_run_override,
        }
    }
}
