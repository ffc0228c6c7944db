//! Trade Executor Binary
//!
//! Executes one dual-leg decision against the paper account and prints the
//! result as JSON.
//!
//! # Usage
//!
//! ```bash
//! trade-executor decision.json
//! EXECUTOR_CONFIG=deploy/bot-2.yaml trade-executor decision.json
//! ```
//!
//! If the executor's bot already holds a position on the symbol, nothing is
//! submitted and the existing positions are printed instead.

use std::sync::Arc;

use anyhow::Context;
use serde_json::json;
use trade_executor::broker::PaperBroker;
use trade_executor::config::load_config;
use trade_executor::execution::ProbeRoute;
use trade_executor::observability::init_metrics;
use trade_executor::telemetry::init_tracing;
use trade_executor::{TradeDecision, TradeExecutor};

fn main() -> anyhow::Result<()> {
    load_dotenv();

    let decision_path = std::env::args()
        .nth(1)
        .context("usage: trade-executor <decision.json>")?;

    let config = load_config(None).context("failed to load configuration")?;
    init_tracing(&config.observability.logging)?;
    init_metrics(&config.observability.metrics)?;

    tracing::info!(
        bot_id = config.executor.bot_id,
        config_id = config.executor.config_id,
        balance = %config.paper.starting_balance,
        "Starting trade executor"
    );

    let contents = std::fs::read_to_string(&decision_path)
        .with_context(|| format!("failed to read decision file '{decision_path}'"))?;
    let decision: TradeDecision =
        serde_json::from_str(&contents).context("failed to parse decision JSON")?;

    let broker = Arc::new(PaperBroker::from_config(&config.paper));
    let executor = TradeExecutor::new(broker, &config)?;

    let probe = executor.probe(&decision.symbol, executor.scope())?;
    if probe.route() == ProbeRoute::Reevaluate {
        tracing::info!(
            symbol = %decision.symbol,
            positions = probe.positions.len(),
            "Position already open, skipping entry"
        );
        let output = json!({ "route": probe.route(), "positions": probe.positions });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    match executor.execute_decision(&decision) {
        Ok(result) => {
            let output = json!({ "route": ProbeRoute::Evaluate, "result": result });
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(err) => {
            if let Some(partial) = err.as_partial() {
                let output = json!({
                    "route": ProbeRoute::Evaluate,
                    "error": err.code(),
                    "market": partial.market,
                    "limit_identifier": partial.limit_identifier,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            Err(err.into())
        }
    }
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}
