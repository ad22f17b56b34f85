//! Load Testing Tool
//!
//! Fires concurrent transactions of amount 1 at one fresh user and checks
//! the final balance.
//!
//! Run with: cargo run --bin load_test --release -- --transactions 1000

use std::time::Instant;

use ledger_service::{db, Config, LedgerError, NewTransaction, TransactionEngine};
use rust_decimal::Decimal;
use tokio::task::JoinSet;
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let count: u64 = args
        .iter()
        .position(|a| a == "--transactions")
        .and_then(|i| args.get(i + 1))
        .and_then(|s| s.parse().ok())
        .unwrap_or(1000);

    let config = Config::from_env()?;

    println!("Load Test - Applying {} concurrent transactions", count);
    println!("Connecting to database...");

    let pool = db::connect(&config).await?;
    db::run_migrations(&pool).await?;

    let engine = TransactionEngine::new(pool, config.engine_config());
    let user = engine.create_user(Uuid::new_v4()).await?;

    let start = Instant::now();
    let mut tasks = JoinSet::new();

    for _ in 0..count {
        let engine = engine.clone();
        let input = NewTransaction::new(user.id, Decimal::ONE, Uuid::new_v4());
        tasks.spawn(async move { engine.apply_transaction(input).await });
    }

    let mut success_count = 0u64;
    let mut failures: Vec<LedgerError> = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined? {
            Ok(_) => success_count += 1,
            Err(e) => failures.push(e),
        }
    }

    let elapsed = start.elapsed();
    let rate = success_count as f64 / elapsed.as_secs_f64();
    let balance = engine.get_balance(user.id).await?;

    println!("\n=== Load Test Results ===");
    println!("User: {}", user.id);
    println!("Total transactions: {}", count);
    println!("Successful: {}", success_count);
    println!("Failed: {}", failures.len());
    if let Some(first) = failures.first() {
        println!("First failure: {}", first);
    }
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Rate: {:.0} transactions/sec", rate);
    println!(
        "Final balance: {} (expected {}) {}",
        balance,
        success_count,
        if balance == Decimal::from(success_count) { "OK" } else { "MISMATCH" }
    );

    Ok(())
}
