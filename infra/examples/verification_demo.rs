//! Walks through the verification code lifecycle with in-memory stores
//!
//! Run with: cargo run -p dt_infra --example verification_demo

use std::sync::Arc;

use anyhow::Context;
use dt_core::{
    CodePurpose, InMemoryFallbackStore, InMemoryRateLimiter, InMemoryVerificationCodeRepository, Notifier,
    VerificationService,
};
use dt_infra::config::load_app_config;
use dt_infra::notify::{LogNotifier, RetryingNotifier};
use dt_infra::telemetry::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = load_app_config().context("loading configuration")?;
    init_tracing(&config.logging).context("installing tracing subscriber")?;

    let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier::new());
    let service = VerificationService::new(
        Arc::new(InMemoryVerificationCodeRepository::new()),
        Arc::new(InMemoryFallbackStore::new()),
        Arc::new(InMemoryRateLimiter::from_config(&config.verification)),
        Arc::new(RetryingNotifier::new(notifier)),
        config.verification.clone(),
    );

    let identity = "demo.user@example.com";
    let issued = service.issue_verification_code(identity).await?;
    println!("Issued verification code: delivered={} expires_at={}", issued.delivered, issued.expires_at);

    let wrong = service
        .verify_code(identity, "000000", CodePurpose::EmailVerification)
        .await?;
    println!("Wrong code accepted: {}", wrong);

    let report = service.cleanup_expired().await;
    println!(
        "Cleanup removed {} entries ({} errors)",
        report.total_cleaned(),
        report.errors.len()
    );

    for attempt in 1..=config.verification.rate_limit_count + 1 {
        match service.issue_password_reset_code(identity).await {
            Ok(result) => println!("Reset request {}: delivered={}", attempt, result.delivered),
            Err(e) => println!("Reset request {}: {} (status {})", attempt, e, e.status_code()),
        }
    }

    Ok(())
}
