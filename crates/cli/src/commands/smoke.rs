use std::sync::Arc;
use std::time::Instant;

use pricebook_client::{HttpCatalogBackend, InMemoryCatalogBackend};
use pricebook_core::config::{AppConfig, LoadOptions};
use pricebook_core::{CatalogBackend, FilterSpec, Session, SharedSession};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::{CommandResult, EXIT_CONFIG, EXIT_TRANSPORT};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum SmokeStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
struct SmokeCheck {
    name: &'static str,
    status: SmokeStatus,
    elapsed_ms: u64,
    message: String,
}

#[derive(Debug, Serialize)]
struct SmokeReport {
    command: &'static str,
    status: SmokeStatus,
    summary: String,
    total_elapsed_ms: u64,
    checks: Vec<SmokeCheck>,
}

impl SmokeCheck {
    fn timed(name: &'static str, elapsed_ms: u64, outcome: Result<String, String>) -> Self {
        let (status, message) = match outcome {
            Ok(message) => (SmokeStatus::Pass, message),
            Err(message) => (SmokeStatus::Fail, message),
        };
        Self { name, status, elapsed_ms, message }
    }
}

pub fn run(options: &LoadOptions) -> CommandResult {
    let started = Instant::now();
    let mut checks = Vec::new();

    let config = match timed_check(|| AppConfig::load(options.clone())) {
        Ok((elapsed_ms, config)) => {
            checks.push(SmokeCheck::timed(
                "config_validation",
                elapsed_ms,
                Ok("configuration loaded and validated".to_string()),
            ));
            config
        }
        Err((elapsed_ms, error)) => {
            checks.push(SmokeCheck::timed("config_validation", elapsed_ms, Err(error.to_string())));
            checks.push(skipped("backend_reachability"));
            checks.push(skipped("catalog_scenario"));
            return finalize_report(checks, started.elapsed().as_millis() as u64, EXIT_CONFIG);
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            checks.push(SmokeCheck::timed(
                "backend_reachability",
                0,
                Err(format!("failed to initialize async runtime: {error}")),
            ));
            checks.push(skipped("catalog_scenario"));
            return finalize_report(checks, started.elapsed().as_millis() as u64, EXIT_TRANSPORT);
        }
    };

    let backend_started = Instant::now();
    let reachability = runtime.block_on(check_backend(&config));
    checks.push(SmokeCheck::timed(
        "backend_reachability",
        backend_started.elapsed().as_millis() as u64,
        reachability,
    ));

    let scenario_started = Instant::now();
    let scenario = runtime.block_on(check_catalog_scenario());
    checks.push(SmokeCheck::timed(
        "catalog_scenario",
        scenario_started.elapsed().as_millis() as u64,
        scenario,
    ));

    finalize_report(checks, started.elapsed().as_millis() as u64, EXIT_TRANSPORT)
}

async fn check_backend(config: &AppConfig) -> Result<String, String> {
    let backend =
        HttpCatalogBackend::from_config(&config.backend).map_err(|error| error.to_string())?;
    let products = backend.fetch_products().await.map_err(|error| error.to_string())?;
    let prices = backend.fetch_prices().await.map_err(|error| error.to_string())?;
    Ok(format!(
        "`{}` answered with {} product(s) and {} price(s)",
        backend.base_url(),
        products.len(),
        prices.len()
    ))
}

/// Register, price, project, and delete against an in-memory catalog.
async fn check_catalog_scenario() -> Result<String, String> {
    let session = SharedSession::new(Session::new(Arc::new(InMemoryCatalogBackend::default())));
    session.load().await.map_err(|error| error.to_string())?;

    let product = session
        .submit_product("Milk", "Acme", "1.0", true)
        .await
        .map_err(|error| error.to_string())?;
    let price = session
        .submit_price(&product.id, "Atacadão", "4,99")
        .await
        .map_err(|error| error.to_string())?;
    if price.price != Decimal::new(499, 2) || price.market != "Atacadão" {
        return Err(format!("unexpected price record: {} at `{}`", price.price, price.market));
    }

    {
        let mut guard = session.lock().await;
        guard.price_filter = FilterSpec::new("milk", "ATACADÃO");
        let visible = guard.visible_prices().len();
        if visible != 1 {
            return Err(format!("expected one projected price, found {visible}"));
        }
    }

    session.delete_product(&product.id).await.map_err(|error| error.to_string())?;
    let remaining = session.lock().await.store().products().len();
    if remaining != 0 {
        return Err(format!("expected an empty catalog after delete, found {remaining}"));
    }

    Ok("register, price, project, and delete round trip succeeded".to_string())
}

fn timed_check<T, E>(check: impl FnOnce() -> Result<T, E>) -> Result<(u64, T), (u64, E)> {
    let started = Instant::now();
    match check() {
        Ok(value) => Ok((started.elapsed().as_millis() as u64, value)),
        Err(error) => Err((started.elapsed().as_millis() as u64, error)),
    }
}

fn skipped(name: &'static str) -> SmokeCheck {
    SmokeCheck {
        name,
        status: SmokeStatus::Skipped,
        elapsed_ms: 0,
        message: "skipped due previous failure".to_string(),
    }
}

fn finalize_report(
    checks: Vec<SmokeCheck>,
    total_elapsed_ms: u64,
    failure_code: u8,
) -> CommandResult {
    let passed = checks.iter().filter(|check| check.status == SmokeStatus::Pass).count();
    let total = checks.len();
    let failed = checks.iter().any(|check| check.status == SmokeStatus::Fail);

    let report = SmokeReport {
        command: "smoke",
        status: if failed { SmokeStatus::Fail } else { SmokeStatus::Pass },
        summary: format!("smoke: {passed}/{total} checks passed in {total_elapsed_ms}ms"),
        total_elapsed_ms,
        checks,
    };

    let human = report.summary.clone();
    let machine = serde_json::to_string(&report).unwrap_or_else(|error| {
        format!(
            "{{\"command\":\"smoke\",\"status\":\"fail\",\"summary\":\"serialization failed\",\"error\":\"{}\"}}",
            error.to_string().replace('\\', "\\\\").replace('"', "\\\"")
        )
    });

    CommandResult {
        exit_code: if failed { failure_code } else { 0 },
        output: format!("{human}\n{machine}"),
    }
}
