//! Spoilage Sentry CLI
//!
//! Usage:
//!   spoilage_sentry                      assess every catalog route
//!   spoilage_sentry RT001 RT004          assess selected routes
//!   spoilage_sentry --manual 25 98 60 meat
//!
//! Environment: see EngineConfig (SPOILAGE_LATENCY_MS, SPOILAGE_RNG_SEED,
//! SPOILAGE_ROUTES_FILE, SPOILAGE_TELEMETRY_DIR)

use spoilage_sentry::{EngineConfig, ManualInput, SpoilageEngine};

use eyre::{bail, Result};
use tracing::{warn, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let config = EngineConfig::from_env()?;
    let engine = SpoilageEngine::from_config(&config)?;

    if args.first().map(String::as_str) == Some("--manual") {
        let [temperature, humidity, duration, food_type] = &args[1..] else {
            bail!(
                "usage: spoilage_sentry --manual <temperature> <humidity> <duration> <food_type>"
            );
        };
        let input = ManualInput::new(
            temperature.as_str(),
            humidity.as_str(),
            duration.as_str(),
            food_type.as_str(),
        );
        let assessment = engine.assess_manual(&input)?;

        println!();
        println!(
            "{} Manual reading: {} Risk ({}%)",
            assessment.risk_tier.emoji(),
            assessment.risk_tier,
            assessment.score
        );
        println!("   {}", assessment.explanation);
        for rec in &assessment.recommendations {
            println!("   • {}", rec);
        }
        return Ok(());
    }

    let route_ids = if args.is_empty() {
        engine.catalog().ids()
    } else {
        args
    };

    println!(
        "\n🧊 Assessing {} route(s) (simulated latency {}ms)...\n",
        route_ids.len(),
        engine.latency().as_millis()
    );

    let results = tokio::select! {
        results = engine.assess_many(&route_ids) => results,
        _ = tokio::signal::ctrl_c() => {
            println!("\n🛑 Interrupted, no assessments recorded.");
            return Ok(());
        }
    };

    let mut failures = 0;
    for (route_id, outcome) in results {
        match outcome {
            Ok(assessment) => {
                println!("{}", assessment.summary());
                println!("   {}", assessment.explanation);
                for rec in &assessment.recommendations {
                    println!("   • {}", rec);
                }
                println!();
            }
            Err(e) => {
                failures += 1;
                eprintln!("❌ {}: {}", route_id, e);
            }
        }
    }

    println!("{}", engine.telemetry().get_stats().summary());
    if let Err(e) = engine.telemetry().flush() {
        warn!("Failed to flush high-risk events: {}", e);
    }

    if failures > 0 {
        bail!("{} route(s) could not be assessed", failures);
    }
    Ok(())
}
