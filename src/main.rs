mod cli;

use agrispray::config::Config;
use agrispray::db::Database;
use agrispray::error::{Result, SprayError};
use agrispray::logic::{analyze, AdvisoryGenerator, SeriesFetch, SprayReport, SprayService};
use agrispray::models::{
    valid_min_window, AdvisoryOutcome, LocationRef, Preferences, PresetRegistry,
    MIN_WINDOW_HOURS_MAX, MIN_WINDOW_HOURS_MIN,
};
use agrispray::report::{presets_listing, ReportView};
use agrispray::server;
use clap::Parser;
use cli::{Cli, Commands, ReportArgs};
use serde::Serialize;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Probe point for `check` when no field is configured (Bologna)
const PROBE_POINT: (f64, f64) = (44.4949, 11.3426);

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Logs go to stderr so --json output stays clean
    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let Cli {
        command,
        config,
        data_dir,
        ..
    } = cli;

    match command.unwrap_or_else(|| Commands::Report(ReportArgs::default())) {
        Commands::Report(args) => run_report(config, data_dir, args).await,
        Commands::Presets => {
            let config = Config::load_or_default(config)?;
            print!(
                "{}",
                presets_listing(&config.preset_registry(), &AdvisoryGenerator::new())
            );
            Ok(())
        }
        Commands::Check => run_check(config).await,
        Commands::Init => {
            let (_, path) = Config::setup_interactive()?;
            println!("Config written to {}", path.display());
            Ok(())
        }
        Commands::MockAdvisor { port } => {
            let config = Config::load_or_default(config)?;
            let mut server_config = config.server;
            if let Some(port) = port {
                server_config.port = port;
            }
            server::serve(&server_config).await
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonReport<'a> {
    location: &'a LocationRef,
    preferences: &'a Preferences,
    report: &'a SprayReport,
    advisory: &'a AdvisoryOutcome,
}

async fn run_report(
    config_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    args: ReportArgs,
) -> Result<()> {
    let config = Config::load_or_default(config_path)?;
    let service = SprayService::new(config);
    let registry = service.registry().clone();

    let db = Database::open(&Config::db_path(data_dir.as_ref())?)?;
    let mut prefs = db.load_preferences(&registry)?;
    apply_overrides(&mut prefs, &args, &registry)?;
    if args.save {
        db.save_preferences(&prefs)?;
        tracing::info!("Saved preferences to {}", db.path().display());
    }

    let location = service
        .resolve_location(args.place.as_deref(), args.coordinates())
        .await?;

    let points = match service.load_series(location.lat, location.lon).await? {
        SeriesFetch::Fresh(points) | SeriesFetch::Cached(points) => points,
        SeriesFetch::Superseded => {
            return Err(SprayError::DataSourceUnavailable(
                "Forecast request was superseded".into(),
            ))
        }
    };

    let report = analyze(&points, &registry, &prefs, chrono::Local::now().naive_local());
    let request = report.advisory_request(
        &registry,
        &prefs,
        location.clone(),
        chrono::Utc::now().to_rfc3339(),
    );

    let outcome = if args.no_ai {
        AdvisoryOutcome::local(report.advice.clone())
    } else {
        service.advise(&report, &request).await
    };

    if args.json {
        let output = JsonReport {
            location: &location,
            preferences: &prefs,
            report: &report,
            advisory: &outcome,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print!("{}", ReportView::new(&report, &request, &outcome).render());
    }

    Ok(())
}

/// Apply command-line selections on top of the stored preferences.
/// Unknown preset keys and out-of-range durations are rejected.
fn apply_overrides(
    prefs: &mut Preferences,
    args: &ReportArgs,
    registry: &PresetRegistry,
) -> Result<()> {
    if let Some(crop) = &args.crop {
        if registry.crop(crop).is_none() {
            return Err(unknown_preset("crop", crop, registry.crops.keys()));
        }
        prefs.selected_crop = crop.clone();
    }

    if let Some(product) = &args.product {
        if registry.product(product).is_none() {
            return Err(unknown_preset("product", product, registry.products.keys()));
        }
        prefs.selected_product = product.clone();
    }

    if let Some(wind) = &args.wind {
        if registry.wind_sensitivity(wind).is_none() {
            return Err(unknown_preset(
                "wind sensitivity",
                wind,
                registry.wind_sensitivities.keys(),
            ));
        }
        prefs.wind_sensitivity = wind.clone();
    }

    if let Some(hours) = args.min_window {
        if !valid_min_window(hours) {
            return Err(SprayError::InvalidData(format!(
                "Minimum window must be between {} and {} hours, got {}",
                MIN_WINDOW_HOURS_MIN, MIN_WINDOW_HOURS_MAX, hours
            )));
        }
        prefs.min_window_hours = hours;
    }

    Ok(())
}

fn unknown_preset<'a>(
    kind: &str,
    key: &str,
    known: impl Iterator<Item = &'a String>,
) -> SprayError {
    let known: Vec<&str> = known.map(String::as_str).collect();
    SprayError::InvalidData(format!(
        "Unknown {} '{}' (available: {})",
        kind,
        key,
        known.join(", ")
    ))
}

async fn run_check(config_path: Option<PathBuf>) -> Result<()> {
    let config = Config::load(config_path)?;
    println!("Config: OK");
    println!("  Advisor: {:?}", config.advisor);

    let (lat, lon) = config
        .location
        .as_ref()
        .map(|l| (l.latitude, l.longitude))
        .unwrap_or(PROBE_POINT);

    let service = SprayService::new(config);
    let status = service.check_connections(lat, lon).await;

    let label = |ok: bool| if ok { "OK" } else { "OFFLINE" };
    println!("Open-Meteo: {}", label(status.weather));
    println!("Nominatim: {}", label(status.geocoding));
    println!(
        "Advisor: {}",
        if status.advisor {
            "configured"
        } else {
            "not configured (local advice only)"
        }
    );

    if !status.core_connected() {
        return Err(SprayError::DataSourceUnavailable(
            "Weather provider unreachable".into(),
        ));
    }
    Ok(())
}
