use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use topdown_core::error::SkillError;
use topdown_core::ingest::dark_sky::DarkSkyClient;
use topdown_core::location::device::FixedPostalCode;
use topdown_core::location::zip::ZipTable;
use topdown_core::location::Coordinates;
use topdown_core::skill::handler::{answer_for_coordinates, SkillHandler};

#[derive(Debug, Parser)]
#[command(name = "topdown", about = "Should I take my top down?")]
struct Args {
    /// Zip code to look up. Defaults to FIXED_POSTAL_CODE.
    #[arg(long, conflicts_with_all = ["lat", "forecast_file"])]
    zip: Option<String>,

    /// Latitude; skips the zip table.
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude; skips the zip table.
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lng: Option<f64>,

    /// Classify a saved forecast JSON document instead of fetching one.
    #[arg(long, conflicts_with = "lat")]
    forecast_file: Option<PathBuf>,

    /// Reference instant (RFC 3339). Defaults to the current time.
    #[arg(long)]
    now: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = topdown_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    let now = resolve_now(args.now.as_deref())?;

    if let Some(path) = &args.forecast_file {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let raw: serde_json::Value = serde_json::from_str(&text)
            .with_context(|| format!("{} is not valid JSON", path.display()))?;
        let result =
            topdown_core::engine::classify_and_respond_json(now, &raw).map_err(SkillError::from);
        return speak(result);
    }

    let forecasts = DarkSkyClient::from_settings(&settings)?;

    let result = match (args.lat, args.lng) {
        (Some(latitude), Some(longitude)) => {
            let coordinates = Coordinates {
                latitude,
                longitude,
            };
            answer_for_coordinates(&forecasts, coordinates, now).await
        }
        _ => {
            let zip = args
                .zip
                .or_else(|| settings.fixed_postal_code.clone())
                .context("pass --zip, --lat/--lng, or --forecast-file")?;
            let locations = ZipTable::load(settings.zip_table_path())?;
            let handler = SkillHandler::new(
                Arc::new(FixedPostalCode(zip.clone())),
                Arc::new(locations),
                Arc::new(forecasts),
            );
            handler.answer_for_postal_code(&zip, now).await
        }
    };

    speak(result)
}

fn speak(result: Result<String, SkillError>) -> anyhow::Result<()> {
    match result {
        Ok(utterance) => {
            println!("{utterance}");
            Ok(())
        }
        Err(err) => {
            println!("{}", err.apology());
            let err = anyhow::Error::new(err);
            sentry_anyhow::capture_anyhow(&err);
            Err(err)
        }
    }
}

fn resolve_now(now_arg: Option<&str>) -> anyhow::Result<DateTime<Utc>> {
    match now_arg {
        Some(s) => Ok(DateTime::parse_from_rfc3339(s)
            .with_context(|| format!("--now must be RFC 3339 (got {s})"))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

fn init_sentry(settings: &topdown_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
