//! Search the remote property collection and print matching listings as JSON lines.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io::{self, Write};
use std::sync::Arc;

use clap::Parser;
use discovery::config::DiscoverySettings;
use discovery::domain::slug::property_slug;
use discovery::domain::{FetchCoordinator, FetchResult, FilterPatch, FilterStore, NumericRange};
use discovery::outbound::postgrest::{PostgrestClient, PostgrestPropertyCollection};
use ortho_config::OrthoConfig;
use serde_json::json;
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

/// `search-listings` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "search-listings",
    about = "Query listings with the discovery filters and print them as JSON lines",
    version
)]
struct CliArgs {
    /// Substring matched anywhere in the location.
    #[arg(long, value_name = "text")]
    location: Option<String>,
    /// City matched at the start of the location or after a comma.
    #[arg(long, value_name = "name")]
    city: Option<String>,
    /// Price range as `min,max`.
    #[arg(long, value_name = "min,max", value_parser = parse_range)]
    price: Option<NumericRange>,
    /// Bedroom range as `min,max`.
    #[arg(long, value_name = "min,max", value_parser = parse_range)]
    bedrooms: Option<NumericRange>,
    /// Bathroom range as `min,max`.
    #[arg(long, value_name = "min,max", value_parser = parse_range)]
    bathrooms: Option<NumericRange>,
    /// Square footage range as `min,max`.
    #[arg(long = "square-feet", value_name = "min,max", value_parser = parse_range)]
    square_feet: Option<NumericRange>,
    /// Required home type.
    #[arg(long = "home-type", value_name = "type")]
    home_type: Option<String>,
    /// Required construction status.
    #[arg(long = "construction-status", value_name = "status")]
    construction_status: Option<String>,
    /// Required ownership type.
    #[arg(long = "ownership-type", value_name = "type")]
    ownership_type: Option<String>,
    /// Only homes available for quick move-in.
    #[arg(long = "quick-move-in")]
    quick_move_in: bool,
}

impl CliArgs {
    fn into_patch(self) -> FilterPatch {
        FilterPatch {
            location: self.location,
            city: self.city,
            price: self.price,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            square_feet: self.square_feet,
            home_type: self.home_type.map(Some),
            construction_status: self.construction_status.map(Some),
            ownership_type: self.ownership_type.map(Some),
            quick_move_in: self.quick_move_in.then_some(true),
        }
    }
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = DiscoverySettings::load_from_iter([OsString::from("search-listings")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    init_tracing(settings.json_logs);

    let store_url = settings.store_url().map_err(io::Error::other)?;
    let client = PostgrestClient::new(
        store_url,
        settings.api_key().map(str::to_owned),
        settings.request_timeout(),
    )
    .map_err(|error| io::Error::other(format!("build HTTP client: {error}")))?;
    let coordinator =
        FetchCoordinator::new(Arc::new(PostgrestPropertyCollection::new(client)));

    let mut filters = FilterStore::default();
    let state = filters.update(args.into_patch());

    let properties = match coordinator.fetch(&state).await {
        FetchResult::Success(properties) => properties,
        FetchResult::Error(error) => {
            return Err(io::Error::other(format!("search failed: {error}")));
        }
        FetchResult::Loading => {
            return Err(io::Error::other("search did not complete"));
        }
    };

    let mut stdout = io::stdout().lock();
    for property in properties.iter() {
        let line = json!({
            "property": property,
            "images": property.images(),
            "detailPath": format!("/properties/{}", property_slug(&property.id, &property.title)),
        });
        writeln!(stdout, "{line}")?;
    }
    Ok(())
}

fn init_tracing(json_logs: bool) {
    let builder = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr);
    let result = if json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(error) = result {
        warn!(%error, "tracing init failed");
    }
}

fn parse_range(raw: &str) -> Result<NumericRange, String> {
    let (min, max) = raw
        .split_once(',')
        .ok_or_else(|| "range must be written as min,max".to_owned())?;
    let parse = |value: &str| {
        value
            .trim()
            .parse::<u64>()
            .map_err(|error| format!("failed to parse range bound {value:?}: {error}"))
    };
    Ok(NumericRange::new(parse(min)?, parse(max)?))
}
