use anyhow::{Result, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use travelweb_core::client::photo::AwardListOptions;
use travelweb_core::client::tour::{ListOptions, date_range};
use travelweb_core::{
    ApiId, Config, WeatherObservation, photo_client_from_config, project_to_grid,
    tour_client_from_config, weather_client_from_config,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "travelweb", version, about = "Trip discovery over Korean public tourism data")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store a data.go.kr service key.
    Configure {
        /// Service short name ("tour", "weather", "photo-award").
        /// Omit to set the shared key used by all services.
        service: Option<String>,
    },

    /// Show weather at a coordinate.
    Weather {
        /// Latitude, decimal degrees.
        latitude: f64,

        /// Longitude, decimal degrees.
        longitude: f64,

        /// Forecast product: "now", "hourly", or "village".
        #[arg(long, default_value = "now")]
        product: String,
    },

    /// Search destinations by keyword.
    Search {
        /// Keyword, e.g. a destination or attraction name.
        keyword: String,

        #[arg(long)]
        rows: Option<u32>,

        #[arg(long)]
        page: Option<u32>,
    },

    /// List festivals starting within the coming days.
    Festivals {
        /// Start date (YYYYMMDD); defaults to today.
        #[arg(long)]
        start: Option<String>,

        /// How many days ahead to include.
        #[arg(long, default_value_t = 30)]
        days: u32,

        /// Area code filter (see the tour service's areaCode2 listing).
        #[arg(long)]
        area: Option<String>,
    },

    /// List tourism content around a coordinate.
    Nearby {
        /// Latitude, decimal degrees.
        latitude: f64,

        /// Longitude, decimal degrees.
        longitude: f64,

        /// Search radius in meters.
        #[arg(long)]
        radius: Option<u32>,
    },

    /// Show details and gallery images for one content item.
    Detail {
        content_id: String,
        content_type_id: String,
    },

    /// Browse photo-contest award entries.
    Photos {
        /// Keyword filter.
        #[arg(long)]
        keyword: Option<String>,

        /// Province region-code filter.
        #[arg(long)]
        region: Option<String>,

        /// Number of entries to show.
        #[arg(long, default_value_t = 10)]
        count: u32,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure { service } => configure(service),
            Command::Weather { latitude, longitude, product } => {
                weather(latitude, longitude, &product).await
            }
            Command::Search { keyword, rows, page } => search(&keyword, rows, page).await,
            Command::Festivals { start, days, area } => festivals(start, days, area).await,
            Command::Nearby { latitude, longitude, radius } => {
                nearby(latitude, longitude, radius).await
            }
            Command::Detail { content_id, content_type_id } => {
                detail(&content_id, &content_type_id).await
            }
            Command::Photos { keyword, region, count } => photos(keyword, region, count).await,
        }
    }
}

fn configure(service: Option<String>) -> Result<()> {
    let mut config = Config::load()?;

    let key = inquire::Password::new("data.go.kr service key:")
        .without_confirmation()
        .prompt()?;

    match service {
        Some(name) => {
            let id = ApiId::try_from(name.as_str())?;
            config.upsert_service_key(id, key);
            println!("Stored key for service '{id}'.");
        }
        None => {
            config.set_shared_key(key);
            println!("Stored shared key for all services.");
        }
    }

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn weather(latitude: f64, longitude: f64, product: &str) -> Result<()> {
    if !(-90.0..=90.0).contains(&latitude) || latitude.abs() == 90.0 {
        bail!("latitude must be strictly between -90 and 90 degrees");
    }
    if !(-180.0..=180.0).contains(&longitude) {
        bail!("longitude must be between -180 and 180 degrees");
    }

    let config = Config::load()?;
    let client = weather_client_from_config(&config)?;
    let now = Local::now().naive_local();

    let cell = project_to_grid(latitude, longitude);
    println!("grid cell: {cell}");

    let obs = match product {
        "now" => client.current_observation(latitude, longitude, now).await?,
        "hourly" => client.forecast_observation(latitude, longitude, now).await?,
        "village" => client.village_observation(latitude, longitude, now).await?,
        other => bail!("Unknown product '{other}'. Supported products: now, hourly, village."),
    };

    print_observation(&obs);
    Ok(())
}

fn print_observation(obs: &WeatherObservation) {
    let mut reported = false;

    if let Some(v) = obs.temperature {
        println!("temperature: {v} °C");
        reported = true;
    }
    if let Some(v) = obs.humidity {
        println!("humidity: {v} %");
        reported = true;
    }
    if let Some(v) = &obs.sky_condition {
        println!("sky: {v}");
        reported = true;
    }
    if let Some(v) = &obs.precipitation_type {
        println!("precipitation type: {v}");
        reported = true;
    }
    if let Some(v) = &obs.precipitation {
        println!("precipitation: {v}");
        reported = true;
    }
    if let Some(v) = obs.precipitation_probability {
        println!("precipitation probability: {v} %");
        reported = true;
    }
    if let Some(v) = obs.wind_speed {
        println!("wind speed: {v} m/s");
        reported = true;
    }
    if let Some(v) = obs.wind_direction {
        println!("wind direction: {v}°");
        reported = true;
    }

    if !reported {
        println!("No weather data reported for this cell and window.");
    }
}

async fn search(keyword: &str, rows: Option<u32>, page: Option<u32>) -> Result<()> {
    let config = Config::load()?;
    let client = tour_client_from_config(&config)?;

    let opts = ListOptions { num_of_rows: rows, page_no: page, ..ListOptions::default() };
    let result = client.search_keyword(keyword, &opts).await?;

    println!("{} result(s), page {} of {} total rows\n", result.items.len(), result.page_no, result.total_count);
    for spot in &result.items {
        println!("[{}] {} ({})", spot.content_id, spot.title, spot.content_type_id);
        if !spot.addr1.is_empty() {
            println!("    {}", spot.addr1);
        }
    }
    Ok(())
}

async fn festivals(start: Option<String>, days: u32, area: Option<String>) -> Result<()> {
    let config = Config::load()?;
    let client = tour_client_from_config(&config)?;

    let today = Local::now().date_naive();
    let (default_start, end) = date_range(today, days);
    let start = start.unwrap_or(default_start);

    let opts = ListOptions { area_code: area, ..ListOptions::default() };
    let result = client.search_festival(&start, Some(&end), &opts).await?;

    println!("Festivals from {start} to {end}:\n");
    for festival in &result.items {
        println!(
            "[{}] {} ({} to {})",
            festival.spot.content_id, festival.spot.title, festival.event_start_date, festival.event_end_date
        );
        if let Some(place) = &festival.event_place {
            println!("    {place}");
        } else if !festival.spot.addr1.is_empty() {
            println!("    {}", festival.spot.addr1);
        }
    }
    Ok(())
}

async fn nearby(latitude: f64, longitude: f64, radius: Option<u32>) -> Result<()> {
    let config = Config::load()?;
    let client = tour_client_from_config(&config)?;

    // The tour service takes mapX/mapY in (longitude, latitude) order.
    let result = client
        .location_based_list(longitude, latitude, radius, &ListOptions::default())
        .await?;

    println!("{} place(s) within {} m:\n", result.items.len(), radius.unwrap_or(1000));
    for spot in &result.items {
        println!("[{}] {}", spot.content_id, spot.title);
        if !spot.addr1.is_empty() {
            println!("    {}", spot.addr1);
        }
    }
    Ok(())
}

async fn detail(content_id: &str, content_type_id: &str) -> Result<()> {
    let config = Config::load()?;
    let client = tour_client_from_config(&config)?;

    let common = client.detail_common(content_id, content_type_id).await?;
    for row in &common.items {
        println!("{}", row.spot.title);
        if !row.spot.addr1.is_empty() {
            println!("address: {}", row.spot.addr1);
        }
        if let Some(tel) = &row.spot.tel {
            println!("tel: {tel}");
        }
        if let Some(overview) = &row.spot.overview {
            println!("\n{overview}\n");
        }
    }

    let images = client.detail_image(content_id).await?;
    if !images.items.is_empty() {
        println!("images:");
        for image in &images.items {
            println!("  {}", image.origin_img_url);
        }
    }
    Ok(())
}

async fn photos(keyword: Option<String>, region: Option<String>, count: u32) -> Result<()> {
    let config = Config::load()?;
    let client = photo_client_from_config(&config)?;

    let opts = AwardListOptions { num_of_rows: Some(count), ..AwardListOptions::default() };
    let awards = match (keyword, region) {
        (Some(keyword), _) => client.search_awards(&keyword, &opts).await?,
        (None, Some(region)) => client.awards_by_region(&region, &opts).await?,
        (None, None) => client.latest_awards(count).await?,
    };

    for award in &awards {
        println!("[{}] {} by {}", award.id, award.title, award.photographer);
        if !award.award.is_empty() {
            println!("    {} ({}, {})", award.award, award.award_category, award.award_rank);
        }
        if !award.film_month.is_empty() {
            println!("    shot {} at {}", award.film_month, award.location);
        }
        println!("    {}", award.thumbnail_url);
    }
    Ok(())
}
