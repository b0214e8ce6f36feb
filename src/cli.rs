use std::fmt::Write;
use std::path::PathBuf;

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Args, Parser, Subcommand};

use airq::models::{Estimate, LiveReading, Pollutant, PollutantReading};
use airq::regions::RegionTable;
use airq::EstimateRequest;

const ABOUT: &str = "Air Quality Index estimator";

const LONG_ABOUT: &str = "
Estimate the Air Quality Index (AQI) from six pollutant concentrations.

Values are either entered manually (PM2.5, PM10, NO2, SO2 and O3 in µg/m³, CO in mg/m³)
or fetched for a district from Open-Meteo, using the hourly sample closest to now.
The estimate is classified into one of six health-advisory bands.
";

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default())
    .usage(AnsiColor::Green.on_default())
    .literal(AnsiColor::Green.on_default())
    .placeholder(AnsiColor::Green.on_default());

#[derive(Parser, Debug)]
#[command(name = "airq", version, styles = STYLES, about = ABOUT, long_about = LONG_ABOUT)]
pub struct Cli {
    /// Configuration file (defaults to <config dir>/airq/config.toml)
    #[arg(long, global = true, env = "AIRQ_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP API
    Serve {
        /// Port to listen on (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
    },
    /// List regions and their districts
    Regions,
    /// Show the latest readings for a district
    Live {
        #[arg(long)]
        district: String,
        #[arg(long)]
        region: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Predict the AQI from manual values or a district's live readings
    Predict(PredictArgs),
}

#[derive(Args, Debug)]
pub struct PredictArgs {
    /// Region containing the district
    #[arg(long, requires = "district")]
    pub region: Option<String>,
    /// District to fetch live readings for
    #[arg(long, requires = "region", conflicts_with_all = ["pm25", "pm10", "no2", "so2", "co", "o3"])]
    pub district: Option<String>,
    /// PM2.5 in µg/m³ (0-400)
    #[arg(long)]
    pub pm25: Option<f64>,
    /// PM10 in µg/m³ (0-400)
    #[arg(long)]
    pub pm10: Option<f64>,
    /// NO2 in µg/m³ (0-200)
    #[arg(long)]
    pub no2: Option<f64>,
    /// SO2 in µg/m³ (0-200)
    #[arg(long)]
    pub so2: Option<f64>,
    /// CO in mg/m³ (0-10)
    #[arg(long)]
    pub co: Option<f64>,
    /// O3 in µg/m³ (0-300)
    #[arg(long)]
    pub o3: Option<f64>,
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl PredictArgs {
    /// Omitted manual values fall back to the defaults
    pub fn to_request(&self) -> EstimateRequest {
        if let (Some(region), Some(district)) = (&self.region, &self.district) {
            return EstimateRequest::District {
                region: region.clone(),
                district: district.clone(),
            };
        }

        let mut values = PollutantReading::default();
        let overrides = [
            (Pollutant::Pm25, self.pm25),
            (Pollutant::Pm10, self.pm10),
            (Pollutant::No2, self.no2),
            (Pollutant::So2, self.so2),
            (Pollutant::Co, self.co),
            (Pollutant::O3, self.o3),
        ];
        for (pollutant, value) in overrides {
            if let Some(value) = value {
                values.set(pollutant, value);
            }
        }
        EstimateRequest::Manual { values }
    }
}

pub fn render_regions(table: &RegionTable) -> String {
    let mut out = String::new();
    for region in table.regions() {
        let _ = writeln!(out, "{}", region.name);
        for district in region.districts {
            let _ = writeln!(out, "  - {district}");
        }
    }
    out
}

fn render_reading(out: &mut String, reading: &PollutantReading) {
    for (pollutant, value) in reading.iter() {
        let _ = writeln!(
            out,
            "  {:<6} {:>8.2} {}",
            pollutant.label(),
            value,
            pollutant.unit()
        );
    }
}

pub fn render_live(live: &LiveReading, zone: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} ({})",
        live.location.display_name(),
        live.location.coordinates.format_coordinates()
    );
    let _ = writeln!(out, "Data Time ({zone}): {}", live.observed_at_local);
    render_reading(&mut out, &live.reading);
    out
}

pub fn render_estimate(estimate: &Estimate, zone: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Predicted AQI: {:.2}", estimate.aqi);
    let _ = writeln!(out, "Level: {}", estimate.band.label);
    let _ = writeln!(out, "Message: {}", estimate.band.message);
    let _ = writeln!(out, "Advice: {}", estimate.band.advice);

    if let Some(location) = &estimate.location {
        let _ = writeln!(
            out,
            "Location: {} ({})",
            location.display_name(),
            location.coordinates.format_coordinates()
        );
    }
    if let Some(local) = &estimate.observed_at_local {
        let _ = writeln!(out, "Data Time ({zone}): {local}");
    }

    let _ = writeln!(out, "Pollutant levels:");
    for entry in &estimate.chart {
        let _ = writeln!(
            out,
            "  {:<6} {:>8.2} {:<6} {:>5.1}%",
            entry.pollutant.label(),
            entry.value,
            entry.unit,
            entry.share * 100.0
        );
    }
    out
}
