//! Analyze command handler
//!
//! One-shot analysis of a site given by address or coordinates.

use crate::cli::init_tracing;
use crate::config::Config;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::features::overpass::OverpassBackend;
use crate::format::{available_formats, get_formatter};
use crate::forecast::Persona;
use crate::geo::nominatim::NominatimBackend;
use crate::model::ForecastModels;
use crate::session::Session;
use clap::Args;
use std::str::FromStr;
use std::sync::Arc;

/// Analyze command arguments
#[derive(Args)]
pub struct AnalyzeArgs {
    /// City or street address (geocoded)
    #[arg(long, short = 'a', conflicts_with_all = ["lat", "lng"])]
    pub address: Option<String>,

    /// Latitude
    #[arg(long, requires = "lng", allow_negative_numbers = true)]
    pub lat: Option<f64>,

    /// Longitude
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    pub lng: Option<f64>,

    /// Franchise persona: premium or budget
    #[arg(long, short = 'p')]
    pub persona: Option<String>,

    /// Scan radius in meters (200-2000)
    #[arg(long, short = 'r')]
    pub radius: Option<u32>,

    /// Output format
    #[arg(long, short = 'f')]
    pub format: Option<String>,

    /// Write output to file
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// List available personas
    #[arg(short = 'P', long = "list-personas")]
    pub list_personas: bool,

    /// List available formats
    #[arg(short = 'F', long = "list-formats")]
    pub list_formats: bool,
}

/// Run the analyze command
pub async fn run(args: AnalyzeArgs) -> Result<()> {
    if args.list_personas {
        list_personas();
        return Ok(());
    }

    if args.list_formats {
        list_formats();
        return Ok(());
    }

    init_tracing("warn");

    let config = Config::load()?;

    let persona = match &args.persona {
        Some(name) => Persona::from_str(name).map_err(|_| Error::UnknownPersona(name.clone()))?,
        None => config.defaults.persona,
    };
    let radius = args.radius.unwrap_or(config.defaults.radius);
    let format = args.format.unwrap_or_else(|| config.defaults.format.clone());

    let formatter = get_formatter(&format)
        .ok_or_else(|| Error::Config(format!("Unknown format: {}", format)))?;

    let services = &config.services;
    let mut session = Session::new(
        NominatimBackend::new(&services.nominatim_url, &services.user_agent)?,
        OverpassBackend::new(&services.overpass_url, &services.user_agent)?,
        Arc::new(ForecastModels::train_default()),
        persona,
        radius,
    )?;

    let report = if let Some(address) = &args.address {
        let report = session.set_address(address).await?;
        eprintln!("Found: {}", address);
        report
    } else if let (Some(lat), Some(lng)) = (args.lat, args.lng) {
        session.set_coordinate(Coordinates::new(lat, lng)).await?
    } else {
        return Err(Error::NoLocation);
    };

    let output = formatter.format(&report, &config)?;

    if let Some(path) = args.output {
        std::fs::write(&path, &output)?;
        eprintln!("Output written to {}", path);
    } else {
        println!("{}", output);
    }

    Ok(())
}

/// Print available personas
fn list_personas() {
    println!("Available personas:");
    for persona in Persona::ALL {
        let t = persona.thresholds();
        println!(
            "  {:8} - {} (prime > ${}, viable > ${})",
            persona.to_string(),
            persona.label(),
            t.high,
            t.low
        );
    }
}

/// Print available output formats
fn list_formats() {
    println!("Available output formats:");
    for format in available_formats() {
        println!("  {:6} - {}", format.name, format.description);
    }
}
