mod lookup;
mod resolve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "gasha-cli")]
#[command(about = "Find shops stocking a capsule toy by its JAN code")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Search shops for a JAN/EAN barcode
    Lookup {
        /// Barcode as printed under the bars
        barcode: String,
        /// Search origin latitude (requires --lng)
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Search origin longitude (requires --lat)
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
        /// Print the raw shop records as JSON
        #[arg(long)]
        json: bool,
    },
    /// Read the barcode from a photo, then search shops for it
    Scan {
        /// Image file(s) to scan; the first readable barcode wins
        #[arg(long = "image", value_name = "PATH", required = true, num_args = 1..)]
        images: Vec<PathBuf>,
        /// Search origin latitude (requires --lng)
        #[arg(long, requires = "lng", allow_negative_numbers = true)]
        lat: Option<f64>,
        /// Search origin longitude (requires --lat)
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lng: Option<f64>,
        /// Print the raw shop records as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let config = gasha_core::load_app_config_from_env()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let request = match cli.command {
        Commands::Lookup {
            barcode,
            lat,
            lng,
            json,
        } => {
            let barcode = resolve::manual_entry(&barcode).await?;
            lookup::LookupRequest::new(barcode, lat.zip(lng), json)?
        }
        Commands::Scan {
            images,
            lat,
            lng,
            json,
        } => {
            let barcode = resolve::scan_images(images).await?;
            eprintln!("Scanned JAN: {barcode}");
            lookup::LookupRequest::new(barcode, lat.zip(lng), json)?
        }
    };

    let output = lookup::run_lookup(&config, &request).await?;
    print!("{output}");
    Ok(())
}
