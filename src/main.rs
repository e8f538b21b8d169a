//! Fetch the current ISS TLE and print its orbit geometry.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use iss_rendezvous::Config;

#[derive(Parser, Debug)]
#[command(name = "iss-rendezvous", version, about = "ISS TLE to state vector, TAI-MJD epoch and plane projection")]
struct Cli {
    /// JSON config file; the flags below override it
    #[arg(long)]
    config: Option<PathBuf>,
    /// TLE source URL
    #[arg(long)]
    url: Option<String>,
    /// Directory the TLE file is stored in
    #[arg(long)]
    data_dir: Option<PathBuf>,
    /// TLE file name inside the data directory
    #[arg(long)]
    file_name: Option<String>,
    /// Use the stored TLE file instead of downloading
    #[arg(long)]
    offline: bool,
    /// Print the report as JSON
    #[arg(long)]
    json: bool,
    /// Kepler solver stop threshold on |ΔE| (rad)
    #[arg(long)]
    tolerance: Option<f64>,
    /// Kepler solver iteration cap
    #[arg(long)]
    max_iterations: Option<usize>,
    /// HTTP timeout in seconds
    #[arg(long)]
    timeout_secs: Option<u64>,
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn to_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)?,
            None => Config::default(),
        };
        if let Some(url) = &self.url {
            config.tle_url = url.clone();
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if let Some(name) = &self.file_name {
            config.file_name = name.clone();
        }
        if let Some(tol) = self.tolerance {
            config.solver.tolerance = tol;
        }
        if let Some(n) = self.max_iterations {
            config.solver.max_iterations = n;
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = secs;
        }
        config.offline |= self.offline;
        Ok(config)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = cli.to_config().context("Invalid configuration")?;
    log::debug!("{config:?}");

    let fetcher = config.fetcher();
    let report = iss_rendezvous::run(&fetcher, &config).context("ISS orbit analysis failed")?;

    if cli.json {
        println!("{}", report.to_json()?);
    } else {
        println!("===================================================");
        println!("RENDEZ-VOUS WITH ISS");
        println!("===================================================");
        println!("{report}");
    }
    Ok(())
}
