#[macro_use]
extern crate lazy_static;

mod accounting;
mod calendar;
mod config;
mod output;
mod simulation;
mod tax;

use config::Config;
use output::Report;

use anyhow::{Context, Result};
use structopt::StructOpt;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(StructOpt)]
#[structopt(name = "swpsim")]
struct Opt {
    /// Overrides `simulation_years` from the config file
    #[structopt(short, long)]
    number_of_years: Option<u32>,

    #[structopt(short, long, default_value = "config.toml")]
    config_file: String,

    /// summary, portfolio, tax, schedule or all
    #[structopt(short, long, default_value = "all")]
    report: Report,

    /// Year of the withdrawal schedule to show
    #[structopt(short, long, default_value = "1")]
    year: usize,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("swpsim=warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_tracing();
    let options = Opt::from_args();

    let config_file_content = std::fs::read_to_string(&options.config_file)
        .with_context(|| format!("Couldn't open config file `{}`", options.config_file))?;

    let mut config =
        Config::from_toml(&config_file_content).context("Invalid TOML in config file")?;
    if let Some(years) = options.number_of_years {
        config = config.with_years(years);
    }

    if !config.has_basic_inputs() {
        warn!("nothing to project yet");
        return output::print_placeholder();
    }

    let input = config.validate().context("Invalid simulation inputs")?;
    let result = simulation::run_simulation(&input);

    output::print(&result, options.report, options.year)
}
