use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};

use sawah::analysis::terminal::OutputFormat;
use sawah::cli;
use sawah::device::PumpState;

#[derive(Debug, Parser)]
#[command(name = "sawah")]
#[command(about = "Monitoring dashboard for a rice field irrigation device")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Live dashboard in the terminal (type on/off/r/q while it runs)
    Watch {
        /// Stop after N timer polls
        #[arg(long)]
        count: Option<u64>,
    },
    /// Switch the pump manually (ON is refused while the water level is too high)
    Pump {
        #[arg(value_enum)]
        command: PumpArg,
    },
    /// Show the daily analysis
    Analysis {
        /// Output format: table (default), json
        #[arg(long, default_value = "table")]
        format: String,
        /// Export the analysis as CSV (to PATH, or the configured directory)
        #[arg(long, num_args = 0..=1, value_name = "PATH")]
        export: Option<Option<PathBuf>>,
        /// Print a plain report suitable for paper
        #[arg(long)]
        print: bool,
    },
    /// Serve the browser dashboard
    Web {
        /// Listen address (default from config: 127.0.0.1:9750)
        #[arg(long)]
        addr: Option<String>,
        /// Do not open the browser
        #[arg(long)]
        no_open: bool,
    },
    /// Run the device simulator
    Simulate {
        /// Listen address (default from config: 127.0.0.1:5000)
        #[arg(long)]
        addr: Option<String>,
        /// Seed for reproducible sensor values
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Check config files, device reachability and the event log
    Health,
    /// Show recent dashboard events
    Events {
        /// Number of events to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PumpArg {
    On,
    Off,
}

impl From<PumpArg> for PumpState {
    fn from(arg: PumpArg) -> Self {
        match arg {
            PumpArg::On => PumpState::On,
            PumpArg::Off => PumpState::Off,
        }
    }
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Write the default config to ~/.sawah/config.toml
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Set one value, e.g. `sawah config set device.base_url http://10.0.0.7:5000`
    Set { key: String, value: String },
    /// Reset the global config to defaults
    Reset,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Watch { count } => cli::run_watch(count),
        Commands::Pump { command } => cli::run_pump(command.into()),
        Commands::Analysis {
            format,
            export,
            print,
        } => {
            let fmt = OutputFormat::from_str_opt(Some(&format));
            cli::run_analysis(fmt, export, print)
        }
        Commands::Web { addr, no_open } => cli::run_web(addr, no_open),
        Commands::Simulate { addr, seed } => cli::run_simulate(addr, seed),
        Commands::Health => cli::run_health(),
        Commands::Events { limit } => cli::run_events(limit),
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
    }
}
