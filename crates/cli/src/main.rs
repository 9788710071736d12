//! # skydelay
//!
//! Command-line interface for training the skydelay model bundles and
//! starting the API server.

use clap::{Parser, Subcommand};
use flight::{Bundle, DelayCauseDataset, FlightRecord, RegressionBundle, RiskBundle, SeverityBundle};
use model::{ForestConfig, KnnConfig, SplitConfig};
use server::ServerConfig;
use std::path::PathBuf;

type CliResult<T> = std::result::Result<T, String>;

#[derive(Parser)]
#[command(name = "skydelay")]
#[command(about = "Flight-delay model training and serving", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Train the weather-risk random forest from the delay-cause dataset
    TrainRisk {
        /// Delay-cause CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Bundle output path
        #[arg(short, long, default_value = "flight_model.json")]
        output: PathBuf,

        /// Number of trees
        #[arg(long, default_value = "200")]
        trees: usize,

        /// Maximum tree depth
        #[arg(long, default_value = "10")]
        max_depth: usize,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Train the delay-severity KNN classifier from flight records
    TrainSeverity {
        /// Flight records CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Bundle output path
        #[arg(short, long, default_value = "delay_severity_model.json")]
        output: PathBuf,

        /// Number of neighbours
        #[arg(short, long, default_value = "5")]
        k: usize,

        /// Fraction of records held out for evaluation
        #[arg(long, default_value = "0.2")]
        test_size: f64,

        /// Random seed for the split
        #[arg(long, default_value = "42")]
        seed: u64,
    },

    /// Fit the linear regression baseline on its built-in sample
    TrainRegression {
        /// Bundle output path
        #[arg(short, long, default_value = "simple_model.json")]
        output: PathBuf,
    },

    /// Start the REST API server
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (overrides HOST)
        #[arg(long)]
        host: Option<String>,
    },
}

fn run_train_risk(
    input: PathBuf,
    output: PathBuf,
    trees: usize,
    max_depth: usize,
    seed: u64,
) -> CliResult<()> {
    let dataset = DelayCauseDataset::from_path(&input).map_err(|e| e.to_string())?;
    println!("Loaded {} delay-cause rows from {}", dataset.len(), input.display());

    let config = ForestConfig::new(trees, Some(max_depth)).with_seed(seed);
    let bundle = RiskBundle::train(&dataset, config).map_err(|e| e.to_string())?;
    bundle.save(&output).map_err(|e| e.to_string())?;

    println!("Routes:      {}", bundle.table.len());
    println!("Carriers:    {}", bundle.carriers.len());
    println!("Airports:    {}", bundle.airports.len());
    println!("Threshold:   {:.4}", bundle.threshold);
    println!("Saved risk bundle to {}", output.display());
    Ok(())
}

fn run_train_severity(
    input: PathBuf,
    output: PathBuf,
    k: usize,
    test_size: f64,
    seed: u64,
) -> CliResult<()> {
    let records = FlightRecord::read_csv(&input).map_err(|e| e.to_string())?;
    println!("Loaded {} flight records from {}", records.len(), input.display());

    let bundle = SeverityBundle::train(&records, KnnConfig::new(k), SplitConfig::new(test_size, seed))
        .map_err(|e| e.to_string())?;
    bundle.save(&output).map_err(|e| e.to_string())?;

    println!("Classes:     {}", bundle.target.classes().join(", "));
    println!("Accuracy:    {:.4}", bundle.holdout_accuracy);
    println!("Saved severity bundle to {}", output.display());
    Ok(())
}

fn run_train_regression(output: PathBuf) -> CliResult<()> {
    let bundle = RegressionBundle::train().map_err(|e| e.to_string())?;
    bundle.save(&output).map_err(|e| e.to_string())?;

    println!("Intercept:   {:.4}", bundle.model.intercept());
    println!("Coefficients: {:?}", bundle.model.coefficients());
    println!("MSE:         {:.4}", bundle.mse);
    println!("R2:          {:.4}", bundle.r2);
    println!("Saved regression bundle to {}", output.display());
    Ok(())
}

fn run_serve(host: Option<String>, port: Option<u16>) -> CliResult<()> {
    let mut config = ServerConfig::from_env().map_err(|e| e.to_string())?;
    if let Some(host) = host {
        config.host = host;
    }
    if let Some(port) = port {
        config.port = port;
    }

    let runtime = tokio::runtime::Runtime::new().map_err(|e| e.to_string())?;
    runtime
        .block_on(server::run(config))
        .map_err(|e| e.to_string())
}

fn main() {
    // Load .env file (optional - won't fail if missing)
    dotenvy::dotenv().ok();
    server::init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::TrainRisk {
            input,
            output,
            trees,
            max_depth,
            seed,
        } => run_train_risk(input, output, trees, max_depth, seed),

        Commands::TrainSeverity {
            input,
            output,
            k,
            test_size,
            seed,
        } => run_train_severity(input, output, k, test_size, seed),

        Commands::TrainRegression { output } => run_train_regression(output),

        Commands::Serve { port, host } => run_serve(host, port),
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
