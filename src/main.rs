use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use modelfetch::config::{ArtifactSpec, Config};
use modelfetch::progress::BarReporter;
use modelfetch::transport::HttpTransport;
use modelfetch::{logging, Fetcher};

#[derive(Parser, Debug)]
#[command(
    name = "modelfetch",
    version,
    about = "Make sure the model weights file is on disk, downloading it if missing"
)]
struct Cli {
    /// Optional path to a config file (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Source URL of the weights file
    #[arg(long)]
    url: Option<String>,

    /// Name of the file inside the target directory
    #[arg(long)]
    filename: Option<String>,

    /// Target directory (defaults to the current directory)
    #[arg(long)]
    dir: Option<PathBuf>,

    /// Do not draw a progress bar
    #[arg(long, short)]
    quiet: bool,
}

impl Cli {
    /// Flags win over file values; file values win over built-in defaults.
    fn resolve_config(&self) -> anyhow::Result<Config> {
        let mut cfg = match &self.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(url) = &self.url {
            cfg.url = Some(url.clone());
        }
        if let Some(filename) = &self.filename {
            cfg.filename = Some(filename.clone());
        }
        if let Some(dir) = &self.dir {
            cfg.directory = Some(dir.clone());
        }
        Ok(cfg)
    }
}

fn main() -> anyhow::Result<ExitCode> {
    logging::init_logging();
    let cli = Cli::parse();

    let cfg = cli.resolve_config()?;
    let spec = cfg.artifact()?;
    let options = cfg.options();

    let transport = HttpTransport::new(&options).context("building HTTP client")?;
    let progress = if cli.quiet { BarReporter::hidden() } else { BarReporter::default() };
    let fetcher = Fetcher::new(transport, progress, options);

    println!("Checking for model: {}", spec.filename.bold());
    println!("Target directory: {}", spec.directory.display());

    match fetcher.ensure(&spec) {
        Ok(path) => println!("\n{} {}", "Model is ready at:".green().bold(), path.display()),
        Err(err) => {
            eprintln!("\n{} {}", "Model download/check failed:".red().bold(), err);
            return Ok(ExitCode::FAILURE);
        }
    }

    println!("\n--- Running check again to test skip logic ---");
    report_second_check(&fetcher, &spec);
    println!("--- Check complete ---");

    Ok(ExitCode::SUCCESS)
}

fn report_second_check(fetcher: &Fetcher<HttpTransport, BarReporter>, spec: &ArtifactSpec) {
    match fetcher.ensure(spec) {
        Ok(path) => println!("{} {}", "Already present:".yellow(), path.display()),
        Err(err) => eprintln!("{} {}", "Second check failed:".red(), err),
    }
}
