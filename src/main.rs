//! Curvature CLI
//!
//! Usage:
//!   curvature [OPTIONS] <BASE_DIR>
//!
//! Options:
//!   -o, --output <DIR>     Output directory (default: <BASE_DIR>/curvature-output)
//!   -c, --config <FILE>    Registry file (default: curvature.toml or curvature-config.json)
//!   -p, --prefix <PREFIX>  Tag prefix overriding the registry file
//!       --check            Only check components for circular references
//!       --nested           Expand components used inside other components
//!       --skip-validation  Do not check for cycles before building
//!   -v, --verbose          More logging (repeat for trace output)

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use curvature::{site, BuildError, CycleResult, RenderError, SiteConfig};

#[derive(Parser)]
#[command(name = "curvature")]
#[command(about = "Replace component tags in HTML files with reusable fragments")]
struct Cli {
    /// Site directory containing pages, components/ and the registry file
    base_dir: PathBuf,

    /// Output directory
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Registry file mapping component names to fragment paths
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tag prefix, e.g. `g` for <g-navbar/>
    #[arg(short, long)]
    prefix: Option<String>,

    /// Only check components for circular references
    #[arg(long)]
    check: bool,

    /// Expand components used inside other components
    #[arg(long)]
    nested: bool,

    /// Do not check for circular references before building
    #[arg(long, conflicts_with = "check")]
    skip_validation: bool,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = SiteConfig::new(&cli.base_dir)
        .with_nested(cli.nested)
        .with_validation(!cli.skip_validation);
    if let Some(output) = &cli.output {
        config = config.with_output_dir(output);
    }
    if let Some(path) = &cli.config {
        config = config.with_config_file(path);
    }
    if let Some(prefix) = &cli.prefix {
        config = config.with_prefix(prefix);
    }

    let result = if cli.check {
        run_check(&config)
    } else {
        site::build(&config).map(|report| {
            println!(
                "Rendered {} and copied {} files into {}",
                report.rendered,
                report.copied,
                config.output_dir.display()
            );
        })
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            report_error(&e);
            ExitCode::FAILURE
        }
    }
}

fn run_check(config: &SiteConfig) -> Result<(), BuildError> {
    let registry = config.load_registry()?;
    site::check(&registry)?;
    println!("{} components checked: {}", registry.len(), CycleResult::NoCycle);
    Ok(())
}

/// Print an error, with source context when it points into a page
fn report_error(e: &BuildError) {
    if let BuildError::Render(err @ RenderError::UnknownComponent { file, .. }) = e {
        if let Ok(source) = fs::read_to_string(file) {
            eprintln!("{}", err.format(&source));
            return;
        }
    }
    eprintln!("Error: {}", e);
}

fn init_logging(verbose: u8) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        };
        EnvFilter::new(format!("curvature={}", level))
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
