use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use native_loader::{
    DirResources, LoadOrigin, LoaderConfig, NativeLoader, Platform, ResourceChain, ZipResources,
};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::Level;

#[derive(Parser)]
#[command(name = "native-loader")]
#[command(version)]
#[command(about = "Resolve and load native libraries, falling back to bundled copies", long_about = None)]
struct Cli {
    /// Log every resolution step
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the file names a load would use, without loading
    Resolve {
        /// Library identifier (e.g. greeter, com/example/greeter)
        #[arg(value_name = "LIBRARY")]
        library: String,

        /// Naming platform: windows, macos or unix (default: this host)
        #[arg(short, long, value_name = "PLATFORM")]
        platform: Option<Platform>,
    },

    /// Load a library from the system path or the bundled resources
    Load {
        /// Library identifier (e.g. greeter, com/example/greeter)
        #[arg(value_name = "LIBRARY")]
        library: String,

        /// Resource directory to search (repeatable, searched in order)
        #[arg(short, long = "resources", value_name = "DIR")]
        resources: Vec<PathBuf>,

        /// Zip/jar archive to search after the directories (repeatable)
        #[arg(short, long = "archive", value_name = "ZIP")]
        archives: Vec<PathBuf>,

        /// Symbol to look up once loaded
        #[arg(short, long, value_name = "NAME")]
        symbol: Option<String>,

        /// JSON loader config
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Extraction directory (overrides config and NATIVE_LOADER_TMPDIR)
        #[arg(long, value_name = "DIR")]
        temp_dir: Option<PathBuf>,
    },
}

#[derive(Debug, Serialize)]
struct LoadReport<'a> {
    identifier: &'a str,
    platform: Platform,
    origin: &'a LoadOrigin,
    #[serde(skip_serializing_if = "Option::is_none")]
    symbol: Option<SymbolReport>,
}

#[derive(Debug, Serialize)]
struct SymbolReport {
    name: String,
    found: bool,
}

fn init_logging(verbose: bool) {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(if verbose { Level::DEBUG } else { Level::INFO })
        .with_target(false)
        .init();
}

fn build_config(file: Option<&Path>, temp_dir: Option<PathBuf>) -> Result<LoaderConfig> {
    let mut config = match file {
        Some(path) => LoaderConfig::from_json_file(path)?,
        None => LoaderConfig::default(),
    }
    .with_env_overrides();
    if let Some(dir) = temp_dir {
        config.temp_dir = Some(dir);
    }
    Ok(config)
}

fn build_resources(dirs: &[PathBuf], archives: &[PathBuf]) -> Result<ResourceChain> {
    let mut chain = ResourceChain::new();
    for dir in dirs {
        chain.push(DirResources::new(dir));
    }
    for archive in archives {
        let zip = ZipResources::open(archive)
            .with_context(|| format!("open archive {}", archive.display()))?;
        chain.push(zip);
    }
    Ok(chain)
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Resolve { library, platform } => {
            let platform = platform.unwrap_or_else(Platform::current);
            let loader = NativeLoader::new(ResourceChain::new()).with_platform(platform);
            print_json(&loader.resolve(&library)?)?;
        }
        Commands::Load {
            library,
            resources,
            archives,
            symbol,
            config,
            temp_dir,
        } => {
            let config = build_config(config.as_deref(), temp_dir)?;
            let chain = build_resources(&resources, &archives)?;
            tracing::debug!(entries = chain.len(), ?config, "resource search path ready");

            let loader = NativeLoader::new(chain).with_config(config);
            let lib = loader
                .load(&library)
                .with_context(|| format!("load {library}"))?;

            let symbol = symbol.map(|name| {
                let found = unsafe { lib.handle().get::<*const ()>(name.as_bytes()) }.is_ok();
                SymbolReport { name, found }
            });
            print_json(&LoadReport {
                identifier: lib.identifier(),
                platform: loader.platform(),
                origin: lib.origin(),
                symbol,
            })?;
        }
    }
    Ok(())
}
