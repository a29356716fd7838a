use clap::{Parser, Subcommand, ValueEnum};
use messy_registry::{config, counter, emit, output, registry, sitemap};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "messy-registry")]
#[command(about = "Build the messy-ui component registry")]
#[command(long_about = "\
Build the messy-ui component registry

Every subdirectory of the source directory is one component. Its metadata
file names the component; its source files are inlined into a manifest the
shadcn installer can fetch.

Source structure:

  registry/new-york/
  ├── animated-counter/
  │   ├── meta.toml                # slug, name, description, dependencies, aliases
  │   └── animated-counter.tsx     # Shipped as registry:component
  ├── theme-toggle/
  │   ├── meta.toml                # [[snippets]] with target_path ship extra files
  │   ├── theme-toggle.css
  │   └── theme-toggle.tsx
  └── tabs/
      ├── meta.toml
      ├── index.ts                 # Barrel file, not shipped
      ├── example.tsx              # Demo, not shipped
      └── tabs.tsx

Output:

  public/r/<slug>.json             # One manifest per component
  registry.json                    # Index of every component

Components with missing or invalid metadata are skipped and reported; the
rest of the catalog still builds.

Run 'messy-registry gen-config' to generate a documented registry.toml.")]
#[command(version)]
struct Cli {
    /// Config file (stock defaults are used when it doesn't exist)
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Component source directory [config: source_dir]
    #[arg(long, global = true)]
    source: Option<PathBuf>,

    /// Manifest output directory [config: output_dir]
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Index file [config: index_path]
    #[arg(long, global = true)]
    index: Option<PathBuf>,

    /// Log verbosity on stderr (RUST_LOG overrides)
    #[arg(long, value_enum, default_value_t = LogLevel::Warn, global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan, build, and write manifests and the index
    Build {
        /// Delete manifests of components that no longer exist
        #[arg(long)]
        prune: bool,
    },
    /// Scan and validate without writing; fails if any component is skipped
    Check,
    /// Print one component by slug or alias
    Show {
        slug: String,
    },
    /// Print the odometer rotation plan for a target number
    Counter {
        #[arg(allow_negative_numbers = true)]
        target: String,
        /// Rotation cap [config: counter.max_rotations]
        #[arg(long, allow_negative_numbers = true)]
        cap: Option<i64>,
        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write sitemap.xml and redirects.json
    Sitemap {
        /// Output directory [config: sitemap.output_dir]
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print a stock registry.toml with all options documented
    GenConfig,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    initialize_tracing(cli.log_level);
    let cwd = std::env::current_dir()?;

    match &cli.command {
        Command::Build { prune } => {
            let config = resolve_config(&cli)?;
            println!("==> Scanning {}", config.source_dir.display());
            let registry = registry::load_registry(&config.source_dir, &config)?;
            output::print_build_report(&registry);

            println!();
            println!("==> Writing registry");
            init_thread_pool(&config.build);
            let report = emit::emit(
                &registry,
                &config.output_dir,
                &config.index_path,
                *prune || config.build.prune,
            )?;
            output::print_emit_report(&report, &config.output_dir, &cwd);
        }
        Command::Check => {
            let config = resolve_config(&cli)?;
            println!("==> Checking {}", config.source_dir.display());
            let registry = registry::load_registry(&config.source_dir, &config)?;
            output::print_build_report(&registry);
            if registry.skipped() > 0 {
                return Err(format!("{} component(s) skipped", registry.skipped()).into());
            }
            println!("==> Registry is valid");
        }
        Command::Show { slug } => {
            let config = resolve_config(&cli)?;
            let registry = registry::load_registry(&config.source_dir, &config)?;
            let entry = registry
                .find(slug)
                .ok_or_else(|| format!("no component or alias named {slug:?}"))?;
            let manifest = registry
                .manifests
                .get(&entry.slug)
                .ok_or_else(|| format!("no manifest for {:?}", entry.slug))?;
            output::print_component(entry, manifest);
        }
        Command::Counter { target, cap, json } => {
            let config = resolve_config(&cli)?;
            let cap = match *cap {
                Some(cap) => cap,
                None => i64::try_from(config.counter.max_rotations)?,
            };
            let plan = counter::plan_from_input(target, cap)?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                output::print_counter_plan(&plan, config.counter.duration);
            }
        }
        Command::Sitemap { out } => {
            let config = resolve_config(&cli)?;
            let registry = registry::load_registry(&config.source_dir, &config)?;
            let out_dir = out.clone().unwrap_or_else(|| config.sitemap.output_dir.clone());
            let files = sitemap::write_site_files(&registry, &config.sitemap.base_url, &out_dir)?;
            output::print_site_files(&files, &cwd);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config file and apply the global path flags on top.
fn resolve_config(cli: &Cli) -> Result<config::RegistryConfig, config::ConfigError> {
    let mut config = config::load_config(&cli.config)?;
    if let Some(source) = &cli.source {
        config.source_dir = source.clone();
    }
    if let Some(output) = &cli.output {
        config.output_dir = output.clone();
    }
    if let Some(index) = &cli.index {
        config.index_path = index.clone();
    }
    Ok(config)
}

/// Install the stderr log subscriber. `RUST_LOG`, when set, wins over
/// `--log-level`.
fn initialize_tracing(log_level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Initialize the rayon thread pool based on build config.
///
/// Caps at the number of available CPU cores; user can constrain down, not up.
fn init_thread_pool(build: &config::BuildConfig) {
    let threads = config::effective_threads(build);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
