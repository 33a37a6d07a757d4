//! Command-line interface for folio.
//!
//! Every subcommand builds a [`FontService`] from the layered configuration
//! (config file, then environment, then flags) and queries it. `fetch` goes
//! through the registered protocol handler, exactly like an embedded UI would.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use folio_config::FontServiceConfig;
use folio_fonts::{FontFamily, FontOption, FontService, ProtocolRegistrar};

use crate::host::LocalSchemeRegistry;

/// folio - font resolution and serving
#[derive(Parser, Debug)]
#[command(name = "folio")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Service config file (YAML); defaults to ~/.config/folio/fonts.yaml when present
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Explicit font manifest, tried before every conventional location
    #[arg(long, value_name = "PATH", global = true)]
    pub manifest: Option<PathBuf>,

    /// Extra asset root to scan for font folders (repeatable)
    #[arg(long = "font-dir", value_name = "DIR", global = true)]
    pub font_dirs: Vec<PathBuf>,

    /// Set debug log level (overrides RUST_LOG and DEBUG_LEVEL)
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevelArg>,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevelArg::Off => log::LevelFilter::Off,
            LogLevelArg::Error => log::LevelFilter::Error,
            LogLevelArg::Warn => log::LevelFilter::Warn,
            LogLevelArg::Info => log::LevelFilter::Info,
            LogLevelArg::Debug => log::LevelFilter::Debug,
            LogLevelArg::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List selectable font options
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one family by key, CSS name or display name
    Family {
        key: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Print the generated @font-face style sheet
    Stylesheet,

    /// Fetch a font through the protocol handler
    Fetch {
        /// Variant id or full `<scheme>://<id>` URL
        target: String,

        /// Write the font to this file
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn log_level(&self) -> Option<log::LevelFilter> {
        self.log_level.map(LogLevelArg::to_level_filter)
    }

    /// Config file, then environment, then command-line flags.
    pub fn build_config(&self) -> anyhow::Result<FontServiceConfig> {
        let default_path = FontServiceConfig::default_config_path();
        let mut config = match &self.config {
            Some(path) => FontServiceConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None if default_path.is_file() => FontServiceConfig::load(&default_path)
                .with_context(|| format!("Failed to load config {}", default_path.display()))?,
            None => FontServiceConfig::from_env(),
        };

        if let Some(manifest) = &self.manifest {
            config = config.with_manifest_path(manifest);
        }
        if !self.font_dirs.is_empty() {
            let mut roots = self.font_dirs.clone();
            roots.append(&mut config.asset_roots);
            config.asset_roots = roots;
        }
        Ok(config)
    }
}

/// Run the selected subcommand.
pub async fn execute(cli: &Cli) -> anyhow::Result<()> {
    let config = cli.build_config()?;
    let service = FontService::new(config);
    log::debug!("Running {:?} with {:?}", cli.command, service);

    match &cli.command {
        Commands::List { json } => {
            service.initialize().await?;
            let options = service.list_fonts()?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&options)?);
            } else {
                print_options(&options);
            }
        }
        Commands::Family { key, json } => {
            service.initialize().await?;
            let Some(family) = service.get_family(key)? else {
                bail!("No font family matches '{key}'");
            };
            if *json {
                println!("{}", serde_json::to_string_pretty(&*family)?);
            } else {
                print_family(&family);
            }
        }
        Commands::Stylesheet => {
            service.initialize().await?;
            print!("{}", service.stylesheet()?);
        }
        Commands::Fetch { target, output } => {
            fetch(&service, target, output.as_ref()).await?;
        }
    }
    Ok(())
}

async fn fetch(
    service: &FontService,
    target: &str,
    output: Option<&PathBuf>,
) -> anyhow::Result<()> {
    let registry = Arc::new(LocalSchemeRegistry::new());
    let registrar = ProtocolRegistrar::new(registry.clone(), service.clone());
    registrar.ensure_registered().await?;

    let url = if target.contains("://") {
        target.to_string()
    } else {
        format!("{}://{}", service.scheme(), target)
    };
    let response = registry.dispatch(&url).await;
    if !response.is_success() {
        bail!(
            "{} {}: {}",
            response.status,
            url,
            String::from_utf8_lossy(&response.body)
        );
    }

    let content_type = response.header("Content-Type").unwrap_or("unknown");
    match output {
        Some(path) => {
            std::fs::write(path, &response.body)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!(
                "Wrote {} bytes ({}) to {}",
                response.body.len(),
                content_type,
                path.display()
            );
        }
        None => println!("{} {} bytes", content_type, response.body.len()),
    }
    Ok(())
}

fn print_options(options: &[FontOption]) {
    if options.is_empty() {
        println!("No fonts available.");
        return;
    }
    for option in options {
        println!(
            "{:<9} {:<8} {:<28} {}",
            option.category,
            option.source.as_str(),
            option.label,
            option.value
        );
    }
}

fn print_family(family: &FontFamily) {
    println!("{} ({})", family.display_name, family.name);
    println!("  category: {}", family.category);
    println!("  source:   {}", family.source.as_str());
    println!("  css:      {}", family.css_family);
    if family.is_system {
        println!("  system font, resolved by name");
        return;
    }
    for variant in &family.variants {
        println!(
            "  {} {:<6} {:<6} {:<5} {}",
            variant.variant_id,
            variant.weight,
            variant.style,
            variant.format.as_str(),
            variant.file_path.display()
        );
    }
}
