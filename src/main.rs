use anyhow::Result;
use folio::cli;
use tokio::runtime::Runtime;

fn main() -> Result<()> {
    // Parse arguments first so --log-level can configure logging
    let cli = cli::Cli::parse_args();

    // Routes all log::info!() etc. to the temp-dir debug log.
    // When RUST_LOG is set, also mirrors to stderr.
    // --log-level takes precedence over RUST_LOG, which beats DEBUG_LEVEL.
    folio::debug::init_log_bridge(cli.log_level());

    log::info!("Starting folio {}", folio::VERSION);

    let runtime = Runtime::new()?;
    let result = runtime.block_on(cli::execute(&cli));
    runtime.shutdown_timeout(std::time::Duration::from_secs(2));

    if let Err(ref e) = result {
        log::error!("{e:#}");
        eprintln!("folio: error: {e:#}");
        std::process::exit(1);
    }
    result
}
