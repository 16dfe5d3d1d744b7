use scanbox::cli::commands::{CliArgs, Commands};
use scanbox::cli::handlers::{handle_health, handle_scan, handle_serve};
use scanbox::util::logging::{init_logging, parse_level, LoggingConfig};
use scanbox::VERSION;

use clap::Parser;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    init_logging_from_args(&args);

    debug!("scanbox v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let exit_code = match &args.command {
        Commands::Serve(serve_args) => handle_serve(serve_args).await,
        Commands::Scan(scan_args) => handle_scan(scan_args, args.quiet).await,
        Commands::Health(health_args) => handle_health(health_args).await,
    };

    std::process::exit(exit_code);
}

fn init_logging_from_args(args: &CliArgs) {
    let config = LoggingConfig::from_env();

    let config = if let Some(level_str) = &args.log_level {
        config.level(parse_level(level_str))
    } else if args.verbose {
        config.level(Level::DEBUG)
    } else if args.quiet {
        config.level(Level::ERROR)
    } else {
        config
    };

    init_logging(config);
}
