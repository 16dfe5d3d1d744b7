use anyhow::{Context, Result};
use std::fs;
use std::time::Duration;
use tracing::{debug, error};

use super::commands::{HealthArgs, ScanArgs, ServeArgs};
use super::output::{HealthStatus, OutputFormat, OutputFormatter};
use crate::config::ScanboxConfig;
use crate::scan::{BanditScanner, ScanService, Scanner};
use crate::server;

pub const EXIT_OK: i32 = 0;
pub const EXIT_ERROR: i32 = 1;
pub const EXIT_HIGH_FINDINGS: i32 = 2;

pub async fn handle_serve(args: &ServeArgs) -> i32 {
    let mut config = ScanboxConfig::default();
    if let Some(ref bind) = args.bind {
        config.bind = bind.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(ref dir) = args.upload_dir {
        config.upload_dir = dir.clone();
    }

    match server::serve(config).await {
        Ok(()) => EXIT_OK,
        Err(e) => {
            error!("{:#}", e);
            eprintln!("Error: {:#}", e);
            EXIT_ERROR
        }
    }
}

pub async fn handle_scan(args: &ScanArgs, quiet: bool) -> i32 {
    match run_scan(args, quiet).await {
        Ok(code) => code,
        Err(e) => {
            match e.downcast_ref::<crate::scan::ServiceError>() {
                Some(service_err) => eprintln!("{}", service_err.help_message()),
                None => eprintln!("Error: {:#}", e),
            }
            EXIT_ERROR
        }
    }
}

async fn run_scan(args: &ScanArgs, quiet: bool) -> Result<i32> {
    let mut config = ScanboxConfig::default();
    if let Some(ref scanner) = args.scanner {
        config.scanner_bin = scanner.clone();
    }
    if let Some(timeout) = args.timeout {
        config.scan_timeout_secs = timeout;
    }
    if !args.keep {
        config.retain_uploads = false;
    }
    config.validate().context("Invalid configuration")?;
    debug!(config = %config, "Resolved configuration");

    let service = ScanService::from_config(&config);
    let outcome = service.scan_archive(&args.archive).await?;

    if args.keep && !quiet {
        eprintln!("Workspace kept at {}", outcome.workspace.display());
    }

    let formatter = OutputFormatter::new(OutputFormat::from(args.format));
    let rendered = formatter.format_report(&outcome.report)?;

    match args.output {
        Some(ref path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !quiet {
                eprintln!("Report written to {}", path.display());
            }
        }
        None => println!("{}", rendered),
    }

    if outcome.report.error().is_some() {
        return Ok(EXIT_ERROR);
    }

    let high = outcome.report.summary().map(|c| c.high).unwrap_or(0);
    Ok(if high > 0 { EXIT_HIGH_FINDINGS } else { EXIT_OK })
}

pub async fn handle_health(args: &HealthArgs) -> i32 {
    let config = ScanboxConfig::default();
    let program = args.scanner.clone().unwrap_or(config.scanner_bin);
    let scanner = BanditScanner::new(program.clone(), Duration::from_secs(30));

    let status = match scanner.version().await {
        Ok(version) => HealthStatus {
            scanner: program,
            available: true,
            version: Some(version),
            error: None,
        },
        Err(e) => HealthStatus {
            scanner: program,
            available: false,
            version: None,
            error: Some(e.to_string()),
        },
    };

    let formatter = OutputFormatter::new(OutputFormat::from(args.format));
    match formatter.format_health(&status) {
        Ok(rendered) => println!("{}", rendered),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return EXIT_ERROR;
        }
    }

    if status.available {
        EXIT_OK
    } else {
        EXIT_ERROR
    }
}
