use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Static security scanning service for zipped source trees
#[derive(Parser, Debug)]
#[command(
    name = "scanbox",
    about = "Static security scanning service for zipped source trees",
    version,
    long_about = "scanbox accepts ZIP archives of source code, unpacks each into its own \
                  workspace, runs the Bandit static analyser over it and reports findings \
                  by severity. Run it as a web service or scan a single archive locally."
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, value_name = "LEVEL", help = "Set logging level")]
    pub log_level: Option<String>,

    #[arg(short = 'v', long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    #[arg(
        short = 'q',
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Quiet mode - suppress non-error output"
    )]
    pub quiet: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(
        about = "Run the upload-and-scan web service",
        long_about = "Serves the upload form on / and accepts archives on /scan.\n\n\
                      Examples:\n  \
                      scanbox serve\n  \
                      scanbox serve --port 9000 --upload-dir /var/lib/scanbox"
    )]
    Serve(ServeArgs),

    #[command(
        about = "Scan a local ZIP archive",
        long_about = "Runs one archive through the same pipeline as the web service and \
                      prints the report.\n\n\
                      Exit codes: 0 no HIGH findings, 1 error, 2 HIGH findings present.\n\n\
                      Examples:\n  \
                      scanbox scan project.zip\n  \
                      scanbox scan project.zip --format json -o report.json"
    )]
    Scan(ScanArgs),

    #[command(
        about = "Check scanner availability",
        long_about = "Runs the scanner's --version and reports whether it is usable.\n\n\
                      Examples:\n  \
                      scanbox health\n  \
                      scanbox health --format json"
    )]
    Health(HealthArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long, value_name = "ADDR", help = "Listen address (default: SCANBOX_BIND or 0.0.0.0)")]
    pub bind: Option<String>,

    #[arg(short = 'p', long, help = "Listen port (default: SCANBOX_PORT or 8000)")]
    pub port: Option<u16>,

    #[arg(long, value_name = "DIR", help = "Root directory for scan workspaces")]
    pub upload_dir: Option<PathBuf>,
}

#[derive(Parser, Debug, Clone)]
pub struct ScanArgs {
    #[arg(value_name = "ARCHIVE", help = "ZIP archive to scan")]
    pub archive: PathBuf,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,

    #[arg(
        short = 'o',
        long,
        value_name = "FILE",
        help = "Write output to file instead of stdout"
    )]
    pub output: Option<PathBuf>,

    #[arg(long, value_name = "BIN", help = "Scanner executable (default: bandit)")]
    pub scanner: Option<String>,

    #[arg(long, value_name = "SECONDS", help = "Scanner timeout in seconds")]
    pub timeout: Option<u64>,

    #[arg(long, help = "Keep the extracted workspace after scanning")]
    pub keep: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct HealthArgs {
    #[arg(long, value_name = "BIN", help = "Scanner executable (default: bandit)")]
    pub scanner: Option<String>,

    #[arg(
        short = 'f',
        long,
        value_enum,
        default_value = "human",
        help = "Output format"
    )]
    pub format: OutputFormatArg,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormatArg {
    Json,
    Yaml,
    Human,
}

impl From<OutputFormatArg> for super::output::OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Json => super::output::OutputFormat::Json,
            OutputFormatArg::Yaml => super::output::OutputFormat::Yaml,
            OutputFormatArg::Human => super::output::OutputFormat::Human,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_args_verify() {
        CliArgs::command().debug_assert();
    }

    #[test]
    fn test_serve_defaults() {
        let args = CliArgs::parse_from(["scanbox", "serve"]);
        match args.command {
            Commands::Serve(serve_args) => {
                assert!(serve_args.bind.is_none());
                assert!(serve_args.port.is_none());
                assert!(serve_args.upload_dir.is_none());
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_serve_with_options() {
        let args = CliArgs::parse_from([
            "scanbox",
            "serve",
            "--bind",
            "127.0.0.1",
            "--port",
            "9000",
            "--upload-dir",
            "/srv/uploads",
        ]);
        match args.command {
            Commands::Serve(serve_args) => {
                assert_eq!(serve_args.bind.as_deref(), Some("127.0.0.1"));
                assert_eq!(serve_args.port, Some(9000));
                assert_eq!(serve_args.upload_dir, Some(PathBuf::from("/srv/uploads")));
            }
            _ => panic!("Expected Serve command"),
        }
    }

    #[test]
    fn test_scan_args() {
        let args = CliArgs::parse_from([
            "scanbox",
            "scan",
            "project.zip",
            "--format",
            "json",
            "--timeout",
            "30",
            "--keep",
        ]);
        match args.command {
            Commands::Scan(scan_args) => {
                assert_eq!(scan_args.archive, PathBuf::from("project.zip"));
                assert_eq!(scan_args.format, OutputFormatArg::Json);
                assert_eq!(scan_args.timeout, Some(30));
                assert!(scan_args.keep);
                assert!(scan_args.output.is_none());
            }
            _ => panic!("Expected Scan command"),
        }
    }

    #[test]
    fn test_scan_requires_archive() {
        assert!(CliArgs::try_parse_from(["scanbox", "scan"]).is_err());
    }

    #[test]
    fn test_health_command() {
        let args = CliArgs::parse_from(["scanbox", "health"]);
        match args.command {
            Commands::Health(health_args) => {
                assert!(health_args.scanner.is_none());
                assert_eq!(health_args.format, OutputFormatArg::Human);
            }
            _ => panic!("Expected Health command"),
        }
    }

    #[test]
    fn test_global_flags() {
        let args = CliArgs::parse_from(["scanbox", "-v", "health"]);
        assert!(args.verbose);
        assert!(!args.quiet);

        let args = CliArgs::parse_from(["scanbox", "--log-level", "debug", "serve"]);
        assert_eq!(args.log_level, Some("debug".to_string()));

        assert!(CliArgs::try_parse_from(["scanbox", "-v", "-q", "serve"]).is_err());
    }
}
