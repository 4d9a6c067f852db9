//! sitemapper CLI
//!
//! Generates `sitemap.xml` for a prerendered site.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use clap::Parser;
use color_eyre::eyre::Result;

/// Command-line interface for sitemapper.
#[derive(Parser)]
#[command(
    name = "sitemapper",
    version,
    about = "Build-time sitemap.xml generation"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "sitemapper.toml")]
    config: std::path::PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Generate sitemap.xml for a built site
    Build {
        /// Override the public output directory
        #[arg(short, long)]
        public_dir: Option<std::path::PathBuf>,
        /// Override site hostname (e.g., https://example.com)
        #[arg(long)]
        hostname: Option<String>,
    },
    /// Start the development server with sitemap preview
    Dev {
        /// Port to listen on
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
        /// Open the sitemap preview in a browser
        #[arg(long)]
        open: bool,
    },
    /// Validate configuration and list inferred routes
    Check {
        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    sitemapper::init_tracing(cli.verbose);

    match cli.command {
        Commands::Build {
            public_dir,
            hostname,
        } => {
            sitemapper::cmd::build::run(&cli.config, public_dir.as_deref(), hostname.as_deref())
                .await?;
        }
        Commands::Dev { port, open } => {
            sitemapper::cmd::dev::run(&cli.config, port, open).await?;
        }
        Commands::Check { strict } => {
            sitemapper::cmd::check::run(&cli.config, strict).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn test_cli_build_command_parsing() {
        let args = ["sitemapper", "build", "--public-dir", "dist"];
        let cli = Cli::parse_from(args);

        assert_eq!(cli.config, std::path::PathBuf::from("sitemapper.toml"));
        assert_eq!(cli.verbose, 0);

        match cli.command {
            Commands::Build {
                public_dir,
                hostname,
            } => {
                assert_eq!(public_dir, Some(std::path::PathBuf::from("dist")));
                assert!(hostname.is_none());
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_build_with_hostname() {
        let args = ["sitemapper", "build", "--hostname", "https://example.com"];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::Build { hostname, .. } => {
                assert_eq!(hostname.as_deref(), Some("https://example.com"));
            }
            _ => panic!("Expected Build command"),
        }
    }

    #[test]
    fn test_cli_dev_command_parsing() {
        let args = ["sitemapper", "dev", "--port", "8080", "--open"];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::Dev { port, open } => {
                assert_eq!(port, 8080);
                assert!(open);
            }
            _ => panic!("Expected Dev command"),
        }
    }

    #[test]
    fn test_cli_check_command_parsing() {
        let args = ["sitemapper", "check", "--strict"];
        let cli = Cli::parse_from(args);

        match cli.command {
            Commands::Check { strict } => {
                assert!(strict);
            }
            _ => panic!("Expected Check command"),
        }
    }

    #[test]
    fn test_cli_verbosity_flags() {
        let args = ["sitemapper", "-vvv", "build"];
        let cli = Cli::parse_from(args);
        assert_eq!(cli.verbose, 3);
    }

    #[test]
    fn test_cli_custom_config_path() {
        let args = ["sitemapper", "--config", "site.toml", "build"];
        let cli = Cli::parse_from(args);
        assert_eq!(cli.config, std::path::PathBuf::from("site.toml"));
    }
}
