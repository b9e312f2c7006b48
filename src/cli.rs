use clap::Parser;
use std::path::PathBuf;

/// dockchat: chat with a Docker-management assistant from the terminal
#[derive(Parser, Debug, Clone)]
#[command(name = "dockchat")]
#[command(version)]
#[command(about = "Terminal chat console for a Docker-management assistant", long_about = None)]
pub struct Cli {
    /// Base URL of the command service
    #[arg(long, env = "DOCKCHAT_SERVER", value_name = "URL")]
    pub server: Option<String>,

    /// Config file to load instead of the default location
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Write logs to this file
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Start in a new chat instead of resuming the last active conversation
    #[arg(long, default_value_t = false)]
    pub no_restore: bool,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["dockchat"]);
        assert!(cli.config.is_none());
        assert!(cli.log_level.is_none());
        assert!(cli.log_file.is_none());
        assert!(!cli.no_restore);
    }

    #[test]
    fn test_server_flag() {
        let cli = Cli::parse_from(["dockchat", "--server", "http://docker-host:5000"]);
        assert_eq!(cli.server.as_deref(), Some("http://docker-host:5000"));
    }

    #[test]
    fn test_config_and_log_flags() {
        let cli = Cli::parse_from([
            "dockchat",
            "-c",
            "/tmp/dockchat.toml",
            "--log-file",
            "/tmp/dockchat.log",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/dockchat.toml")));
        assert_eq!(cli.log_file, Some(PathBuf::from("/tmp/dockchat.log")));
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_no_restore_flag() {
        let cli = Cli::parse_from(["dockchat", "--no-restore"]);
        assert!(cli.no_restore);
    }
}
