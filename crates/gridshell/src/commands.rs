use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
pub use clap_complete::Shell;

use gridshell_common::LogConfig;
use gridshell_core::Locality;
use gridshell_core::ShellConfig;
use gridshell_rpc::HttpClientConfig;

pub const DEFAULT_SERVICE_URL: &str = "https://localhost/cgi-bin/xmlrpcinterface.py";

const LONG_ABOUT: &str = r#"gridshell is a command shell for grid portals that expose an XML-RPC interface.

At startup it asks the service for its method signatures and offers every
method as a shell command next to the built-in ones (help, list, cd, upload,
clear, exit).

COMMAND LINES:
    <command> [value]... [-option value]... [-flags]

    Values fill the required fields first, then optional fields in order.
    "-name value" sets the optional field whose name starts with "name".
    Letters such as -la are passed as flags. Paths are resolved against the
    current directory shown in the prompt.

EXAMPLES:
    # Interactive shell against a grid portal
    gridshell --url https://grid.example.org/cgi-bin/xmlrpcinterface.py

    # Run lines without a terminal
    gridshell exec "cd /projects" "ls -l"

    # Explore the built-in commands without a service
    gridshell --offline exec help "list console""#;

#[derive(Parser)]
#[command(name = "gridshell")]
#[command(author, version)]
#[command(about = "Command shell for grid portals speaking XML-RPC")]
#[command(long_about = LONG_ABOUT)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// XML-RPC service URL
    #[arg(long, global = true, env = "GRIDSHELL_URL", default_value = DEFAULT_SERVICE_URL)]
    pub url: String,

    /// Upload handler URL (default: upload.py next to --url)
    #[arg(long, global = true, env = "GRIDSHELL_UPLOAD_URL")]
    pub upload_url: Option<String>,

    /// Number of commands kept in history
    #[arg(long, global = true, env = "GRIDSHELL_HISTORY", default_value_t = 10)]
    pub history_size: usize,

    /// Preferred command kind when a name is both local and remote
    #[arg(long, global = true, env = "GRIDSHELL_PREFER")]
    pub prefer: Option<Preference>,

    /// HTTP request timeout in seconds
    #[arg(long, global = true, env = "GRIDSHELL_TIMEOUT", default_value_t = 60)]
    pub timeout_secs: u64,

    /// Do not contact the service; only built-in commands are available
    #[arg(long, global = true)]
    pub offline: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Output as JSON (shorthand for --format json)
    #[arg(long, global = true)]
    pub json: bool,

    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Enable debug logging (shows requests)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Append logs to this file instead of stderr
    #[arg(long, global = true, env = "GRIDSHELL_LOG")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Returns the effective output format, considering --json shorthand.
    pub fn effective_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            self.format
        }
    }

    pub fn shell_config(&self) -> ShellConfig {
        ShellConfig {
            history_limit: self.history_size,
            priority: self.prefer.map(Locality::from),
            ..ShellConfig::default()
        }
    }

    pub fn client_config(&self) -> HttpClientConfig {
        let config = HttpClientConfig::new(self.url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs));
        match &self.upload_url {
            Some(upload_url) => config.with_upload_url(upload_url.clone()),
            None => config,
        }
    }

    pub fn log_config(&self) -> LogConfig {
        let level = if self.verbose { "debug" } else { "warn" };
        LogConfig::new(level).with_file(self.log_file.clone())
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the interactive shell (default)
    Shell,

    /// Run command lines in order and exit
    #[command(long_about = r#"Run command lines in order and exit.

Each argument is one shell line, echoed after the prompt before it runs.
Execution stops after exit or quit. The exit status reflects the first
line that failed.

EXAMPLES:
    gridshell exec "cd /projects" ls
    gridshell exec "cat -path results.txt""#)]
    Exec {
        /// Lines to run
        #[arg(required = true)]
        lines: Vec<String>,
    },

    /// Generate shell completion scripts
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Preference {
    Local,
    Remote,
}

impl From<Preference> for Locality {
    fn from(preference: Preference) -> Self {
        match preference {
            Preference::Local => Locality::Local,
            Preference::Remote => Locality::Remote,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["gridshell"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.history_size, 10);
        assert_eq!(cli.timeout_secs, 60);
        assert_eq!(cli.shell_config().priority, None);
        assert_eq!(cli.log_config().level, "warn");
    }

    #[test]
    fn test_exec_lines() {
        let cli = Cli::try_parse_from(["gridshell", "--offline", "exec", "help", "list console"])
            .unwrap();
        assert!(cli.offline);
        match cli.command {
            Some(Commands::Exec { lines }) => assert_eq!(lines, vec!["help", "list console"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_exec_requires_a_line() {
        assert!(Cli::try_parse_from(["gridshell", "exec"]).is_err());
    }

    #[test]
    fn test_verbose_log_file() {
        let cli = Cli::try_parse_from(["gridshell", "-v", "--log-file", "/tmp/gs.log"]).unwrap();
        let config = cli.log_config();
        assert_eq!(config.level, "debug");
        assert_eq!(config.file, Some(PathBuf::from("/tmp/gs.log")));
    }

    #[test]
    fn test_prefer_and_json() {
        let cli = Cli::try_parse_from(["gridshell", "--prefer", "remote", "--json"]).unwrap();
        assert_eq!(cli.shell_config().priority, Some(Locality::Remote));
        assert_eq!(cli.effective_format(), OutputFormat::Json);
    }

    #[test]
    fn test_client_config_upload_url() {
        let cli = Cli::try_parse_from([
            "gridshell",
            "--url",
            "http://127.0.0.1:9000/cgi-bin/xmlrpcinterface.py",
            "--timeout-secs",
            "5",
        ])
        .unwrap();
        let config = cli.client_config();
        assert_eq!(config.upload_url, "http://127.0.0.1:9000/cgi-bin/upload.py");
        assert_eq!(config.timeout, Duration::from_secs(5));

        let cli = Cli::try_parse_from(["gridshell", "--upload-url", "http://h/up"]).unwrap();
        assert_eq!(cli.client_config().upload_url, "http://h/up");
    }
}
