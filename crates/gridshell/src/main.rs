use clap::CommandFactory;
use clap::Parser;
use clap_complete::generate;
use tracing::debug;

use gridshell::app::run_exec;
use gridshell::app::run_shell;
use gridshell::commands::Cli;
use gridshell::commands::Commands;
use gridshell::presenter::create_presenter;
use gridshell::Dispatcher;
use gridshell::ShellError;
use gridshell_common::color_init;
use gridshell_common::init_tracing;
use gridshell_rpc::HttpClient;

fn main() {
    let cli = Cli::parse();
    color_init(cli.no_color);
    let _telemetry = init_tracing(&cli.log_config());

    if let Some(Commands::Completions { shell }) = &cli.command {
        let mut cmd = Cli::command();
        generate(*shell, &mut cmd, "gridshell", &mut std::io::stdout());
        return;
    }

    match run(&cli) {
        Ok(0) => {}
        Ok(code) => std::process::exit(code),
        Err(e) => {
            create_presenter(cli.effective_format()).present_error(&e);
            std::process::exit(e.exit_code());
        }
    }
}

/// Returns the exit status once the shell has finished.
///
/// Errors from individual lines are shown as they happen; only startup
/// failures and terminal errors come back as `Err`.
fn run(cli: &Cli) -> Result<i32, ShellError> {
    let client = if cli.offline {
        None
    } else {
        let config = cli.client_config();
        debug!(url = %config.service_url, upload_url = %config.upload_url, "connecting");
        Some(HttpClient::new(config)?)
    };

    let mut shell = Dispatcher::new(
        client,
        cli.shell_config(),
        create_presenter(cli.effective_format()),
    );
    shell.start()?;

    match &cli.command {
        Some(Commands::Exec { lines }) => match run_exec(&mut shell, lines) {
            Ok(()) => Ok(0),
            Err(e) => Ok(e.exit_code()),
        },
        Some(Commands::Shell) | None => run_shell(&mut shell).map(|()| 0),
        Some(Commands::Completions { .. }) => Ok(0),
    }
}
