use chrono::Local;
use gridshell_rpc::RpcClient;
use tracing::debug;

use crate::dispatcher::Dispatcher;
use crate::error::ShellError;
use crate::render::Line;
use crate::render::Style;
use crate::repl::read_line;

pub const BANNER_TITLE: &str = "Grid - Advanced Shell Interface";

/// Runs the interactive shell until `exit`, `quit` or end of input.
///
/// Command errors are shown and the shell keeps going; only terminal
/// failures end the loop with an error.
pub fn run_shell<C: RpcClient>(shell: &mut Dispatcher<C>) -> Result<(), ShellError> {
    shell
        .presenter()
        .present_line(&Line::new(Style::Title, BANNER_TITLE));
    shell
        .presenter()
        .present_text(&Local::now().format("%a %b %e %Y %H:%M:%S").to_string());

    while shell.is_running() {
        let prompt = shell.session().prompt();
        let Some(line) = read_line(&prompt, shell.session_mut().history_mut())? else {
            debug!("end of input");
            break;
        };
        if let Err(e) = shell.submit(&line) {
            debug!(error = %e, "command failed");
        }
    }
    Ok(())
}

/// Runs `lines` in order, echoing each after the prompt.
///
/// Every line runs even when an earlier one fails; the first failure is
/// returned. Stops early once the session ends.
pub fn run_exec<C: RpcClient>(
    shell: &mut Dispatcher<C>,
    lines: &[String],
) -> Result<(), ShellError> {
    let mut first_error = None;
    for line in lines {
        if !shell.is_running() {
            break;
        }
        shell.echo(line);
        if let Err(e) = shell.submit(line) {
            first_error.get_or_insert(e);
        }
    }
    match first_error {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
