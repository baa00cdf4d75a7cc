//! Commands the shell runs itself, without asking the service.

use std::collections::HashMap;
use std::path::Path;

use gridshell_core::CommandSpec;
use gridshell_core::Locality;
use gridshell_core::ParsedCommand;
use gridshell_rpc::RpcClient;
use gridshell_rpc::RpcValue;
use tracing::debug;

use crate::dispatcher::Dispatcher;
use crate::dispatcher::LocalHandler;
use crate::error::ShellError;
use crate::render::Line;
use crate::render::Style;

pub type HandlerResult = Result<(), ShellError>;

const HELP_BANNER: [&str; 5] = [
    "Advanced Grid Shell    - Help",
    "list [console|remote]  - to show all/console/remote commands.",
    "help <command name> - to show help of a certain command.",
    "Note: this shell does not support pipes or redirection",
    "----------",
];

const CONSOLE_HEADER: &str = "----------Console Methods------------";
const REMOTE_HEADER: &str = "----------Remote Methods------------";

/// Built-in commands, registered ahead of any remote method.
pub fn local_commands() -> Vec<CommandSpec> {
    vec![
        CommandSpec::local(&["help", "man"], "{'method': ['']}"),
        CommandSpec::local(&["clear"], ""),
        CommandSpec::local(&["list"], "{'type': ['']}"),
        CommandSpec::local(&["cd"], "{'path': ['']}").require("path"),
        CommandSpec::local(&["upload"], "{'file': ['']}"),
        CommandSpec::local(&["exit", "quit"], ""),
    ]
}

/// Handler for each built-in, keyed by the command's primary name.
pub fn local_handlers<C: RpcClient>() -> HashMap<&'static str, LocalHandler<C>> {
    let mut handlers: HashMap<&'static str, LocalHandler<C>> = HashMap::new();
    handlers.insert("help", handle_help::<C>);
    handlers.insert("clear", handle_clear::<C>);
    handlers.insert("list", handle_list::<C>);
    handlers.insert("cd", handle_cd::<C>);
    handlers.insert("upload", handle_upload::<C>);
    handlers.insert("exit", handle_exit::<C>);
    handlers
}

pub fn handle_help<C: RpcClient>(shell: &mut Dispatcher<C>, parsed: &ParsedCommand) -> HandlerResult {
    let presenter = shell.presenter();
    let method = parsed.get("method").unwrap_or_default();
    if method.is_empty() {
        presenter.present_line(&Line::new(Style::Title, HELP_BANNER[0]));
        for line in &HELP_BANNER[1..] {
            presenter.present_text(line);
        }
        return Ok(());
    }

    match shell
        .registry()
        .resolve(method, shell.session().config().priority)
    {
        Some(spec) => presenter.present_text(&spec.help_line()),
        None => presenter.present_line(&Line::new(
            Style::Error,
            "Unsupported command or invalid input!",
        )),
    }
    Ok(())
}

pub fn handle_clear<C: RpcClient>(shell: &mut Dispatcher<C>, _parsed: &ParsedCommand) -> HandlerResult {
    shell.presenter().clear();
    Ok(())
}

pub fn handle_list<C: RpcClient>(shell: &mut Dispatcher<C>, parsed: &ParsedCommand) -> HandlerResult {
    let wanted = parsed
        .get("type")
        .and_then(|kind| kind.parse::<Locality>().ok());
    let sections = match wanted {
        Some(Locality::Local) => vec![(Locality::Local, CONSOLE_HEADER)],
        Some(Locality::Remote) => vec![(Locality::Remote, REMOTE_HEADER)],
        None => vec![
            (Locality::Local, CONSOLE_HEADER),
            (Locality::Remote, REMOTE_HEADER),
        ],
    };

    let presenter = shell.presenter();
    for (locality, header) in sections {
        presenter.present_line(&Line::new(Style::SectionHeader, header));
        for spec in shell.registry().list(locality) {
            presenter.present_text(&spec.aliases.join(", "));
        }
    }
    Ok(())
}

pub fn handle_cd<C: RpcClient>(shell: &mut Dispatcher<C>, parsed: &ParsedCommand) -> HandlerResult {
    let path = parsed.get("path").unwrap_or_default().to_string();
    if path.contains('*') {
        shell
            .presenter()
            .present_line(&Line::new(Style::Error, "cd: Wildcards not supported!"));
        return Ok(());
    }

    if shell.is_online() {
        let arg: RpcValue = [("path", RpcValue::from(vec![path.as_str()]))]
            .into_iter()
            .collect();
        let listing = shell.invoke_remote("ls", Some(vec![arg]))?;
        let status = listing
            .at(1)
            .and_then(|status| status.at(0))
            .and_then(RpcValue::as_i64);
        if status != Some(0) {
            debug!(path = %path, ?status, "directory lookup failed");
            shell
                .presenter()
                .present_line(&Line::new(Style::Error, "Directory not found!"));
            return Ok(());
        }
    }

    shell.session_mut().change_dir(&path);
    Ok(())
}

pub fn handle_upload<C: RpcClient>(shell: &mut Dispatcher<C>, parsed: &ParsedCommand) -> HandlerResult {
    let target = shell.session().cwd().to_string();
    let file = parsed.get("file").unwrap_or_default();
    if file.is_empty() {
        shell
            .presenter()
            .present_text(&format!("Upload target: {}", target));
        return Ok(());
    }

    let response = shell.client_mut()?.upload(Path::new(file), &target)?;
    debug!(file, target = %target, bytes = response.len(), "upload finished");
    shell
        .presenter()
        .present_text(&format!("Uploaded {} to {}", file, target));
    Ok(())
}

pub fn handle_exit<C: RpcClient>(shell: &mut Dispatcher<C>, _parsed: &ParsedCommand) -> HandlerResult {
    shell.session_mut().end();
    Ok(())
}
