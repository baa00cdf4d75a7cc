use std::collections::HashMap;

use gridshell_core::bind;
use gridshell_core::remote_signatures;
use gridshell_core::tokenize;
use gridshell_core::CoreError;
use gridshell_core::Locality;
use gridshell_core::ParsedCommand;
use gridshell_core::Registry;
use gridshell_core::Session;
use gridshell_core::ShellConfig;
use gridshell_rpc::ClientError;
use gridshell_rpc::RpcClient;
use gridshell_rpc::RpcValue;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::error::ShellError;
use crate::handlers::local_commands;
use crate::handlers::local_handlers;
use crate::handlers::HandlerResult;
use crate::presenter::Presenter;

/// Method listing every remote command with its signature.
pub const SIGNATURES_METHOD: &str = "AllMethodSignatures";
/// Method returning the distinguished name of the authenticated user.
pub const IDENTITY_METHOD: &str = "my_id";

pub type LocalHandler<C> = fn(&mut Dispatcher<C>, &ParsedCommand) -> HandlerResult;

/// Routes submitted lines to local handlers or remote methods.
///
/// Without a client the dispatcher runs offline: only local commands are
/// registered and anything that needs the service fails with
/// [`ClientError::NotConnected`].
pub struct Dispatcher<C: RpcClient> {
    client: Option<C>,
    session: Session,
    registry: Registry,
    handlers: HashMap<&'static str, LocalHandler<C>>,
    presenter: Box<dyn Presenter>,
}

impl<C: RpcClient> Dispatcher<C> {
    pub fn new(client: Option<C>, config: ShellConfig, presenter: Box<dyn Presenter>) -> Self {
        Self {
            client,
            session: Session::new(config),
            registry: Registry::new(local_commands()),
            handlers: local_handlers(),
            presenter,
        }
    }

    /// Discovers remote commands and the user name.
    ///
    /// Does nothing offline. A failed user lookup falls back to the configured
    /// user name; a failed discovery is returned.
    pub fn start(&mut self) -> Result<(), ShellError> {
        if !self.is_online() {
            debug!("offline, skipping method discovery");
            return Ok(());
        }
        let added = self.discover()?;
        info!(methods = added, "registered remote methods");
        self.identify();
        Ok(())
    }

    /// Registers every remote method the service advertises.
    pub fn discover(&mut self) -> Result<usize, ShellError> {
        let listing = self.invoke_remote(SIGNATURES_METHOD, None)?;
        let signatures = remote_signatures(&listing);
        let letters = self.session.config().flag_letters.clone();
        Ok(self.registry.append_remote(signatures, &letters))
    }

    /// Sets the session user from the service's identity for this client.
    pub fn identify(&mut self) {
        match self.invoke_remote(IDENTITY_METHOD, None) {
            Ok(value) => match value.as_str() {
                Some(dn) => self.session.set_user_from_dn(dn),
                None => warn!(kind = value.type_name(), "user lookup returned no name"),
            },
            Err(e) => warn!(error = %e, "user lookup failed"),
        }
    }

    /// Shows the prompt followed by `line`, as if it had been typed.
    pub fn echo(&self, line: &str) {
        self.presenter.present_echo(&self.session.prompt(), line);
    }

    /// Records `line` in history and runs it, presenting any error.
    pub fn submit(&mut self, line: &str) -> Result<(), ShellError> {
        self.session.history_mut().push(line);
        let result = self.execute(line);
        if let Err(e) = &result {
            self.presenter.present_error(e);
        }
        result
    }

    /// Runs one line without touching history.
    pub fn execute(&mut self, line: &str) -> Result<(), ShellError> {
        let tokens = tokenize(line);
        let Some((name, args)) = tokens.split_first() else {
            return Ok(());
        };

        let spec = self
            .registry
            .resolve(name, self.session.config().priority)
            .cloned()
            .ok_or_else(|| CoreError::UnknownCommand { name: name.clone() })?;
        let parsed = bind(args, &spec, &self.session.bind_context())?;
        debug!(
            command = spec.name(),
            locality = spec.locality.as_str(),
            "dispatching"
        );

        match spec.locality {
            Locality::Local => {
                let handler = self
                    .handlers
                    .get(spec.name())
                    .copied()
                    .ok_or_else(|| CoreError::UnknownCommand { name: name.clone() })?;
                handler(self, &parsed)
            }
            Locality::Remote => {
                let args = parsed.to_argument(&spec).map(|arg| vec![arg]);
                let result = self.invoke_remote(spec.name(), args)?;
                self.presenter.present_result(&result);
                Ok(())
            }
        }
    }

    /// Calls a remote method, turning a fault response into an error.
    pub fn invoke_remote(
        &mut self,
        method: &str,
        args: Option<Vec<RpcValue>>,
    ) -> Result<RpcValue, ShellError> {
        let value = self.client_mut()?.invoke(method, args)?;
        if let Some(fault) = value.as_fault() {
            debug!(method, code = fault.code, "service returned a fault");
            return Err(ShellError::RemoteFault {
                code: fault.code,
                message: fault.message,
            });
        }
        Ok(value)
    }

    pub fn is_online(&self) -> bool {
        self.client.is_some()
    }

    pub fn client_mut(&mut self) -> Result<&mut C, ClientError> {
        self.client.as_mut().ok_or(ClientError::NotConnected)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn presenter(&self) -> &dyn Presenter {
        self.presenter.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }
}
