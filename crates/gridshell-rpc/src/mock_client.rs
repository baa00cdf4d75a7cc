use std::collections::HashMap;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::client::RpcClient;
use crate::error::ClientError;
use crate::error_codes;
use crate::value::RpcValue;

type CallRecord = Vec<(String, Option<Vec<RpcValue>>)>;

/// A mock implementation of [`RpcClient`] for testing.
///
/// Responses are configured per method name and every call is recorded for
/// assertions. Clones share the same state, so a test can keep a handle while
/// the dispatcher owns another.
///
/// # Example
///
/// ```
/// use gridshell_rpc::{MockClient, RpcClient, RpcValue};
///
/// let mut mock = MockClient::new();
/// mock.set_response("my_id", RpcValue::from("/O=Grid/CN=Jane Doe"));
///
/// let result = mock.invoke("my_id", None).unwrap();
/// assert_eq!(result.as_str(), Some("/O=Grid/CN=Jane Doe"));
/// assert_eq!(mock.call_count("my_id"), 1);
/// ```
#[derive(Clone)]
pub struct MockClient {
    responses: Arc<Mutex<HashMap<String, RpcValue>>>,
    statuses: Arc<Mutex<HashMap<String, u16>>>,
    calls: Arc<Mutex<CallRecord>>,
    uploads: Arc<Mutex<Vec<(PathBuf, String)>>>,
    default_response: RpcValue,
    fault_on_missing: bool,
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl MockClient {
    /// Creates a mock that answers unconfigured methods with an empty string.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            statuses: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            uploads: Arc::new(Mutex::new(Vec::new())),
            default_response: RpcValue::string(""),
            fault_on_missing: false,
        }
    }

    /// Creates a mock that answers unconfigured methods with a
    /// method-not-found fault, as the service does.
    pub fn new_strict() -> Self {
        Self {
            fault_on_missing: true,
            ..Self::new()
        }
    }

    pub fn set_response(&mut self, method: &str, response: RpcValue) {
        lock(&self.responses).insert(method.to_string(), response);
    }

    /// Makes calls to `method` fail with the given HTTP status.
    pub fn set_http_status(&mut self, method: &str, status: u16) {
        lock(&self.statuses).insert(method.to_string(), status);
    }

    pub fn get_calls(&self) -> CallRecord {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self, method: &str) -> usize {
        lock(&self.calls).iter().filter(|(m, _)| m == method).count()
    }

    pub fn last_call(&self, method: &str) -> Option<(String, Option<Vec<RpcValue>>)> {
        lock(&self.calls)
            .iter()
            .rev()
            .find(|(m, _)| m == method)
            .cloned()
    }

    /// Local file and remote directory of every upload, in order.
    pub fn uploads(&self) -> Vec<(PathBuf, String)> {
        lock(&self.uploads).clone()
    }

    pub fn clear_calls(&mut self) {
        lock(&self.calls).clear();
        lock(&self.uploads).clear();
    }

    pub fn reset(&mut self) {
        self.clear_calls();
        lock(&self.responses).clear();
        lock(&self.statuses).clear();
    }
}

impl RpcClient for MockClient {
    fn invoke(
        &mut self,
        method: &str,
        args: Option<Vec<RpcValue>>,
    ) -> Result<RpcValue, ClientError> {
        lock(&self.calls).push((method.to_string(), args));

        if let Some(status) = lock(&self.statuses).get(method) {
            return Err(ClientError::HttpStatus { status: *status });
        }

        if let Some(response) = lock(&self.responses).get(method) {
            return Ok(response.clone());
        }

        if self.fault_on_missing {
            Ok(RpcValue::fault(
                i64::from(error_codes::METHOD_NOT_FOUND),
                format!("method \"{}\" is not supported", method),
            ))
        } else {
            Ok(self.default_response.clone())
        }
    }

    fn upload(&mut self, file: &Path, remote_dir: &str) -> Result<String, ClientError> {
        if !file.exists() {
            return Err(ClientError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} does not exist", file.display()),
            )));
        }
        lock(&self.uploads).push((file.to_path_buf(), remote_dir.to_string()));
        Ok(String::new())
    }
}
