//! Test harness for CLI tests against the mock service.
//!
//! Provides a synchronous interface to the async MockService for use in
//! plain `#[test]` functions.

#![allow(dead_code)]

use assert_cmd::Command;
use gridshell_rpc::RpcValue;
use tokio::runtime::Runtime;

use super::gridshell_cmd;
use super::mock_service::{MockResponse, MockService, RecordedRequest};

pub struct TestHarness {
    service: MockService,
    // Keeps the service's tasks alive; dropped after the service.
    _runtime: Runtime,
}

impl TestHarness {
    pub fn new() -> Self {
        let runtime = Runtime::new().expect("Failed to create tokio runtime");
        let service = runtime.block_on(MockService::start());
        Self {
            service,
            _runtime: runtime,
        }
    }

    /// Shell command pointed at the mock service.
    pub fn cli_command(&self) -> Command {
        let mut cmd = gridshell_cmd();
        cmd.args(["--url", &self.service.url(), "--timeout-secs", "10"]);
        cmd
    }

    /// Run `exec` with the given lines.
    pub fn exec(&self, lines: &[&str]) -> assert_cmd::assert::Assert {
        self.cli_command().arg("exec").args(lines).assert()
    }

    /// Run `exec` with JSON output.
    pub fn exec_json(&self, lines: &[&str]) -> assert_cmd::assert::Assert {
        self.cli_command()
            .args(["--format", "json", "exec"])
            .args(lines)
            .assert()
    }

    pub fn set_response(&self, method: &str, response: MockResponse) {
        self.service.set_response(method, response);
    }

    pub fn set_value(&self, method: &str, value: RpcValue) {
        self.set_response(method, MockResponse::Value(value));
    }

    pub fn set_fault(&self, method: &str, code: i64, message: &str) {
        self.set_response(
            method,
            MockResponse::Fault {
                code,
                message: message.to_string(),
            },
        );
    }

    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.service.get_requests()
    }

    pub fn last_request_for(&self, method: &str) -> Option<RecordedRequest> {
        self.service.last_request_for(method)
    }

    pub fn assert_method_called(&self, method: &str) {
        let requests = self.get_requests();
        assert!(
            requests.iter().any(|r| r.method == method),
            "Expected method '{}' to be called, but it wasn't. Calls: {:?}",
            method,
            requests.iter().map(|r| &r.method).collect::<Vec<_>>()
        );
    }

    pub fn assert_method_not_called(&self, method: &str) {
        let requests = self.get_requests();
        assert!(
            !requests.iter().any(|r| r.method == method),
            "Expected method '{}' not to be called. Calls: {:?}",
            method,
            requests.iter().map(|r| &r.method).collect::<Vec<_>>()
        );
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
