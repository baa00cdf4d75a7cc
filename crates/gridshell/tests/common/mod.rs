#![allow(dead_code)]
#![allow(unused_imports)]

pub mod mock_service;
pub mod test_harness;

pub use mock_service::{MockResponse, MockService, RecordedRequest};
pub use test_harness::TestHarness;

use assert_cmd::Command;
use gridshell_rpc::RpcValue;

pub const TEST_DN: &str = "/C=DK/O=Grid/CN=user/emailAddress=user@example.org";

/// Command for the shell binary with no service configuration leaking in
/// from the environment.
pub fn gridshell_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("gridshell"));
    for var in [
        "GRIDSHELL_URL",
        "GRIDSHELL_UPLOAD_URL",
        "GRIDSHELL_HISTORY",
        "GRIDSHELL_PREFER",
        "GRIDSHELL_TIMEOUT",
        "GRIDSHELL_LOG",
        "RUST_LOG",
    ] {
        cmd.env_remove(var);
    }
    cmd.arg("--no-color");
    cmd
}

/// Struct tagged with an `object_type`, as grid service methods return.
pub fn output_object(object_type: &str, fields: &[(&str, RpcValue)]) -> RpcValue {
    std::iter::once(("object_type", RpcValue::from(object_type)))
        .chain(fields.iter().cloned())
        .collect()
}

/// `[output_objects, [code, text]]` result of a grid service method.
pub fn method_result(objects: Vec<RpcValue>, code: i64, text: &str) -> RpcValue {
    RpcValue::from(vec![
        RpcValue::List(objects),
        RpcValue::from(vec![RpcValue::from(code), RpcValue::from(text)]),
    ])
}
