//! Mock grid service for testing the shell without a real portal.
//!
//! Listens on a local TCP port, answers XML-RPC calls with configured
//! values or faults and records every request for verification.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use gridshell_rpc::{decode_element, encode, parse_document, write_document};
use gridshell_rpc::{RpcValue, XmlElement};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

use super::{method_result, output_object, TEST_DN};

/// Recorded request for test verification.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// XML-RPC method name, or `upload` for the upload handler.
    pub method: String,
    /// First parameter of the call, decoded.
    pub params: Option<RpcValue>,
    pub body: String,
}

/// Configuration for how the mock should respond.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Value(RpcValue),
    Fault { code: i64, message: String },
    /// Answer with this HTTP status and no XML.
    HttpStatus(u16),
    /// Answer 200 with this body verbatim.
    Malformed(String),
}

pub struct MockService {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handlers: Arc<Mutex<HashMap<String, MockResponse>>>,
}

fn default_handlers() -> HashMap<String, MockResponse> {
    let signatures = RpcValue::from(vec![
        RpcValue::from(vec!["ls", "{'flags': [''], 'path': ['.']}"]),
        RpcValue::from(vec![
            "cat",
            "{'path': 'MUST_BE_SET_AND_NO_DEFAULT_VALUE', 'flags': ['']}",
        ]),
        RpcValue::from(vec!["my_id", "none, array"]),
        RpcValue::from(vec!["system.listMethods", "none, array"]),
    ]);

    let entries = RpcValue::from(vec![
        output_object("entry", &[
            ("type", "directory".into()),
            ("name", "results".into()),
        ]),
        output_object("entry", &[("type", "file".into()), ("name", "notes.txt".into())]),
    ]);
    let listing: RpcValue = [("relative_path", RpcValue::from("/")), ("entries", entries)]
        .into_iter()
        .collect();
    let ls = method_result(
        vec![
            output_object("start", &[]),
            output_object("dir_listings", &[("dir_listings", RpcValue::from(vec![listing]))]),
            output_object("end", &[]),
        ],
        0,
        "OK",
    );

    let cat = method_result(
        vec![output_object("file_output", &[
            ("path", "notes.txt".into()),
            ("lines", RpcValue::from(vec!["first line\n", "second line\n"])),
        ])],
        0,
        "OK",
    );

    let mut handlers = HashMap::new();
    handlers.insert("AllMethodSignatures".to_string(), MockResponse::Value(signatures));
    handlers.insert("my_id".to_string(), MockResponse::Value(RpcValue::from(TEST_DN)));
    handlers.insert("ls".to_string(), MockResponse::Value(ls));
    handlers.insert("cat".to_string(), MockResponse::Value(cat));
    handlers
}

impl MockService {
    /// Create and start a new mock service.
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock service");
        let addr = listener.local_addr().expect("Failed to read local address");

        let requests = Arc::new(Mutex::new(Vec::new()));
        let handlers = Arc::new(Mutex::new(default_handlers()));
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

        let server_requests = Arc::clone(&requests);
        let server_handlers = Arc::clone(&handlers);
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    accepted = listener.accept() => {
                        let Ok((stream, _)) = accepted else { continue };
                        let requests = Arc::clone(&server_requests);
                        let handlers = Arc::clone(&server_handlers);
                        tokio::spawn(handle_connection(stream, requests, handlers));
                    }
                }
            }
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            requests,
            handlers,
        }
    }

    /// XML-RPC endpoint URL; the upload handler lives next to it.
    pub fn url(&self) -> String {
        format!("http://{}/cgi-bin/xmlrpcinterface.py", self.addr)
    }

    pub fn set_response(&self, method: &str, response: MockResponse) {
        self.handlers
            .lock()
            .unwrap()
            .insert(method.to_string(), response);
    }

    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request_for(&self, method: &str) -> Option<RecordedRequest> {
        self.get_requests()
            .into_iter()
            .rev()
            .find(|r| r.method == method)
    }

    pub fn clear_requests(&self) {
        self.requests.lock().unwrap().clear();
    }
}

impl Drop for MockService {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

async fn read_body(
    reader: &mut BufReader<TcpStream>,
    content_length: Option<usize>,
    chunked: bool,
) -> Option<Vec<u8>> {
    if !chunked {
        let mut body = vec![0u8; content_length.unwrap_or(0)];
        reader.read_exact(&mut body).await.ok()?;
        return Some(body);
    }

    let mut body = Vec::new();
    loop {
        let mut size_line = String::new();
        reader.read_line(&mut size_line).await.ok()?;
        let size = usize::from_str_radix(size_line.trim(), 16).ok()?;
        let mut chunk = vec![0u8; size + 2];
        reader.read_exact(&mut chunk).await.ok()?;
        if size == 0 {
            return Some(body);
        }
        body.extend_from_slice(&chunk[..size]);
    }
}

async fn handle_connection(
    stream: TcpStream,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    handlers: Arc<Mutex<HashMap<String, MockResponse>>>,
) {
    let mut reader = BufReader::new(stream);

    let mut request_line = String::new();
    if reader.read_line(&mut request_line).await.unwrap_or(0) == 0 {
        return;
    }
    let path = request_line
        .split_whitespace()
        .nth(1)
        .unwrap_or("/")
        .to_string();

    let mut content_length = None;
    let mut chunked = false;
    loop {
        let mut line = String::new();
        if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
            return;
        }
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((name, value)) = line.split_once(':') {
            if name.eq_ignore_ascii_case("content-length") {
                content_length = value.trim().parse().ok();
            } else if name.eq_ignore_ascii_case("transfer-encoding") {
                chunked = value.trim().eq_ignore_ascii_case("chunked");
            }
        }
    }

    let Some(body) = read_body(&mut reader, content_length, chunked).await else {
        return;
    };
    let body = String::from_utf8_lossy(&body).into_owned();

    let (status, payload) = if path.ends_with("upload.py") {
        requests.lock().unwrap().push(RecordedRequest {
            method: "upload".to_string(),
            params: None,
            body,
        });
        (200, "Upload complete".to_string())
    } else {
        respond_to_call(body, &requests, &handlers)
    };

    let reason = if status == 200 { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/xml\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        payload.len(),
        payload
    );
    let mut stream = reader.into_inner();
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn respond_to_call(
    body: String,
    requests: &Mutex<Vec<RecordedRequest>>,
    handlers: &Mutex<HashMap<String, MockResponse>>,
) -> (u16, String) {
    let Ok(call) = parse_document(&body) else {
        return (400, "bad request".to_string());
    };
    let method = call
        .first_named("methodName")
        .map(XmlElement::text)
        .unwrap_or_default();
    let params = call
        .find_descendant("value")
        .and_then(|value| decode_element(value).ok());

    requests.lock().unwrap().push(RecordedRequest {
        method: method.clone(),
        params,
        body,
    });

    let response = handlers
        .lock()
        .unwrap()
        .get(&method)
        .cloned()
        .unwrap_or_else(|| MockResponse::Fault {
            code: -32601,
            message: format!("method \"{}\" is not supported", method),
        });

    match response {
        MockResponse::Value(value) => {
            let root = XmlElement::new("methodResponse").with_child(
                XmlElement::new("params").with_child(
                    XmlElement::new("param").with_child(
                        XmlElement::new("value").with_child(encode(&value).unwrap()),
                    ),
                ),
            );
            (200, write_document(&root).unwrap())
        }
        MockResponse::Fault { code, message } => {
            let fault = RpcValue::fault(code, message);
            let root = XmlElement::new("methodResponse").with_child(
                XmlElement::new("fault")
                    .with_child(XmlElement::new("value").with_child(encode(&fault).unwrap())),
            );
            (200, write_document(&root).unwrap())
        }
        MockResponse::HttpStatus(status) => (status, "service error".to_string()),
        MockResponse::Malformed(text) => (200, text),
    }
}
