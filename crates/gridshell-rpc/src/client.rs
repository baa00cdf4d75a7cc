use std::path::Path;
use std::time::Duration;

use reqwest::blocking::multipart::Form;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use tracing::debug;

use crate::error::ClientError;
use crate::message::pack_message;
use crate::message::unpack_message;
use crate::value::RpcValue;

/// Transport for XML-RPC calls against the grid service.
pub trait RpcClient {
    /// Calls `method` with positional `args` and returns the decoded result.
    ///
    /// Faults are returned as values, not errors; see [`RpcValue::as_fault`].
    fn invoke(&mut self, method: &str, args: Option<Vec<RpcValue>>)
        -> Result<RpcValue, ClientError>;

    /// Uploads `file` into `remote_dir` and returns the response body.
    fn upload(&mut self, file: &Path, remote_dir: &str) -> Result<String, ClientError>;
}

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub service_url: String,
    pub upload_url: String,
    pub timeout: Duration,
}

impl HttpClientConfig {
    pub fn new(service_url: impl Into<String>) -> Self {
        let service_url = service_url.into();
        Self {
            upload_url: default_upload_url(&service_url),
            service_url,
            timeout: Duration::from_secs(60),
        }
    }

    pub fn with_upload_url(mut self, upload_url: impl Into<String>) -> Self {
        self.upload_url = upload_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Upload form handler living next to the XML-RPC endpoint.
pub fn default_upload_url(service_url: &str) -> String {
    match service_url.rfind('/') {
        Some(idx) if !service_url[..idx].ends_with('/') => {
            format!("{}/upload.py", &service_url[..idx])
        }
        _ => format!("{}/upload.py", service_url.trim_end_matches('/')),
    }
}

pub struct HttpClient {
    http: Client,
    config: HttpClientConfig,
}

impl HttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("gridshell/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }
}

impl RpcClient for HttpClient {
    fn invoke(
        &mut self,
        method: &str,
        args: Option<Vec<RpcValue>>,
    ) -> Result<RpcValue, ClientError> {
        let body = pack_message(method, args.as_deref())?;
        debug!(method, bytes = body.len(), url = %self.config.service_url, "XML-RPC request");

        let response = self
            .http
            .post(&self.config.service_url)
            .header(CONTENT_TYPE, "text/xml")
            .body(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
            });
        }

        let text = response.text()?;
        debug!(method, bytes = text.len(), "XML-RPC response");
        Ok(unpack_message(&text)?)
    }

    fn upload(&mut self, file: &Path, remote_dir: &str) -> Result<String, ClientError> {
        let form = Form::new()
            .text("path", remote_dir.to_string())
            .file("fileupload", file)?;
        debug!(file = %file.display(), remote_dir, url = %self.config.upload_url, "upload");

        let response = self.http.post(&self.config.upload_url).multipart(form).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
            });
        }
        Ok(response.text()?)
    }
}
