//! XML-RPC value marshaling and transport for gridshell.
//!
//! Converts [`RpcValue`] trees to and from the XML-RPC element structure,
//! packs method calls into request documents, unpacks responses, and carries
//! them over HTTP through an [`RpcClient`].

#![deny(clippy::all)]

mod client;
mod codec;
mod error;
pub mod error_codes;
mod message;
mod mock_client;
mod tree;
mod value;

pub use client::HttpClient;
pub use client::HttpClientConfig;
pub use client::RpcClient;
pub use client::default_upload_url;
pub use codec::NumberStyle;
pub use codec::decode;
pub use codec::decode_element;
pub use codec::encode;
pub use codec::encode_with;
pub use error::ClientError;
pub use error::MarshalError;
pub use message::build_call;
pub use message::pack_message;
pub use message::unpack_message;
pub use mock_client::MockClient;
pub use tree::XmlElement;
pub use tree::XmlNode;
pub use tree::parse_document;
pub use tree::write_document;
pub use value::Fault;
pub use value::RpcValue;
pub use value::Struct;

pub type Result<T> = std::result::Result<T, ClientError>;
