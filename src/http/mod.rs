pub mod client;
pub mod error;
pub mod parsing;
pub mod request;
pub mod response;

pub use client::{ByteStream, HttpTransport, Transport, TransportRequest};
pub use request::{OperationBody, Options, OutgoingPayload, PayloadRetention, RequestBuilder};
pub use response::StreamStats;
