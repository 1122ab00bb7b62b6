mod streaming_client_tests;

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use futures_util::{StreamExt, stream};

use crate::client::OllamaClient;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::http::{ByteStream, Transport, TransportRequest};

/// What the scripted server answers with.
#[derive(Clone)]
pub(crate) enum Reply {
    Body(&'static str),
    Chunks(Vec<&'static str>),
    /// Sends the chunks, then never finishes.
    Stall(Vec<&'static str>),
    Fail(ClientError),
}

/// In-memory transport that records requests and replays a fixed reply.
#[derive(Clone)]
pub(crate) struct ScriptedTransport {
    reply: Reply,
    requests: Arc<Mutex<Vec<TransportRequest>>>,
}

impl ScriptedTransport {
    pub(crate) fn new(reply: Reply) -> Self {
        Self {
            reply,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn last_request(&self) -> TransportRequest {
        self.requests().pop().expect("no request was sent")
    }

    fn record(&self, request: TransportRequest) {
        self.requests.lock().unwrap().push(request);
    }
}

impl Transport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<Bytes> {
        self.record(request);
        match &self.reply {
            Reply::Body(body) => Ok(Bytes::from_static(body.as_bytes())),
            Reply::Chunks(chunks) | Reply::Stall(chunks) => Ok(Bytes::from(chunks.concat())),
            Reply::Fail(err) => Err(err.clone()),
        }
    }

    async fn send_streaming(&self, request: TransportRequest) -> Result<ByteStream> {
        self.record(request);
        let chunks = |parts: &[&'static str]| {
            stream::iter(
                parts
                    .iter()
                    .map(|part| Ok(Bytes::from_static(part.as_bytes())))
                    .collect::<Vec<_>>(),
            )
        };

        match &self.reply {
            Reply::Body(body) => Ok(Box::pin(chunks(&[*body]))),
            Reply::Chunks(parts) => Ok(Box::pin(chunks(parts.as_slice()))),
            Reply::Stall(parts) => Ok(Box::pin(
                chunks(parts.as_slice()).chain(stream::pending()),
            )),
            Reply::Fail(err) => Err(err.clone()),
        }
    }
}

pub(crate) fn client_with(reply: Reply) -> (OllamaClient<ScriptedTransport>, ScriptedTransport) {
    let transport = ScriptedTransport::new(reply);
    let client = OllamaClient::with_transport(
        ClientConfig::new("http://localhost:11434", Some("llama2")),
        transport.clone(),
    )
    .expect("valid config");
    (client, transport)
}
