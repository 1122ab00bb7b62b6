use serde_json::Value;

use crate::client::OllamaClient;
use crate::endpoints::Endpoint;
use crate::error::Result;
use crate::http::Transport;
use crate::http::request::OperationBody;

impl<T: Transport> OllamaClient<T> {
    /// Requests embeddings; the text to embed goes in through the options
    /// (`prompt`), alongside the configured keep-alive.
    pub async fn embeddings(&mut self, model: Option<&str>) -> Result<Value> {
        let payload = self
            .request_mut()
            .build_payload(OperationBody::Embeddings { model });
        self.dispatch(Endpoint::Embeddings, Some(payload)).await
    }
}
