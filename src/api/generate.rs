use serde_json::Value;

use crate::client::OllamaClient;
use crate::endpoints::Endpoint;
use crate::error::Result;
use crate::http::Transport;
use crate::http::request::OperationBody;

impl<T: Transport> OllamaClient<T> {
    /// Completes the configured prompt with the configured model.
    pub async fn generate(&mut self) -> Result<Value> {
        let payload = self.request_mut().build_payload(OperationBody::Generate);
        self.dispatch(Endpoint::Generate, Some(payload)).await
    }
}
