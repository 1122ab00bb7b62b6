use serde_json::Value;

use crate::client::OllamaClient;
use crate::endpoints::Endpoint;
use crate::error::Result;
use crate::http::Transport;
use crate::http::request::OperationBody;

impl<T: Transport> OllamaClient<T> {
    /// Copies `source` (or the configured model) to `destination`.
    pub async fn copy(&mut self, destination: &str, source: Option<&str>) -> Result<Value> {
        let payload = self.request_mut().build_payload(OperationBody::Copy {
            destination,
            source,
        });
        self.dispatch(Endpoint::Copy, Some(payload)).await
    }

    pub async fn delete(&mut self, model: Option<&str>) -> Result<Value> {
        let payload = self
            .request_mut()
            .build_payload(OperationBody::Delete { model });
        self.dispatch(Endpoint::Delete, Some(payload)).await
    }

    /// Downloads a model. With a sink registered, progress objects arrive as
    /// the server reports them.
    pub async fn pull(&mut self, model: Option<&str>, insecure: bool) -> Result<Value> {
        let payload = self
            .request_mut()
            .build_payload(OperationBody::Pull { model, insecure });
        self.dispatch(Endpoint::Pull, Some(payload)).await
    }
}
