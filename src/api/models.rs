use serde_json::Value;

use crate::client::OllamaClient;
use crate::endpoints::Endpoint;
use crate::error::Result;
use crate::http::Transport;
use crate::http::request::OperationBody;

impl<T: Transport> OllamaClient<T> {
    /// Model details for `model`, or the configured model.
    pub async fn show(&mut self, model: Option<&str>, verbose: bool) -> Result<Value> {
        let payload = self
            .request_mut()
            .build_payload(OperationBody::Show { model, verbose });
        self.dispatch(Endpoint::Show, Some(payload)).await
    }

    pub async fn list_local_models(&mut self) -> Result<Value> {
        self.dispatch(Endpoint::Tags, None).await
    }

    pub async fn list_running_models(&mut self) -> Result<Value> {
        self.dispatch(Endpoint::Ps, None).await
    }
}
