use serde_json::{Map, Value};

use crate::config::ClientConfig;

/// Free-form fields merged over every operation payload.
pub type Options = Map<String, Value>;

/// Whether building a payload writes it back into the stored options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PayloadRetention {
    /// Stored options are left untouched.
    #[default]
    Fresh,
    /// The merged payload replaces the stored options, so later calls on the
    /// same builder see earlier payload fields.
    Accumulate,
}

/// Ordered field map sent as the JSON request body.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OutgoingPayload {
    fields: Map<String, Value>,
}

impl OutgoingPayload {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_required<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.fields.insert(key.to_string(), value.into());
        self
    }

    /// Adds the field only when a value is present.
    pub fn add_optional<V: Into<Value>>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.add_required(key, value),
            None => self,
        }
    }

    /// Overlays `options`; an existing key keeps its position but takes the
    /// option's value.
    pub fn merge(mut self, options: &Options) -> Self {
        for (key, value) in options {
            self.fields.insert(key.clone(), value.clone());
        }
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn to_json(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

/// Operation-specific base fields.
pub enum OperationBody<'a> {
    Generate,
    Chat {
        messages: Value,
    },
    Show {
        model: Option<&'a str>,
        verbose: bool,
    },
    Copy {
        destination: &'a str,
        source: Option<&'a str>,
    },
    Delete {
        model: Option<&'a str>,
    },
    Pull {
        model: Option<&'a str>,
        insecure: bool,
    },
    Embeddings {
        model: Option<&'a str>,
    },
}

/// Fluent request state shared by every operation of one client.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    base_url: String,
    model: Option<String>,
    prompt: Option<String>,
    keep_alive_seconds: i64,
    options: Options,
    retention: PayloadRetention,
}

impl RequestBuilder {
    pub fn new(base_url: &str) -> Self {
        Self::from_config(&ClientConfig::new(base_url, None))
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            prompt: None,
            keep_alive_seconds: config.keep_alive_seconds,
            options: Options::new(),
            retention: config.payload_retention,
        }
    }

    pub fn base_url(&mut self, base_url: &str) -> &mut Self {
        self.base_url = base_url.to_string();
        self
    }

    pub fn model(&mut self, model: &str) -> &mut Self {
        self.model = Some(model.to_string());
        self
    }

    pub fn prompt(&mut self, prompt: &str) -> &mut Self {
        self.prompt = Some(prompt.to_string());
        self
    }

    pub fn keep_alive(&mut self, seconds: i64) -> &mut Self {
        self.keep_alive_seconds = seconds;
        self
    }

    /// Replaces the stored options.
    pub fn options(&mut self, options: Options) -> &mut Self {
        self.options = options;
        self
    }

    /// Shallow-merges `append` over the stored options; new keys win.
    pub fn append_options(&mut self, append: Options) -> &mut Self {
        self.options.extend(append);
        self
    }

    pub fn retention(&mut self, retention: PayloadRetention) -> &mut Self {
        self.retention = retention;
        self
    }

    pub fn current_base_url(&self) -> &str {
        &self.base_url
    }

    pub fn current_model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    pub fn current_prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    pub fn current_keep_alive(&self) -> i64 {
        self.keep_alive_seconds
    }

    pub fn current_options(&self) -> &Options {
        &self.options
    }

    pub fn current_retention(&self) -> PayloadRetention {
        self.retention
    }

    /// Merges the operation's base fields with the stored options, options
    /// taking precedence.
    pub fn build_payload(&mut self, body: OperationBody<'_>) -> OutgoingPayload {
        let configured_model = self.model.as_deref();

        let base = match body {
            OperationBody::Generate => OutgoingPayload::new()
                .add_optional("model", configured_model)
                .add_optional("prompt", self.prompt.as_deref()),
            OperationBody::Chat { messages } => OutgoingPayload::new()
                .add_optional("model", configured_model)
                .add_required("messages", messages),
            OperationBody::Show { model, verbose } => OutgoingPayload::new()
                .add_optional("model", model.or(configured_model))
                .add_required("verbose", verbose),
            OperationBody::Copy {
                destination,
                source,
            } => OutgoingPayload::new()
                .add_optional("source", source.or(configured_model))
                .add_required("destination", destination),
            OperationBody::Delete { model } => {
                OutgoingPayload::new().add_optional("model", model.or(configured_model))
            }
            OperationBody::Pull { model, insecure } => OutgoingPayload::new()
                .add_optional("model", model.or(configured_model))
                .add_required("insecure", insecure),
            OperationBody::Embeddings { model } => OutgoingPayload::new()
                .add_optional("model", model.or(configured_model))
                .add_required("keep_alive", self.keep_alive_seconds),
        };

        let payload = base.merge(&self.options);

        if self.retention == PayloadRetention::Accumulate {
            self.options = payload.fields().clone();
        }

        payload
    }
}

#[cfg(test)]
mod request_tests {
    use serde_json::json;

    use super::*;

    fn options(value: Value) -> Options {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn generate_payload_has_model_then_prompt() {
        let mut builder = RequestBuilder::new("http://localhost:11434");
        builder.model("llama2").prompt("hi");

        let payload = builder.build_payload(OperationBody::Generate);
        assert_eq!(payload.to_json(), r#"{"model":"llama2","prompt":"hi"}"#);
    }

    #[test]
    fn append_options_merges_over_existing() {
        let mut builder = RequestBuilder::new("http://localhost:11434");
        builder
            .options(options(json!({"model": "x"})))
            .append_options(options(json!({"temperature": 0.7})));

        assert_eq!(
            Value::Object(builder.current_options().clone()),
            json!({"model": "x", "temperature": 0.7})
        );
    }

    #[test]
    fn options_override_base_fields_in_place() {
        let mut builder = RequestBuilder::new("http://localhost:11434");
        builder
            .model("llama2")
            .prompt("hi")
            .options(options(json!({"stream": false, "model": "mistral"})));

        let payload = builder.build_payload(OperationBody::Generate);
        assert_eq!(
            payload.to_json(),
            r#"{"model":"mistral","prompt":"hi","stream":false}"#
        );
    }

    #[test]
    fn missing_model_is_omitted() {
        let mut builder = RequestBuilder::new("http://localhost:11434");
        builder.prompt("hi");

        let payload = builder.build_payload(OperationBody::Generate);
        assert!(payload.get("model").is_none());
        assert_eq!(payload.to_json(), r#"{"prompt":"hi"}"#);
    }

    #[test]
    fn explicit_model_argument_beats_configured_model() {
        let mut builder = RequestBuilder::new("http://localhost:11434");
        builder.model("llama2");

        let payload = builder.build_payload(OperationBody::Copy {
            destination: "llama2-backup",
            source: Some("llama2:13b"),
        });
        assert_eq!(
            payload.into_value(),
            json!({"source": "llama2:13b", "destination": "llama2-backup"})
        );

        let payload = builder.build_payload(OperationBody::Delete { model: None });
        assert_eq!(payload.into_value(), json!({"model": "llama2"}));
    }

    #[test]
    fn embeddings_carry_keep_alive() {
        let mut builder = RequestBuilder::new("http://localhost:11434");
        builder.model("all-minilm").keep_alive(60);

        let payload = builder.build_payload(OperationBody::Embeddings { model: None });
        assert_eq!(
            payload.to_json(),
            r#"{"model":"all-minilm","keep_alive":60}"#
        );
    }

    #[test]
    fn fresh_retention_leaves_options_alone() {
        let mut builder = RequestBuilder::new("http://localhost:11434");
        builder.model("llama2").prompt("first");
        builder.build_payload(OperationBody::Generate);

        assert!(builder.current_options().is_empty());

        builder.prompt("second");
        let payload = builder.build_payload(OperationBody::Generate);
        assert_eq!(payload.get("prompt"), Some(&json!("second")));
    }

    #[test]
    fn accumulate_retention_leaks_previous_payload() {
        let mut builder = RequestBuilder::new("http://localhost:11434");
        builder
            .retention(PayloadRetention::Accumulate)
            .model("llama2")
            .prompt("first");
        builder.build_payload(OperationBody::Generate);

        assert_eq!(
            Value::Object(builder.current_options().clone()),
            json!({"model": "llama2", "prompt": "first"})
        );

        builder.prompt("second");
        let payload = builder.build_payload(OperationBody::Generate);
        assert_eq!(payload.get("prompt"), Some(&json!("first")));

        let payload = builder.build_payload(OperationBody::Pull {
            model: Some("mistral"),
            insecure: false,
        });
        assert_eq!(
            payload.into_value(),
            json!({"model": "llama2", "insecure": false, "prompt": "first"})
        );
    }
}
