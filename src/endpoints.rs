use reqwest::Method;

use crate::constants::{
    OLLAMA_CHAT, OLLAMA_COPY, OLLAMA_DELETE, OLLAMA_EMBEDDINGS, OLLAMA_GENERATE, OLLAMA_PS,
    OLLAMA_PULL, OLLAMA_SHOW, OLLAMA_TAGS,
};

/// Server operations the client can invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Generate,
    Chat,
    Show,
    Copy,
    Delete,
    Pull,
    Embeddings,
    Tags,
    Ps,
}

impl Endpoint {
    pub const ALL: [Endpoint; 9] = [
        Endpoint::Generate,
        Endpoint::Chat,
        Endpoint::Show,
        Endpoint::Copy,
        Endpoint::Delete,
        Endpoint::Pull,
        Endpoint::Embeddings,
        Endpoint::Tags,
        Endpoint::Ps,
    ];

    pub fn method(self) -> Method {
        match self {
            Endpoint::Delete => Method::DELETE,
            Endpoint::Tags | Endpoint::Ps => Method::GET,
            _ => Method::POST,
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Generate => OLLAMA_GENERATE,
            Endpoint::Chat => OLLAMA_CHAT,
            Endpoint::Show => OLLAMA_SHOW,
            Endpoint::Copy => OLLAMA_COPY,
            Endpoint::Delete => OLLAMA_DELETE,
            Endpoint::Pull => OLLAMA_PULL,
            Endpoint::Embeddings => OLLAMA_EMBEDDINGS,
            Endpoint::Tags => OLLAMA_TAGS,
            Endpoint::Ps => OLLAMA_PS,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Endpoint::Generate => "generate",
            Endpoint::Chat => "chat",
            Endpoint::Show => "show",
            Endpoint::Copy => "copy",
            Endpoint::Delete => "delete",
            Endpoint::Pull => "pull",
            Endpoint::Embeddings => "embeddings",
            Endpoint::Tags => "list local models",
            Endpoint::Ps => "list running models",
        }
    }

    /// GET listings go out without a JSON body.
    pub fn has_body(self) -> bool {
        self.method() != Method::GET
    }
}

/// Joins a base URL and an endpoint path with exactly one slash between them.
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{}/{}", base, path)
}
