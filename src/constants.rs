/// Ollama API endpoints
pub const OLLAMA_GENERATE: &str = "/api/generate";
pub const OLLAMA_CHAT: &str = "/api/chat";
pub const OLLAMA_SHOW: &str = "/api/show";
pub const OLLAMA_COPY: &str = "/api/copy";
pub const OLLAMA_DELETE: &str = "/api/delete";
pub const OLLAMA_PULL: &str = "/api/pull";
pub const OLLAMA_EMBEDDINGS: &str = "/api/embeddings";
pub const OLLAMA_TAGS: &str = "/api/tags";
pub const OLLAMA_PS: &str = "/api/ps";

/// Client defaults
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";
pub const DEFAULT_KEEP_ALIVE_SECONDS: i64 = 300;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 300;
pub const DEFAULT_MAX_BUFFER_SIZE: usize = 16 * 1024 * 1024;
pub const INITIAL_BUFFER_CAPACITY: usize = 4096;

/// Request headers
pub const CONTENT_TYPE_JSON: &str = "application/json; charset=utf-8";

/// Error messages
pub const ERROR_CANCELLED: &str = "request cancelled";
pub const ERROR_SERVER_UNAVAILABLE: &str = "Ollama server not available";
pub const ERROR_TIMEOUT: &str = "request timed out";
pub const ERROR_BUFFER_OVERFLOW: &str = "stream buffer limit exceeded";

/// Logging prefixes
pub const LOG_PREFIX_SUCCESS: &str = "✅";
pub const LOG_PREFIX_ERROR: &str = "❌";
pub const LOG_PREFIX_WARNING: &str = "⚠️";
