use std::io::Write;

use clap::{Parser, Subcommand};
use serde::Deserialize;
use serde_json::{Value, json};

use ollama_stream_client::config::parse_keep_alive_seconds;
use ollama_stream_client::constants::{DEFAULT_BASE_URL, DEFAULT_MAX_BUFFER_SIZE};
use ollama_stream_client::{
    ChatMessage, ClientConfig, ClientError, DecodeErrorPolicy, DecodedEvent, DecoderOptions,
    EventSink, OllamaClient, Options, PayloadRetention, ScanMode, messages,
};

#[derive(Parser, Debug, Clone)]
#[command(name = "ollama-client")]
#[command(about = "ollama API client with incremental stream decoding")]
pub struct Config {
    #[arg(long, default_value = DEFAULT_BASE_URL, help = "ollama server url")]
    pub base_url: String,

    #[arg(long, help = "model used when a command does not name one")]
    pub model: Option<String>,

    #[arg(
        long,
        default_value = "300",
        help = "keep-alive for embeddings (seconds or durations like '5m')"
    )]
    pub keep_alive: String,

    #[arg(long, default_value = "300", help = "request timeout in seconds")]
    pub timeout_seconds: u64,

    #[arg(
        long,
        default_value_t = DEFAULT_MAX_BUFFER_SIZE,
        help = "largest unfinished object kept while streaming, in bytes"
    )]
    pub max_buffer_size: usize,

    #[arg(long, help = "skip malformed stream objects instead of aborting")]
    pub skip_malformed: bool,

    #[arg(long, help = "count braces inside string values too")]
    pub literal_braces: bool,

    #[arg(long, help = "merge each payload back into the options")]
    pub accumulate_options: bool,

    #[arg(
        long,
        default_value = "warn",
        help = "log level (off, error, warn, info, debug, trace)"
    )]
    pub log_level: String,

    #[arg(long, help = "stream the response as it is generated")]
    pub stream: bool,

    #[arg(long, help = "with --stream, print each raw object instead of its text")]
    pub raw: bool,

    #[arg(
        long = "option",
        value_name = "KEY=VALUE",
        help = "extra payload field; VALUE is parsed as JSON when possible"
    )]
    pub options: Vec<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Complete a prompt
    Generate { prompt: String },
    /// Send one chat message
    Chat {
        message: String,
        #[arg(long)]
        system: Option<String>,
    },
    /// Show model details
    Show {
        model: Option<String>,
        #[arg(long)]
        verbose: bool,
    },
    /// Copy a model
    Copy {
        destination: String,
        #[arg(long)]
        source: Option<String>,
    },
    /// Delete a model
    Delete { model: Option<String> },
    /// Pull a model
    Pull {
        model: Option<String>,
        #[arg(long)]
        insecure: bool,
    },
    /// Embed a prompt
    Embeddings {
        prompt: String,
        #[arg(long)]
        model: Option<String>,
    },
    /// List local models
    Tags,
    /// List running models
    Ps,
}

impl Command {
    /// The server streams these unless told otherwise.
    pub fn streams_by_default(&self) -> bool {
        matches!(
            self,
            Command::Generate { .. } | Command::Chat { .. } | Command::Pull { .. }
        )
    }
}

impl Config {
    pub fn client_config(&self) -> Result<ClientConfig, ClientError> {
        let mut config = ClientConfig::new(&self.base_url, self.model.as_deref());
        config.keep_alive_seconds = parse_keep_alive_seconds(&self.keep_alive)?;
        config.timeout_seconds = self.timeout_seconds;
        config.decoder = DecoderOptions {
            scan_mode: if self.literal_braces {
                ScanMode::Literal
            } else {
                ScanMode::StringAware
            },
            error_policy: if self.skip_malformed {
                DecodeErrorPolicy::Skip
            } else {
                DecodeErrorPolicy::Abort
            },
            max_buffer_size: self.max_buffer_size,
        };
        if self.accumulate_options {
            config.payload_retention = PayloadRetention::Accumulate;
        }
        Ok(config)
    }

    /// Parses the repeated `--option KEY=VALUE` flags.
    pub fn payload_options(&self) -> Result<Options, ClientError> {
        let mut options = Options::new();

        for entry in &self.options {
            let (key, raw_value) = entry.split_once('=').ok_or_else(|| {
                ClientError::invalid_config(&format!(
                    "invalid option '{}', expected KEY=VALUE",
                    entry
                ))
            })?;
            let value = serde_json::from_str::<Value>(raw_value)
                .unwrap_or_else(|_| Value::String(raw_value.to_string()));
            options.insert(key.trim().to_string(), value);
        }

        if !self.stream && self.command.streams_by_default() && !options.contains_key("stream")
        {
            options.insert("stream".to_string(), Value::Bool(false));
        }

        Ok(options)
    }
}

pub async fn run(client: &mut OllamaClient, command: &Command) -> Result<Value, ClientError> {
    match command {
        Command::Generate { prompt } => client.prompt(prompt).generate().await,
        Command::Chat { message, system } => {
            let mut conversation = Vec::new();
            if let Some(system) = system {
                conversation.push(ChatMessage::system(system));
            }
            conversation.push(ChatMessage::user(message));
            client.chat(messages(&conversation)).await
        }
        Command::Show { model, verbose } => client.show(model.as_deref(), *verbose).await,
        Command::Copy {
            destination,
            source,
        } => client.copy(destination, source.as_deref()).await,
        Command::Delete { model } => client.delete(model.as_deref()).await,
        Command::Pull { model, insecure } => client.pull(model.as_deref(), *insecure).await,
        Command::Embeddings { prompt, model } => {
            let mut extra = Options::new();
            extra.insert("prompt".to_string(), json!(prompt));
            client
                .append_options(extra)
                .embeddings(model.as_deref())
                .await
        }
        Command::Tags => client.list_local_models().await,
        Command::Ps => client.list_running_models().await,
    }
}

#[derive(Debug, Default, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    response: Option<String>,
    #[serde(default)]
    message: Option<ChunkMessage>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    completed: Option<u64>,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    done: bool,
}

#[derive(Debug, Default, Deserialize)]
struct ChunkMessage {
    #[serde(default)]
    content: String,
}

/// Writes streamed objects to stdout as they arrive.
pub struct StreamPrinter {
    raw: bool,
}

impl StreamPrinter {
    pub fn new(raw: bool) -> Self {
        Self { raw }
    }

    /// Writes the text carried by one streamed object.
    ///
    /// Objects with no generated text or status line (show, tags, embeddings)
    /// are written out whole so nothing is silently dropped.
    fn render(&self, event: &DecodedEvent<'_>, out: &mut impl Write) -> std::io::Result<()> {
        if self.raw {
            return writeln!(out, "{}", event.raw);
        }

        let chunk = StreamChunk::deserialize(&event.value).unwrap_or_default();

        if let Some(text) = chunk.response {
            write!(out, "{}", text)?;
        } else if let Some(message) = chunk.message {
            write!(out, "{}", message.content)?;
        } else if let Some(status) = chunk.status {
            match (chunk.completed, chunk.total) {
                (Some(completed), Some(total)) if total > 0 => writeln!(
                    out,
                    "{} {:.1}%",
                    status,
                    completed as f64 * 100.0 / total as f64
                )?,
                _ => writeln!(out, "{}", status)?,
            }
        } else {
            return writeln!(out, "{}", event.raw);
        }

        if chunk.done {
            writeln!(out)?;
        }
        Ok(())
    }
}

impl EventSink for StreamPrinter {
    fn on_event(&mut self, event: &DecodedEvent<'_>) {
        let mut stdout = std::io::stdout().lock();
        if let Err(e) = self.render(event, &mut stdout).and_then(|_| stdout.flush()) {
            log::warn!("failed to write stream output: {}", e);
        }
    }

    fn on_decode_error(&mut self, error: &ClientError) {
        log::warn!("dropped malformed object: {}", error);
    }
}
