pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::adapters::Transport;
#[cfg(feature = "cli")]
use crate::core::runner::OutputFormat;
#[cfg(feature = "cli")]
use crate::core::EmbeddingDimension;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use toml_config::EmbedConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "bedrock-embed")]
#[command(about = "Generate text embeddings with Amazon Titan on Bedrock")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[arg(long, global = true)]
    pub region: Option<String>,

    /// AWS shared config profile
    #[arg(long, global = true)]
    pub profile: Option<String>,

    #[arg(long, global = true)]
    pub model_id: Option<String>,

    /// Override the Bedrock runtime endpoint
    #[arg(long, global = true)]
    pub endpoint_url: Option<String>,

    /// sdk (SigV4 credential chain) or http (bearer API key)
    #[arg(long, global = true)]
    pub transport: Option<Transport>,

    /// Total attempts per request, including retries
    #[arg(long, global = true)]
    pub max_attempts: Option<u32>,

    /// Output dimension: 256, 512 or 1024
    #[arg(long, global = true)]
    pub dimension: Option<EmbeddingDimension>,

    #[arg(long, global = true)]
    pub no_normalize: bool,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Embed a single text and print the vector as JSON
    Embed {
        text: String,
    },
    /// Encode a sentences file for a benchmark harness
    Encode {
        /// .txt (one sentence per line) or .jsonl ({"text": ...} per line)
        #[arg(short, long)]
        input: String,

        #[arg(short, long)]
        output_dir: Option<String>,

        #[arg(long)]
        format: Option<OutputFormat>,

        #[arg(long)]
        batch_size: Option<usize>,
    },
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// 載入設定檔 (若有) 並套用命令列覆蓋
    pub fn resolve(&self) -> Result<EmbedConfig> {
        let mut config = match &self.config {
            Some(path) => EmbedConfig::from_file(path)?,
            None => EmbedConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    pub fn apply_overrides(&self, config: &mut EmbedConfig) {
        if let Some(region) = &self.region {
            config.client.region = region.clone();
        }
        if let Some(profile) = &self.profile {
            config.client.profile = Some(profile.clone());
        }
        if let Some(model_id) = &self.model_id {
            config.client.model_id = model_id.clone();
        }
        if let Some(endpoint_url) = &self.endpoint_url {
            config.client.endpoint_url = Some(endpoint_url.clone());
        }
        if let Some(transport) = self.transport {
            config.client.transport = transport;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.client.max_attempts = max_attempts;
        }
        if let Some(dimension) = self.dimension {
            config.embedding.dimension = dimension;
        }
        if self.no_normalize {
            config.embedding.normalize = false;
        }

        if let Command::Encode {
            output_dir,
            format,
            batch_size,
            ..
        } = &self.command
        {
            if let Some(output_dir) = output_dir {
                config.encode.output_dir = output_dir.clone();
            }
            if let Some(format) = format {
                config.encode.format = *format;
            }
            if let Some(batch_size) = batch_size {
                config.encode.batch_size = *batch_size;
            }
        }
    }
}
