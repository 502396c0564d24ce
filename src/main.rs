use bedrock_embed::config::Command;
use bedrock_embed::core::{ConfigProvider, SentenceEncoder};
use bedrock_embed::utils::error::EmbedError;
use bedrock_embed::utils::{logger, validation::Validate};
use bedrock_embed::{
    build_invoker, BenchmarkEncoder, CliConfig, EmbedConfig, EncodeRunner, LocalStorage,
    TitanEmbedder,
};
use clap::Parser;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting bedrock-embed");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 載入並驗證配置
    let config = match cli.resolve().and_then(|config| config.validate().map(|_| config)) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
            eprintln!("❌ {}", e.user_friendly_message());
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&cli.command, &config).await {
        tracing::error!(
            "❌ Embedding failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        // 依錯誤嚴重程度決定退出碼
        std::process::exit(e.severity().exit_code());
    }

    Ok(())
}

async fn run(command: &Command, config: &EmbedConfig) -> Result<(), EmbedError> {
    let invoker = build_invoker(config).await?;
    let embedder = TitanEmbedder::new(invoker, config.model_id())
        .with_max_input_chars(config.embedding.max_input_chars);

    match command {
        Command::Embed { text } => {
            let embedding = embedder
                .generate_embedding(text, config.dimension(), config.normalize())
                .await?;
            tracing::info!(
                "✅ Generated {}-dimensional embedding",
                embedding.vector.len()
            );
            println!("{}", serde_json::to_string(&embedding)?);
        }
        Command::Encode { input, .. } => {
            let encoder = BenchmarkEncoder::new(embedder, config.dimension(), config.normalize());
            tracing::info!("Encoding with {:?}", encoder.model_meta());

            let storage = LocalStorage::new(".");
            let runner =
                EncodeRunner::new(storage, encoder, config.encode.batch_size, config.encode.format);

            let output_dir = &config.encode.output_dir;
            let summary = runner.run(input, output_dir).await?;
            let summary_path = runner.write_summary(output_dir, &summary).await?;

            tracing::info!(
                "✅ Encoded {} sentences ({} empty, {} truncated, {} input tokens)",
                summary.sentences,
                summary.empty_inputs,
                summary.truncated_inputs,
                summary.input_tokens
            );
            println!("📁 Embeddings saved to: {}", summary.output_path);
            println!("📁 Summary saved to: {}", summary_path);
        }
    }

    Ok(())
}
