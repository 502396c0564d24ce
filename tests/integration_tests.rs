use bedrock_embed::core::ConfigProvider;
use bedrock_embed::{
    build_invoker, BenchmarkEncoder, EmbedConfig, EmbedError, EmbeddingDimension, EncodeRunner,
    LocalStorage, OutputFormat, SentenceEncoder, TitanEmbedder, Transport,
};
use anyhow::Result;
use httpmock::prelude::*;
use tempfile::TempDir;

const MODEL_PATH: &str = "/model/amazon.titan-embed-text-v2:0/invoke";

fn http_config(server: &MockServer, dimension: u32) -> EmbedConfig {
    let toml_content = format!(
        r#"
[client]
region = "us-east-1"
transport = "http"
endpoint_url = "{}"
api_key = "integration-key"
max_attempts = 2

[embedding]
dimension = {}
normalize = true
"#,
        server.base_url(),
        dimension
    );
    EmbedConfig::from_toml_str(&toml_content).unwrap()
}

#[tokio::test]
async fn test_end_to_end_embedding_over_http() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST)
            .path(MODEL_PATH)
            .header("authorization", "Bearer integration-key")
            .json_body(serde_json::json!({
                "inputText": "Amazon Bedrock is a managed service",
                "dimensions": 256,
                "normalize": true
            }));
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({
                "embedding": vec![0.0625f32; 256],
                "inputTextTokenCount": 7
            }));
    });

    let config = http_config(&server, 256);
    let invoker = build_invoker(&config).await.unwrap();
    let embedder = TitanEmbedder::new(invoker, config.model_id());

    let embedding = embedder
        .generate_embedding(
            "Amazon Bedrock is a managed service",
            config.dimension(),
            config.normalize(),
        )
        .await
        .unwrap();

    api_mock.assert();
    assert_eq!(embedding.vector.len(), 256);
    assert_eq!(embedding.dimension, EmbeddingDimension::D256);
    assert_eq!(embedding.token_count, Some(7));
}

#[tokio::test]
async fn test_wrong_vector_length_is_an_error() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(MODEL_PATH);
        then.status(200)
            .json_body(serde_json::json!({"embedding": vec![0.1f32; 1024]}));
    });

    let config = http_config(&server, 512);
    let embedder = TitanEmbedder::new(build_invoker(&config).await.unwrap(), config.model_id());

    let result = embedder
        .generate_embedding("hello", EmbeddingDimension::D512, true)
        .await;

    assert!(matches!(
        result,
        Err(EmbedError::DimensionMismatch {
            expected: 512,
            actual: 1024
        })
    ));
}

#[tokio::test]
async fn test_server_errors_are_retried_with_configured_attempts() {
    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path(MODEL_PATH);
        then.status(503)
            .json_body(serde_json::json!({"message": "Service unavailable"}));
    });

    let config = http_config(&server, 1024);
    let embedder = TitanEmbedder::new(build_invoker(&config).await.unwrap(), config.model_id());

    let result = embedder
        .generate_embedding("hello", EmbeddingDimension::D1024, true)
        .await;

    api_mock.assert_hits(2);
    assert!(matches!(result, Err(EmbedError::ServiceError { .. })));
}

#[tokio::test]
async fn test_encode_sentences_file_for_benchmark() -> Result<()> {
    let temp_dir = TempDir::new()?;
    std::fs::write(
        temp_dir.path().join("sentences.txt"),
        "A man is playing guitar.\n\nA woman is slicing onions.\n",
    )?;

    let server = MockServer::start();
    let api_mock = server.mock(|when, then| {
        when.method(POST).path(MODEL_PATH);
        then.status(200).json_body(serde_json::json!({
            "embedding": vec![0.5f32; 256],
            "inputTextTokenCount": 6
        }));
    });

    let config = http_config(&server, 256);
    assert_eq!(config.client.transport, Transport::Http);
    let embedder = TitanEmbedder::new(build_invoker(&config).await?, config.model_id());
    let encoder = BenchmarkEncoder::new(embedder, config.dimension(), config.normalize());
    assert_eq!(encoder.model_meta().revision.as_deref(), Some("0"));

    let storage = LocalStorage::new(temp_dir.path());
    let runner = EncodeRunner::new(storage, encoder, 2, OutputFormat::Jsonl);

    let summary = runner.run("sentences.txt", "out").await?;
    let summary_path = runner.write_summary("out", &summary).await?;

    // 空行不會呼叫服務
    api_mock.assert_hits(2);
    assert_eq!(summary.sentences, 3);
    assert_eq!(summary.embedded, 2);
    assert_eq!(summary.empty_inputs, 1);
    assert_eq!(summary.input_tokens, 12);

    let output = std::fs::read_to_string(temp_dir.path().join("out/embeddings.jsonl"))?;
    let rows = output
        .lines()
        .map(serde_json::from_str::<serde_json::Value>)
        .collect::<std::result::Result<Vec<_>, _>>()?;
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["text"], "A man is playing guitar.");
    assert_eq!(rows[1]["embedding"][0], 0.0);
    assert_eq!(rows[2]["embedding"].as_array().unwrap().len(), 256);

    assert!(temp_dir.path().join(summary_path).exists());
    Ok(())
}

#[tokio::test]
async fn test_encode_fails_fast_on_service_error() {
    let temp_dir = TempDir::new().unwrap();
    std::fs::write(temp_dir.path().join("sentences.txt"), "one\ntwo\n").unwrap();

    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(POST).path(MODEL_PATH);
        then.status(400)
            .json_body(serde_json::json!({"message": "Malformed input request"}));
    });

    let config = http_config(&server, 256);
    let embedder = TitanEmbedder::new(build_invoker(&config).await.unwrap(), config.model_id());
    let encoder = BenchmarkEncoder::new(embedder, config.dimension(), config.normalize());
    let runner = EncodeRunner::new(
        LocalStorage::new(temp_dir.path()),
        encoder,
        8,
        OutputFormat::Csv,
    );

    let result = runner.run("sentences.txt", "out").await;

    match result {
        Err(EmbedError::ServiceError { code, message }) => {
            assert_eq!(code, "400");
            assert_eq!(message, "Malformed input request");
        }
        other => panic!("unexpected result: {:?}", other.map(|s| s.output_path)),
    }
    assert!(!temp_dir.path().join("out/embeddings.csv").exists());
}
