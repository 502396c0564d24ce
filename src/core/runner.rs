use crate::core::{EncodeSummary, Result, SentenceEncoder, Storage};
use crate::utils::error::EmbedError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Jsonl,
    Csv,
}

impl OutputFormat {
    pub fn file_name(self) -> &'static str {
        match self {
            OutputFormat::Jsonl => "embeddings.jsonl",
            OutputFormat::Csv => "embeddings.csv",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = EmbedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jsonl" => Ok(OutputFormat::Jsonl),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(EmbedError::InvalidConfigValueError {
                field: "format".to_string(),
                value: other.to_string(),
                reason: "Unsupported format. Valid formats: jsonl, csv".to_string(),
            }),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Jsonl => write!(f, "jsonl"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[derive(Deserialize)]
struct InputLine {
    text: String,
}

#[derive(Serialize)]
struct OutputLine<'a> {
    index: usize,
    text: &'a str,
    embedding: &'a [f32],
}

/// Encodes a sentences file and writes the matrix where the benchmark harness can load it.
pub struct EncodeRunner<S: Storage, E: SentenceEncoder> {
    storage: S,
    encoder: E,
    batch_size: usize,
    format: OutputFormat,
}

impl<S: Storage, E: SentenceEncoder> EncodeRunner<S, E> {
    pub fn new(storage: S, encoder: E, batch_size: usize, format: OutputFormat) -> Self {
        Self {
            storage,
            encoder,
            batch_size,
            format,
        }
    }

    pub async fn run(&self, input_path: &str, output_dir: &str) -> Result<EncodeSummary> {
        tracing::info!("Reading sentences from {}", input_path);
        let raw = self.storage.read_file(input_path).await?;
        let sentences = parse_sentences(input_path, &raw)?;
        tracing::info!("Loaded {} sentences", sentences.len());

        let rows = self.encoder.encode(&sentences, self.batch_size).await?;
        if rows.len() != sentences.len() {
            return Err(EmbedError::ValidationError {
                message: format!(
                    "Encoder returned {} rows for {} sentences",
                    rows.len(),
                    sentences.len()
                ),
            });
        }

        let data = match self.format {
            OutputFormat::Jsonl => render_jsonl(&sentences, &rows)?,
            OutputFormat::Csv => render_csv(&sentences, &rows)?,
        };
        let output_path = format!(
            "{}/{}",
            output_dir.trim_end_matches('/'),
            self.format.file_name()
        );
        tracing::debug!("Writing {} bytes to {}", data.len(), output_path);
        self.storage.write_file(&output_path, &data).await?;

        let stats = self.encoder.stats();
        let summary = EncodeSummary {
            model: self.encoder.model_meta().clone(),
            sentences: sentences.len(),
            embedded: stats.embedded,
            empty_inputs: stats.empty_inputs,
            truncated_inputs: stats.truncated_inputs,
            input_tokens: stats.input_tokens,
            output_path: output_path.clone(),
            generated_at: chrono::Utc::now(),
        };

        Ok(summary)
    }

    /// Writes `summary.json` next to the embeddings file.
    pub async fn write_summary(
        &self,
        output_dir: &str,
        summary: &EncodeSummary,
    ) -> Result<String> {
        let path = format!("{}/summary.json", output_dir.trim_end_matches('/'));
        let json = serde_json::to_string_pretty(summary)?;
        self.storage.write_file(&path, json.as_bytes()).await?;
        Ok(path)
    }
}

pub fn parse_sentences(input_path: &str, raw: &[u8]) -> Result<Vec<String>> {
    let content = std::str::from_utf8(raw).map_err(|e| EmbedError::ValidationError {
        message: format!("Input file is not valid UTF-8: {}", e),
    })?;

    if input_path.ends_with(".jsonl") {
        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| Ok(serde_json::from_str::<InputLine>(line)?.text))
            .collect()
    } else {
        // 純文字：每行一句，空行保留為空句子
        Ok(content.lines().map(str::to_string).collect())
    }
}

fn render_jsonl(sentences: &[String], rows: &[Vec<f32>]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for (index, (text, embedding)) in sentences.iter().zip(rows).enumerate() {
        serde_json::to_writer(
            &mut out,
            &OutputLine {
                index,
                text,
                embedding,
            },
        )?;
        out.push(b'\n');
    }
    Ok(out)
}

fn render_csv(sentences: &[String], rows: &[Vec<f32>]) -> Result<Vec<u8>> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let width = rows.first().map(Vec::len).unwrap_or(0);
    let mut header = vec!["index".to_string(), "text".to_string()];
    header.extend((0..width).map(|i| format!("e{}", i)));
    writer.write_record(&header)?;

    for (index, (text, embedding)) in sentences.iter().zip(rows).enumerate() {
        let mut record = Vec::with_capacity(embedding.len() + 2);
        record.push(index.to_string());
        record.push(text.clone());
        record.extend(embedding.iter().map(|v| v.to_string()));
        writer.write_record(&record)?;
    }

    writer.into_inner().map_err(|e| {
        EmbedError::IoError(std::io::Error::new(e.error().kind(), e.error().to_string()))
    })
}
