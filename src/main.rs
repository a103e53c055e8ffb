use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use pdf_qa::application::{self, Pipeline, QuestionRunner};
use pdf_qa::infrastructure::{
    logging, Config, InMemoryVectorStore, OpenAiChat, PdfLoader, Settings, TextEmbedding,
};

/// Answer a fixed list of questions about a PDF and print the answers as JSON.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// YAML file overriding models, chunking, prompts and questions.
    #[arg(long, env = "PDF_QA_SETTINGS")]
    settings: Option<PathBuf>,

    /// PDF to read instead of `PDF_FILE_PATH`.
    #[arg(long)]
    pdf: Option<PathBuf>,

    /// Log file, defaults to the `log_file` setting.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let settings = Settings::load(cli.settings.as_deref());
    logging::init(&log_file_for(cli.log_file, settings.as_ref().ok()))?;
    let settings = settings
        .inspect_err(|e| error!(error = %e, "Error loading settings"))
        .context("failed to load settings")?;

    let config = match cli.pdf {
        Some(path) => Config::from_env_with_pdf(path),
        None => Config::from_env(),
    }
    .inspect_err(|e| error!(error = %e, "Error reading configuration"))
    .context("failed to read configuration")?;
    info!(pdf = %config.pdf_file_path.display(), "Configuration loaded");

    let embedding = TextEmbedding::from_config(&config.openai_api_key, &settings.embedding)
        .inspect_err(|e| error!(error = %e, "Error creating embedding client"))?;
    let llm = OpenAiChat::from_config(&config.openai_api_key, &settings.llm)
        .inspect_err(|e| error!(error = %e, "Error creating chat client"))?;

    let pipeline = Pipeline {
        loader: Arc::new(PdfLoader::new()),
        embedding: Arc::new(embedding),
        vector_store: Arc::new(InMemoryVectorStore::new()),
        llm: Arc::new(llm),
    };

    let records = application::run(pipeline, &settings, &config.pdf_file_path)
        .await
        .inspect_err(|e| error!(stage = %e.stage, error = %e.source, "Run aborted"))?;

    let output = QuestionRunner::to_json(&records)?;
    println!("{output}");

    Ok(())
}

/// `--log-file` wins, then the settings file, then the default. Needs no
/// settings, so a broken settings file is still logged.
fn log_file_for(cli_log_file: Option<PathBuf>, settings: Option<&Settings>) -> PathBuf {
    cli_log_file
        .or_else(|| settings.map(|s| s.log_file.clone()))
        .unwrap_or_else(|| Settings::default().log_file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_for_prefers_cli() {
        let settings = Settings {
            log_file: PathBuf::from("custom.log"),
            ..Settings::default()
        };

        assert_eq!(
            log_file_for(Some(PathBuf::from("cli.log")), Some(&settings)),
            PathBuf::from("cli.log")
        );
        assert_eq!(log_file_for(None, Some(&settings)), PathBuf::from("custom.log"));
    }

    #[test]
    fn test_log_file_for_broken_settings_uses_default() {
        let broken = Settings::from_yaml_str("chunking: [not, a, map]");
        assert!(broken.is_err());

        assert_eq!(
            log_file_for(None, broken.as_ref().ok()),
            PathBuf::from("app.log")
        );
    }
}
