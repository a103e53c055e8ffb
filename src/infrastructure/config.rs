use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const PDF_FILE_PATH_VAR: &str = "PDF_FILE_PATH";

pub const CONTEXT_PLACEHOLDER: &str = "{context}";
pub const HISTORY_PLACEHOLDER: &str = "{chat_history}";
pub const QUESTION_PLACEHOLDER: &str = "{question}";

const DEFAULT_CONDENSE_PROMPT: &str = "Given the following conversation and a follow up question, \
rephrase the follow up question to be a standalone question, in its original language.\n\n\
Chat History:\n{chat_history}\nFollow Up Input: {question}\nStandalone question:";

const DEFAULT_ANSWER_PROMPT: &str = "Use the following pieces of context to answer the user's question.\n\
If you don't know the answer, just say that you don't know, don't try to make up an answer.\n\
----------------\n{context}";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("environment variable {0} is not set")]
    MissingVar(&'static str),
    #[error("failed to read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid settings: {0}")]
    Invalid(String),
}

/// Values taken from the process environment at startup.
#[derive(Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub pdf_file_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`Config::from_env`], but with the PDF path supplied by the caller.
    pub fn from_env_with_pdf(pdf_file_path: PathBuf) -> Result<Self, ConfigError> {
        Self::from_lookup_with_pdf(|name| std::env::var(name).ok(), pdf_file_path)
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let openai_api_key = required(&lookup, OPENAI_API_KEY_VAR)?;
        let pdf_file_path = PathBuf::from(required(&lookup, PDF_FILE_PATH_VAR)?);

        Ok(Self {
            openai_api_key,
            pdf_file_path,
        })
    }

    /// Reads only the key; the path is used as given, without a round trip
    /// through `String`.
    pub fn from_lookup_with_pdf<F>(lookup: F, pdf_file_path: PathBuf) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            openai_api_key: required(&lookup, OPENAI_API_KEY_VAR)?,
            pdf_file_path,
        })
    }
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingVar(name))
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("openai_api_key", &"<redacted>")
            .field("pdf_file_path", &self.pdf_file_path)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub llm: LlmConfig,
    pub embedding: EmbeddingConfig,
    pub chunking: ChunkingConfig,
    pub rag: RagConfig,
    pub answer: AnswerConfig,
    pub prompts: PromptsConfig,
    pub questions: Vec<String>,
    pub log_file: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f64,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    pub model: String,
    pub dimension: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    pub top_k: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnswerConfig {
    pub placeholder: String,
    pub confidence_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptsConfig {
    pub condense: String,
    pub answer: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            llm: LlmConfig::default(),
            embedding: EmbeddingConfig::default(),
            chunking: ChunkingConfig::default(),
            rag: RagConfig::default(),
            answer: AnswerConfig::default(),
            prompts: PromptsConfig::default(),
            questions: vec![
                "What is the name of the company?".to_string(),
                "Who is the CEO of the company?".to_string(),
                "What is their vacation policy?".to_string(),
                "What is the termination policy?".to_string(),
            ],
            log_file: PathBuf::from("app.log"),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.9,
            timeout_seconds: 120,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-ada-002".to_string(),
            dimension: 1536,
        }
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 4000,
            chunk_overlap: 200,
        }
    }
}

impl Default for RagConfig {
    fn default() -> Self {
        Self { top_k: 4 }
    }
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            placeholder: "Data Not Available".to_string(),
            confidence_threshold: 0.7,
        }
    }
}

impl Default for PromptsConfig {
    fn default() -> Self {
        Self {
            condense: DEFAULT_CONDENSE_PROMPT.to_string(),
            answer: DEFAULT_ANSWER_PROMPT.to_string(),
        }
    }
}

impl Settings {
    /// Loads settings from a YAML file, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let settings = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_yaml_str(&raw)?
            }
            None => Self::default(),
        };

        settings.validate()?;
        Ok(settings)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.llm.model.trim().is_empty() {
            return invalid("llm.model must not be empty");
        }
        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return invalid("llm.temperature must be between 0 and 2");
        }
        if self.llm.timeout_seconds == 0 {
            return invalid("llm.timeout_seconds must be positive");
        }
        if self.embedding.model.trim().is_empty() {
            return invalid("embedding.model must not be empty");
        }
        if self.chunking.chunk_size == 0 {
            return invalid("chunking.chunk_size must be positive");
        }
        if self.chunking.chunk_overlap >= self.chunking.chunk_size {
            return invalid("chunking.chunk_overlap must be smaller than chunk_size");
        }
        if self.rag.top_k == 0 {
            return invalid("rag.top_k must be positive");
        }
        if !(0.0..=1.0).contains(&self.answer.confidence_threshold) {
            return invalid("answer.confidence_threshold must be between 0 and 1");
        }
        if self.questions.is_empty() {
            return invalid("questions must not be empty");
        }
        if !self.prompts.answer.contains(CONTEXT_PLACEHOLDER) {
            return invalid("prompts.answer must contain {context}");
        }
        if !self.prompts.condense.contains(HISTORY_PLACEHOLDER)
            || !self.prompts.condense.contains(QUESTION_PLACEHOLDER)
        {
            return invalid("prompts.condense must contain {chat_history} and {question}");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_config_from_lookup() {
        let config = Config::from_lookup(lookup(&[
            (OPENAI_API_KEY_VAR, "sk-test"),
            (PDF_FILE_PATH_VAR, "/tmp/handbook.pdf"),
        ]))
        .unwrap();

        assert_eq!(config.openai_api_key, "sk-test");
        assert_eq!(config.pdf_file_path, PathBuf::from("/tmp/handbook.pdf"));
    }

    #[test]
    fn test_config_missing_vars() {
        let err = Config::from_lookup(lookup(&[(PDF_FILE_PATH_VAR, "a.pdf")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(OPENAI_API_KEY_VAR)));

        let err = Config::from_lookup(lookup(&[
            (OPENAI_API_KEY_VAR, "sk-test"),
            (PDF_FILE_PATH_VAR, "  "),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(PDF_FILE_PATH_VAR)));
    }

    #[test]
    fn test_config_with_pdf_ignores_path_var() {
        let config = Config::from_lookup_with_pdf(
            lookup(&[(OPENAI_API_KEY_VAR, "sk-test")]),
            PathBuf::from("cli.pdf"),
        )
        .unwrap();
        assert_eq!(config.pdf_file_path, PathBuf::from("cli.pdf"));

        let err = Config::from_lookup_with_pdf(lookup(&[]), PathBuf::from("cli.pdf")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingVar(OPENAI_API_KEY_VAR)));
    }

    #[cfg(unix)]
    #[test]
    fn test_config_with_pdf_keeps_non_utf8_path() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = PathBuf::from(OsStr::from_bytes(b"/tmp/hand\xffbook.pdf"));
        let config =
            Config::from_lookup_with_pdf(lookup(&[(OPENAI_API_KEY_VAR, "sk-test")]), path.clone())
                .unwrap();

        assert_eq!(config.pdf_file_path, path);
    }

    #[test]
    fn test_config_debug_redacts_key() {
        let config = Config {
            openai_api_key: "sk-secret".to_string(),
            pdf_file_path: PathBuf::from("a.pdf"),
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("a.pdf"));
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.llm.model, "gpt-4o-mini");
        assert_eq!(settings.llm.temperature, 0.9);
        assert_eq!(settings.rag.top_k, 4);
        assert_eq!(settings.answer.placeholder, "Data Not Available");
        assert_eq!(settings.answer.confidence_threshold, 0.7);
        assert_eq!(settings.questions.len(), 4);
        assert_eq!(settings.questions[0], "What is the name of the company?");
        assert_eq!(settings.log_file, PathBuf::from("app.log"));
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let settings = Settings::from_yaml_str(
            "llm:\n  temperature: 0.2\nquestions:\n  - Who founded the company?\n",
        )
        .unwrap();

        assert_eq!(settings.llm.temperature, 0.2);
        assert_eq!(settings.llm.model, "gpt-4o-mini");
        assert_eq!(settings.questions, vec!["Who founded the company?"]);
        assert_eq!(settings.chunking, ChunkingConfig::default());
    }

    #[test]
    fn test_settings_validation() {
        let valid = Settings::default();

        let mut invalid = valid.clone();
        invalid.chunking.chunk_overlap = invalid.chunking.chunk_size;
        assert!(invalid.validate().is_err());

        let mut invalid = valid.clone();
        invalid.rag.top_k = 0;
        assert!(invalid.validate().is_err());

        let mut invalid = valid.clone();
        invalid.llm.temperature = 2.5;
        assert!(invalid.validate().is_err());

        let mut invalid = valid.clone();
        invalid.answer.confidence_threshold = 1.5;
        assert!(invalid.validate().is_err());

        let mut invalid = valid.clone();
        invalid.questions.clear();
        assert!(invalid.validate().is_err());

        let mut invalid = valid.clone();
        invalid.prompts.answer = "no context here".to_string();
        assert!(invalid.validate().is_err());

        let mut invalid = valid;
        invalid.prompts.condense = "{question}".to_string();
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_load_settings_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rag:\n  top_k: 2").unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.rag.top_k, 2);
    }

    #[test]
    fn test_load_settings_missing_file() {
        let err = Settings::load(Some(Path::new("/nonexistent/settings.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_settings_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "chunking:\n  chunk_size: 0").unwrap();

        let err = Settings::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }
}
