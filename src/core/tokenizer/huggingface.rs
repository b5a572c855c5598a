//! `tokenizers`-backed vocabulary, loaded from a file, a directory or the Hub.

use super::traits::{TokenVocab, TokenizerError};
use crate::core::{Result, TokenId};
use crate::envconfig::EnvConfig;
use hf_hub::api::sync::ApiBuilder;
use hf_hub::{Repo, RepoType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const TOKENIZER_FILE: &str = "tokenizer.json";

/// Options handed through to tokenizer construction as given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizerOptions {
    pub revision: Option<String>,
    pub auth_token: Option<String>,
    pub cache_dir: Option<PathBuf>,
    /// Caller-side settings kept on the loaded tokenizer for inspection.
    /// Loading does not read them, so keys like `padding_side` have no effect.
    #[serde(default)]
    pub extra: HashMap<String, String>,
}

impl TokenizerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults taken from `HF_TOKEN`, `HF_HOME` and `CT2_TOKENIZER_REVISION`.
    pub fn from_env() -> Self {
        let env = EnvConfig::from_env();
        Self {
            revision: env.tokenizer_revision,
            auth_token: env.hf_token,
            cache_dir: env.hf_home.map(|home| home.join("hub")),
            extra: HashMap::new(),
        }
    }

    pub fn revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

pub struct HfTokenizer {
    inner: tokenizers::Tokenizer,
    options: TokenizerOptions,
}

impl HfTokenizer {
    pub fn new(inner: tokenizers::Tokenizer, options: TokenizerOptions) -> Self {
        Self { inner, options }
    }

    /// Resolves `identifier` as a `tokenizer.json` path, a directory holding
    /// one, or a Hub repository id, in that order.
    pub fn load(identifier: &str, options: &TokenizerOptions) -> Result<Self> {
        let path = Path::new(identifier);
        let file = if path.is_file() {
            path.to_path_buf()
        } else if path.is_dir() {
            let file = path.join(TOKENIZER_FILE);
            if !file.is_file() {
                return Err(TokenizerError::NotFound(file.display().to_string()).into());
            }
            file
        } else {
            fetch_from_hub(identifier, options)?
        };

        let mut tokenizer = Self::from_file(&file)?;
        tokenizer.options = options.clone();
        Ok(tokenizer)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let inner = tokenizers::Tokenizer::from_file(path)
            .map_err(|e| TokenizerError::Load(format!("{}: {}", path.display(), e)))?;
        debug!("Loaded tokenizer from {}", path.display());
        Ok(Self::new(inner, TokenizerOptions::default()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let inner = tokenizers::Tokenizer::from_bytes(json.as_bytes())
            .map_err(|e| TokenizerError::Load(e.to_string()))?;
        Ok(Self::new(inner, TokenizerOptions::default()))
    }

    pub fn options(&self) -> &TokenizerOptions {
        &self.options
    }

    pub fn inner(&self) -> &tokenizers::Tokenizer {
        &self.inner
    }
}

impl TokenVocab for HfTokenizer {
    fn id_to_token(&self, id: TokenId) -> Option<String> {
        self.inner.id_to_token(id)
    }

    fn vocab_size(&self) -> usize {
        self.inner.get_vocab_size(true)
    }
}

fn fetch_from_hub(repo_id: &str, options: &TokenizerOptions) -> Result<PathBuf> {
    let mut builder = ApiBuilder::new()
        .with_progress(false)
        .with_token(options.auth_token.clone());
    if let Some(dir) = &options.cache_dir {
        builder = builder.with_cache_dir(dir.clone());
    }
    let api = builder.build()?;

    let repo = match &options.revision {
        Some(rev) => Repo::with_revision(repo_id.to_string(), RepoType::Model, rev.clone()),
        None => Repo::model(repo_id.to_string()),
    };

    info!("Fetching {} from {}", TOKENIZER_FILE, repo_id);
    let file = api.repo(repo).get(TOKENIZER_FILE)?;
    Ok(file)
}
