//! Configuração do pipeline NER.
//!
//! Lida de um arquivo JSON; todo campo ausente assume o valor padrão.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NerError, Result};
use crate::features::FeatureOptions;
use crate::legend::Palette;
use crate::pos::TagSet;
use crate::tokenizer::TokenizerMode;

/// Configuração completa do pipeline.
///
/// ```json
/// {
///   "tokenizer": "treebank",
///   "tagset": "penn",
///   "features": { "extended_features": true },
///   "model_path": "models/gmb-crf.json",
///   "palette": "material"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NerConfig {
    /// Estratégia de tokenização.
    pub tokenizer: TokenizerMode,
    /// Vocabulário de tags POS entregue ao extrator.
    pub tagset: TagSet,
    /// Variante do extrator de features.
    pub features: FeatureOptions,
    /// Arquivo JSON do modelo CRF (ausente → modelo embutido).
    pub model_path: Option<PathBuf>,
    /// Paleta de cores da legenda.
    pub palette: Palette,
}

impl NerConfig {
    /// Lê a configuração de um arquivo JSON.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| NerError::Config(format!("{}: {e}", path.display())))?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| NerError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = NerConfig::default();
        assert_eq!(config.tokenizer, TokenizerMode::Treebank);
        assert_eq!(config.tagset, TagSet::Penn);
        assert!(config.features.extended_features);
        assert!(config.model_path.is_none());
        assert_eq!(config.palette, Palette::Material);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = NerConfig::from_json_str(r#"{"tagset": "universal", "palette": "pastel"}"#).unwrap();
        assert_eq!(config.tagset, TagSet::Universal);
        assert_eq!(config.palette, Palette::Pastel);
        assert_eq!(config.tokenizer, TokenizerMode::Treebank);
        assert!(config.features.extended_features);
    }

    #[test]
    fn test_full_json() {
        let json = r#"{
            "tokenizer": "unicode_words",
            "tagset": "penn",
            "features": { "extended_features": false },
            "model_path": "/tmp/model.json",
            "palette": "sunset"
        }"#;
        let config = NerConfig::from_json_str(json).unwrap();
        assert_eq!(config.tokenizer, TokenizerMode::UnicodeWords);
        assert!(!config.features.extended_features);
        assert_eq!(config.model_path, Some(PathBuf::from("/tmp/model.json")));
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        assert!(matches!(
            NerConfig::from_json_str(r#"{"tokenizer": "bpe"}"#),
            Err(NerError::Config(_))
        ));
        assert!(matches!(
            NerConfig::from_file("/nao/existe/config.json"),
            Err(NerError::Config(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"palette": "displacy"}}"#).unwrap();
        let config = NerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.palette, Palette::Displacy);
    }
}
