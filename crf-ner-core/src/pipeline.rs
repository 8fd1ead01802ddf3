//! # Pipeline NER — Orquestrador com Eventos Observáveis
//!
//! O pipeline coordena todos os estágios:
//!
//! ```text
//! texto → Tokenizador → POS tagger → Extrator de features → CRF (Viterbi) → spans
//! ```
//!
//! e emite eventos em cada passo via um canal Rust (`mpsc`), permitindo que
//! o servidor WebSocket transmita o progresso em tempo real para o cliente.
//!
//! Os componentes são somente leitura depois da construção; o pipeline pode
//! ser compartilhado entre threads via `Arc`.

use std::sync::{mpsc, Arc};
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::NerConfig;
use crate::crf::{CrfModel, SequenceLabeler};
use crate::error::{NerError, Result};
use crate::features::{extract_features, FeatureMap, FeatureOptions};
use crate::legend::Palette;
use crate::model::heuristic_model;
use crate::pos::{HmmPosTagger, PosTagger};
use crate::tagger::{tokens_to_spans, AnalyzedToken, EntitySpan, Tag};
use crate::tokenizer::{tokenize_with_mode, Token, TokenizerMode};
use crate::viterbi::ViterbiStep;

/// Eventos emitidos pelo pipeline durante o processamento.
///
/// Permitem que a UI visualize o "raciocínio" do modelo passo a passo.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum PipelineEvent {
    /// **Passo 1**: Tokenização concluída.
    TokenizationDone { tokens: Vec<Token>, total: usize },
    /// **Passo 2**: Tags POS atribuídas (uma por token).
    PosTagged { tags: Vec<String> },
    /// **Passo 3**: Mapa de features de um token.
    FeaturesComputed {
        token_index: usize,
        token_text: String,
        features: FeatureMap,
    },
    /// **Passo 4**: Um passo do Viterbi, com os scores acumulados de cada rótulo.
    ViterbiStep { step: ViterbiStep, token_text: String },
    /// **Passo 5**: Rótulo definitivo de um token.
    TagAssigned {
        token_index: usize,
        token_text: String,
        tag: String,
        confidence: f64,
    },
    /// **Conclusão**: entidades estruturadas e tempo de processamento.
    Done {
        entities: Vec<EntitySpan>,
        tokens: Vec<AnalyzedToken>,
        total_tokens: usize,
        processing_ms: u64,
    },
    /// **Falha**: o processamento foi interrompido.
    Error { message: String },
}

/// Resultado de uma análise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Analysis {
    pub tokens: Vec<AnalyzedToken>,
    pub entities: Vec<EntitySpan>,
    pub processing_ms: u64,
}

/// Token com sua tag POS e o mapa de features entregue ao rotulador.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenFeatures {
    pub token: Token,
    pub pos: String,
    pub features: FeatureMap,
}

/// O pipeline NER principal.
///
/// # Modos de Uso
/// - **Sync**: [`NerPipeline::analyze`] para scripts, CLI e HTTP.
/// - **Streaming**: [`NerPipeline::analyze_streaming`] para UIs reativas (WebSocket).
pub struct NerPipeline {
    tokenizer_mode: TokenizerMode,
    pos_tagger: Box<dyn PosTagger>,
    labeler: Arc<dyn SequenceLabeler>,
    options: FeatureOptions,
    palette: Palette,
    model_source: String,
}

impl NerPipeline {
    /// Monta o pipeline a partir da configuração.
    ///
    /// Treina o POS tagger no corpus embutido e carrega o modelo CRF de
    /// `model_path` (ou usa o modelo embutido).
    pub fn new(config: &NerConfig) -> Result<Self> {
        let pos_tagger = HmmPosTagger::from_bundled_corpus(config.tagset)?;
        let (labeler, model_source) = match &config.model_path {
            Some(path) => (CrfModel::from_file(path)?, path.display().to_string()),
            None => (heuristic_model()?, "bundled".to_string()),
        };
        tracing::info!(
            model = %model_source,
            tokenizer = ?config.tokenizer,
            tagset = ?config.tagset,
            extended_features = config.features.extended_features,
            "pipeline NER pronto"
        );

        let mut pipeline = Self::with_components(config, Box::new(pos_tagger), Arc::new(labeler));
        pipeline.model_source = model_source;
        Ok(pipeline)
    }

    /// Monta o pipeline com componentes fornecidos pelo chamador.
    pub fn with_components(
        config: &NerConfig,
        pos_tagger: Box<dyn PosTagger>,
        labeler: Arc<dyn SequenceLabeler>,
    ) -> Self {
        Self {
            tokenizer_mode: config.tokenizer,
            pos_tagger,
            labeler,
            options: config.features,
            palette: config.palette,
            model_source: "custom".to_string(),
        }
    }

    /// Paleta configurada para a legenda
    pub fn palette(&self) -> Palette {
        self.palette
    }

    /// Origem do modelo ("bundled", "custom" ou caminho do arquivo)
    pub fn model_source(&self) -> &str {
        &self.model_source
    }

    /// Rótulos do modelo carregado
    pub fn labels(&self) -> &[String] {
        self.labeler.labels()
    }

    /// Tokeniza e etiqueta, garantindo uma tag POS por token.
    fn tokenize_and_tag(&self, text: &str) -> Result<(Vec<Token>, Vec<String>)> {
        if text.trim().is_empty() {
            return Err(NerError::EmptyInput);
        }
        let tokens = tokenize_with_mode(text, self.tokenizer_mode);
        if tokens.is_empty() {
            return Err(NerError::EmptyInput);
        }
        let pos = self.pos_tagger.tag(&tokens)?;
        if pos.len() != tokens.len() {
            return Err(NerError::LengthMismatch {
                expected: tokens.len(),
                got: pos.len(),
            });
        }
        Ok((tokens, pos))
    }

    fn features_for(&self, tokens: &[Token], pos: &[String]) -> Result<Vec<FeatureMap>> {
        let sent: Vec<(&str, &str)> = tokens
            .iter()
            .zip(pos)
            .map(|(t, p)| (t.text.as_str(), p.as_str()))
            .collect();
        extract_features(&sent, &self.options)
    }

    /// Apenas tokenização, POS e features (o que o modelo "vê").
    pub fn featurize(&self, text: &str) -> Result<Vec<TokenFeatures>> {
        let (tokens, pos) = self.tokenize_and_tag(text)?;
        let features = self.features_for(&tokens, &pos)?;
        Ok(tokens
            .into_iter()
            .zip(pos)
            .zip(features)
            .map(|((token, pos), features)| TokenFeatures { token, pos, features })
            .collect())
    }

    /// Processa o texto de forma síncrona e retorna o resultado final.
    pub fn analyze(&self, text: &str) -> Result<Analysis> {
        self.run(text, None)
    }

    /// Analisa vários textos em paralelo (rayon).
    pub fn analyze_batch<S: AsRef<str> + Sync>(&self, texts: &[S]) -> Result<Vec<Analysis>> {
        texts.par_iter().map(|t| self.analyze(t.as_ref())).collect()
    }

    /// Processa o texto emitindo eventos a cada etapa.
    ///
    /// Ordem: `TokenizationDone`, `PosTagged`, `FeaturesComputed` (loop),
    /// `ViterbiStep` (loop), `TagAssigned` (loop), `Done`. Em caso de falha
    /// o último evento é `Error`.
    pub fn analyze_streaming(&self, text: &str, tx: mpsc::Sender<PipelineEvent>) {
        if let Err(e) = self.run(text, Some(&tx)) {
            tracing::debug!(error = %e, "análise interrompida");
            let _ = tx.send(PipelineEvent::Error {
                message: e.to_string(),
            });
        }
    }

    fn run(&self, text: &str, tx: Option<&mpsc::Sender<PipelineEvent>>) -> Result<Analysis> {
        let start = Instant::now();
        let emit = |event: PipelineEvent| {
            if let Some(tx) = tx {
                // Receptor desconectado não interrompe a análise
                let _ = tx.send(event);
            }
        };

        // === Passo 1 e 2: Tokenização e POS ===
        let (tokens, pos) = self.tokenize_and_tag(text)?;
        emit(PipelineEvent::TokenizationDone {
            tokens: tokens.clone(),
            total: tokens.len(),
        });
        emit(PipelineEvent::PosTagged { tags: pos.clone() });

        // === Passo 3: Extração de Features ===
        let xseq = self.features_for(&tokens, &pos)?;
        if tx.is_some() {
            for (i, features) in xseq.iter().enumerate() {
                emit(PipelineEvent::FeaturesComputed {
                    token_index: i,
                    token_text: tokens[i].text.clone(),
                    features: features.clone(),
                });
            }
        }

        // === Passo 4: Decodificação ===
        let decoded = self.labeler.decode(&xseq)?;
        if decoded.labels.len() != tokens.len() || decoded.confidences.len() != tokens.len() {
            return Err(NerError::LengthMismatch {
                expected: tokens.len(),
                got: decoded.labels.len(),
            });
        }
        for step in &decoded.steps {
            let token_text = tokens
                .get(step.token_index)
                .map(|t| t.text.clone())
                .unwrap_or_default();
            emit(PipelineEvent::ViterbiStep {
                step: step.clone(),
                token_text,
            });
        }

        // === Passo 5: Tags finais ===
        let analyzed = tokens
            .into_iter()
            .zip(pos)
            .zip(decoded.labels.into_iter().zip(decoded.confidences))
            .map(|((token, pos), (label, confidence))| {
                let tag = Tag::from_label(&label)?;
                emit(PipelineEvent::TagAssigned {
                    token_index: token.index,
                    token_text: token.text.clone(),
                    tag: label.clone(),
                    confidence,
                });
                Ok(AnalyzedToken {
                    token,
                    pos,
                    label,
                    tag,
                    confidence,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let entities = tokens_to_spans(&analyzed, text);
        let processing_ms = start.elapsed().as_millis() as u64;
        tracing::debug!(
            tokens = analyzed.len(),
            entities = entities.len(),
            processing_ms,
            "análise concluída"
        );

        emit(PipelineEvent::Done {
            entities: entities.clone(),
            tokens: analyzed.clone(),
            total_tokens: analyzed.len(),
            processing_ms,
        });

        Ok(Analysis {
            tokens: analyzed,
            entities,
            processing_ms,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crf::Decoded;
    use crate::pos::TagSet;
    use crate::tagger::EntityType;

    fn pipeline() -> NerPipeline {
        NerPipeline::new(&NerConfig::default()).unwrap()
    }

    /// Rotulador que devolve sempre a mesma sequência fixa
    struct FixedLabeler {
        labels: Vec<String>,
        output: Vec<&'static str>,
    }

    impl SequenceLabeler for FixedLabeler {
        fn labels(&self) -> &[String] {
            &self.labels
        }

        fn decode(&self, _xseq: &[FeatureMap]) -> Result<Decoded> {
            Ok(Decoded {
                labels: self.output.iter().map(|s| s.to_string()).collect(),
                confidences: vec![1.0; self.output.len()],
                best_score: 0.0,
                steps: vec![],
            })
        }
    }

    fn with_fixed_output(output: Vec<&'static str>) -> NerPipeline {
        let config = NerConfig::default();
        let pos = HmmPosTagger::from_bundled_corpus(TagSet::Penn).unwrap();
        let labeler = FixedLabeler {
            labels: vec!["O".to_string()],
            output,
        };
        NerPipeline::with_components(&config, Box::new(pos), Arc::new(labeler))
    }

    #[test]
    fn test_analyze_obama_sentence() {
        let analysis = pipeline().analyze("Barack Obama visited Paris in July 2021.").unwrap();

        let labels: Vec<&str> = analysis.tokens.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, ["B-per", "I-per", "O", "B-geo", "O", "B-tim", "I-tim", "O"]);

        let entities: Vec<(&str, EntityType)> = analysis
            .entities
            .iter()
            .map(|e| (e.text.as_str(), e.entity))
            .collect();
        assert_eq!(
            entities,
            [
                ("Barack Obama", EntityType::Per),
                ("Paris", EntityType::Geo),
                ("July 2021", EntityType::Tim),
            ]
        );
        assert!(analysis.tokens.iter().all(|t| t.confidence > 0.0 && t.confidence <= 1.0 + 1e-9));
    }

    #[test]
    fn test_analyze_default_demo_text() {
        let text = "India is going to win the Apple stocks and can get a profit of 2 billion dollars in the next year 2020 with 2kg of apples";
        let analysis = pipeline().analyze(text).unwrap();
        let entities: Vec<(&str, EntityType)> = analysis
            .entities
            .iter()
            .map(|e| (e.text.as_str(), e.entity))
            .collect();
        assert!(entities.contains(&("India", EntityType::Geo)));
        assert!(entities.contains(&("Apple", EntityType::Org)));
    }

    #[test]
    fn test_universal_tagset_pipeline() {
        let config = NerConfig {
            tagset: TagSet::Universal,
            ..NerConfig::default()
        };
        let pipeline = NerPipeline::new(&config).unwrap();
        let analysis = pipeline.analyze("Barack Obama visited Paris in July 2021.").unwrap();
        assert_eq!(analysis.tokens[0].pos, "PROPN");
        assert_eq!(analysis.entities.len(), 3);
    }

    #[test]
    fn test_empty_input_is_error() {
        assert!(matches!(pipeline().analyze("   "), Err(NerError::EmptyInput)));
        assert!(matches!(pipeline().featurize(""), Err(NerError::EmptyInput)));
    }

    #[test]
    fn test_featurize_exposes_model_input() {
        let rows = pipeline().featurize("Obama visited Paris").unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].features.contains_key("BOS"));
        assert!(rows[2].features.contains_key("EOS"));
        assert_eq!(rows[1].pos, "VBD");
    }

    #[test]
    fn test_length_mismatch_detected() {
        let pipeline = with_fixed_output(vec!["O"]);
        let result = pipeline.analyze("Obama visited Paris");
        assert!(matches!(
            result,
            Err(NerError::LengthMismatch { expected: 3, got: 1 })
        ));
    }

    #[test]
    fn test_unknown_label_detected() {
        let pipeline = with_fixed_output(vec!["O", "B-xyz"]);
        let result = pipeline.analyze("Obama visited");
        assert!(matches!(result, Err(NerError::UnknownLabel(_))));
    }

    #[test]
    fn test_streaming_event_order() {
        let (tx, rx) = mpsc::channel();
        pipeline().analyze_streaming("Obama visited Paris.", tx);
        let events: Vec<PipelineEvent> = rx.iter().collect();

        assert!(matches!(events[0], PipelineEvent::TokenizationDone { total: 4, .. }));
        assert!(matches!(events[1], PipelineEvent::PosTagged { .. }));
        let count = |f: fn(&PipelineEvent) -> bool| events.iter().filter(|e| f(e)).count();
        assert_eq!(count(|e| matches!(e, PipelineEvent::FeaturesComputed { .. })), 4);
        assert_eq!(count(|e| matches!(e, PipelineEvent::ViterbiStep { .. })), 4);
        assert_eq!(count(|e| matches!(e, PipelineEvent::TagAssigned { .. })), 4);
        assert!(matches!(events.last(), Some(PipelineEvent::Done { total_tokens: 4, .. })));
    }

    #[test]
    fn test_streaming_reports_errors() {
        let (tx, rx) = mpsc::channel();
        pipeline().analyze_streaming("", tx);
        let events: Vec<PipelineEvent> = rx.iter().collect();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], PipelineEvent::Error { .. }));
    }

    #[test]
    fn test_analyze_batch() {
        let results = pipeline()
            .analyze_batch(&["Obama visited Paris.", "Apple reported earnings."])
            .unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].tokens.len(), 4);
        assert!(pipeline().analyze_batch(&["ok", " "]).is_err());
    }

    #[test]
    fn test_events_serialize_with_type_tag() {
        let event = PipelineEvent::PosTagged {
            tags: vec!["NNP".to_string()],
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "PosTagged");
        assert_eq!(json["data"]["tags"][0], "NNP");
    }
}
