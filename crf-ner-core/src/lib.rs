//! # crf-ner-core — Reconhecimento de Entidades Nomeadas com CRF
//!
//! Este crate implementa o pipeline de NER em inglês usado pelo servidor
//! `crf-ner-web`: um modelo CRF linear-chain pré-treinado (formato CRFsuite,
//! vocabulário GMB) alimentado por mapas de features por token.
//!
//! ## Arquitetura do Sistema
//!
//! O dado flui e é transformado passo a passo:
//!
//! 1.  **Entrada**: Texto bruto (String).
//! 2.  **Tokenização** ([`tokenizer`]): tokens com offsets no texto original.
//! 3.  **POS tagging** ([`pos`]): uma tag gramatical por token (Penn ou Universal).
//! 4.  **Extração de Features** ([`features`]): um [`FeatureMap`] por token,
//!     com as chaves exatas com que os modelos foram treinados.
//! 5.  **Decodificação** ([`crf`], [`viterbi`]): sequência de rótulos BIO e confiança.
//! 6.  **Saída**: lista de [`EntitySpan`] (ex: "Barack Obama" -> per) e a
//!     legenda de cores ([`legend`]).
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use crf_ner_core::{NerConfig, NerPipeline};
//!
//! // 1. Monta o pipeline (POS tagger + modelo embutido)
//! let pipeline = NerPipeline::new(&NerConfig::default()).unwrap();
//!
//! // 2. Analisa o texto
//! let analysis = pipeline.analyze("Barack Obama visited Paris in July 2021.").unwrap();
//!
//! // 3. Exibe as entidades encontradas
//! for entity in &analysis.entities {
//!     println!("{} ({}) - {:.2}", entity.text, entity.entity, entity.confidence);
//! }
//! assert_eq!(analysis.entities[0].text, "Barack Obama");
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: Orquestrador que conecta todos os estágios.
//! - [`features`]: O extrator de features por token.
//! - [`corpus`]: Sentenças anotadas (POS + BIO) e textos de demonstração.

pub mod config;
pub mod corpus;
pub mod crf;
pub mod error;
pub mod features;
pub mod legend;
pub mod model;
pub mod pipeline;
pub mod pos;
pub mod tagger;
pub mod tokenizer;
pub mod viterbi;

pub use config::NerConfig;
pub use crf::{CrfModel, SequenceLabeler};
pub use error::{NerError, Result};
pub use features::{extract_features, FeatureMap, FeatureOptions, FeatureValue};
pub use legend::Palette;
pub use pipeline::{Analysis, NerPipeline, PipelineEvent};
pub use tagger::{AnalyzedToken, EntitySpan, EntityType, Tag};
pub use tokenizer::{Token, TokenizerMode};
