//! # CRF — Conditional Random Field Linear-Chain
//!
//! Rotulador de sequências pré-treinado. O modelo é carregado de um arquivo
//! JSON e usado apenas para inferência; não há treinamento neste crate.
//!
//! ## Estrutura do Modelo
//!
//! Score total de uma sequência de rótulos:
//!
//! ```text
//! score(y, x) = Σ_i [emission(y_i, x, i) + transition(y_{i-1}, y_i)]
//! emission(y, x, i) = Σ_a valor(a) × w(a, y)   para cada atributo a do token i
//! ```
//!
//! Os atributos seguem a convenção do CRFsuite (ver
//! [`FeatureMap::attributes`]): `"word.lower():paris"` vale 1.0,
//! `"word.istitle()"` vale 1.0 ou 0.0, `"word.length"` vale o comprimento.
//!
//! ## Formato do arquivo
//!
//! ```json
//! {
//!   "labels": ["O", "B-geo", "I-geo"],
//!   "state_features": { "word.lower():paris": { "B-geo": 3.2 } },
//!   "transitions": { "B-geo": { "I-geo": 1.5 } }
//! }
//! ```

use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{NerError, Result};
use crate::features::FeatureMap;
use crate::viterbi::{marginals, viterbi_decode, ViterbiStep};

/// Resultado da decodificação de uma sequência.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decoded {
    /// Um rótulo por token
    pub labels: Vec<String>,
    /// Probabilidade marginal do rótulo escolhido, por token
    pub confidences: Vec<f64>,
    /// Score não normalizado da melhor sequência
    pub best_score: f64,
    /// Tabela do Viterbi (para visualização)
    pub steps: Vec<ViterbiStep>,
}

/// Rotulador de sequências: uma sequência de feature maps entra, uma
/// sequência de rótulos do mesmo tamanho sai.
pub trait SequenceLabeler: Send + Sync {
    /// Vocabulário de rótulos do modelo
    fn labels(&self) -> &[String];

    /// Decodifica uma sequência, com confiança e tabela de scores
    fn decode(&self, xseq: &[FeatureMap]) -> Result<Decoded>;

    /// Apenas os rótulos
    fn predict(&self, xseq: &[FeatureMap]) -> Result<Vec<String>> {
        Ok(self.decode(xseq)?.labels)
    }

    /// Rotula várias sentenças em paralelo (rayon)
    fn predict_batch(&self, batch: &[Vec<FeatureMap>]) -> Result<Vec<Vec<String>>> {
        batch.par_iter().map(|xseq| self.predict(xseq)).collect()
    }
}

/// Representação em disco do modelo
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelFile {
    pub labels: Vec<String>,
    /// atributo → (rótulo → peso)
    #[serde(default)]
    pub state_features: BTreeMap<String, BTreeMap<String, f64>>,
    /// rótulo anterior → (rótulo seguinte → peso)
    #[serde(default)]
    pub transitions: BTreeMap<String, BTreeMap<String, f64>>,
}

/// Modelo CRF com pesos indexados para inferência.
///
/// Read-only depois de construído; compartilhado entre threads via `Arc`.
#[derive(Debug, Clone)]
pub struct CrfModel {
    labels: Vec<String>,
    label_index: HashMap<String, usize>,
    /// atributo → [(índice do rótulo, peso)]
    state_features: HashMap<String, Vec<(usize, f64)>>,
    /// Pesos de transição: indexed by [prev][next]
    transitions: Vec<Vec<f64>>,
}

impl CrfModel {
    /// Cria um modelo com pesos zerados.
    ///
    /// Os rótulos devem ser não vazios e únicos.
    pub fn new(labels: Vec<String>) -> Result<Self> {
        if labels.is_empty() {
            return Err(NerError::InvalidModel("lista de rótulos vazia".to_string()));
        }
        let mut seen = HashSet::new();
        for label in &labels {
            if label.is_empty() {
                return Err(NerError::InvalidModel("rótulo vazio".to_string()));
            }
            if !seen.insert(label.as_str()) {
                return Err(NerError::InvalidModel(format!("rótulo duplicado: {label}")));
            }
        }

        let n = labels.len();
        let label_index = labels
            .iter()
            .enumerate()
            .map(|(i, l)| (l.clone(), i))
            .collect();
        Ok(Self {
            labels,
            label_index,
            state_features: HashMap::new(),
            transitions: vec![vec![0.0f64; n]; n],
        })
    }

    /// Constrói o modelo a partir do arquivo desserializado, validando referências.
    pub fn from_model_file(file: ModelFile) -> Result<Self> {
        let mut model = Self::new(file.labels)?;
        for (attr, weights) in file.state_features {
            for (label, w) in weights {
                model.set_state(&attr, &label, w)?;
            }
        }
        for (from, row) in file.transitions {
            for (to, w) in row {
                model.set_transition(&from, &to, w)?;
            }
        }
        Ok(model)
    }

    /// Carrega de uma string JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let file: ModelFile = serde_json::from_str(json)?;
        Self::from_model_file(file)
    }

    /// Carrega de um arquivo JSON no disco
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| NerError::ModelIo {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::from_json_str(&content)?;
        tracing::info!(
            path = %path.display(),
            labels = model.labels.len(),
            attributes = model.state_features.len(),
            "modelo CRF carregado"
        );
        Ok(model)
    }

    fn index_of(&self, label: &str) -> Result<usize> {
        self.label_index
            .get(label)
            .copied()
            .ok_or_else(|| NerError::InvalidModel(format!("rótulo não declarado: {label}")))
    }

    /// Configura (ou substitui) um peso de estado
    pub fn set_state(&mut self, attribute: &str, label: &str, weight: f64) -> Result<()> {
        let y = self.index_of(label)?;
        let entry = self.state_features.entry(attribute.to_string()).or_default();
        match entry.iter_mut().find(|(idx, _)| *idx == y) {
            Some((_, w)) => *w = weight,
            None => entry.push((y, weight)),
        }
        Ok(())
    }

    /// Soma a um peso de estado existente
    pub fn add_state(&mut self, attribute: &str, label: &str, weight: f64) -> Result<()> {
        let current = self.state_weight(attribute, label);
        self.set_state(attribute, label, current + weight)
    }

    /// Configura um peso de transição
    pub fn set_transition(&mut self, from: &str, to: &str, weight: f64) -> Result<()> {
        let i = self.index_of(from)?;
        let j = self.index_of(to)?;
        self.transitions[i][j] = weight;
        Ok(())
    }

    /// Peso de estado (0.0 se ausente)
    pub fn state_weight(&self, attribute: &str, label: &str) -> f64 {
        let Some(&y) = self.label_index.get(label) else {
            return 0.0;
        };
        self.state_features
            .get(attribute)
            .and_then(|ws| ws.iter().find(|(idx, _)| *idx == y))
            .map(|&(_, w)| w)
            .unwrap_or(0.0)
    }

    /// Peso de transição (0.0 se algum rótulo for desconhecido)
    pub fn transition_weight(&self, from: &str, to: &str) -> f64 {
        match (self.label_index.get(from), self.label_index.get(to)) {
            (Some(&i), Some(&j)) => self.transitions[i][j],
            _ => 0.0,
        }
    }

    /// Scores de emissão: `emission[i][y]`
    pub fn emission_scores(&self, xseq: &[FeatureMap]) -> Vec<Vec<f64>> {
        xseq.iter()
            .map(|fm| {
                let mut scores = vec![0.0f64; self.labels.len()];
                for (attr, value) in fm.attributes() {
                    if value == 0.0 {
                        continue;
                    }
                    if let Some(weights) = self.state_features.get(&attr) {
                        for &(y, w) in weights {
                            scores[y] += value * w;
                        }
                    }
                }
                scores
            })
            .collect()
    }

    /// Matriz de transições (para visualização)
    pub fn transition_matrix(&self) -> &[Vec<f64>] {
        &self.transitions
    }
}

impl SequenceLabeler for CrfModel {
    fn labels(&self) -> &[String] {
        &self.labels
    }

    fn decode(&self, xseq: &[FeatureMap]) -> Result<Decoded> {
        let emission = self.emission_scores(xseq);
        let result = viterbi_decode(&emission, &self.transitions, &self.labels);
        let marginals = marginals(&emission, &self.transitions);

        let labels = result
            .best_path
            .iter()
            .map(|&y| self.labels[y].clone())
            .collect();
        let confidences = result
            .best_path
            .iter()
            .zip(&marginals)
            .map(|(&y, row)| row[y])
            .collect();

        Ok(Decoded {
            labels,
            confidences,
            best_score: result.best_score,
            steps: result.steps,
        })
    }
}
