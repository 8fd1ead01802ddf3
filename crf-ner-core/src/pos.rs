//! # POS Tagger — Hidden Markov Model
//!
//! Etiquetador de classes gramaticais usado antes da extração de features.
//! O extrator trata a tag como texto opaco; qualquer implementação de
//! [`PosTagger`] pode ser plugada no pipeline.
//!
//! A implementação embutida é um HMM de primeira ordem:
//! - **Estados Ocultos**: tags Penn Treebank (NNP, VBD, IN...)
//! - **Observações**: palavras em minúsculas
//!
//! Palavras fora do vocabulário são observadas pela sua **assinatura** de
//! forma (`<CAP>`, `<NUM>`, `<ING>`...), aprendida no mesmo treinamento.
//!
//! ## Conjuntos de tags
//!
//! | Penn | Universal | Legível |
//! |------|-----------|---------|
//! | NNP  | PROPN     | Proper Noun |
//! | VBD  | VERB      | Verb |
//! | IN   | ADP       | Preposition |

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::corpus::AnnotatedSentence;
use crate::error::{NerError, Result};
use crate::tokenizer::Token;

/// Vocabulário de tags POS entregue ao extrator de features.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagSet {
    /// Tags finas do Penn Treebank (`NN`, `VBD`, `NNP`)
    #[default]
    Penn,
    /// Tags universais (`NOUN`, `VERB`, `PROPN`)
    Universal,
}

impl FromStr for TagSet {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "penn" => Ok(TagSet::Penn),
            "universal" => Ok(TagSet::Universal),
            other => Err(format!("conjunto de tags desconhecido: {other}")),
        }
    }
}

/// Etiquetador de classes gramaticais.
///
/// Deve devolver exatamente uma tag por token.
pub trait PosTagger: Send + Sync {
    fn tag(&self, tokens: &[Token]) -> Result<Vec<String>>;
}

/// Assinaturas de forma para palavras desconhecidas
const SIGNATURES: [&str; 10] = [
    "<NUM>", "<PUNCT>", "<CAPS>", "<CAP>", "<HYPH>", "<ING>", "<ED>", "<LY>", "<S>", "<UNK>",
];

/// Constante `k` do smoothing das emissões de palavras
const WORD_SMOOTHING: f64 = 0.1;

/// Classifica a forma de uma palavra (sobre o texto original, com caixa).
///
/// # Exemplo
/// - "2021" → `<NUM>`, "NASA" → `<CAPS>`, "Kyiv" → `<CAP>`, "running" → `<ING>`
pub fn word_signature(word: &str) -> &'static str {
    let first = word.chars().next();
    if first.map(char::is_numeric).unwrap_or(false) {
        return "<NUM>";
    }
    if !word.chars().any(char::is_alphanumeric) {
        return "<PUNCT>";
    }
    let has_lower = word.chars().any(char::is_lowercase);
    if !has_lower && word.chars().filter(|c| c.is_uppercase()).count() > 1 {
        return "<CAPS>";
    }
    if first.map(char::is_uppercase).unwrap_or(false) {
        return "<CAP>";
    }
    let lower = word.to_lowercase();
    if lower.contains('-') {
        "<HYPH>"
    } else if lower.ends_with("ing") {
        "<ING>"
    } else if lower.ends_with("ed") {
        "<ED>"
    } else if lower.ends_with("ly") {
        "<LY>"
    } else if lower.ends_with('s') {
        "<S>"
    } else {
        "<UNK>"
    }
}

/// POS tagger HMM treinado em corpus anotado.
///
/// As probabilidades ficam em **log-space** para evitar underflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HmmPosTagger {
    /// Tags conhecidas, em ordem determinística
    tags: Vec<String>,
    /// log P(tag_0)
    start: Vec<f64>,
    /// log P(tag_i | tag_{i-1}), indexado por [prev][curr]
    transition: Vec<Vec<f64>>,
    /// log P(palavra | tag), um vetor por palavra
    emission: HashMap<String, Vec<f64>>,
    /// log P(assinatura | tag), um vetor por assinatura
    signature_emission: HashMap<String, Vec<f64>>,
    /// Vista de saída
    tagset: TagSet,
}

impl HmmPosTagger {
    /// Treina o HMM sobre a coluna POS do corpus.
    ///
    /// Transições e assinaturas usam *Add-1 Smoothing* (Laplace); emissões de
    /// palavras usam *add-k* com `k` = `WORD_SMOOTHING`.
    pub fn train(corpus: &[AnnotatedSentence], tagset: TagSet) -> Result<Self> {
        let mut tag_counts: HashMap<&str, u32> = HashMap::new();
        let mut start_counts: HashMap<&str, u32> = HashMap::new();
        let mut transition_counts: HashMap<(&str, &str), u32> = HashMap::new();
        let mut word_counts: HashMap<(String, &str), u32> = HashMap::new();
        let mut signature_counts: HashMap<(&str, &str), u32> = HashMap::new();
        let mut vocab: HashSet<String> = HashSet::new();

        for sentence in corpus {
            let mut prev: Option<&str> = None;
            for &(word, pos, _) in sentence.annotations {
                let lower = word.to_lowercase();
                *tag_counts.entry(pos).or_insert(0) += 1;
                *word_counts.entry((lower.clone(), pos)).or_insert(0) += 1;
                *signature_counts.entry((word_signature(word), pos)).or_insert(0) += 1;
                vocab.insert(lower);

                match prev {
                    None => *start_counts.entry(pos).or_insert(0) += 1,
                    Some(p) => *transition_counts.entry((p, pos)).or_insert(0) += 1,
                }
                prev = Some(pos);
            }
        }

        if tag_counts.is_empty() {
            return Err(NerError::PosTagger("corpus de treinamento vazio".to_string()));
        }

        let mut tags: Vec<&str> = tag_counts.keys().copied().collect();
        tags.sort_unstable();

        let n_tags = tags.len() as f64;
        let vocab_size = vocab.len() as f64;
        let n_signatures = SIGNATURES.len() as f64;
        let total_starts = corpus.len() as f64;
        let count = |t: &str| *tag_counts.get(t).unwrap_or(&0) as f64;

        let start: Vec<f64> = tags
            .iter()
            .map(|t| {
                let c = *start_counts.get(t).unwrap_or(&0) as f64;
                ((c + 1.0) / (total_starts + n_tags)).ln()
            })
            .collect();

        let transition: Vec<Vec<f64>> = tags
            .iter()
            .map(|prev| {
                tags.iter()
                    .map(|curr| {
                        let c = *transition_counts.get(&(*prev, *curr)).unwrap_or(&0) as f64;
                        ((c + 1.0) / (count(*prev) + n_tags)).ln()
                    })
                    .collect()
            })
            .collect();

        let emission: HashMap<String, Vec<f64>> = vocab
            .iter()
            .map(|word| {
                let row: Vec<f64> = tags
                    .iter()
                    .map(|t| {
                        let c = *word_counts.get(&(word.clone(), *t)).unwrap_or(&0) as f64;
                        ((c + WORD_SMOOTHING) / (count(*t) + WORD_SMOOTHING * (vocab_size + 1.0))).ln()
                    })
                    .collect();
                (word.clone(), row)
            })
            .collect();

        let signature_emission: HashMap<String, Vec<f64>> = SIGNATURES
            .iter()
            .map(|sig| {
                let row: Vec<f64> = tags
                    .iter()
                    .map(|t| {
                        let c = *signature_counts.get(&(*sig, *t)).unwrap_or(&0) as f64;
                        ((c + 1.0) / (count(*t) + n_signatures)).ln()
                    })
                    .collect();
                (sig.to_string(), row)
            })
            .collect();

        tracing::debug!(
            tags = tags.len(),
            vocab = vocab.len(),
            "POS tagger HMM treinado"
        );

        Ok(Self {
            tags: tags.into_iter().map(str::to_string).collect(),
            start,
            transition,
            emission,
            signature_emission,
            tagset,
        })
    }

    /// Treina sobre o corpus embutido ([`crate::corpus::get_corpus`]).
    pub fn from_bundled_corpus(tagset: TagSet) -> Result<Self> {
        Self::train(&crate::corpus::get_corpus(), tagset)
    }

    /// Tags Penn conhecidas pelo modelo
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// log P(palavra | tag) para todas as tags, com fallback para a assinatura
    fn emission_row(&self, word: &str) -> Option<&Vec<f64>> {
        self.emission
            .get(&word.to_lowercase())
            .or_else(|| self.signature_emission.get(word_signature(word)))
    }

    /// Viterbi em log-space. Retorna tags Penn.
    ///
    /// Complexidade `O(N · T²)`.
    pub fn predict_penn(&self, words: &[&str]) -> Result<Vec<String>> {
        if words.is_empty() {
            return Ok(Vec::new());
        }
        let n_tags = self.tags.len();
        let rows = words
            .iter()
            .map(|w| {
                self.emission_row(w)
                    .ok_or_else(|| NerError::PosTagger(format!("sem emissão para {w:?}")))
            })
            .collect::<Result<Vec<_>>>()?;

        // viterbi[s] = log-prob do melhor caminho terminando no estado s
        let mut viterbi: Vec<f64> = (0..n_tags).map(|s| self.start[s] + rows[0][s]).collect();
        let mut backptr = vec![vec![0usize; n_tags]; words.len()];

        for (t, row) in rows.iter().enumerate().skip(1) {
            let mut next = vec![f64::NEG_INFINITY; n_tags];
            for s in 0..n_tags {
                let (best_prev, best) = (0..n_tags)
                    .map(|p| (p, viterbi[p] + self.transition[p][s]))
                    .fold((0, f64::NEG_INFINITY), |acc, x| if x.1 > acc.1 { x } else { acc });
                next[s] = best + row[s];
                backptr[t][s] = best_prev;
            }
            viterbi = next;
        }

        // Backtracking
        let mut state = (0..n_tags)
            .fold(0, |best, s| if viterbi[s] > viterbi[best] { s } else { best });
        let mut path = vec![String::new(); words.len()];
        for t in (0..words.len()).rev() {
            path[t] = self.tags[state].clone();
            state = backptr[t][state];
        }
        Ok(path)
    }
}

impl PosTagger for HmmPosTagger {
    fn tag(&self, tokens: &[Token]) -> Result<Vec<String>> {
        let words: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
        let penn = self.predict_penn(&words)?;
        Ok(match self.tagset {
            TagSet::Penn => penn,
            TagSet::Universal => penn.iter().map(|t| penn_to_universal(t).to_string()).collect(),
        })
    }
}

/// Mapeamento fixo Penn Treebank → Universal Dependencies.
pub fn penn_to_universal(tag: &str) -> &'static str {
    match tag {
        "NN" | "NNS" => "NOUN",
        "NNP" | "NNPS" => "PROPN",
        "MD" => "AUX",
        "JJ" | "JJR" | "JJS" => "ADJ",
        "RB" | "RBR" | "RBS" | "WRB" => "ADV",
        "DT" | "PDT" | "WDT" => "DET",
        "IN" => "ADP",
        "CD" => "NUM",
        "PRP" | "PRP$" | "WP" | "WP$" | "EX" => "PRON",
        "CC" => "CCONJ",
        "RP" | "TO" | "POS" => "PART",
        "$" | "#" | "SYM" => "SYM",
        "UH" => "INTJ",
        t if t.starts_with("VB") => "VERB",
        "." | "," | ":" | "``" | "''" | "-LRB-" | "-RRB-" | "HYPH" => "PUNCT",
        _ => "X",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::tokenize;

    fn tiny_corpus() -> Vec<AnnotatedSentence> {
        vec![
            AnnotatedSentence {
                text: "Obama visited Paris .",
                domain: "test",
                annotations: &[
                    ("Obama", "NNP", "B-per"),
                    ("visited", "VBD", "O"),
                    ("Paris", "NNP", "B-geo"),
                    (".", ".", "O"),
                ],
            },
            AnnotatedSentence {
                text: "the people visited London .",
                domain: "test",
                annotations: &[
                    ("the", "DT", "O"),
                    ("people", "NNS", "O"),
                    ("visited", "VBD", "O"),
                    ("London", "NNP", "B-geo"),
                    (".", ".", "O"),
                ],
            },
        ]
    }

    #[test]
    fn test_hmm_tags_training_sentence() {
        let tagger = HmmPosTagger::train(&tiny_corpus(), TagSet::Penn).unwrap();
        let tags = tagger.predict_penn(&["Obama", "visited", "Paris", "."]).unwrap();
        assert_eq!(tags, ["NNP", "VBD", "NNP", "."]);
    }

    #[test]
    fn test_hmm_unknown_capitalized_word() {
        let tagger = HmmPosTagger::train(&tiny_corpus(), TagSet::Penn).unwrap();
        // "Merkel" é desconhecida, mas a assinatura <CAP> só foi vista com NNP
        let tags = tagger.predict_penn(&["Merkel", "visited", "Berlin", "."]).unwrap();
        assert_eq!(tags, ["NNP", "VBD", "NNP", "."]);
    }

    #[test]
    fn test_hmm_empty_corpus_is_error() {
        assert!(matches!(
            HmmPosTagger::train(&[], TagSet::Penn),
            Err(NerError::PosTagger(_))
        ));
    }

    #[test]
    fn test_bundled_tagger_universal_view() {
        let tagger = HmmPosTagger::from_bundled_corpus(TagSet::Universal).unwrap();
        let tokens = tokenize("Barack Obama visited Paris in July 2021.");
        let tags = tagger.tag(&tokens).unwrap();
        assert_eq!(tags.len(), tokens.len());
        assert_eq!(tags, ["PROPN", "PROPN", "VERB", "PROPN", "ADP", "PROPN", "NUM", "PUNCT"]);
    }

    #[test]
    fn test_word_signature() {
        assert_eq!(word_signature("2021"), "<NUM>");
        assert_eq!(word_signature("2kg"), "<NUM>");
        assert_eq!(word_signature("NASA"), "<CAPS>");
        assert_eq!(word_signature("Kyiv"), "<CAP>");
        assert_eq!(word_signature("running"), "<ING>");
        assert_eq!(word_signature("well-known"), "<HYPH>");
        assert_eq!(word_signature("!"), "<PUNCT>");
        assert_eq!(word_signature("quickly"), "<LY>");
    }

    #[test]
    fn test_penn_to_universal() {
        assert_eq!(penn_to_universal("NNP"), "PROPN");
        assert_eq!(penn_to_universal("VBD"), "VERB");
        assert_eq!(penn_to_universal("IN"), "ADP");
        assert_eq!(penn_to_universal("."), "PUNCT");
        assert_eq!(penn_to_universal("FW"), "X");
    }

    #[test]
    fn test_tagset_from_str() {
        assert_eq!("universal".parse::<TagSet>(), Ok(TagSet::Universal));
        assert!("brown".parse::<TagSet>().is_err());
    }
}
