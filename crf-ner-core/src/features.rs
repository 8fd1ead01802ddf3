//! # Engenharia de Features para o CRF
//!
//! Para cada token de uma sentença etiquetada (pares `(palavra, POS)`), gera o
//! mapa de features consumido pelo rotulador de sequências. As chaves são
//! exatamente as usadas no treinamento dos modelos CRFsuite
//! (`word.lower()`, `word[-3:]`, `postag[:2]`, `-1:word.istitle()`...).
//!
//! ## Features Implementadas
//!
//! ### Token atual
//! - `bias` (constante 1.0)
//! - Forma: `word.lower()`, `word[-3:]`, `word[-2:]`
//! - Capitalização e dígitos: `word.isupper()`, `word.istitle()`, `word.isdigit()`
//! - POS: `postag`, `postag[:2]`
//! - Estendidas (opcionais): `word.isalpha()`, `word.isalnum()`,
//!   `word.startswith.upper()`, `word.endswith.s`, `word.length`
//!
//! ### Contexto (janela de 1 token)
//! - Vizinho anterior com prefixo `-1:` ou `BOS = true` no início
//! - Vizinho seguinte com prefixo `+1:` ou `EOS = true` no fim
//!
//! O mapa do token `i` depende apenas dos tokens `i-1`, `i` e `i+1`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use unicode_properties::{GeneralCategory, GeneralCategoryGroup, UnicodeGeneralCategory};

use crate::error::{NerError, Result};

/// Valor de uma feature.
///
/// Serializa sem tag em JSON: `true`, `5`, `1.0`, `"paris"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    Bool(bool),
    Int(i64),
    Number(f64),
    Text(String),
}

impl From<bool> for FeatureValue {
    fn from(value: bool) -> Self {
        FeatureValue::Bool(value)
    }
}

impl From<f64> for FeatureValue {
    fn from(value: f64) -> Self {
        FeatureValue::Number(value)
    }
}

impl From<i64> for FeatureValue {
    fn from(value: i64) -> Self {
        FeatureValue::Int(value)
    }
}

impl From<String> for FeatureValue {
    fn from(value: String) -> Self {
        FeatureValue::Text(value)
    }
}

impl From<&str> for FeatureValue {
    fn from(value: &str) -> Self {
        FeatureValue::Text(value.to_string())
    }
}

/// Mapa de features de um token.
///
/// Usamos `BTreeMap` para que iteração, serialização e igualdade sejam
/// determinísticas: duas extrações da mesma sentença produzem mapas idênticos.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureMap {
    features: BTreeMap<String, FeatureValue>,
}

impl FeatureMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<FeatureValue>) {
        self.features.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&FeatureValue> {
        self.features.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.features.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FeatureValue)> {
        self.features.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.features.keys()
    }

    /// Achata o mapa em atributos no formato do CRFsuite.
    ///
    /// - Texto vira o atributo `chave:valor` com peso 1.0
    /// - Booleano vira `chave` com peso 1.0 ou 0.0
    /// - Números viram `chave` com o próprio valor como peso
    ///
    /// É essa a forma que o modelo CRF enxerga cada token.
    pub fn attributes(&self) -> Vec<(String, f64)> {
        self.features
            .iter()
            .map(|(key, value)| match value {
                FeatureValue::Text(text) => (format!("{key}:{text}"), 1.0),
                FeatureValue::Bool(b) => (key.clone(), if *b { 1.0 } else { 0.0 }),
                FeatureValue::Int(n) => (key.clone(), *n as f64),
                FeatureValue::Number(x) => (key.clone(), *x),
            })
            .collect()
    }
}

/// Opções do extrator. O conjunto estendido é o padrão.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureOptions {
    /// Inclui `isalpha`, `isalnum`, `startswith.upper`, `endswith.s` e `length`.
    pub extended_features: bool,
}

impl Default for FeatureOptions {
    fn default() -> Self {
        Self {
            extended_features: true,
        }
    }
}

impl FeatureOptions {
    /// Conjunto básico (sem as features estendidas).
    pub fn base() -> Self {
        Self {
            extended_features: false,
        }
    }
}

/// Gera os mapas de features para toda a sentença.
///
/// O índice `i` do retorno corresponde ao token `i` da entrada; é exatamente
/// a sequência esperada pelo rotulador.
///
/// # Erros
/// - [`NerError::EmptySentence`] se `sent` for vazia
/// - [`NerError::EmptyWord`] se algum token tiver palavra vazia
pub fn extract_features<W, P>(sent: &[(W, P)], options: &FeatureOptions) -> Result<Vec<FeatureMap>>
where
    W: AsRef<str>,
    P: AsRef<str>,
{
    if sent.is_empty() {
        return Err(NerError::EmptySentence);
    }
    (0..sent.len())
        .map(|i| extract_for_token(sent, i, options))
        .collect()
}

/// Extrai o mapa de features de um único token em seu contexto.
///
/// # Exemplo
/// Para `[("Barack", "PROPN"), ("Obama", "PROPN"), ("visited", "VERB")]`,
/// o mapa do índice 1 contém `-1:word.lower() = "barack"`,
/// `postag = "PROPN"` e `+1:word.lower() = "visited"`, sem `BOS`/`EOS`.
pub fn extract_for_token<W, P>(sent: &[(W, P)], i: usize, options: &FeatureOptions) -> Result<FeatureMap>
where
    W: AsRef<str>,
    P: AsRef<str>,
{
    if sent.is_empty() {
        return Err(NerError::EmptySentence);
    }
    let (word, postag) = token_at(sent, i)?;

    let mut fv = FeatureMap::new();

    // === Token atual ===
    fv.insert("bias", 1.0);
    fv.insert("word.lower()", word.to_lowercase());
    fv.insert("word[-3:]", suffix(word, 3));
    fv.insert("word[-2:]", suffix(word, 2));
    fv.insert("word.isupper()", is_upper(word));
    fv.insert("word.istitle()", is_title(word));
    fv.insert("word.isdigit()", is_digit(word));
    fv.insert("postag", postag);
    fv.insert("postag[:2]", prefix(postag, 2));
    if options.extended_features {
        insert_extended(&mut fv, "", word);
    }

    // === Contexto ===
    if i > 0 {
        let (prev_word, prev_pos) = token_at(sent, i - 1)?;
        insert_neighbor(&mut fv, "-1:", prev_word, prev_pos, options);
    } else {
        fv.insert("BOS", true);
    }

    if i + 1 < sent.len() {
        let (next_word, next_pos) = token_at(sent, i + 1)?;
        insert_neighbor(&mut fv, "+1:", next_word, next_pos, options);
    } else {
        fv.insert("EOS", true);
    }

    Ok(fv)
}

fn token_at<W, P>(sent: &[(W, P)], index: usize) -> Result<(&str, &str)>
where
    W: AsRef<str>,
    P: AsRef<str>,
{
    let (word, pos) = sent.get(index).ok_or(NerError::IndexOutOfRange {
        index,
        len: sent.len(),
    })?;
    let word = word.as_ref();
    if word.is_empty() {
        return Err(NerError::EmptyWord { index });
    }
    Ok((word, pos.as_ref()))
}

/// Features de um vizinho: nunca inclui `bias`, sufixos, `isdigit` ou flags de fronteira.
fn insert_neighbor(fv: &mut FeatureMap, prefix_key: &str, word: &str, postag: &str, options: &FeatureOptions) {
    fv.insert(format!("{prefix_key}word.lower()"), word.to_lowercase());
    fv.insert(format!("{prefix_key}word.istitle()"), is_title(word));
    fv.insert(format!("{prefix_key}word.isupper()"), is_upper(word));
    fv.insert(format!("{prefix_key}postag"), postag);
    fv.insert(format!("{prefix_key}postag[:2]"), prefix(postag, 2));
    if options.extended_features {
        insert_extended(fv, prefix_key, word);
    }
}

fn insert_extended(fv: &mut FeatureMap, prefix_key: &str, word: &str) {
    let starts_upper = word.chars().next().map(char::is_uppercase).unwrap_or(false);
    fv.insert(format!("{prefix_key}word.isalpha()"), is_alpha(word));
    fv.insert(format!("{prefix_key}word.isalnum()"), is_alnum(word));
    fv.insert(format!("{prefix_key}word.startswith.upper()"), starts_upper);
    fv.insert(format!("{prefix_key}word.endswith.s"), word.ends_with('s'));
    fv.insert(format!("{prefix_key}word.length"), word.chars().count() as i64);
}

/// Últimos `n` caracteres (ou a palavra inteira se for menor).
fn suffix(word: &str, n: usize) -> String {
    let count = word.chars().count();
    word.chars().skip(count.saturating_sub(n)).collect()
}

/// Primeiros `n` caracteres.
fn prefix(text: &str, n: usize) -> String {
    text.chars().take(n).collect()
}

fn is_titlecase_letter(c: char) -> bool {
    c.general_category() == GeneralCategory::TitlecaseLetter
}

/// Tem ao menos um caractere com caixa e nenhum minúsculo ("NASA", "2KG").
/// Letras de título (`ǅ`) contam como minúsculas.
fn is_upper(word: &str) -> bool {
    let mut cased = false;
    for c in word.chars() {
        if c.is_lowercase() || is_titlecase_letter(c) {
            return false;
        }
        if c.is_uppercase() {
            cased = true;
        }
    }
    cased
}

/// Caixa de título: maiúsculas só depois de caracteres sem caixa, minúsculas
/// só depois de caracteres com caixa ("Paris", "Hello-World", "ǅemal"; não "McDonald").
fn is_title(word: &str) -> bool {
    let mut cased = false;
    let mut previous_is_cased = false;
    for c in word.chars() {
        if c.is_uppercase() || is_titlecase_letter(c) {
            if previous_is_cased {
                return false;
            }
            previous_is_cased = true;
            cased = true;
        } else if c.is_lowercase() {
            if !previous_is_cased {
                return false;
            }
            previous_is_cased = true;
            cased = true;
        } else {
            previous_is_cased = false;
        }
    }
    cased
}

/// Todos os caracteres são letras (categorias `L*`); marcas combinantes não contam.
fn is_alpha(word: &str) -> bool {
    !word.is_empty()
        && word
            .chars()
            .all(|c| c.general_category_group() == GeneralCategoryGroup::Letter)
}

/// Todos os caracteres são letras ou números (`L*`, `N*`).
fn is_alnum(word: &str) -> bool {
    !word.is_empty()
        && word.chars().all(|c| {
            matches!(
                c.general_category_group(),
                GeneralCategoryGroup::Letter | GeneralCategoryGroup::Number
            )
        })
}

/// Dígitos decimais (`Nd`) e dígitos de outra forma tipográfica, como
/// sobrescritos, subscritos e circulados ("²", "①"). Frações e numerais
/// romanos ficam de fora.
fn is_digit(word: &str) -> bool {
    !word.is_empty() && word.chars().all(|c| match c.general_category() {
        GeneralCategory::DecimalNumber => true,
        GeneralCategory::OtherNumber => is_digit_form(c),
        _ => false,
    })
}

/// Faixas de `No` com valor de dígito único (0–9).
const DIGIT_FORMS: &[(char, char)] = &[
    ('\u{00B2}', '\u{00B3}'),
    ('\u{00B9}', '\u{00B9}'),
    ('\u{1369}', '\u{1371}'),
    ('\u{19DA}', '\u{19DA}'),
    ('\u{2070}', '\u{2070}'),
    ('\u{2074}', '\u{2079}'),
    ('\u{2080}', '\u{2089}'),
    ('\u{2460}', '\u{2468}'),
    ('\u{2474}', '\u{247C}'),
    ('\u{2488}', '\u{2490}'),
    ('\u{24EA}', '\u{24EA}'),
    ('\u{24F5}', '\u{24FD}'),
    ('\u{24FF}', '\u{24FF}'),
    ('\u{2776}', '\u{277E}'),
    ('\u{2780}', '\u{2788}'),
    ('\u{278A}', '\u{2792}'),
    ('\u{10A40}', '\u{10A43}'),
    ('\u{10E60}', '\u{10E68}'),
    ('\u{11052}', '\u{1105A}'),
    ('\u{1F100}', '\u{1F10A}'),
];

fn is_digit_form(c: char) -> bool {
    DIGIT_FORMS.iter().any(|&(lo, hi)| (lo..=hi).contains(&c))
}

#[cfg(test)]
mod tests {
    use super::*;

    const OBAMA: [(&str, &str); 3] = [("Barack", "PROPN"), ("Obama", "PROPN"), ("visited", "VERB")];

    fn text(fm: &FeatureMap, key: &str) -> String {
        match fm.get(key) {
            Some(FeatureValue::Text(t)) => t.clone(),
            other => panic!("{key}: esperado texto, obtido {other:?}"),
        }
    }

    fn flag(fm: &FeatureMap, key: &str) -> bool {
        match fm.get(key) {
            Some(FeatureValue::Bool(b)) => *b,
            other => panic!("{key}: esperado booleano, obtido {other:?}"),
        }
    }

    #[test]
    fn test_output_length_matches_input() {
        for options in [FeatureOptions::default(), FeatureOptions::base()] {
            let features = extract_features(&OBAMA, &options).unwrap();
            assert_eq!(features.len(), OBAMA.len());
        }
    }

    #[test]
    fn test_single_token_has_both_boundaries() {
        let features = extract_features(&[("Hello", "UH")], &FeatureOptions::default()).unwrap();
        let fm = &features[0];
        assert!(flag(fm, "BOS"));
        assert!(flag(fm, "EOS"));
        assert!(!fm.keys().any(|k| k.starts_with("-1:") || k.starts_with("+1:")));
    }

    #[test]
    fn test_context_features_of_middle_token() {
        let features = extract_features(&OBAMA, &FeatureOptions::default()).unwrap();
        let obama = &features[1];
        assert_eq!(text(obama, "-1:word.lower()"), "barack");
        assert_eq!(text(obama, "postag"), "PROPN");
        assert_eq!(text(obama, "+1:word.lower()"), "visited");
        assert!(!obama.contains_key("BOS"));
        assert!(!obama.contains_key("EOS"));
    }

    #[test]
    fn test_neighbor_keys_match_direct_computation() {
        for options in [FeatureOptions::default(), FeatureOptions::base()] {
            let features = extract_features(&OBAMA, &options).unwrap();
            let middle = &features[1];

            for (prefix_key, neighbor) in [("-1:", &features[0]), ("+1:", &features[2])] {
                let prefixed: Vec<&String> =
                    middle.keys().filter(|k| k.starts_with(prefix_key)).collect();
                let mut expected = vec![
                    "word.lower()", "word.istitle()", "word.isupper()", "postag", "postag[:2]",
                ];
                if options.extended_features {
                    expected.extend([
                        "word.isalpha()", "word.isalnum()", "word.startswith.upper()",
                        "word.endswith.s", "word.length",
                    ]);
                }
                assert_eq!(prefixed.len(), expected.len());
                for key in expected {
                    assert_eq!(
                        middle.get(&format!("{prefix_key}{key}")),
                        neighbor.get(key),
                        "{prefix_key}{key}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_bias_is_always_one() {
        let sent = [("The", "DT"), ("U.S.", "NNP"), ("grew", "VBD"), ("2.5", "CD"), ("%", "NN")];
        for fm in extract_features(&sent, &FeatureOptions::default()).unwrap() {
            assert_eq!(fm.get("bias"), Some(&FeatureValue::Number(1.0)));
        }
    }

    #[test]
    fn test_case_sensitivity() {
        let sent = [("NASA", "NNP"), ("Paris", "NNP"), ("paris", "NN")];
        let features = extract_features(&sent, &FeatureOptions::base()).unwrap();

        assert!(flag(&features[0], "word.isupper()"));
        assert!(!flag(&features[0], "word.istitle()"));
        assert!(flag(&features[1], "word.istitle()"));
        assert!(!flag(&features[1], "word.isupper()"));
        assert!(!flag(&features[2], "word.istitle()"));
        assert!(!flag(&features[2], "word.isupper()"));
    }

    #[test]
    fn test_title_and_upper_edge_cases() {
        assert!(is_title("Hello-World"));
        assert!(!is_title("McDonald"));
        assert!(!is_title("2021"));
        assert!(is_upper("2KG"));
        assert!(!is_upper("2021"));
    }

    #[test]
    fn test_unicode_predicates_follow_python_semantics() {
        let features = extract_features(&[("½", "CD"), ("²", "CD"), ("٣", "CD")], &FeatureOptions::default()).unwrap();
        assert!(!flag(&features[0], "word.isdigit()"));
        assert!(flag(&features[1], "word.isdigit()"));
        assert!(flag(&features[2], "word.isdigit()"));

        // Sinais vocálicos combinantes não são letras
        let hindi = extract_features(&[("हिंदी", "NNP")], &FeatureOptions::default()).unwrap();
        assert!(!flag(&hindi[0], "word.isalpha()"));
        assert!(!flag(&hindi[0], "word.isalnum()"));

        let title = extract_features(&[("ǅemal", "NNP"), ("ǅEMAL", "NNP")], &FeatureOptions::default()).unwrap();
        assert!(flag(&title[0], "word.istitle()"));
        assert!(!flag(&title[1], "word.isupper()"));
        assert!(!flag(&title[0], "+1:word.istitle()"));
    }

    #[test]
    fn test_suffixes_degrade_for_short_words() {
        let features = extract_features(&[("a", "DT")], &FeatureOptions::base()).unwrap();
        assert_eq!(text(&features[0], "word[-3:]"), "a");
        assert_eq!(text(&features[0], "word[-2:]"), "a");
        assert_eq!(text(&features[0], "postag[:2]"), "DT");
    }

    #[test]
    fn test_extended_features() {
        let features = extract_features(&[("Stocks", "NNS"), ("2kg", "CD")], &FeatureOptions::default()).unwrap();
        let stocks = &features[0];
        assert!(flag(stocks, "word.isalpha()"));
        assert!(flag(stocks, "word.startswith.upper()"));
        assert!(flag(stocks, "word.endswith.s"));
        assert_eq!(stocks.get("word.length"), Some(&FeatureValue::Int(6)));
        assert_eq!(stocks.get("+1:word.length"), Some(&FeatureValue::Int(3)));
        assert!(!flag(stocks, "+1:word.isalpha()"));
        assert!(flag(stocks, "+1:word.isalnum()"));

        let base = extract_features(&[("Stocks", "NNS")], &FeatureOptions::base()).unwrap();
        assert!(!base[0].contains_key("word.length"));
    }

    #[test]
    fn test_idempotent() {
        let options = FeatureOptions::default();
        assert_eq!(
            extract_features(&OBAMA, &options).unwrap(),
            extract_features(&OBAMA, &options).unwrap()
        );
    }

    #[test]
    fn test_precondition_errors() {
        let empty: [(&str, &str); 0] = [];
        assert!(matches!(
            extract_features(&empty, &FeatureOptions::default()),
            Err(NerError::EmptySentence)
        ));
        assert!(matches!(
            extract_for_token(&OBAMA, 3, &FeatureOptions::default()),
            Err(NerError::IndexOutOfRange { index: 3, len: 3 })
        ));
        assert!(matches!(
            extract_features(&[("ok", "JJ"), ("", "NN")], &FeatureOptions::default()),
            Err(NerError::EmptyWord { index: 1 })
        ));
    }

    #[test]
    fn test_attributes_follow_crfsuite_convention() {
        let features = extract_features(&[("Paris", "NNP")], &FeatureOptions::default()).unwrap();
        let attrs: BTreeMap<String, f64> = features[0].attributes().into_iter().collect();
        assert_eq!(attrs.get("bias"), Some(&1.0));
        assert_eq!(attrs.get("word.lower():paris"), Some(&1.0));
        assert_eq!(attrs.get("word.istitle()"), Some(&1.0));
        assert_eq!(attrs.get("word.isupper()"), Some(&0.0));
        assert_eq!(attrs.get("word.length"), Some(&5.0));
        assert_eq!(attrs.get("BOS"), Some(&1.0));
    }

    #[test]
    fn test_serializes_to_plain_json() {
        let features = extract_features(&[("a", "DT")], &FeatureOptions::base()).unwrap();
        let json = serde_json::to_value(&features[0]).unwrap();
        assert_eq!(json["bias"], serde_json::json!(1.0));
        assert_eq!(json["word.lower()"], serde_json::json!("a"));
        assert_eq!(json["BOS"], serde_json::json!(true));
    }
}
