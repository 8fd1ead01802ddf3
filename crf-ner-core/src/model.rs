//! # Modelo CRF Embutido
//!
//! Usado quando nenhum arquivo de modelo é configurado, para que o sistema
//! funcione "out of the box" (demonstração, testes, CLI).
//!
//! ## Como os pesos foram derivados
//!
//! Os pesos são heurísticos. Em um sistema real seriam treinados via máxima
//! verossimilhança condicional com L-BFGS (CRFsuite). Aqui combinamos:
//! - **Transições** consistentes com o esquema BIO (−8 nas inválidas)
//! - **Forma**: título, maiúsculas e tag de nome próprio puxam para entidades
//! - **Léxico**: frequência relativa de cada rótulo por palavra no corpus
//! - **Contexto**: rótulo do token seguinte a cada palavra no corpus

use crate::corpus::{context_counts, label_counts};
use crate::crf::CrfModel;
use crate::error::Result;
use crate::tagger::{EntityType, Tag};

/// Peso do viés de `O`
const BIAS_OUTSIDE: f64 = 0.5;
/// Peso máximo de uma entrada do léxico (palavra sempre com o mesmo rótulo)
const LEXICON_WEIGHT: f64 = 4.0;
/// Peso máximo de uma entrada de contexto
const CONTEXT_WEIGHT: f64 = 2.0;
/// Penalidade para transições que violam o esquema BIO
const INVALID_TRANSITION: f64 = -8.0;

/// Constrói o modelo CRF embutido.
///
/// Rótulos: `O` e `B-`/`I-` para os 8 tipos GMB (17 no total).
pub fn heuristic_model() -> Result<CrfModel> {
    let tags = Tag::all();
    let mut model = CrfModel::new(tags.iter().map(Tag::label).collect())?;

    // =====================================================================
    // TRANSIÇÕES
    // =====================================================================
    for prev in &tags {
        for next in &tags {
            let weight = match (prev, next) {
                _ if !Tag::is_valid_transition(prev, next) => INVALID_TRANSITION,
                (Tag::Outside, Tag::Outside) => 1.0,
                (Tag::Begin(a), Tag::Inside(b)) if a == b => 1.5,
                (Tag::Inside(a), Tag::Inside(b)) if a == b => 1.0,
                (Tag::Begin(_) | Tag::Inside(_), Tag::Outside) => 0.5,
                _ => 0.0,
            };
            model.set_transition(&prev.label(), &next.label(), weight)?;
        }
    }

    // =====================================================================
    // VIÉS E FRONTEIRAS
    // =====================================================================
    model.set_state("bias", "O", BIAS_OUTSIDE)?;
    model.set_state("BOS", "O", 0.5)?;
    for entity in EntityType::ALL {
        // Sentença não começa com I-x
        model.set_state("BOS", &Tag::Inside(entity).label(), INVALID_TRANSITION)?;
    }

    // =====================================================================
    // FORMA
    // =====================================================================
    for (label, w) in [
        ("B-per", 0.7),
        ("B-geo", 0.8),
        ("B-org", 0.6),
        ("I-per", 0.7),
        ("I-geo", 0.5),
        ("I-org", 0.6),
    ] {
        model.set_state("word.istitle()", label, w)?;
    }

    // Nome próprio nos dois conjuntos de tags
    for postag in ["postag:NNP", "postag:NNPS", "postag:PROPN"] {
        for (label, w) in [
            ("B-geo", 0.6),
            ("B-per", 0.6),
            ("B-org", 0.5),
            ("I-per", 0.6),
            ("I-geo", 0.5),
            ("I-org", 0.5),
        ] {
            model.set_state(postag, label, w)?;
        }
    }

    // Siglas (NASA, IAEA) tendem a ser organizações
    model.set_state("word.isupper()", "B-org", 1.2)?;

    // =====================================================================
    // LÉXICO E CONTEXTO (derivados do corpus)
    // =====================================================================
    let mut lexicon_entries = 0;
    for (word, counts) in label_counts() {
        let total: u32 = counts.values().sum();
        for (label, count) in counts {
            let w = LEXICON_WEIGHT * f64::from(count) / f64::from(total);
            model.add_state(&format!("word.lower():{word}"), label, w)?;
            lexicon_entries += 1;
        }
    }

    for (prev_word, counts) in context_counts() {
        let total: u32 = counts.values().sum();
        for (label, count) in counts.into_iter().filter(|(label, _)| *label != "O") {
            let w = CONTEXT_WEIGHT * f64::from(count) / f64::from(total);
            model.add_state(&format!("-1:word.lower():{prev_word}"), label, w)?;
        }
    }

    tracing::debug!(lexicon_entries, "modelo CRF embutido construído");
    Ok(model)
}
