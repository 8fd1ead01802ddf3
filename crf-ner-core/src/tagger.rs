//! # Esquema de Tags BIO e Tipos de Entidade
//!
//! Os modelos CRF deste projeto foram treinados no corpus GMB (Groningen
//! Meaning Bank), cujo vocabulário de entidades é fechado:
//!
//! | Tipo | Significado               | Exemplos                   |
//! |------|---------------------------|----------------------------|
//! | geo  | Localização geográfica    | Paris, India, Europe       |
//! | org  | Organização               | Apple, United Nations      |
//! | per  | Pessoa                    | Barack Obama               |
//! | gpe  | Entidade geopolítica      | American, British          |
//! | tim  | Expressão de tempo        | July 2021, Monday          |
//! | art  | Artefato                  | Nobel Prize                |
//! | eve  | Evento                    | World Cup                  |
//! | nat  | Fenômeno natural          | Katrina, H5N1              |
//!
//! ## Esquema BIO
//!
//! - `B-tipo`: primeiro token de uma entidade
//! - `I-tipo`: continuação da entidade
//! - `O`: fora de entidade
//!
//! Algumas variantes emitem o tipo sem prefixo (`geo`); ele é lido como `I-geo`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{NerError, Result};
use crate::tokenizer::Token;

/// Tipos de entidade reconhecidos pelos modelos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Geo,
    Org,
    Per,
    Gpe,
    Tim,
    Art,
    Eve,
    Nat,
}

impl EntityType {
    /// Todos os tipos, na ordem da legenda
    pub const ALL: [EntityType; 8] = [
        EntityType::Geo,
        EntityType::Org,
        EntityType::Per,
        EntityType::Gpe,
        EntityType::Tim,
        EntityType::Art,
        EntityType::Eve,
        EntityType::Nat,
    ];

    /// Nome canônico (ex: "geo")
    pub fn name(&self) -> &'static str {
        match self {
            EntityType::Geo => "geo",
            EntityType::Org => "org",
            EntityType::Per => "per",
            EntityType::Gpe => "gpe",
            EntityType::Tim => "tim",
            EntityType::Art => "art",
            EntityType::Eve => "eve",
            EntityType::Nat => "nat",
        }
    }
}

impl FromStr for EntityType {
    type Err = NerError;

    /// Aceita "geo", "GEO", "Geo"...
    fn from_str(s: &str) -> Result<Self> {
        EntityType::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| NerError::UnknownLabel(s.to_string()))
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tag BIO aplicada a um token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tag {
    /// **Begin**: início de uma entidade. Ex: **Barack** (B-per) Obama.
    Begin(EntityType),
    /// **Inside**: continuação da entidade. Ex: Barack **Obama** (I-per).
    Inside(EntityType),
    /// **Outside**: fora de qualquer entidade.
    Outside,
}

impl Tag {
    /// Representação textual (ex: "B-per", "I-geo", "O")
    pub fn label(&self) -> String {
        match self {
            Tag::Begin(t) => format!("B-{}", t.name()),
            Tag::Inside(t) => format!("I-{}", t.name()),
            Tag::Outside => "O".to_string(),
        }
    }

    /// Tipo da entidade (se não for `O`)
    pub fn entity(&self) -> Option<EntityType> {
        match self {
            Tag::Begin(t) | Tag::Inside(t) => Some(*t),
            Tag::Outside => None,
        }
    }

    /// Parseia uma tag crua do rotulador: "B-geo", "I-geo", "geo" ou "O".
    pub fn from_label(s: &str) -> Result<Self> {
        if s == "O" {
            return Ok(Tag::Outside);
        }
        match s.split_once('-') {
            Some(("B", t)) => Ok(Tag::Begin(t.parse()?)),
            Some(("I", t)) => Ok(Tag::Inside(t.parse()?)),
            Some(_) => Err(NerError::UnknownLabel(s.to_string())),
            None => s
                .parse::<EntityType>()
                .map(Tag::Inside)
                .map_err(|_| NerError::UnknownLabel(s.to_string())),
        }
    }

    /// Verifica se a transição `prev → next` é válida no esquema BIO.
    ///
    /// `I-X` só pode seguir `B-X` ou `I-X`; `B-X` e `O` podem seguir qualquer tag.
    pub fn is_valid_transition(prev: &Tag, next: &Tag) -> bool {
        match next {
            Tag::Inside(t) => match prev {
                Tag::Begin(p) | Tag::Inside(p) => p == t,
                Tag::Outside => false,
            },
            _ => true,
        }
    }

    /// Todas as tags BIO do vocabulário (O primeiro)
    pub fn all() -> Vec<Tag> {
        std::iter::once(Tag::Outside)
            .chain(
                EntityType::ALL
                    .into_iter()
                    .flat_map(|t| [Tag::Begin(t), Tag::Inside(t)]),
            )
            .collect()
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Remove o prefixo `B-`/`I-` de uma tag crua ("B-geo" → "geo", "O" → "O").
pub fn strip_bio_prefix(label: &str) -> &str {
    label
        .strip_prefix("B-")
        .or_else(|| label.strip_prefix("I-"))
        .unwrap_or(label)
}

/// Um token analisado: POS, tag crua do modelo, tag parseada e confiança.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzedToken {
    pub token: Token,
    /// Tag de classe gramatical (Penn ou Universal, conforme configuração)
    pub pos: String,
    /// Tag exatamente como o rotulador devolveu
    pub label: String,
    pub tag: Tag,
    /// Probabilidade marginal da tag escolhida (0.0 a 1.0)
    pub confidence: f64,
}

/// Uma entidade identificada no texto (pode cobrir vários tokens)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySpan {
    /// Texto da entidade, recortado do texto original
    pub text: String,
    pub entity: EntityType,
    /// Índice do primeiro token
    pub start_token: usize,
    /// Índice do último token (inclusivo)
    pub end_token: usize,
    /// Offset de byte inicial no texto original
    pub start: usize,
    /// Offset de byte final no texto original (exclusivo)
    pub end: usize,
    /// Confiança média dos tokens
    pub confidence: f64,
}

/// Converte tokens rotulados em spans de entidades.
///
/// Máquina de estados BIO:
/// - `B-X` abre uma entidade nova
/// - `I-X` continua a entidade aberta do mesmo tipo; sem entidade aberta
///   (ou com tipo diferente) abre uma nova
/// - `O` fecha a entidade aberta
///
/// Texto e offsets vêm dos offsets reais do tokenizador, então pontuação
/// colada ou espaços múltiplos não deslocam as entidades.
///
/// # Exemplo
/// `[B-per, I-per, O, B-geo]` -> `[EntitySpan(per), EntitySpan(geo)]`
pub fn tokens_to_spans(tagged: &[AnalyzedToken], original_text: &str) -> Vec<EntitySpan> {
    let mut spans: Vec<EntitySpan> = Vec::new();
    let mut open: Option<(EntityType, usize, f64, usize)> = None; // (tipo, início, soma conf, qtd)

    let mut close = |open: &mut Option<(EntityType, usize, f64, usize)>, last: usize| {
        if let Some((entity, first, conf_sum, count)) = open.take() {
            let start = tagged[first].token.start;
            let end = tagged[last].token.end;
            spans.push(EntitySpan {
                text: original_text.get(start..end).unwrap_or_default().to_string(),
                entity,
                start_token: tagged[first].token.index,
                end_token: tagged[last].token.index,
                start,
                end,
                confidence: conf_sum / count as f64,
            });
        }
    };

    for (i, tt) in tagged.iter().enumerate() {
        match tt.tag {
            Tag::Outside => {
                if i > 0 {
                    close(&mut open, i - 1);
                }
            }
            Tag::Inside(entity) if matches!(open, Some((t, ..)) if t == entity) => {
                if let Some((_, _, conf_sum, count)) = open.as_mut() {
                    *conf_sum += tt.confidence;
                    *count += 1;
                }
            }
            Tag::Begin(entity) | Tag::Inside(entity) => {
                if i > 0 {
                    close(&mut open, i - 1);
                }
                open = Some((entity, i, tt.confidence, 1));
            }
        }
    }
    if let Some(last) = tagged.len().checked_sub(1) {
        close(&mut open, last);
    }

    spans
}
