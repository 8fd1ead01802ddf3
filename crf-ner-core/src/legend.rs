//! # Legenda de Entidades
//!
//! Tabela única e declarativa com a apresentação de cada tipo de entidade:
//! emoji, rótulo amigável, rótulo curto e uma cor por paleta. Toda a camada
//! de apresentação (página web, template renderizado no servidor e CLI)
//! consulta esta tabela; nenhuma cor é definida em outro lugar.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::tagger::{strip_bio_prefix, EntityType};

/// Paletas de cores disponíveis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Palette {
    /// Cores Material Design (padrão)
    #[default]
    Material,
    /// Tons quentes de pôr do sol
    Sunset,
    /// Cores no estilo displaCy
    Displacy,
    /// Tons pastel
    Pastel,
}

impl Palette {
    pub const ALL: [Palette; 4] = [
        Palette::Material,
        Palette::Sunset,
        Palette::Displacy,
        Palette::Pastel,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Palette::Material => "material",
            Palette::Sunset => "sunset",
            Palette::Displacy => "displacy",
            Palette::Pastel => "pastel",
        }
    }

    fn column(&self) -> usize {
        match self {
            Palette::Material => 0,
            Palette::Sunset => 1,
            Palette::Displacy => 2,
            Palette::Pastel => 3,
        }
    }
}

impl FromStr for Palette {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Palette::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("paleta desconhecida: {s}"))
    }
}

/// Uma linha da tabela de legenda
struct LegendRow {
    emoji: &'static str,
    label: &'static str,
    short_label: &'static str,
    /// Uma cor por paleta, na ordem de [`Palette::ALL`]
    colors: [&'static str; 4],
}

const fn row(
    emoji: &'static str,
    label: &'static str,
    short_label: &'static str,
    colors: [&'static str; 4],
) -> LegendRow {
    LegendRow { emoji, label, short_label, colors }
}

/// Linhas na ordem de [`EntityType::ALL`]
const ENTITY_ROWS: [LegendRow; 8] = [
    row("🌍", "Geographical Location", "Location", ["#8BC34A", "#F94144", "#e76f51", "#06D6A0"]),
    row("🏢", "Organization", "Organization", ["#FF9800", "#F3722C", "#2a9d8f", "#118AB2"]),
    row("👤", "Person", "Person", ["#03A9F4", "#F8961E", "#f4a261", "#FFD166"]),
    row("🗺️", "Geopolitical Entity", "Country", ["#9C27B0", "#F9844A", "#e9c46a", "#7BDFF2"]),
    row("🕒", "Time", "Time", ["#FFC107", "#90BE6D", "#264653", "#EF476F"]),
    row("🎨", "Artifact", "Artifact", ["#E91E63", "#43AA8B", "#a8dadc", "#8E44AD"]),
    row("🎉", "Event", "Event", ["#673AB7", "#577590", "#457b9d", "#FFA07A"]),
    row("🌋", "Natural Phenomenon", "Nature", ["#009688", "#277DA1", "#ffafcc", "#A9A9A9"]),
];

const OUTSIDE_ROW: LegendRow = row("⚪", "Other", "Other", ["#B0BEC5", "#E0E0E0", "#E0E0E0", "#E0E0E0"]);

const UNKNOWN_ROW: LegendRow = row("🔘", "Unknown", "Unknown", ["#888888"; 4]);

/// Entrada de legenda resolvida para uma paleta.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LegendEntry {
    /// Chave do tipo ("geo", "O" ou "unknown")
    pub key: String,
    pub emoji: &'static str,
    pub label: &'static str,
    pub short_label: &'static str,
    /// Cor hexadecimal (ex: "#8BC34A")
    pub color: &'static str,
}

impl LegendEntry {
    fn from_row(key: &str, row: &LegendRow, palette: Palette) -> Self {
        Self {
            key: key.to_string(),
            emoji: row.emoji,
            label: row.label,
            short_label: row.short_label,
            color: row.colors[palette.column()],
        }
    }

    /// Texto de exibição: "🌍 Geographical Location"
    pub fn display(&self) -> String {
        format!("{} {}", self.emoji, self.label)
    }
}

/// Legenda de um tipo de entidade
pub fn entry_for(entity: EntityType, palette: Palette) -> LegendEntry {
    let index = EntityType::ALL
        .iter()
        .position(|t| *t == entity)
        .unwrap_or_default();
    LegendEntry::from_row(entity.name(), &ENTITY_ROWS[index], palette)
}

/// Legenda de uma tag crua do rotulador.
///
/// Remove o prefixo `B-`/`I-` antes da consulta; o tipo é comparado sem
/// diferenciar maiúsculas. Tipos desconhecidos caem em "🔘 Unknown".
///
/// # Exemplo
/// `lookup("B-geo", Palette::Material)` → `🌍 Geographical Location`, `#8BC34A`
pub fn lookup(raw_tag: &str, palette: Palette) -> LegendEntry {
    let stripped = strip_bio_prefix(raw_tag);
    if stripped == "O" {
        return LegendEntry::from_row("O", &OUTSIDE_ROW, palette);
    }
    match stripped.parse::<EntityType>() {
        Ok(entity) => entry_for(entity, palette),
        Err(_) => LegendEntry::from_row("unknown", &UNKNOWN_ROW, palette),
    }
}

/// Legenda completa (tipos + "Other") para exibição
pub fn legend(palette: Palette) -> Vec<LegendEntry> {
    EntityType::ALL
        .into_iter()
        .map(|t| entry_for(t, palette))
        .chain(std::iter::once(LegendEntry::from_row("O", &OUTSIDE_ROW, palette)))
        .collect()
}

/// Nome legível de uma tag POS universal (ex: "PROPN" → "Proper Noun").
///
/// Tags fora da tabela são devolvidas como vieram.
pub fn pos_readable(tag: &str) -> &str {
    match tag {
        "NOUN" => "Noun",
        "VERB" => "Verb",
        "PROPN" => "Proper Noun",
        "ADJ" => "Adjective",
        "ADV" => "Adverb",
        "DET" => "Determiner",
        "ADP" => "Preposition",
        "NUM" => "Number",
        "PRON" => "Pronoun",
        "CCONJ" => "Conjunction",
        "PART" => "Particle",
        "PUNCT" => "Punctuation",
        "SYM" => "Symbol",
        "X" => "Other",
        "SPACE" => "Space",
        "AUX" => "Auxiliary",
        "INTJ" => "Interjection",
        other => other,
    }
}
