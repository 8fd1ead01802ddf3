//! Página de resultado renderizada no servidor (askama).
//!
//! A página mostra o texto com as entidades destacadas (visão inline) ou a
//! tabela palavra / entidade / POS, sempre com as cores da legenda.

use askama::Template;
use crf_ner_core::legend::{self, pos_readable, LegendEntry};
use crf_ner_core::{Analysis, EntitySpan, Palette};
use serde::Deserialize;

/// Visão da página de resultado.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum View {
    #[default]
    Inline,
    Table,
}

/// Trecho do texto original: entidade destacada ou texto corrido.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub text: String,
    pub is_entity: bool,
    pub color: &'static str,
    pub label: String,
}

/// Linha da tabela de tokens.
#[derive(Debug, Clone)]
pub struct TableRow {
    pub word: String,
    pub tag: String,
    pub entity: String,
    pub color: &'static str,
    pub pos: String,
    pub pos_readable: String,
    pub confidence: String,
}

pub struct PaletteOption {
    pub name: &'static str,
    pub selected: bool,
}

#[derive(Template)]
#[template(path = "result.html")]
pub struct ResultPage {
    pub text: String,
    pub has_result: bool,
    pub view_inline: bool,
    pub palettes: Vec<PaletteOption>,
    pub segments: Vec<Segment>,
    pub rows: Vec<TableRow>,
    pub legend: Vec<LegendEntry>,
    pub entity_count: usize,
    pub token_count: usize,
    pub processing_ms: u64,
}

impl ResultPage {
    /// Página sem análise (só o formulário)
    pub fn empty(palette: Palette) -> Self {
        Self {
            text: String::new(),
            has_result: false,
            view_inline: true,
            palettes: palette_options(palette),
            segments: Vec::new(),
            rows: Vec::new(),
            legend: legend::legend(palette),
            entity_count: 0,
            token_count: 0,
            processing_ms: 0,
        }
    }

    pub fn from_analysis(text: &str, analysis: &Analysis, view: View, palette: Palette) -> Self {
        let rows = analysis
            .tokens
            .iter()
            .map(|t| {
                let entry = legend::lookup(&t.label, palette);
                TableRow {
                    word: t.token.text.clone(),
                    tag: t.label.clone(),
                    entity: entry.display(),
                    color: entry.color,
                    pos: t.pos.clone(),
                    pos_readable: pos_readable(&t.pos).to_string(),
                    confidence: format!("{:.0}%", t.confidence * 100.0),
                }
            })
            .collect();

        Self {
            text: text.to_string(),
            has_result: true,
            view_inline: view == View::Inline,
            palettes: palette_options(palette),
            segments: segments(text, &analysis.entities, palette),
            rows,
            legend: legend::legend(palette),
            entity_count: analysis.entities.len(),
            token_count: analysis.tokens.len(),
            processing_ms: analysis.processing_ms,
        }
    }
}

fn palette_options(selected: Palette) -> Vec<PaletteOption> {
    Palette::ALL
        .into_iter()
        .map(|p| PaletteOption {
            name: p.name(),
            selected: p == selected,
        })
        .collect()
}

/// Recorta o texto original em trechos, destacando as entidades.
///
/// Os spans vêm em ordem e sem sobreposição; o texto entre eles é
/// preservado byte a byte (espaços múltiplos, pontuação).
pub fn segments(text: &str, entities: &[EntitySpan], palette: Palette) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut cursor = 0;

    let plain = |from: usize, to: usize| Segment {
        text: text.get(from..to).unwrap_or_default().to_string(),
        is_entity: false,
        color: "",
        label: String::new(),
    };

    for span in entities {
        if span.start < cursor {
            continue;
        }
        if span.start > cursor {
            out.push(plain(cursor, span.start));
        }
        let entry = legend::entry_for(span.entity, palette);
        out.push(Segment {
            text: span.text.clone(),
            is_entity: true,
            color: entry.color,
            label: entry.display(),
        });
        cursor = span.end;
    }
    if cursor < text.len() {
        out.push(plain(cursor, text.len()));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crf_ner_core::EntityType;

    fn span(text: &str, entity: EntityType, start: usize, end: usize) -> EntitySpan {
        EntitySpan {
            text: text.to_string(),
            entity,
            start_token: 0,
            end_token: 0,
            start,
            end,
            confidence: 1.0,
        }
    }

    #[test]
    fn test_segments_preserve_text() {
        let text = "Visit  Paris, now";
        let spans = [span("Paris", EntityType::Geo, 7, 12)];
        let segs = segments(text, &spans, Palette::Material);

        assert_eq!(segs.len(), 3);
        assert_eq!(segs[0].text, "Visit  ");
        assert!(segs[1].is_entity);
        assert_eq!(segs[1].color, "#8BC34A");
        assert_eq!(segs[1].label, "🌍 Geographical Location");
        assert_eq!(segs[2].text, ", now");

        let joined: String = segs.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(joined, text);
    }

    #[test]
    fn test_segments_entity_at_edges() {
        let text = "Obama in Paris";
        let spans = [
            span("Obama", EntityType::Per, 0, 5),
            span("Paris", EntityType::Geo, 9, 14),
        ];
        let segs = segments(text, &spans, Palette::Sunset);
        assert_eq!(segs.len(), 3);
        assert!(segs[0].is_entity && segs[2].is_entity);
        assert_eq!(segs[0].color, "#F8961E");
    }

    #[test]
    fn test_empty_page_renders_form() {
        let html = ResultPage::empty(Palette::Pastel).render().unwrap();
        assert!(html.contains("<form"));
        assert!(html.contains("value=\"pastel\" selected"));
        assert!(!html.contains("class=\"entity\""));
    }
}
