//! # Corpus em Inglês com Anotações POS e BIO
//!
//! Pequeno corpus no estilo do GMB (Groningen Meaning Bank): notícias curtas
//! em inglês, já tokenizadas, com a tag Penn Treebank e a tag BIO de cada token.
//!
//! O corpus alimenta dois componentes:
//! - o POS tagger HMM ([`crate::pos::HmmPosTagger`]), treinado na coluna POS;
//! - o modelo CRF embutido ([`crate::model::heuristic_model`]), que deriva
//!   pesos léxicos das entidades anotadas.

use std::collections::HashMap;

/// Uma sentença anotada.
pub struct AnnotatedSentence {
    /// Texto original da sentença.
    pub text: &'static str,
    /// Domínio temático da notícia.
    pub domain: &'static str,
    /// Triplas (palavra, tag Penn, tag BIO).
    /// Exemplo: `[("Obama", "NNP", "I-per"), ("visited", "VBD", "O")]`
    pub annotations: &'static [(&'static str, &'static str, &'static str)],
}

/// Retorna o corpus completo
pub fn get_corpus() -> Vec<AnnotatedSentence> {
    vec![
        // ===== POLÍTICA =====
        AnnotatedSentence {
            text: "Barack Obama visited Paris in July 2021.",
            domain: "politics",
            annotations: &[
                ("Barack", "NNP", "B-per"), ("Obama", "NNP", "I-per"), ("visited", "VBD", "O"),
                ("Paris", "NNP", "B-geo"), ("in", "IN", "O"), ("July", "NNP", "B-tim"),
                ("2021", "CD", "I-tim"), (".", ".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "President Obama met German Chancellor Angela Merkel in Berlin on Monday.",
            domain: "politics",
            annotations: &[
                ("President", "NNP", "B-per"), ("Obama", "NNP", "I-per"), ("met", "VBD", "O"),
                ("German", "JJ", "B-gpe"), ("Chancellor", "NNP", "O"), ("Angela", "NNP", "B-per"),
                ("Merkel", "NNP", "I-per"), ("in", "IN", "O"), ("Berlin", "NNP", "B-geo"),
                ("on", "IN", "O"), ("Monday", "NNP", "B-tim"), (".", ".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "French President Nicolas Sarkozy visited Washington last week.",
            domain: "politics",
            annotations: &[
                ("French", "JJ", "B-gpe"), ("President", "NNP", "B-per"), ("Nicolas", "NNP", "I-per"),
                ("Sarkozy", "NNP", "I-per"), ("visited", "VBD", "O"), ("Washington", "NNP", "B-geo"),
                ("last", "JJ", "O"), ("week", "NN", "O"), (".", ".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Prime Minister Gordon Brown said Britain will send more troops to Afghanistan in 2009.",
            domain: "politics",
            annotations: &[
                ("Prime", "NNP", "B-per"), ("Minister", "NNP", "I-per"), ("Gordon", "NNP", "I-per"),
                ("Brown", "NNP", "I-per"), ("said", "VBD", "O"), ("Britain", "NNP", "B-geo"),
                ("will", "MD", "O"), ("send", "VB", "O"), ("more", "JJR", "O"),
                ("troops", "NNS", "O"), ("to", "TO", "O"), ("Afghanistan", "NNP", "B-geo"),
                ("in", "IN", "O"), ("2009", "CD", "B-tim"), (".", ".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Pakistani President Pervez Musharraf said he will step down.",
            domain: "politics",
            annotations: &[
                ("Pakistani", "JJ", "B-gpe"), ("President", "NNP", "B-per"), ("Pervez", "NNP", "I-per"),
                ("Musharraf", "NNP", "I-per"), ("said", "VBD", "O"), ("he", "PRP", "O"),
                ("will", "MD", "O"), ("step", "VB", "O"), ("down", "RP", "O"), (".", ".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Israel and the Palestinians resumed peace talks in Jerusalem.",
            domain: "politics",
            annotations: &[
                ("Israel", "NNP", "B-geo"), ("and", "CC", "O"), ("the", "DT", "O"),
                ("Palestinians", "NNPS", "B-gpe"), ("resumed", "VBD", "O"), ("peace", "NN", "O"),
                ("talks", "NNS", "O"), ("in", "IN", "O"), ("Jerusalem", "NNP", "B-geo"), (".", ".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "The European Union imposed sanctions on Russia in March 2014.",
            domain: "politics",
            annotations: &[
                ("The", "DT", "O"), ("European", "NNP", "B-org"), ("Union", "NNP", "I-org"),
                ("imposed", "VBD", "O"), ("sanctions", "NNS", "O"), ("on", "IN", "O"),
                ("Russia", "NNP", "B-geo"), ("in", "IN", "O"), ("March", "NNP", "B-tim"),
                ("2014", "CD", "I-tim"), (".", ".", "O"),
            ],
        },
        // ===== CONFLITOS =====
        AnnotatedSentence {
            text: "Thousands of demonstrators have marched through London to protest the war in Iraq and demand the withdrawal of British troops from that country.",
            domain: "conflict",
            annotations: &[
                ("Thousands", "NNS", "O"), ("of", "IN", "O"), ("demonstrators", "NNS", "O"),
                ("have", "VBP", "O"), ("marched", "VBN", "O"), ("through", "IN", "O"),
                ("London", "NNP", "B-geo"), ("to", "TO", "O"), ("protest", "VB", "O"),
                ("the", "DT", "O"), ("war", "NN", "O"), ("in", "IN", "O"), ("Iraq", "NNP", "B-geo"),
                ("and", "CC", "O"), ("demand", "VB", "O"), ("the", "DT", "O"),
                ("withdrawal", "NN", "O"), ("of", "IN", "O"), ("British", "JJ", "B-gpe"),
                ("troops", "NNS", "O"), ("from", "IN", "O"), ("that", "DT", "O"),
                ("country", "NN", "O"), (".", ".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Iranian officials say they expect to get access to sealed sensitive parts of the plant Wednesday, after an IAEA surveillance system begins functioning.",
            domain: "conflict",
            annotations: &[
                ("Iranian", "JJ", "B-gpe"), ("officials", "NNS", "O"), ("say", "VBP", "O"),
                ("they", "PRP", "O"), ("expect", "VBP", "O"), ("to", "TO", "O"), ("get", "VB", "O"),
                ("access", "NN", "O"), ("to", "TO", "O"), ("sealed", "VBN", "O"),
                ("sensitive", "JJ", "O"), ("parts", "NNS", "O"), ("of", "IN", "O"), ("the", "DT", "O"),
                ("plant", "NN", "O"), ("Wednesday", "NNP", "B-tim"), (",", ",", "O"),
                ("after", "IN", "O"), ("an", "DT", "O"), ("IAEA", "NNP", "B-org"),
                ("surveillance", "NN", "O"), ("system", "NN", "O"), ("begins", "VBZ", "O"),
                ("functioning", "VBG", "O"), (".", ".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Helicopter gunships Saturday pounded militant hideouts in the Orakzai tribal region, where many Taliban militants are believed to have fled to avoid an earlier military offensive in nearby South Waziristan.",
            domain: "conflict",
            annotations: &[
                ("Helicopter", "NN", "O"), ("gunships", "NNS", "O"), ("Saturday", "NNP", "B-tim"),
                ("pounded", "VBD", "O"), ("militant", "JJ", "O"), ("hideouts", "NNS", "O"),
                ("in", "IN", "O"), ("the", "DT", "O"), ("Orakzai", "NNP", "B-geo"),
                ("tribal", "JJ", "O"), ("region", "NN", "O"), (",", ",", "O"), ("where", "WRB", "O"),
                ("many", "JJ", "O"), ("Taliban", "NNP", "B-org"), ("militants", "NNS", "O"),
                ("are", "VBP", "O"), ("believed", "VBN", "O"), ("to", "TO", "O"), ("have", "VB", "O"),
                ("fled", "VBN", "O"), ("to", "TO", "O"), ("avoid", "VB", "O"), ("an", "DT", "O"),
                ("earlier", "JJR", "O"), ("military", "JJ", "O"), ("offensive", "NN", "O"),
                ("in", "IN", "O"), ("nearby", "JJ", "O"), ("South", "NNP", "B-geo"),
                ("Waziristan", "NNP", "I-geo"), (".", ".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Officials in Afghanistan say Taliban fighters attacked a police post in Kandahar province.",
            domain: "conflict",
            annotations: &[
                ("Officials", "NNS", "O"), ("in", "IN", "O"), ("Afghanistan", "NNP", "B-geo"),
                ("say", "VBP", "O"), ("Taliban", "NNP", "B-org"), ("fighters", "NNS", "O"),
                ("attacked", "VBD", "O"), ("a", "DT", "O"), ("police", "NN", "O"), ("post", "NN", "O"),
                ("in", "IN", "O"), ("Kandahar", "NNP", "B-geo"), ("province", "NN", "O"), (".", ".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Egyptian police arrested members of the Muslim Brotherhood in Cairo.",
            domain: "conflict",
            annotations: &[
                ("Egyptian", "JJ", "B-gpe"), ("police", "NNS", "O"), ("arrested", "VBD", "O"),
                ("members", "NNS", "O"), ("of", "IN", "O"), ("the", "DT", "O"),
                ("Muslim", "NNP", "B-org"), ("Brotherhood", "NNP", "I-org"), ("in", "IN", "O"),
                ("Cairo", "NNP", "B-geo"), (".", ".", "O"),
            ],
        },
        // ===== ECONOMIA =====
        AnnotatedSentence {
            text: "India is going to win the Apple stocks and can get a profit of 2 billion dollars in the next year 2020 with 2kg of apples",
            domain: "economy",
            annotations: &[
                ("India", "NNP", "B-geo"), ("is", "VBZ", "O"), ("going", "VBG", "O"), ("to", "TO", "O"),
                ("win", "VB", "O"), ("the", "DT", "O"), ("Apple", "NNP", "B-org"), ("stocks", "NNS", "O"),
                ("and", "CC", "O"), ("can", "MD", "O"), ("get", "VB", "O"), ("a", "DT", "O"),
                ("profit", "NN", "O"), ("of", "IN", "O"), ("2", "CD", "O"), ("billion", "CD", "O"),
                ("dollars", "NNS", "O"), ("in", "IN", "O"), ("the", "DT", "O"), ("next", "JJ", "O"),
                ("year", "NN", "O"), ("2020", "CD", "B-tim"), ("with", "IN", "O"), ("2kg", "CD", "O"),
                ("of", "IN", "O"), ("apples", "NNS", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Microsoft and Google reported strong earnings on Thursday.",
            domain: "economy",
            annotations: &[
                ("Microsoft", "NNP", "B-org"), ("and", "CC", "O"), ("Google", "NNP", "B-org"),
                ("reported", "VBD", "O"), ("strong", "JJ", "O"), ("earnings", "NNS", "O"),
                ("on", "IN", "O"), ("Thursday", "NNP", "B-tim"), (".", ".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Apple chief executive Tim Cook announced a new iPhone in California on Tuesday.",
            domain: "economy",
            annotations: &[
                ("Apple", "NNP", "B-org"), ("chief", "JJ", "O"), ("executive", "NN", "O"),
                ("Tim", "NNP", "B-per"), ("Cook", "NNP", "I-per"), ("announced", "VBD", "O"),
                ("a", "DT", "O"), ("new", "JJ", "O"), ("iPhone", "NN", "B-art"), ("in", "IN", "O"),
                ("California", "NNP", "B-geo"), ("on", "IN", "O"), ("Tuesday", "NNP", "B-tim"),
                (".", ".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "The World Bank says economic growth in Africa will slow to 4 percent this year.",
            domain: "economy",
            annotations: &[
                ("The", "DT", "O"), ("World", "NNP", "B-org"), ("Bank", "NNP", "I-org"),
                ("says", "VBZ", "O"), ("economic", "JJ", "O"), ("growth", "NN", "O"), ("in", "IN", "O"),
                ("Africa", "NNP", "B-geo"), ("will", "MD", "O"), ("slow", "VB", "O"), ("to", "TO", "O"),
                ("4", "CD", "O"), ("percent", "NN", "O"), ("this", "DT", "O"), ("year", "NN", "O"),
                (".", ".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "The Toyota Corolla is the best selling car in Japan.",
            domain: "economy",
            annotations: &[
                ("The", "DT", "O"), ("Toyota", "NNP", "B-org"), ("Corolla", "NNP", "B-art"),
                ("is", "VBZ", "O"), ("the", "DT", "O"), ("best", "JJS", "O"), ("selling", "VBG", "O"),
                ("car", "NN", "O"), ("in", "IN", "O"), ("Japan", "NNP", "B-geo"), (".", ".", "O"),
            ],
        },
        // ===== CULTURA E EVENTOS =====
        AnnotatedSentence {
            text: "The United Nations says the World Cup in South Africa drew millions of visitors in June.",
            domain: "events",
            annotations: &[
                ("The", "DT", "O"), ("United", "NNP", "B-org"), ("Nations", "NNPS", "I-org"),
                ("says", "VBZ", "O"), ("the", "DT", "O"), ("World", "NNP", "B-eve"), ("Cup", "NNP", "I-eve"),
                ("in", "IN", "O"), ("South", "NNP", "B-geo"), ("Africa", "NNP", "I-geo"),
                ("drew", "VBD", "O"), ("millions", "NNS", "O"), ("of", "IN", "O"),
                ("visitors", "NNS", "O"), ("in", "IN", "O"), ("June", "NNP", "B-tim"), (".", ".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "The Olympic Games opened in Beijing in August 2008.",
            domain: "events",
            annotations: &[
                ("The", "DT", "O"), ("Olympic", "NNP", "B-eve"), ("Games", "NNPS", "I-eve"),
                ("opened", "VBD", "O"), ("in", "IN", "O"), ("Beijing", "NNP", "B-geo"), ("in", "IN", "O"),
                ("August", "NNP", "B-tim"), ("2008", "CD", "I-tim"), (".", ".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Thousands of people gathered in Paris to celebrate Bastille Day on Friday.",
            domain: "events",
            annotations: &[
                ("Thousands", "NNS", "O"), ("of", "IN", "O"), ("people", "NNS", "O"),
                ("gathered", "VBD", "O"), ("in", "IN", "O"), ("Paris", "NNP", "B-geo"), ("to", "TO", "O"),
                ("celebrate", "VB", "O"), ("Bastille", "NNP", "B-eve"), ("Day", "NNP", "I-eve"),
                ("on", "IN", "O"), ("Friday", "NNP", "B-tim"), (".", ".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "The Nobel Prize was awarded to Marie Curie in 1911.",
            domain: "science",
            annotations: &[
                ("The", "DT", "O"), ("Nobel", "NNP", "B-art"), ("Prize", "NNP", "I-art"),
                ("was", "VBD", "O"), ("awarded", "VBN", "O"), ("to", "TO", "O"), ("Marie", "NNP", "B-per"),
                ("Curie", "NNP", "I-per"), ("in", "IN", "O"), ("1911", "CD", "B-tim"), (".", ".", "O"),
            ],
        },
        // ===== NATUREZA E CIÊNCIA =====
        AnnotatedSentence {
            text: "Hurricane Katrina struck New Orleans in August 2005.",
            domain: "nature",
            annotations: &[
                ("Hurricane", "NNP", "B-nat"), ("Katrina", "NNP", "I-nat"), ("struck", "VBD", "O"),
                ("New", "NNP", "B-geo"), ("Orleans", "NNP", "I-geo"), ("in", "IN", "O"),
                ("August", "NNP", "B-tim"), ("2005", "CD", "I-tim"), (".", ".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Chinese scientists said the H5N1 virus spread to birds in Vietnam last year.",
            domain: "science",
            annotations: &[
                ("Chinese", "JJ", "B-gpe"), ("scientists", "NNS", "O"), ("said", "VBD", "O"),
                ("the", "DT", "O"), ("H5N1", "NNP", "B-nat"), ("virus", "NN", "O"), ("spread", "VBD", "O"),
                ("to", "TO", "O"), ("birds", "NNS", "O"), ("in", "IN", "O"), ("Vietnam", "NNP", "B-geo"),
                ("last", "JJ", "O"), ("year", "NN", "O"), (".", ".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "The storm El Nino caused floods in Peru and Ecuador in January 1998.",
            domain: "nature",
            annotations: &[
                ("The", "DT", "O"), ("storm", "NN", "O"), ("El", "NNP", "B-nat"), ("Nino", "NNP", "I-nat"),
                ("caused", "VBD", "O"), ("floods", "NNS", "O"), ("in", "IN", "O"), ("Peru", "NNP", "B-geo"),
                ("and", "CC", "O"), ("Ecuador", "NNP", "B-geo"), ("in", "IN", "O"),
                ("January", "NNP", "B-tim"), ("1998", "CD", "I-tim"), (".", ".", "O"),
            ],
        },
        AnnotatedSentence {
            text: "Mount Etna erupted in Italy on Sunday, sending ash over Sicily.",
            domain: "nature",
            annotations: &[
                ("Mount", "NNP", "B-geo"), ("Etna", "NNP", "I-geo"), ("erupted", "VBD", "O"),
                ("in", "IN", "O"), ("Italy", "NNP", "B-geo"), ("on", "IN", "O"), ("Sunday", "NNP", "B-tim"),
                (",", ",", "O"), ("sending", "VBG", "O"), ("ash", "NN", "O"), ("over", "IN", "O"),
                ("Sicily", "NNP", "B-geo"), (".", ".", "O"),
            ],
        },
    ]
}

/// Contagem de rótulos BIO por palavra (em minúsculas), extraída das anotações.
///
/// Base do léxico do modelo embutido: `"paris" → {"B-geo": 2}`.
pub fn label_counts() -> HashMap<String, HashMap<&'static str, u32>> {
    let mut counts: HashMap<String, HashMap<&'static str, u32>> = HashMap::new();
    for sentence in get_corpus() {
        for &(word, _, label) in sentence.annotations {
            *counts
                .entry(word.to_lowercase())
                .or_default()
                .entry(label)
                .or_insert(0) += 1;
        }
    }
    counts
}

/// Contagem do rótulo do token seguinte, por palavra anterior (em minúsculas).
///
/// Ex: `"barack" → {"I-per": 1}`, `"in" → {"B-geo": 12, "O": 3, ...}`.
pub fn context_counts() -> HashMap<String, HashMap<&'static str, u32>> {
    let mut counts: HashMap<String, HashMap<&'static str, u32>> = HashMap::new();
    for sentence in get_corpus() {
        for pair in sentence.annotations.windows(2) {
            *counts
                .entry(pair[0].0.to_lowercase())
                .or_default()
                .entry(pair[1].2)
                .or_insert(0) += 1;
        }
    }
    counts
}

/// Textos de demonstração para a interface web e a CLI
pub fn demo_texts() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "Default",
            "India is going to win the Apple stocks and can get a profit of 2 billion dollars in the next year 2020 with 2kg of apples",
        ),
        ("Politics", "Barack Obama visited Paris in July 2021."),
        (
            "Conflict",
            "Thousands of demonstrators have marched through London to protest the war in Iraq and demand the withdrawal of British troops from that country.",
        ),
        (
            "Economy",
            "Apple chief executive Tim Cook announced a new iPhone in California on Tuesday, while Microsoft and Google reported strong earnings.",
        ),
        (
            "Nature",
            "Hurricane Katrina struck New Orleans in August 2005, and Mount Etna erupted in Italy on Sunday.",
        ),
        (
            "Events",
            "The Olympic Games opened in Beijing in August 2008 and the World Cup drew millions of visitors to South Africa in June.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tagger::Tag;

    #[test]
    fn test_annotations_are_valid_labels() {
        for sentence in get_corpus() {
            for &(word, pos, label) in sentence.annotations {
                assert!(!word.is_empty());
                assert!(!pos.is_empty());
                assert!(Tag::from_label(label).is_ok(), "tag inválida: {label}");
            }
        }
    }

    #[test]
    fn test_bio_sequences_are_consistent() {
        for sentence in get_corpus() {
            let tags: Vec<Tag> = sentence
                .annotations
                .iter()
                .map(|&(_, _, l)| Tag::from_label(l).unwrap())
                .collect();
            assert!(!matches!(tags[0], Tag::Inside(_)), "{}", sentence.text);
            for pair in tags.windows(2) {
                assert!(
                    Tag::is_valid_transition(&pair[0], &pair[1]),
                    "transição inválida em: {}",
                    sentence.text
                );
            }
        }
    }

    #[test]
    fn test_label_counts() {
        let counts = label_counts();
        assert_eq!(counts["paris"].get("B-geo"), Some(&2));
        assert_eq!(counts["obama"].get("I-per"), Some(&2));
        assert_eq!(counts["in"].len(), 1);
        assert!(counts["in"].contains_key("O"));
    }

    #[test]
    fn test_context_counts() {
        let counts = context_counts();
        assert_eq!(counts["barack"].get("I-per"), Some(&1));
        assert_eq!(counts["july"].get("I-tim"), Some(&1));
        assert!(counts["in"].get("B-geo").copied().unwrap_or(0) > 5);
        // O último token de cada sentença não é contexto de ninguém
        assert!(!counts.contains_key("apples"));
    }

    #[test]
    fn test_demo_texts_not_empty() {
        let demos = demo_texts();
        assert!(demos.len() >= 5);
        assert!(demos.iter().all(|(_, text)| !text.trim().is_empty()));
    }
}
