//! # Tokenizador para Inglês
//!
//! Divide o texto bruto em tokens (palavras e pontuações). Cada token preserva
//! sua posição original no texto (offsets em bytes) para que as entidades
//! possam ser destacadas na interface sem reconstruir posições "na mão".
//!
//! ## Modos de Tokenização
//!
//! - **Treebank**: Estilo Penn Treebank. Separa pontuação, mantém números
//!   decimais (`2.5`, `2,000`), abreviações (`Mr.`, `U.S.`) e separa clíticos
//!   (`don't` -> `do`, `n't`; `Obama's` -> `Obama`, `'s`).
//! - **UnicodeWords**: Segmentação por fronteiras de palavra Unicode (UAX #29).
//!   Mantém contrações inteiras (`don't`).
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use crf_ner_core::tokenizer::{tokenize_with_mode, TokenizerMode};
//!
//! let tokens = tokenize_with_mode("Mr. Smith didn't go.", TokenizerMode::Treebank);
//! let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
//! assert_eq!(texts, ["Mr.", "Smith", "did", "n't", "go", "."]);
//! ```

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Um token extraído do texto original.
///
/// `start` e `end` são offsets de byte no texto original, de modo que
/// `&text[token.start..token.end] == token.text` sempre vale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    /// O texto do token (ex: "Obama", ",", "n't").
    pub text: String,
    /// Índice de byte inicial no texto original (inclusive).
    pub start: usize,
    /// Índice de byte final no texto original (exclusivo).
    pub end: usize,
    /// Índice sequencial do token na lista (0, 1, 2...).
    pub index: usize,
}

/// Estratégias de tokenização disponíveis.
///
/// As duas estratégias são intercambiáveis: o extrator de features não sabe
/// qual delas produziu os tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenizerMode {
    /// **Treebank**: regras no estilo Penn Treebank (separa clíticos e pontuação).
    #[default]
    Treebank,
    /// **Palavras Unicode**: fronteiras de palavra UAX #29, sem tokens de espaço.
    UnicodeWords,
}

impl FromStr for TokenizerMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "treebank" => Ok(TokenizerMode::Treebank),
            "unicode_words" | "unicode" => Ok(TokenizerMode::UnicodeWords),
            other => Err(format!("modo de tokenização desconhecido: {other}")),
        }
    }
}

/// Abreviações que mantêm o ponto final (comparação sem diferenciar maiúsculas)
const ABBREVIATIONS: &[&str] = &[
    "Mr", "Mrs", "Ms", "Dr", "Prof", "Sr", "Jr", "St", "Mt", "Gen", "Gov",
    "Sen", "Rep", "Capt", "Lt", "Col", "Sgt", "Inc", "Ltd", "Co", "Corp",
    "Bros", "vs", "etc", "Jan", "Feb", "Mar", "Apr", "Jun", "Jul", "Aug",
    "Sep", "Sept", "Oct", "Nov", "Dec", "U.S", "U.K", "U.N", "e.g", "i.e",
    "a.m", "p.m",
];

/// Clíticos separados no modo Treebank
const CLITICS: &[&str] = &["n't", "'s", "'re", "'ve", "'ll", "'d", "'m"];

/// Tokeniza um texto usando o modo padrão (Treebank).
pub fn tokenize(text: &str) -> Vec<Token> {
    tokenize_with_mode(text, TokenizerMode::Treebank)
}

/// Tokeniza um texto com o modo especificado.
pub fn tokenize_with_mode(text: &str, mode: TokenizerMode) -> Vec<Token> {
    let mut tokens = match mode {
        TokenizerMode::Treebank => tokenize_treebank(text),
        TokenizerMode::UnicodeWords => tokenize_unicode_words(text),
    };

    // Re-indexa os tokens
    for (i, token) in tokens.iter_mut().enumerate() {
        token.index = i;
    }
    tokens
}

fn tokenize_unicode_words(text: &str) -> Vec<Token> {
    text.split_word_bound_indices()
        .filter(|(_, segment)| !segment.trim().is_empty())
        .map(|(start, segment)| Token {
            text: segment.to_string(),
            start,
            end: start + segment.len(),
            index: 0,
        })
        .collect()
}

fn tokenize_treebank(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current_start = 0;
    let mut current_text = String::new();
    let chars: Vec<(usize, char)> = text.char_indices().collect();

    for (i, &(byte_pos, ch)) in chars.iter().enumerate() {
        let next = chars.get(i + 1).map(|&(_, c)| c);
        let next_is_alnum = next.map(char::is_alphanumeric).unwrap_or(false);

        if ch.is_alphanumeric() {
            if current_text.is_empty() {
                current_start = byte_pos;
            }
            current_text.push(ch);
        } else if (ch == '-' || ch == '\'' || ch == '\u{2019}')
            && !current_text.is_empty()
            && next_is_alnum
        {
            // Hífen interno ("well-known") ou apóstrofo ("don't"); clíticos são separados no flush
            current_text.push(ch);
        } else if (ch == '.' || ch == ',') && !current_text.is_empty() {
            let current_is_num = current_text
                .chars()
                .all(|c| c.is_numeric() || c == '.' || c == ',');
            let next_is_num = next.map(char::is_numeric).unwrap_or(false);

            if current_is_num && next_is_num {
                // 2.5 ou 2,000
                current_text.push(ch);
            } else if ch == '.' && is_abbreviation(&current_text, next) {
                current_text.push(ch);
            } else {
                flush_token(&mut tokens, &mut current_text, current_start, byte_pos);
                push_token(&mut tokens, ch.to_string(), byte_pos, byte_pos + 1);
            }
        } else if ch.is_whitespace() {
            flush_token(&mut tokens, &mut current_text, current_start, byte_pos);
        } else {
            flush_token(&mut tokens, &mut current_text, current_start, byte_pos);
            push_token(&mut tokens, ch.to_string(), byte_pos, byte_pos + ch.len_utf8());
        }
    }

    flush_token(&mut tokens, &mut current_text, current_start, text.len());
    tokens
}

/// Decide se o ponto após `current` pertence ao token.
///
/// Vale para abreviações conhecidas, para o início de uma abreviação
/// pontuada da lista ("p" em "p.m.", "e" em "e.g.") e para iniciais como
/// "U.S." (letra maiúscula isolada seguida de outra letra ou de um segmento
/// já pontuado).
fn is_abbreviation(current: &str, next: Option<char>) -> bool {
    let next_is_alpha = next.map(char::is_alphabetic).unwrap_or(false);
    let dotted = format!("{current}.");
    let known = ABBREVIATIONS.iter().any(|a| {
        a.eq_ignore_ascii_case(current)
            || (next_is_alpha
                && a.len() > dotted.len()
                && a.get(..dotted.len()).is_some_and(|p| p.eq_ignore_ascii_case(&dotted)))
    });
    if known {
        return true;
    }
    let last_segment = current.rsplit('.').next().unwrap_or(current);
    let mut chars = last_segment.chars();
    let single_upper = matches!((chars.next(), chars.next()), (Some(c), None) if c.is_uppercase());
    single_upper && (current.contains('.') || next_is_alpha)
}

/// Fecha o token acumulado (separando clíticos) e adiciona à lista
fn flush_token(tokens: &mut Vec<Token>, text: &mut String, start: usize, end: usize) {
    if text.is_empty() {
        return;
    }

    match split_clitic(text) {
        Some(split_at) => {
            push_token(tokens, text[..split_at].to_string(), start, start + split_at);
            push_token(tokens, text[split_at..].to_string(), start + split_at, end);
        }
        None => push_token(tokens, text.clone(), start, end),
    }
    text.clear();
}

/// Retorna o offset de byte onde começa um clítico no final da palavra.
fn split_clitic(word: &str) -> Option<usize> {
    let chars: Vec<(usize, char)> = word.char_indices().collect();
    for clitic in CLITICS {
        let n = clitic.chars().count();
        if chars.len() <= n {
            continue;
        }
        let (split_at, _) = chars[chars.len() - n];
        let tail: String = word[split_at..]
            .chars()
            .map(|c| if c == '\u{2019}' { '\'' } else { c })
            .flat_map(char::to_lowercase)
            .collect();
        if tail == *clitic {
            return Some(split_at);
        }
    }
    None
}

/// Adiciona um token diretamente
fn push_token(tokens: &mut Vec<Token>, text: String, start: usize, end: usize) {
    tokens.push(Token {
        text,
        start,
        end,
        index: 0,
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.text.as_str()).collect()
    }

    #[test]
    fn test_tokenize_treebank_basic() {
        let tokens = tokenize("Barack Obama visited Paris in July 2021.");
        assert_eq!(
            texts(&tokens),
            ["Barack", "Obama", "visited", "Paris", "in", "July", "2021", "."]
        );
        assert_eq!(tokens[7].index, 7);
    }

    #[test]
    fn test_tokenize_numbers_and_abbreviations() {
        let tokens = tokenize("The U.S. economy grew 2.5% to 2,000 units.");
        let t = texts(&tokens);
        assert!(t.contains(&"U.S."));
        assert!(t.contains(&"2.5"));
        assert!(t.contains(&"%"));
        assert!(t.contains(&"2,000"));
        assert_eq!(t.last(), Some(&"."));
    }

    #[test]
    fn test_tokenize_dotted_lowercase_abbreviations() {
        let tokens = tokenize("We met at 5 p.m. e.g. today, i.e. Monday");
        assert_eq!(
            texts(&tokens),
            ["We", "met", "at", "5", "p.m.", "e.g.", "today", ",", "i.e.", "Monday"]
        );
        // Letra minúscula isolada fora da lista continua separada
        assert_eq!(texts(&tokenize("plan b. Then")), ["plan", "b", ".", "Then"]);
    }

    #[test]
    fn test_tokenize_clitics() {
        let tokens = tokenize("I don't think it's Obama's.");
        assert_eq!(
            texts(&tokens),
            ["I", "do", "n't", "think", "it", "'s", "Obama", "'s", "."]
        );
    }

    #[test]
    fn test_offsets_match_original_text() {
        let text = "India  is going to win the Apple stocks, and 2kg of apples!";
        for mode in [TokenizerMode::Treebank, TokenizerMode::UnicodeWords] {
            for token in tokenize_with_mode(text, mode) {
                assert_eq!(&text[token.start..token.end], token.text);
            }
        }
    }

    #[test]
    fn test_tokenize_unicode_words() {
        let tokens = tokenize_with_mode("Hello, world! Don't", TokenizerMode::UnicodeWords);
        assert_eq!(texts(&tokens), ["Hello", ",", "world", "!", "Don't"]);
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("   ").is_empty());
        assert!(tokenize_with_mode("", TokenizerMode::UnicodeWords).is_empty());
    }

    #[test]
    fn test_mode_from_str() {
        assert_eq!("treebank".parse::<TokenizerMode>(), Ok(TokenizerMode::Treebank));
        assert_eq!("unicode_words".parse::<TokenizerMode>(), Ok(TokenizerMode::UnicodeWords));
        assert!("bpe".parse::<TokenizerMode>().is_err());
    }
}
