//! # Tipos de Erro do Pipeline NER
//!
//! Todos os estágios (extração de features, POS tagging, carregamento do modelo
//! e decodificação) reportam falhas por meio de [`NerError`]. O extrator de
//! features é puro: seus únicos erros são violações de pré-condição do chamador.

use std::path::PathBuf;

use thiserror::Error;

/// Erro de alto nível do crate.
#[derive(Debug, Error)]
pub enum NerError {
    /// Texto de entrada vazio ou só com espaços.
    #[error("texto de entrada vazio")]
    EmptyInput,

    /// Sentença sem tokens: nenhum índice é válido.
    #[error("sentença vazia: nenhum token para extrair features")]
    EmptySentence,

    /// Índice fora dos limites da sentença.
    #[error("índice {index} fora dos limites da sentença (len = {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Token cuja palavra é a string vazia.
    #[error("token {index} tem palavra vazia")]
    EmptyWord { index: usize },

    /// O rotulador devolveu uma sequência de tamanho diferente da entrada.
    #[error("rotulador devolveu {got} tags para {expected} tokens")]
    LengthMismatch { expected: usize, got: usize },

    /// Tag fora do vocabulário de entidades conhecido.
    #[error("tag desconhecida: {0:?}")]
    UnknownLabel(String),

    /// Arquivo de modelo lido, mas com conteúdo inconsistente.
    #[error("modelo inválido: {0}")]
    InvalidModel(String),

    /// Falha de I/O ao abrir o modelo.
    #[error("não foi possível ler o modelo {path}: {source}")]
    ModelIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Erro de configuração.
    #[error("erro de configuração: {0}")]
    Config(String),

    /// O POS tagger não conseguiu etiquetar a sentença.
    #[error("erro no POS tagger: {0}")]
    PosTagger(String),

    /// Erro de (de)serialização JSON.
    #[error("erro de JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// Erro de I/O genérico.
    #[error("erro de I/O: {0}")]
    Io(#[from] std::io::Error),
}

/// Tipo `Result` do crate.
pub type Result<T> = std::result::Result<T, NerError>;
