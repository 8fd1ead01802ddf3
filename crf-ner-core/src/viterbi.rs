//! # Algoritmo de Viterbi e Forward-Backward
//!
//! O Viterbi é um método de **programação dinâmica** que encontra a sequência
//! de rótulos de maior score em um CRF linear-chain.
//!
//! ## Intuição
//!
//! Para N tokens e L rótulos, uma busca exaustiva custaria `O(L^N)`. O Viterbi
//! explora que a **melhor sequência até o token i com rótulo y** depende
//! apenas da **melhor sequência até o token i-1** → `O(N × L²)`.
//!
//! ## Algoritmo
//!
//! ```text
//! Inicialização: viterbi[0][y] = emission(0, y)
//!
//! Recursão: viterbi[i][y] = max_{y'} [viterbi[i-1][y'] + transition(y', y)] + emission(i, y)
//!
//! Backtracking: reconstrói o caminho ótimo de trás pra frente
//! ```
//!
//! Empates são resolvidos pelo menor índice de rótulo, então a decodificação
//! é determinística.
//!
//! O forward-backward usa as mesmas matrizes, trocando `max` por
//! `log-sum-exp`, e produz as probabilidades marginais `P(y_i = y | x)`.

use serde::{Deserialize, Serialize};

/// Estado do Viterbi em um instante (para visualização passo a passo)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViterbiStep {
    /// Índice do token sendo processado
    pub token_index: usize,
    /// Scores acumulados para cada rótulo neste passo
    pub scores: Vec<LabelScore>,
    /// O rótulo com maior score neste passo
    pub best_label: String,
    /// Score do melhor caminho até aqui
    pub best_score: f64,
}

/// Score de um rótulo individual no Viterbi
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelScore {
    /// Rótulo (ex: "B-per")
    pub label: String,
    /// Score acumulado até este passo com este rótulo
    pub score: f64,
    /// Rótulo anterior que gerou este score ótimo
    pub best_prev: Option<String>,
    /// Score de emissão neste passo
    pub emission: f64,
    /// Score de transição do rótulo anterior para este
    pub transition: f64,
}

/// Resultado completo do Viterbi
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViterbiResult {
    /// Índices dos rótulos da melhor sequência (um por token)
    pub best_path: Vec<usize>,
    /// Score (não normalizado) da melhor sequência
    pub best_score: f64,
    /// Tabela completa de scores (para visualização)
    pub steps: Vec<ViterbiStep>,
}

/// Executa o Viterbi sobre scores pré-calculados.
///
/// # Parâmetros
/// - `emission`: `emission[i][y]`, score de estado do rótulo `y` no token `i`
/// - `transitions`: `transitions[y'][y]`, score de transição
/// - `labels`: nomes dos rótulos (apenas para a tabela de visualização)
pub fn viterbi_decode(
    emission: &[Vec<f64>],
    transitions: &[Vec<f64>],
    labels: &[String],
) -> ViterbiResult {
    if emission.is_empty() {
        return ViterbiResult {
            best_path: vec![],
            best_score: 0.0,
            steps: vec![],
        };
    }

    let n_tokens = emission.len();
    let n_labels = labels.len();

    // Backpointer: backptr[i][y] = índice do rótulo anterior que maximiza o score
    let mut backptr: Vec<Vec<usize>> = vec![vec![0usize; n_labels]; n_tokens];
    let mut steps: Vec<ViterbiStep> = Vec::with_capacity(n_tokens);

    // === Inicialização (token 0) ===
    let mut viterbi: Vec<f64> = emission[0].clone();
    let (best_0, best_score_0) = best_in_slice(&viterbi);
    steps.push(ViterbiStep {
        token_index: 0,
        scores: (0..n_labels)
            .map(|y| LabelScore {
                label: labels[y].clone(),
                score: viterbi[y],
                best_prev: None,
                emission: emission[0][y],
                transition: 0.0,
            })
            .collect(),
        best_label: labels[best_0].clone(),
        best_score: best_score_0,
    });

    // === Recursão (tokens 1..N-1) ===
    for i in 1..n_tokens {
        let mut next = vec![f64::NEG_INFINITY; n_labels];
        let mut step_scores = Vec::with_capacity(n_labels);

        for y in 0..n_labels {
            let mut best_prev_score = f64::NEG_INFINITY;
            let mut best_prev = 0;
            for prev in 0..n_labels {
                let score = viterbi[prev] + transitions[prev][y];
                if score > best_prev_score {
                    best_prev_score = score;
                    best_prev = prev;
                }
            }

            next[y] = best_prev_score + emission[i][y];
            backptr[i][y] = best_prev;

            step_scores.push(LabelScore {
                label: labels[y].clone(),
                score: next[y],
                best_prev: Some(labels[best_prev].clone()),
                emission: emission[i][y],
                transition: transitions[best_prev][y],
            });
        }

        viterbi = next;

        let (best_y, best_s) = best_in_slice(&viterbi);
        steps.push(ViterbiStep {
            token_index: i,
            scores: step_scores,
            best_label: labels[best_y].clone(),
            best_score: best_s,
        });
    }

    // === Backtracking ===
    let (mut current, best_score) = best_in_slice(&viterbi);
    let mut best_path = vec![0usize; n_tokens];
    best_path[n_tokens - 1] = current;
    for i in (0..n_tokens - 1).rev() {
        current = backptr[i + 1][current];
        best_path[i] = current;
    }

    ViterbiResult {
        best_path,
        best_score,
        steps,
    }
}

/// Probabilidades marginais `P(y_i = y | x)` via forward-backward em log-space.
///
/// Cada linha do resultado soma 1.
pub fn marginals(emission: &[Vec<f64>], transitions: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n_tokens = emission.len();
    if n_tokens == 0 {
        return vec![];
    }
    let n_labels = emission[0].len();

    // alpha[i][y] = log Σ scores de todos os prefixos terminando em y
    let mut alpha = vec![vec![0.0f64; n_labels]; n_tokens];
    alpha[0] = emission[0].clone();
    for i in 1..n_tokens {
        for y in 0..n_labels {
            let incoming: Vec<f64> = (0..n_labels)
                .map(|prev| alpha[i - 1][prev] + transitions[prev][y])
                .collect();
            alpha[i][y] = log_sum_exp(&incoming) + emission[i][y];
        }
    }

    // beta[i][y] = log Σ scores de todos os sufixos começando após y
    let mut beta = vec![vec![0.0f64; n_labels]; n_tokens];
    for i in (0..n_tokens - 1).rev() {
        for y in 0..n_labels {
            let outgoing: Vec<f64> = (0..n_labels)
                .map(|next| transitions[y][next] + emission[i + 1][next] + beta[i + 1][next])
                .collect();
            beta[i][y] = log_sum_exp(&outgoing);
        }
    }

    let log_z = log_sum_exp(&alpha[n_tokens - 1]);
    (0..n_tokens)
        .map(|i| {
            (0..n_labels)
                .map(|y| (alpha[i][y] + beta[i][y] - log_z).exp())
                .collect()
        })
        .collect()
}

/// `log(Σ exp(x))` numericamente estável
pub fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return f64::NEG_INFINITY;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}

/// Retorna (índice, valor) do máximo em um slice; empates ficam com o menor índice
fn best_in_slice(scores: &[f64]) -> (usize, f64) {
    scores
        .iter()
        .enumerate()
        .fold((0, f64::NEG_INFINITY), |best, (i, &v)| {
            if v > best.1 {
                (i, v)
            } else {
                best
            }
        })
}
