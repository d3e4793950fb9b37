use crate::core::summarizer::text::{clean_text, split_sentences, tokenize};
use crate::domain::model::Summary;
use crate::domain::ports::Summarizer;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::cmp::Reverse;
use std::collections::HashMap;

const SCORE_RESOLUTION: f64 = 1e-12;

fn quantize(score: f64) -> i64 {
    (score / SCORE_RESOLUTION).round() as i64
}

/// LexRank over a TF-IDF cosine similarity graph.
///
/// Sentences are ranked by stationary probability of a random walk over the
/// similarity graph; the winners are returned in document order.
#[derive(Debug, Clone)]
pub struct ExtractiveSummarizer {
    threshold: f64,
    damping: f64,
    tolerance: f64,
    max_iterations: usize,
}

impl Default for ExtractiveSummarizer {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            damping: 0.85,
            tolerance: 1e-4,
            max_iterations: 100,
        }
    }
}

impl ExtractiveSummarizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Synchronous core shared with the abstractive fallbacks. Never fails.
    pub fn extract(&self, text: &str, max_fragments: usize) -> Summary {
        let sentences = split_sentences(&clean_text(text));
        if sentences.len() <= max_fragments {
            return Summary::new(sentences);
        }

        let scores = self.rank(&sentences);
        // 以量化分數排序，同分時取較早出現的句子
        let mut order: Vec<usize> = (0..sentences.len()).collect();
        order.sort_by_key(|&i| (Reverse(quantize(scores[i])), i));

        let mut selected: Vec<usize> = order.into_iter().take(max_fragments).collect();
        selected.sort_unstable();

        Summary::new(selected.into_iter().map(|i| sentences[i].clone()).collect())
    }

    /// LexRank scores, one per sentence, summing to 1.
    pub fn rank(&self, sentences: &[String]) -> Vec<f64> {
        let n = sentences.len();
        if n == 0 {
            return Vec::new();
        }

        let vectors = tf_idf_vectors(sentences);
        let mut weights = vec![vec![0.0; n]; n];
        for i in 0..n {
            for j in (i + 1)..n {
                let similarity = cosine(&vectors[i], &vectors[j]);
                if similarity > self.threshold {
                    weights[i][j] = similarity;
                    weights[j][i] = similarity;
                }
            }
        }
        let row_sums: Vec<f64> = weights.iter().map(|row| row.iter().sum()).collect();

        let uniform = 1.0 / n as f64;
        let mut scores = vec![uniform; n];
        for _ in 0..self.max_iterations {
            // 孤立句子的分數平均分給所有節點
            let dangling: f64 = (0..n)
                .filter(|&i| row_sums[i] == 0.0)
                .map(|i| scores[i])
                .sum();

            let mut next = vec![(1.0 - self.damping) * uniform + self.damping * dangling * uniform; n];
            for i in 0..n {
                if row_sums[i] == 0.0 {
                    continue;
                }
                for j in 0..n {
                    if weights[i][j] > 0.0 {
                        next[j] += self.damping * scores[i] * weights[i][j] / row_sums[i];
                    }
                }
            }

            let delta: f64 = next.iter().zip(&scores).map(|(a, b)| (a - b).abs()).sum();
            scores = next;
            if delta < self.tolerance {
                break;
            }
        }

        scores
    }
}

fn tf_idf_vectors(sentences: &[String]) -> Vec<HashMap<String, f64>> {
    let tokenized: Vec<Vec<String>> = sentences.iter().map(|s| tokenize(s)).collect();

    let mut document_frequency: HashMap<&str, usize> = HashMap::new();
    for tokens in &tokenized {
        let mut seen: Vec<&str> = tokens.iter().map(String::as_str).collect();
        seen.sort_unstable();
        seen.dedup();
        for term in seen {
            *document_frequency.entry(term).or_insert(0) += 1;
        }
    }

    let total = sentences.len() as f64;
    tokenized
        .iter()
        .map(|tokens| {
            let mut tf: HashMap<String, f64> = HashMap::new();
            for token in tokens {
                *tf.entry(token.clone()).or_insert(0.0) += 1.0;
            }
            for (term, weight) in tf.iter_mut() {
                let df = document_frequency.get(term.as_str()).copied().unwrap_or(1) as f64;
                let idf = ((1.0 + total) / (1.0 + df)).ln() + 1.0;
                *weight *= idf;
            }
            tf
        })
        .collect()
}

fn cosine(a: &HashMap<String, f64>, b: &HashMap<String, f64>) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let dot: f64 = small
        .iter()
        .filter_map(|(term, weight)| large.get(term).map(|other| weight * other))
        .sum();
    let norm_a = a.values().map(|w| w * w).sum::<f64>().sqrt();
    let norm_b = b.values().map(|w| w * w).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    fn name(&self) -> &str {
        "extractive"
    }

    async fn summarize(&self, text: &str, max_fragments: usize) -> Result<Summary> {
        Ok(self.extract(text, max_fragments))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATES_ARTICLE: &str = "The central bank raised interest rates today. \
        Cats enjoy sleeping in sunny windows. \
        Interest rates at the central bank affect loans. \
        My grandmother knits colourful scarves. \
        Higher interest rates from the central bank slow inflation.";

    #[test]
    fn test_returns_all_sentences_when_fewer_than_requested() {
        let summarizer = ExtractiveSummarizer::new();
        let summary = summarizer.extract("Second thing happened. First thing happened.", 3);

        assert_eq!(
            summary.fragments,
            vec!["Second thing happened.", "First thing happened."]
        );
    }

    #[test]
    fn test_empty_input_yields_empty_summary() {
        let summarizer = ExtractiveSummarizer::new();

        assert!(summarizer.extract("", 3).is_empty());
        assert!(summarizer.extract("   <p></p>  ", 3).is_empty());
    }

    #[test]
    fn test_wordpress_entities_never_reach_fragments() {
        let summary = ExtractiveSummarizer::new().extract(
            "<p>Företagets vd&#8217;s plan är klar.</p><p>Aktien steg med 5&nbsp;% &#8211; mest i år [&#8230;]</p>",
            3,
        );

        assert_eq!(
            summary.fragments,
            vec![
                "Företagets vd\u{2019}s plan är klar.",
                "Aktien steg med 5 % \u{2013} mest i år"
            ]
        );
        assert!(summary.fragments.iter().all(|f| !f.contains("&#")));
    }

    #[test]
    fn test_picks_central_sentences_in_document_order() {
        let summarizer = ExtractiveSummarizer::new();
        let summary = summarizer.extract(RATES_ARTICLE, 3);

        assert_eq!(
            summary.fragments,
            vec![
                "The central bank raised interest rates today.",
                "Interest rates at the central bank affect loans.",
                "Higher interest rates from the central bank slow inflation.",
            ]
        );
    }

    #[test]
    fn test_ties_break_by_earliest_position() {
        let summarizer = ExtractiveSummarizer::new();
        let text = "Alpha beta gamma. Delta epsilon zeta. Eta theta iota. Kappa lambda mu.";
        let summary = summarizer.extract(text, 2);

        assert_eq!(summary.fragments, vec!["Alpha beta gamma.", "Delta epsilon zeta."]);
    }

    #[test]
    fn test_rank_is_a_probability_distribution() {
        let summarizer = ExtractiveSummarizer::new();
        let sentences = split_sentences(RATES_ARTICLE);
        let scores = summarizer.rank(&sentences);

        assert_eq!(scores.len(), 5);
        assert!((scores.iter().sum::<f64>() - 1.0).abs() < 1e-6);
        assert!(scores[0] > scores[1]);
    }

    #[test]
    fn test_zero_fragments_requested() {
        let summarizer = ExtractiveSummarizer::new();
        assert!(summarizer.extract(RATES_ARTICLE, 0).is_empty());
    }

    #[test]
    fn test_trait_entry_point_matches_sync_core() {
        let summarizer = ExtractiveSummarizer::new();
        let via_trait = tokio_test::block_on(summarizer.summarize(RATES_ARTICLE, 2)).unwrap();

        assert_eq!(via_trait, summarizer.extract(RATES_ARTICLE, 2));
    }
}
