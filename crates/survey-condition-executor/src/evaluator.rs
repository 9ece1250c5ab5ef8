//! Condition evaluation against recorded responses.

use std::sync::Arc;

use survey_condition::{Comparator, Comparison, Condition, Fragment, Leaf, NoResponse, Terminal};

use crate::cache::ConditionCache;
use crate::config::{ExecutorConfig, MissingResponsePolicy};
use crate::error::{ConditionExecutorError, ExecutorResult};
use crate::response::{integral, ResponseSource, ResponseValue};

/// Evaluates parsed conditions against response maps.
///
/// An evaluator holds no per-evaluation state, so one instance can serve
/// many threads. Evaluation short-circuits: the right side of an `AND` is
/// not visited when the left side is false, nor the right side of an `OR`
/// when the left side is true.
///
/// # Example
///
/// ```rust
/// use survey_condition::Condition;
/// use survey_condition_executor::{Evaluator, ResponseMap, ResponseValue};
///
/// let condition = Condition::parse("sleep < 6 AND (mood == 0 OR mood == 1)").unwrap();
///
/// let mut responses = ResponseMap::new();
/// responses.insert("sleep".into(), ResponseValue::from(5i64));
/// responses.insert("mood".into(), ResponseValue::from(1i64));
///
/// let evaluator = Evaluator::new();
/// assert!(evaluator.evaluate(&condition, &responses).unwrap());
/// ```
#[derive(Debug, Default)]
pub struct Evaluator {
    config: ExecutorConfig,
    cache: Option<Arc<ConditionCache>>,
}

/// A terminal resolved to a comparable value.
#[derive(Debug, Clone, Copy)]
enum Operand<'r> {
    Number(f64),
    Text(&'r str),
    Choices(&'r [i64]),
    Marker(NoResponse),
}

impl<'r> Operand<'r> {
    fn from_response(value: &'r ResponseValue) -> Self {
        match value {
            ResponseValue::Number(n) => Operand::Number(*n),
            ResponseValue::Text(s) => Operand::Text(s),
            ResponseValue::Choices(keys) => Operand::Choices(keys),
            ResponseValue::NoResponse(marker) => Operand::Marker(*marker),
        }
    }
}

impl Evaluator {
    /// Creates an evaluator with default configuration and no cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an evaluator with custom configuration.
    pub fn with_config(config: ExecutorConfig) -> Self {
        let cache = config
            .cache
            .as_ref()
            .map(|c| Arc::new(ConditionCache::new(c, config.grammar())));
        Self { config, cache }
    }

    /// Returns the compiled-condition cache if enabled.
    pub fn cache(&self) -> Option<&ConditionCache> {
        self.cache.as_deref()
    }

    /// Returns the evaluator configuration.
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Parses a sentence, reusing a cached parse when the cache is enabled.
    pub fn compile(&self, sentence: &str) -> ExecutorResult<Arc<Condition>> {
        match &self.cache {
            Some(cache) => cache.compile(sentence),
            None => Ok(Arc::new(Condition::parse_with(
                sentence,
                &self.config.grammar(),
            )?)),
        }
    }

    /// Evaluates a condition.
    pub fn evaluate<R>(&self, condition: &Condition, responses: &R) -> ExecutorResult<bool>
    where
        R: ResponseSource + ?Sized,
    {
        let result = self.evaluate_fragment(condition.root(), responses)?;
        tracing::trace!(
            condition = condition.sentence(),
            result,
            "evaluated condition"
        );
        Ok(result)
    }

    /// Parses (or fetches from cache) and evaluates a sentence.
    pub fn evaluate_sentence<R>(&self, sentence: &str, responses: &R) -> ExecutorResult<bool>
    where
        R: ResponseSource + ?Sized,
    {
        let condition = self.compile(sentence)?;
        self.evaluate(&condition, responses)
    }

    /// Evaluates a bare tree after checking its height.
    pub fn evaluate_fragment<R>(&self, fragment: &Fragment, responses: &R) -> ExecutorResult<bool>
    where
        R: ResponseSource + ?Sized,
    {
        let depth = fragment.depth();
        if depth > self.config.max_depth {
            return Err(ConditionExecutorError::DepthExceeded {
                depth,
                limit: self.config.max_depth,
            });
        }
        self.eval(fragment, responses)
    }

    /// Evaluates one condition against many response maps.
    ///
    /// With the `parallel` feature the maps are processed on the rayon pool.
    #[cfg(feature = "parallel")]
    pub fn evaluate_batch<R>(&self, condition: &Condition, responses: &[R]) -> Vec<ExecutorResult<bool>>
    where
        R: ResponseSource + Sync,
    {
        use rayon::prelude::*;

        responses
            .par_iter()
            .map(|r| self.evaluate(condition, r))
            .collect()
    }

    /// Evaluates one condition against many response maps.
    ///
    /// With the `parallel` feature the maps are processed on the rayon pool.
    #[cfg(not(feature = "parallel"))]
    pub fn evaluate_batch<R>(&self, condition: &Condition, responses: &[R]) -> Vec<ExecutorResult<bool>>
    where
        R: ResponseSource,
    {
        responses
            .iter()
            .map(|r| self.evaluate(condition, r))
            .collect()
    }

    // Depth is bounded by the check in evaluate_fragment.
    fn eval<R>(&self, fragment: &Fragment, responses: &R) -> ExecutorResult<bool>
    where
        R: ResponseSource + ?Sized,
    {
        match fragment {
            Fragment::And(left, right) => {
                Ok(self.eval(left, responses)? && self.eval(right, responses)?)
            }
            Fragment::Or(left, right) => {
                Ok(self.eval(left, responses)? || self.eval(right, responses)?)
            }
            Fragment::Nested(inner) => self.eval(inner, responses),
            Fragment::Leaf(leaf) => self.eval_leaf(leaf, responses),
        }
    }

    fn eval_leaf<R>(&self, leaf: &Leaf, responses: &R) -> ExecutorResult<bool>
    where
        R: ResponseSource + ?Sized,
    {
        match leaf {
            Leaf::Terminal(Terminal::PromptId(id)) => Ok(self
                .lookup(id, responses)?
                .is_some_and(ResponseValue::is_answered)),
            Leaf::Terminal(Terminal::Number(n)) => Ok(n.value != 0.0),
            Leaf::Terminal(Terminal::NoResponse(_)) => Ok(false),
            Leaf::Comparison(comparison) => self.eval_comparison(comparison, responses),
        }
    }

    fn eval_comparison<R>(&self, comparison: &Comparison, responses: &R) -> ExecutorResult<bool>
    where
        R: ResponseSource + ?Sized,
    {
        let left = self.operand(&comparison.left, responses)?;
        let right = self.operand(&comparison.right, responses)?;
        Ok(match (left, right) {
            (Some(left), Some(right)) => compare(left, comparison.comparator, right),
            _ => false,
        })
    }

    fn operand<'r, R>(&self, terminal: &Terminal, responses: &'r R) -> ExecutorResult<Option<Operand<'r>>>
    where
        R: ResponseSource + ?Sized,
    {
        Ok(match terminal {
            Terminal::PromptId(id) => self.lookup(id, responses)?.map(Operand::from_response),
            Terminal::Number(n) => Some(Operand::Number(n.value)),
            Terminal::NoResponse(marker) => Some(Operand::Marker(*marker)),
        })
    }

    fn lookup<'r, R>(&self, prompt_id: &str, responses: &'r R) -> ExecutorResult<Option<&'r ResponseValue>>
    where
        R: ResponseSource + ?Sized,
    {
        match responses.response(prompt_id) {
            Some(value) => Ok(Some(value)),
            None => match self.config.missing_response {
                MissingResponsePolicy::TreatAsUnanswered => {
                    tracing::warn!(prompt_id, "no response recorded, treating as unanswered");
                    Ok(None)
                }
                MissingResponsePolicy::Error => {
                    Err(ConditionExecutorError::MissingResponse(prompt_id.to_string()))
                }
            },
        }
    }
}

fn compare(left: Operand<'_>, comparator: Comparator, right: Operand<'_>) -> bool {
    match comparator {
        Comparator::Equals => equal(left, right),
        Comparator::NotEquals => !equal(left, right),
        _ => match (left, right) {
            (Operand::Number(a), Operand::Number(b)) => match comparator {
                Comparator::LessThan => a < b,
                Comparator::LessThanEquals => a <= b,
                Comparator::GreaterThan => a > b,
                Comparator::GreaterThanEquals => a >= b,
                Comparator::Equals | Comparator::NotEquals => false,
            },
            _ => false,
        },
    }
}

fn equal(left: Operand<'_>, right: Operand<'_>) -> bool {
    match (left, right) {
        (Operand::Number(a), Operand::Number(b)) => a == b,
        (Operand::Choices(keys), Operand::Number(n)) | (Operand::Number(n), Operand::Choices(keys)) => {
            integral(n).is_some_and(|n| keys.contains(&n))
        }
        (Operand::Choices(a), Operand::Choices(b)) => {
            let mut a = a.to_vec();
            let mut b = b.to_vec();
            a.sort_unstable();
            a.dedup();
            b.sort_unstable();
            b.dedup();
            a == b
        }
        (Operand::Marker(a), Operand::Marker(b)) => a == b,
        (Operand::Text(a), Operand::Text(b)) => a == b,
        _ => false,
    }
}

/// Evaluates `condition` with a default [`Evaluator`].
pub fn evaluate<R>(condition: &Condition, responses: &R) -> ExecutorResult<bool>
where
    R: ResponseSource + ?Sized,
{
    Evaluator::new().evaluate(condition, responses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use crate::response::ResponseMap;

    fn responses(pairs: &[(&str, ResponseValue)]) -> ResponseMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn eval(sentence: &str, map: &ResponseMap) -> bool {
        evaluate(&Condition::parse(sentence).unwrap(), map).unwrap()
    }

    mod comparisons {
        use super::*;

        #[test]
        fn test_numeric_comparators() {
            let map = responses(&[("q", ResponseValue::from(5i64))]);
            assert!(eval("q == 5", &map));
            assert!(eval("q != 4", &map));
            assert!(eval("q < 6", &map));
            assert!(eval("q <= 5", &map));
            assert!(eval("q > 4.5", &map));
            assert!(eval("q >= 5", &map));
            assert!(!eval("q > 5", &map));
        }

        #[test]
        fn test_literal_on_left() {
            let map = responses(&[("q", ResponseValue::from(5i64))]);
            assert!(eval("6 > q", &map));
            assert!(!eval("5 < q", &map));
        }

        #[test]
        fn test_prompt_to_prompt() {
            let map = responses(&[
                ("a", ResponseValue::from(3i64)),
                ("b", ResponseValue::from(7i64)),
            ]);
            assert!(eval("a < b", &map));
            assert!(eval("a != b", &map));
        }

        #[test]
        fn test_multi_choice_membership() {
            let map = responses(&[("foods", ResponseValue::Choices(vec![1, 4]))]);
            assert!(eval("foods == 4", &map));
            assert!(!eval("foods == 2", &map));
            assert!(eval("foods != 2", &map));
            assert!(!eval("foods > 0", &map));
        }

        #[test]
        fn test_markers() {
            let map = responses(&[
                ("a", ResponseValue::NoResponse(NoResponse::Skipped)),
                ("b", ResponseValue::NoResponse(NoResponse::NotDisplayed)),
                ("c", ResponseValue::from(1i64)),
            ]);
            assert!(eval("a == SKIPPED", &map));
            assert!(!eval("a == NOT_DISPLAYED", &map));
            assert!(eval("b == NOT_DISPLAYED", &map));
            assert!(eval("c != SKIPPED", &map));
            assert!(!eval("a < 3", &map));
        }

        #[test]
        fn test_text_equality() {
            let map = responses(&[
                ("a", ResponseValue::from("yes")),
                ("b", ResponseValue::from("yes")),
            ]);
            assert!(eval("a == b", &map));
            assert!(!eval("a == 1", &map));
        }
    }

    mod bare_terminals {
        use super::*;

        #[test]
        fn test_bare_prompt_means_answered() {
            let map = responses(&[
                ("a", ResponseValue::from(0i64)),
                ("b", ResponseValue::NoResponse(NoResponse::Skipped)),
            ]);
            assert!(eval("a", &map));
            assert!(!eval("b", &map));
            assert!(!eval("c", &map));
        }

        #[test]
        fn test_bare_literals() {
            let map = ResponseMap::new();
            assert!(eval("1", &map));
            assert!(!eval("0", &map));
            assert!(!eval("SKIPPED", &map));
        }
    }

    mod conjunctions {
        use super::*;

        #[test]
        fn test_and_or_truth_table() {
            for a in [0i64, 1] {
                for b in [0i64, 1] {
                    let map = responses(&[
                        ("a", ResponseValue::from(a)),
                        ("b", ResponseValue::from(b)),
                    ]);
                    assert_eq!(eval("a == 1 AND b == 1", &map), a == 1 && b == 1);
                    assert_eq!(eval("a == 1 OR b == 1", &map), a == 1 || b == 1);
                }
            }
        }

        #[test]
        fn test_right_nesting_without_precedence() {
            // a OR (b AND c)
            let map = responses(&[
                ("a", ResponseValue::from(1i64)),
                ("b", ResponseValue::from(0i64)),
                ("c", ResponseValue::from(0i64)),
            ]);
            assert!(eval("a == 1 OR b == 1 AND c == 1", &map));
            assert!(!eval("(a == 1 OR b == 1) AND c == 1", &map));
        }

        #[test]
        fn test_short_circuit_skips_missing_response() {
            let config = ExecutorConfig::builder()
                .with_missing_response_policy(MissingResponsePolicy::Error)
                .build();
            let evaluator = Evaluator::with_config(config);
            let map = responses(&[("a", ResponseValue::from(1i64))]);

            let or = Condition::parse("a == 1 OR missing == 1").unwrap();
            assert!(evaluator.evaluate(&or, &map).unwrap());

            let and = Condition::parse("a == 2 AND missing == 1").unwrap();
            assert!(!evaluator.evaluate(&and, &map).unwrap());

            let and = Condition::parse("a == 1 AND missing == 1").unwrap();
            assert!(matches!(
                evaluator.evaluate(&and, &map),
                Err(ConditionExecutorError::MissingResponse(id)) if id == "missing"
            ));
        }
    }

    mod missing_responses {
        use super::*;

        #[test]
        fn test_default_policy_is_false() {
            let map = ResponseMap::new();
            assert!(!eval("q == 1", &map));
            assert!(!eval("q != 1", &map));
        }

        #[test]
        fn test_error_policy() {
            let evaluator = Evaluator::with_config(
                ExecutorConfig::builder()
                    .with_missing_response_policy(MissingResponsePolicy::Error)
                    .build(),
            );
            let c = Condition::parse("q").unwrap();
            assert!(evaluator.evaluate(&c, &ResponseMap::new()).is_err());
        }
    }

    mod compilation {
        use super::*;

        #[test]
        fn test_cache_returns_same_condition() {
            let evaluator = Evaluator::with_config(
                ExecutorConfig::builder()
                    .with_cache(CacheConfig::default())
                    .build(),
            );
            let first = evaluator.compile("q == 1  AND r").unwrap();
            let second = evaluator.compile(" q == 1 AND   r ").unwrap();
            assert!(Arc::ptr_eq(&first, &second));
            assert_eq!(evaluator.cache().map(|c| c.len()), Some(1));
        }

        #[test]
        fn test_cache_counts_hits_and_misses() {
            let evaluator = Evaluator::with_config(
                ExecutorConfig::builder()
                    .with_cache(CacheConfig::default())
                    .build(),
            );
            let mut map = ResponseMap::new();
            map.insert("q".into(), ResponseValue::from(1i64));

            assert!(evaluator.evaluate_sentence("q == 1", &map).unwrap());
            assert!(evaluator.evaluate_sentence("q  ==  1", &map).unwrap());
            assert!(evaluator.compile("q == 2").is_ok());

            let stats = evaluator.cache().map(|c| c.stats()).unwrap();
            assert_eq!((stats.hits, stats.misses, stats.entries), (1, 2, 2));
        }

        #[test]
        fn test_cached_compile_respects_depth_limit() {
            let evaluator = Evaluator::with_config(
                ExecutorConfig::builder()
                    .with_max_depth(2)
                    .with_cache(CacheConfig::default())
                    .build(),
            );
            assert!(evaluator.compile("a AND b AND c").is_err());
            assert!(evaluator.compile("a AND b").is_ok());
            assert_eq!(evaluator.cache().map(|c| c.grammar().max_depth()), Some(2));
        }

        #[test]
        fn test_no_cache_by_default() {
            let evaluator = Evaluator::new();
            assert!(evaluator.cache().is_none());
            let first = evaluator.compile("q").unwrap();
            let second = evaluator.compile("q").unwrap();
            assert!(!Arc::ptr_eq(&first, &second));
        }

        #[test]
        fn test_compile_respects_depth_limit() {
            let evaluator =
                Evaluator::with_config(ExecutorConfig::builder().with_max_depth(2).build());
            assert!(evaluator.compile("a AND b").is_ok());
            assert!(matches!(
                evaluator.compile("a AND b AND c"),
                Err(ConditionExecutorError::Parse(_))
            ));
        }

        #[test]
        fn test_evaluate_sentence() {
            let map = responses(&[("q", ResponseValue::from(2i64))]);
            let evaluator = Evaluator::new();
            assert!(evaluator.evaluate_sentence("q >= 2", &map).unwrap());
            assert!(evaluator.evaluate_sentence("q >=", &map).is_err());
        }
    }

    #[test]
    fn test_depth_exceeded_for_external_tree() {
        let leaf = || Fragment::terminal(Terminal::prompt_id("q"));
        let mut tree = leaf();
        for _ in 0..4 {
            tree = Fragment::Nested(Box::new(tree));
        }
        let evaluator = Evaluator::with_config(ExecutorConfig::builder().with_max_depth(3).build());
        assert!(matches!(
            evaluator.evaluate_fragment(&tree, &ResponseMap::new()),
            Err(ConditionExecutorError::DepthExceeded { depth: 5, limit: 3 })
        ));
    }

    #[test]
    fn test_evaluate_batch() {
        let condition = Condition::parse("q > 1").unwrap();
        let maps: Vec<ResponseMap> = (0..4i64)
            .map(|n| responses(&[("q", ResponseValue::from(n))]))
            .collect();
        let results: Vec<bool> = Evaluator::new()
            .evaluate_batch(&condition, &maps)
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        assert_eq!(results, vec![false, false, true, true]);
    }
}
