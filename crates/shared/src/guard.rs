use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

use crate::compose::{self, NEUTRAL_FALLBACKS};
use crate::hooks::HookSet;
use crate::models::{Domain, Move, Teaser};

/// Opener and first-word bookkeeping for a single run.
///
/// Built once per run from the previous digest and threaded through the pipeline by
/// `&mut`. Openers are only ever appended.
#[derive(Debug, Clone)]
pub struct HistoryState {
    openers: Vec<String>,
    known: HashSet<String>,
    seeded: usize,
    first_words: HashMap<String, usize>,
    run_openers: HashSet<String>,
    first_word_cap: usize,
}

impl HistoryState {
    pub fn new(first_word_cap: usize) -> Self {
        Self::seeded(Vec::new(), 0, first_word_cap)
    }

    /// Keeps at most `limit` seed openers, in the order given.
    pub fn seeded<I>(openers: I, limit: usize, first_word_cap: usize) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let openers: Vec<String> = openers
            .into_iter()
            .filter(|opener| !opener.is_empty())
            .take(limit)
            .collect();
        let known = openers.iter().cloned().collect();
        let seeded = openers.len();

        Self {
            openers,
            known,
            seeded,
            first_words: HashMap::new(),
            run_openers: HashSet::new(),
            first_word_cap: first_word_cap.max(1),
        }
    }

    pub fn openers(&self) -> &[String] {
        &self.openers
    }

    pub fn seeded_len(&self) -> usize {
        self.seeded
    }

    pub fn first_word_cap(&self) -> usize {
        self.first_word_cap
    }

    pub fn contains_opener(&self, opener: &str) -> bool {
        self.known.contains(opener)
    }

    pub fn used_this_run(&self, opener: &str) -> bool {
        self.run_openers.contains(opener)
    }

    pub fn first_word_count(&self, word: &str) -> usize {
        self.first_words.get(word).copied().unwrap_or(0)
    }

    /// True when one more teaser starting with `word` would exceed the cap.
    pub fn over_first_word_cap(&self, word: &str) -> bool {
        self.first_word_count(word) >= self.first_word_cap
    }

    pub fn record(&mut self, teaser: &Teaser) {
        if self.known.insert(teaser.opener.clone()) {
            self.openers.push(teaser.opener.clone());
        }
        self.run_openers.insert(teaser.opener.clone());
        *self
            .first_words
            .entry(compose::first_word(&teaser.text))
            .or_insert(0) += 1;
    }
}

/// Screens drafted teasers against the run's history and always settles on one.
///
/// Drafts are tried in [`compose::drafts`] order; the first that passes
/// [`RepetitionGuard::needs_rewrite`] is then checked against the first-word cap, and a
/// neutral sentence replaces it when the cap is reached or nothing passes.
pub struct RepetitionGuard {
    rng: StdRng,
}

impl RepetitionGuard {
    pub fn new(rng: StdRng) -> Self {
        Self { rng }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    pub fn needs_rewrite(candidate: &str, history: &HistoryState) -> bool {
        compose::contains_banned_phrase(candidate)
            || compose::is_question(candidate)
            || history.contains_opener(&compose::opener_key(candidate))
    }

    pub fn finalize(
        &mut self,
        hooks: &HookSet,
        domain: Domain,
        title: &str,
        history: &mut HistoryState,
    ) -> Teaser {
        let drafts = compose::drafts(hooks, domain, title);
        let rewritten = drafts
            .into_iter()
            .enumerate()
            .find(|(_, (_, text))| !Self::needs_rewrite(text, history));

        let teaser = match rewritten {
            Some((attempt, (chosen_move, text)))
                if !history.over_first_word_cap(&compose::first_word(&text)) =>
            {
                if attempt > 0 {
                    debug!(
                        domain = %domain,
                        chosen_move = %chosen_move,
                        attempt,
                        "teaser rewritten"
                    );
                }
                Teaser {
                    opener: compose::opener_key(&text),
                    text,
                    domain,
                    chosen_move,
                }
            }
            Some((_, (_, text))) => {
                debug!(
                    first_word = %compose::first_word(&text),
                    cap = history.first_word_cap(),
                    "first-word cap reached, forcing fallback"
                );
                self.neutral_fallback(domain, history)
            }
            None => {
                debug!(domain = %domain, "no draft cleared the filters, forcing fallback");
                self.neutral_fallback(domain, history)
            }
        };

        history.record(&teaser);
        teaser
    }

    fn neutral_fallback(&mut self, domain: Domain, history: &HistoryState) -> Teaser {
        let start = self.rng.random_range(0..NEUTRAL_FALLBACKS.len());
        let rotation: Vec<&str> = (0..NEUTRAL_FALLBACKS.len())
            .map(|i| NEUTRAL_FALLBACKS[(start + i) % NEUTRAL_FALLBACKS.len()])
            .collect();

        let clean = rotation.iter().find(|text| {
            !Self::needs_rewrite(text, history)
                && !history.over_first_word_cap(&compose::first_word(text))
        });

        // Fail open: once the pool is exhausted an opener may repeat, and once every
        // fallback's first word is at the cap the cap is exceeded too.
        let text = match clean {
            Some(text) => *text,
            None => {
                let under_cap = rotation
                    .iter()
                    .find(|text| !history.over_first_word_cap(&compose::first_word(text)))
                    .copied();
                match under_cap {
                    Some(text) => {
                        warn!(
                            domain = %domain,
                            "neutral fallback pool exhausted, repeating an opener"
                        );
                        text
                    }
                    None => {
                        warn!(
                            domain = %domain,
                            cap = history.first_word_cap(),
                            "neutral fallback pool exhausted, exceeding first-word cap"
                        );
                        rotation[0]
                    }
                }
            }
        };

        Teaser {
            text: text.to_string(),
            domain,
            chosen_move: Move::NeutralFallback,
            opener: compose::opener_key(text),
        }
    }
}
