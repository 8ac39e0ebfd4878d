//! Scored, throttled suggestions (`USER_PROMPT_SUBMIT`).
//!
//! Candidates (skills, tools, ...) arrive in the context with match flags
//! from the intent matcher. Each is scored with fixed weights, candidates
//! below `min_match_score` are dropped, and the best `max_suggestions`
//! are returned. A candidate suggested within the throttle window is
//! left out regardless of its score.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use devflow_core::config::hooks::SuggestionConfig;

use crate::error::HookResult;
use crate::hooks::chain::{HookHandler, Next};
use crate::hooks::context::HookContext;

/// Context key holding the candidate list.
pub const CANDIDATES_KEY: &str = "candidates";
/// Context key the ranked suggestions are written to.
pub const SUGGESTIONS_KEY: &str = "suggestions";

/// Weight of a file match.
pub const FILE_WEIGHT: u32 = 3;
/// Weight of a keyword match.
pub const KEYWORD_WEIGHT: u32 = 2;
/// Weight of a directory match.
pub const DIR_WEIGHT: u32 = 2;
/// Weight of a project match.
pub const PROJECT_WEIGHT: u32 = 1;

/// Which signals matched a candidate. Accepts booleans or `0`/`1`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFlags {
    /// A file in the prompt matched the candidate.
    #[serde(default, alias = "fileMatch", deserialize_with = "flag")]
    pub file_match: bool,
    /// A keyword in the prompt matched the candidate.
    #[serde(default, alias = "keywordMatch", deserialize_with = "flag")]
    pub keyword_match: bool,
    /// The working directory matched the candidate.
    #[serde(default, alias = "dirMatch", deserialize_with = "flag")]
    pub dir_match: bool,
    /// The active project matched the candidate.
    #[serde(default, alias = "projectMatch", deserialize_with = "flag")]
    pub project_match: bool,
}

fn flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        _ => false,
    })
}

/// `3·file + 2·keyword + 2·dir + 1·project`.
pub fn score(flags: &MatchFlags) -> u32 {
    u32::from(flags.file_match) * FILE_WEIGHT
        + u32::from(flags.keyword_match) * KEYWORD_WEIGHT
        + u32::from(flags.dir_match) * DIR_WEIGHT
        + u32::from(flags.project_match) * PROJECT_WEIGHT
}

/// A candidate as produced by the intent matcher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionCandidate {
    /// Stable identity, used for throttling.
    pub id: String,
    /// What is suggested, e.g. `"skill"` or `"tool"`.
    #[serde(default)]
    pub kind: Option<String>,
    /// Match signals.
    #[serde(flatten)]
    pub flags: MatchFlags,
}

/// A candidate that made the cut.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoredSuggestion {
    /// Candidate identity.
    pub id: String,
    /// Candidate kind.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Weighted score.
    pub score: u32,
}

/// Scores candidates, drops those below `min_score`, sorts by descending
/// score (stable) and keeps at most `max`.
pub fn rank<I>(candidates: I, min_score: u32, max: usize) -> Vec<ScoredSuggestion>
where
    I: IntoIterator<Item = SuggestionCandidate>,
{
    let mut scored: Vec<ScoredSuggestion> = candidates
        .into_iter()
        .map(|c| ScoredSuggestion {
            score: score(&c.flags),
            id: c.id,
            kind: c.kind,
        })
        .filter(|s| s.score >= min_score)
        .collect();

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(max);
    scored
}

/// Last-suggested timestamps per candidate identity.
#[derive(Debug)]
pub struct SuggestionThrottle {
    window: Duration,
    last_suggested: DashMap<String, DateTime<Utc>>,
}

impl SuggestionThrottle {
    /// Creates a throttle with a window in minutes.
    pub fn new(window_minutes: u64) -> Self {
        Self {
            window: i64::try_from(window_minutes)
                .ok()
                .and_then(Duration::try_minutes)
                .unwrap_or(Duration::MAX),
            last_suggested: DashMap::new(),
        }
    }

    /// Whether `id` was suggested less than one window before `now`.
    pub fn is_throttled(&self, id: &str, now: DateTime<Utc>) -> bool {
        self.last_suggested
            .get(id)
            .is_some_and(|last| now.signed_duration_since(*last) < self.window)
    }

    /// Records that `id` was suggested at `now`.
    pub fn record(&self, id: &str, now: DateTime<Utc>) {
        self.last_suggested.insert(id.to_string(), now);
    }

    /// Forgets every recorded suggestion.
    pub fn reset(&self) {
        self.last_suggested.clear();
    }

    /// Number of tracked identities.
    pub fn len(&self) -> usize {
        self.last_suggested.len()
    }

    /// Whether nothing is tracked.
    pub fn is_empty(&self) -> bool {
        self.last_suggested.is_empty()
    }
}

/// Ranks the context's candidates into suggestions.
#[derive(Debug)]
pub struct SuggestionHook {
    enabled: bool,
    min_match_score: u32,
    max_suggestions: usize,
    throttle: SuggestionThrottle,
}

impl SuggestionHook {
    /// Creates the hook from its configuration section.
    pub fn new(config: &SuggestionConfig) -> Self {
        Self {
            enabled: config.enabled,
            min_match_score: config.min_match_score,
            max_suggestions: config.max_suggestions,
            throttle: SuggestionThrottle::new(config.throttle_minutes),
        }
    }

    /// The throttle state.
    pub fn throttle(&self) -> &SuggestionThrottle {
        &self.throttle
    }

    /// Runs one suggestion pass at `now` and records what was suggested.
    pub fn suggest(
        &self,
        candidates: Vec<SuggestionCandidate>,
        now: DateTime<Utc>,
    ) -> Vec<ScoredSuggestion> {
        let total = candidates.len();
        let eligible: Vec<SuggestionCandidate> = candidates
            .into_iter()
            .filter(|c| !self.throttle.is_throttled(&c.id, now))
            .collect();
        let throttled = total - eligible.len();

        let suggestions = rank(eligible, self.min_match_score, self.max_suggestions);
        for s in &suggestions {
            self.throttle.record(&s.id, now);
        }

        debug!(
            candidates = total,
            throttled,
            suggested = suggestions.len(),
            "Suggestion pass complete"
        );
        suggestions
    }
}

#[async_trait]
impl HookHandler for SuggestionHook {
    async fn handle(&self, ctx: &mut HookContext, next: Next<'_>) -> HookResult<()> {
        if self.enabled {
            if let Some(candidates) =
                ctx.get_deserialized::<Vec<SuggestionCandidate>>(CANDIDATES_KEY)?
            {
                let suggestions = self.suggest(candidates, Utc::now());
                ctx.set_serialized(SUGGESTIONS_KEY, &suggestions)?;
            }
        }

        next.run(ctx).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn flags(file: bool, keyword: bool, dir: bool, project: bool) -> MatchFlags {
        MatchFlags {
            file_match: file,
            keyword_match: keyword,
            dir_match: dir,
            project_match: project,
        }
    }

    fn candidate(id: &str, f: MatchFlags) -> SuggestionCandidate {
        SuggestionCandidate {
            id: id.to_string(),
            kind: Some("skill".to_string()),
            flags: f,
        }
    }

    #[test]
    fn test_score_weights() {
        assert_eq!(score(&flags(true, false, false, false)), 3);
        assert_eq!(score(&flags(false, true, false, false)), 2);
        assert_eq!(score(&flags(false, false, true, false)), 2);
        assert_eq!(score(&flags(false, false, false, true)), 1);
        assert_eq!(score(&flags(true, true, true, true)), 8);
        assert_eq!(score(&MatchFlags::default()), 0);
    }

    #[test]
    fn test_rank_orders_and_truncates() {
        // Scores 8, 7, 6, 5, 4 fed in shuffled order.
        let candidates = vec![
            candidate("five", flags(true, false, true, false)),
            candidate("eight", flags(true, true, true, true)),
            candidate("four", flags(false, true, true, false)),
            candidate("seven", flags(true, true, true, false)),
            candidate("six", flags(true, true, false, true)),
        ];

        let ranked = rank(candidates, 0, 2);
        let scores: Vec<u32> = ranked.iter().map(|s| s.score).collect();
        assert_eq!(scores, vec![8, 7]);
        assert_eq!(ranked[0].id, "eight");
        assert_eq!(ranked[1].id, "seven");
    }

    #[test]
    fn test_rank_drops_below_minimum() {
        let ranked = rank(
            vec![
                candidate("weak", flags(false, false, false, true)),
                candidate("strong", flags(true, false, false, false)),
            ],
            2,
            10,
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].id, "strong");
    }

    #[test]
    fn test_flags_accept_numbers_and_camel_case() {
        let c: SuggestionCandidate = serde_json::from_value(json!({
            "id": "git",
            "fileMatch": 1,
            "keyword_match": 0,
            "dir_match": true
        }))
        .unwrap();
        assert_eq!(score(&c.flags), 5);
        assert!(c.kind.is_none());
    }

    #[test]
    fn test_throttle_window() {
        let throttle = SuggestionThrottle::new(30);
        let t0 = Utc::now();

        assert!(!throttle.is_throttled("a", t0));
        throttle.record("a", t0);
        assert!(throttle.is_throttled("a", t0 + Duration::minutes(29)));
        assert!(!throttle.is_throttled("a", t0 + Duration::minutes(30)));
        assert!(!throttle.is_throttled("b", t0));

        throttle.reset();
        assert!(throttle.is_empty());
    }

    #[test]
    fn test_throttled_candidate_excluded_regardless_of_score() {
        let hook = SuggestionHook::new(&SuggestionConfig {
            enabled: true,
            min_match_score: 1,
            max_suggestions: 2,
            throttle_minutes: 30,
        });
        let t0 = Utc::now();
        let pool = || {
            vec![
                candidate("best", flags(true, true, true, true)),
                candidate("mid", flags(true, false, false, false)),
                candidate("low", flags(false, false, false, true)),
            ]
        };

        let first: Vec<String> = hook.suggest(pool(), t0).into_iter().map(|s| s.id).collect();
        assert_eq!(first, vec!["best", "mid"]);

        let second: Vec<String> = hook
            .suggest(pool(), t0 + Duration::minutes(1))
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(second, vec!["low"]);

        let later: Vec<String> = hook
            .suggest(pool(), t0 + Duration::minutes(31))
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(later, vec!["best", "mid"]);
    }
}
