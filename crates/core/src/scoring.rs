//! Deterministic creative scoring heuristics.
//!
//! Scoring is a pure function of the combination's fragments: no I/O, no
//! randomness, so re-scoring an unchanged combination always reproduces the
//! same numbers. Five sub-scores (0-100) are always populated -- absence of
//! an optional fragment is a scoring input, not an error -- and `overall`
//! is a fixed-weight average, which makes it monotonic in every sub-score.
//!
//! The exact weighting is an implementation choice, not a contract. Only
//! determinism, full population, and monotonicity are load-bearing.

use serde::Serialize;

// ---------------------------------------------------------------------------
// Weights
// ---------------------------------------------------------------------------

/// Sub-score weights for `overall`. Must sum to 1.0.
const WEIGHT_HOOK: f64 = 0.25;
const WEIGHT_ALIGNMENT: f64 = 0.20;
const WEIGHT_FIT: f64 = 0.20;
const WEIGHT_CLARITY: f64 = 0.20;
const WEIGHT_MATCH: f64 = 0.15;

/// Platform-recommended copy limits. Copy beyond these renders truncated
/// in most placements, which the fit score penalizes.
const HEADLINE_LIMIT: usize = 40;
const DESCRIPTION_LIMIT: usize = 30;
const BODY_SOFT_LIMIT: usize = 125;

/// Cue words suggesting a concrete action; rewarded in hook and fit scores.
const ACTION_CUES: &[&str] = &[
    "get", "try", "start", "join", "save", "shop", "discover", "learn", "claim", "book", "grab",
    "unlock", "download",
];

/// Urgency cues; a little urgency helps the hook, too much hurts clarity.
const URGENCY_CUES: &[&str] = &[
    "now", "today", "limited", "hurry", "last", "ends", "only", "free",
];

// ---------------------------------------------------------------------------
// Inputs / outputs
// ---------------------------------------------------------------------------

/// Asset attributes relevant to scoring.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetInfo<'a> {
    /// `image` or `video`; `None` when the upload carried no media kind.
    pub media_kind: Option<&'a str>,
    pub width: Option<i32>,
    pub height: Option<i32>,
}

/// The creative fragments of one combination, borrowed for scoring.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub asset: AssetInfo<'a>,
    /// Optional axis: scored through its absence branch when `None`.
    pub hook: Option<&'a str>,
    pub headline: &'a str,
    pub body: &'a str,
    pub description: &'a str,
    pub cta_text: &'a str,
    pub cta_type: &'a str,
}

/// The five sub-scores plus the weighted overall, all 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CombinationScores {
    pub hook: i16,
    pub alignment: i16,
    pub fit: i16,
    pub clarity: i16,
    #[serde(rename = "match")]
    pub matching: i16,
    pub overall: i16,
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Score one combination. Pure and deterministic.
pub fn score_combination(input: &ScoringInput<'_>) -> CombinationScores {
    let hook = score_hook(input.hook);
    let alignment = score_alignment(input.headline, input.body, input.description);
    let fit = score_fit(input.headline, input.body, input.description, input.cta_text);
    let clarity = score_clarity(input.headline, input.body);
    let matching = score_match(&input.asset, input.body, input.cta_type);
    let overall = combine(hook, alignment, fit, clarity, matching);
    CombinationScores {
        hook,
        alignment,
        fit,
        clarity,
        matching,
        overall,
    }
}

/// Fixed monotonic mapping from `overall` to a predicted engagement rate
/// (CTR-like percentage). Spans roughly 0.4% at overall = 0 to 2.2% at 100.
pub fn predicted_engagement(overall: i16) -> f32 {
    let o = f32::from(overall.clamp(0, 100)) / 100.0;
    0.4 + 1.8 * o
}

// ---------------------------------------------------------------------------
// Sub-scores
// ---------------------------------------------------------------------------

/// Weighted combination of the five sub-scores, rounded to the nearest
/// integer. Weights are fixed and sum to 1.0, so increasing any sub-score
/// while holding the others never decreases the result.
fn combine(hook: i16, alignment: i16, fit: i16, clarity: i16, matching: i16) -> i16 {
    let weighted = WEIGHT_HOOK * f64::from(hook)
        + WEIGHT_ALIGNMENT * f64::from(alignment)
        + WEIGHT_FIT * f64::from(fit)
        + WEIGHT_CLARITY * f64::from(clarity)
        + WEIGHT_MATCH * f64::from(matching);
    clamp_score(weighted.round())
}

/// Hook strength. No hook is a legitimate creative choice and scores a
/// neutral baseline; a present hook is judged on length band, questions,
/// numerals, and action/urgency cues.
fn score_hook(hook: Option<&str>) -> i16 {
    let Some(text) = hook else {
        return 50;
    };
    let text = text.trim();
    if text.is_empty() {
        return 20;
    }

    let mut score = 40.0;
    let len = text.chars().count();
    score += match len {
        10..=80 => 25.0,
        5..=9 | 81..=120 => 12.0,
        _ => 0.0,
    };
    if text.contains('?') {
        score += 10.0;
    }
    if text.chars().any(|c| c.is_ascii_digit()) {
        score += 10.0;
    }
    if contains_cue(text, ACTION_CUES) {
        score += 8.0;
    }
    if contains_cue(text, URGENCY_CUES) {
        score += 7.0;
    }
    clamp_score(score)
}

/// Cross-fragment consistency: the headline should be developed by the
/// body and description, measured as salient-token overlap.
fn score_alignment(headline: &str, body: &str, description: &str) -> i16 {
    let head = salient_tokens(headline);
    if head.is_empty() {
        return 30;
    }
    let body_tokens = salient_tokens(body);
    let desc_tokens = salient_tokens(description);

    let body_overlap = overlap_ratio(&head, &body_tokens);
    let desc_overlap = overlap_ratio(&head, &desc_tokens);

    // Full overlap is not required for a strong score; echoing half the
    // headline's salient tokens already reads as a coherent ad.
    let combined = (0.7 * body_overlap + 0.3 * desc_overlap).min(0.5) / 0.5;
    clamp_score(30.0 + 70.0 * combined)
}

/// Platform fit: copy lengths inside placement limits, a CTA with an
/// action cue, and a non-empty description.
fn score_fit(headline: &str, body: &str, description: &str, cta_text: &str) -> i16 {
    let mut score = 20.0;
    if !headline.trim().is_empty() && headline.chars().count() <= HEADLINE_LIMIT {
        score += 25.0;
    }
    if !description.trim().is_empty() && description.chars().count() <= DESCRIPTION_LIMIT {
        score += 20.0;
    }
    if !body.trim().is_empty() && body.chars().count() <= BODY_SOFT_LIMIT {
        score += 20.0;
    }
    if contains_cue(cta_text, ACTION_CUES) {
        score += 15.0;
    } else if !cta_text.trim().is_empty() {
        score += 7.0;
    }
    clamp_score(score)
}

/// Readability: short sentences, restrained shouting, a headline that
/// does not run on.
fn score_clarity(headline: &str, body: &str) -> i16 {
    let mut score = 100.0;

    let words = body.split_whitespace().count();
    let sentences = body
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count()
        .max(1);
    let words_per_sentence = words as f64 / sentences as f64;
    if words_per_sentence > 20.0 {
        score -= (words_per_sentence - 20.0).min(30.0);
    }

    let letters: Vec<char> = body.chars().filter(|c| c.is_alphabetic()).collect();
    if !letters.is_empty() {
        let upper = letters.iter().filter(|c| c.is_uppercase()).count();
        let upper_ratio = upper as f64 / letters.len() as f64;
        if upper_ratio > 0.3 {
            score -= 25.0;
        }
    }

    if headline.split_whitespace().count() > 10 {
        score -= 15.0;
    }
    if body.trim().is_empty() {
        score -= 40.0;
    }
    clamp_score(score)
}

/// Asset/copy match: media kind cues in the copy, usable dimensions, and
/// an aspect ratio the feed placements favour.
fn score_match(asset: &AssetInfo<'_>, body: &str, cta_type: &str) -> i16 {
    let mut score = 40.0;

    match asset.media_kind {
        Some(crate::fragment::MEDIA_VIDEO) => {
            score += 10.0;
            if contains_cue(body, &["watch", "see", "video"]) || cta_type.starts_with("WATCH") {
                score += 15.0;
            }
        }
        Some(crate::fragment::MEDIA_IMAGE) => {
            score += 10.0;
            if cta_type.starts_with("WATCH") {
                // Watch-style button on a still image reads as broken.
                score -= 15.0;
            }
        }
        _ => {}
    }

    if let (Some(w), Some(h)) = (asset.width, asset.height) {
        if w > 0 && h > 0 {
            score += 15.0;
            let ratio = f64::from(w) / f64::from(h);
            // Feed placements favour 1:1 through 4:5.
            if (0.8..=1.05).contains(&ratio) {
                score += 20.0;
            } else if (0.5..=1.91).contains(&ratio) {
                score += 10.0;
            }
        }
    }
    clamp_score(score)
}

// ---------------------------------------------------------------------------
// Text helpers
// ---------------------------------------------------------------------------

fn clamp_score(raw: f64) -> i16 {
    raw.clamp(0.0, 100.0) as i16
}

fn contains_cue(text: &str, cues: &[&str]) -> bool {
    let lowered = text.to_lowercase();
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .any(|w| cues.contains(&w))
}

/// Lowercased alphanumeric tokens longer than three characters.
fn salient_tokens(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut tokens: Vec<String> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.chars().count() > 3)
        .map(str::to_owned)
        .collect();
    tokens.sort();
    tokens.dedup();
    tokens
}

fn overlap_ratio(reference: &[String], other: &[String]) -> f64 {
    if reference.is_empty() {
        return 0.0;
    }
    let hits = reference.iter().filter(|t| other.contains(t)).count();
    hits as f64 / reference.len() as f64
}
