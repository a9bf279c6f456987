use std::cmp::Ordering;

use tracing::debug;

use crate::models::{PlaceCandidate, RankedPlace, MAX_RECOMMENDATIONS};

const SCENE_BONUS: f64 = 0.6;
const OPEN_NOW_BONUS: f64 = 2.0;
const CLOSING_SOON_PENALTY: f64 = 0.5;
const FAR_DISTANCE_SCORE: f64 = 0.1;
const REASON_SEPARATOR: &str = " • ";

/// Scene tag → categories that tag favours. Each rule is evaluated on its own.
const SCENE_RULES: &[(&str, &[&str])] = &[
    ("night", &["bar", "night_club"]),
    ("outdoors", &["park", "cafe"]),
    ("indoors", &["library", "cafe"]),
    ("day", &["park", "cafe"]),
];

struct ScoredPlace {
    score: f64,
    place: PlaceCandidate,
    reason: String,
}

/// Top recommendations, best first. Ties keep their input order.
pub fn rank<S: AsRef<str>>(
    candidates: Vec<PlaceCandidate>,
    intent: &str,
    scene_tags: &[S],
) -> Vec<RankedPlace> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let mut scored = candidates
        .into_iter()
        .map(|place| ScoredPlace {
            score: score_candidate(&place, scene_tags),
            reason: reason_for(&place, scene_tags),
            place,
        })
        .collect::<Vec<_>>();

    scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    for entry in scored.iter().take(MAX_RECOMMENDATIONS) {
        debug!(
            intent,
            place_id = %entry.place.place_id,
            score = entry.score,
            "ranked candidate"
        );
    }

    scored
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|entry| RankedPlace {
            place: entry.place,
            reason: entry.reason,
        })
        .collect()
}

pub fn score_candidate<S: AsRef<str>>(place: &PlaceCandidate, scene_tags: &[S]) -> f64 {
    let mut score = distance_score(place.distance_m);

    if place.open_now {
        score += OPEN_NOW_BONUS;
    }

    score += rating_bonus(place.rating);
    score += scene_bias(place, scene_tags);

    if is_closing_soon(place) {
        score -= CLOSING_SOON_PENALTY;
    }

    score
}

fn distance_score(distance_m: u32) -> f64 {
    if distance_m <= 1000 {
        f64::from(1000 - distance_m) / 500.0
    } else {
        FAR_DISTANCE_SCORE
    }
}

fn rating_bonus(rating: Option<f64>) -> f64 {
    match rating {
        Some(value) if value >= 4.3 => 0.5,
        Some(value) if value >= 4.0 => 0.25,
        _ => 0.0,
    }
}

pub fn scene_bias<S: AsRef<str>>(place: &PlaceCandidate, scene_tags: &[S]) -> f64 {
    matching_scene_rules(place, scene_tags) as f64 * SCENE_BONUS
}

pub fn matches_scene<S: AsRef<str>>(place: &PlaceCandidate, scene_tags: &[S]) -> bool {
    matching_scene_rules(place, scene_tags) > 0
}

fn matching_scene_rules<S: AsRef<str>>(place: &PlaceCandidate, scene_tags: &[S]) -> usize {
    SCENE_RULES
        .iter()
        .filter(|(tag, categories)| {
            scene_tags.iter().any(|present| present.as_ref() == *tag)
                && categories.contains(&place.category.as_str())
        })
        .count()
}

/// Opening-hours parsing is not implemented, so nothing is ever closing soon.
pub fn is_closing_soon(_place: &PlaceCandidate) -> bool {
    false
}

pub fn reason_for<S: AsRef<str>>(place: &PlaceCandidate, scene_tags: &[S]) -> String {
    let mut reasons = Vec::new();

    if place.distance_m < 1000 {
        reasons.push(format!("Close ({}m)", place.distance_m));
    } else {
        reasons.push(format!("{}m away", place.distance_m));
    }

    if place.open_now {
        reasons.push("open now".to_string());
    }

    if let Some(rating) = place.rating.filter(|value| *value != 0.0) {
        reasons.push(format!("{}★", format_rating(rating)));
    }

    if matches_scene(place, scene_tags) {
        reasons.push("matches your vibe".to_string());
    }

    if is_closing_soon(place) {
        reasons.push("closing soon".to_string());
    }

    reasons.join(REASON_SEPARATOR)
}

// Whole ratings keep one decimal: 4.0★, not 4★.
fn format_rating(rating: f64) -> String {
    if rating.fract() == 0.0 {
        format!("{rating:.1}")
    } else {
        rating.to_string()
    }
}
