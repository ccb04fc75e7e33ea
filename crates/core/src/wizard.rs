//! Supplement wizard bundle scorer.
//!
//! The quiz submits a fitness profile; every active bundle is scored against
//! the goal and the best five are recommended.

use serde::{Deserialize, Serialize};

/// Highest score a bundle can reach.
pub const MAX_SCORE: u32 = 98;

/// Match percentage reported when no bundle relates to the goal.
pub const FALLBACK_MATCH_PERCENTAGE: u32 = 85;

/// Number of bundles returned.
pub const MAX_RECOMMENDATIONS: usize = 5;

const TAG_POINTS: u32 = 30;
const NAME_POINTS: u32 = 10;
const DESCRIPTION_POINTS: u32 = 5;
const CONTEXT_POINTS: u32 = 10;

/// Quiz answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardProfile {
    pub age: u32,
    /// Body weight in kilograms.
    pub weight: f64,
    pub goal: String,
    /// Training sessions per week.
    pub training_frequency: u32,
    pub diet_type: String,
}

/// Anything the wizard can score.
pub trait WizardCandidate {
    fn name(&self) -> &str;
    fn description(&self) -> Option<&str>;
    fn tags(&self) -> &[String];
}

/// A scored bundle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation<T> {
    pub bundle: T,
    pub score: u32,
}

/// Wizard output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardResult<T> {
    pub recommendations: Vec<Recommendation<T>>,
    pub match_percentage: u32,
    pub goal_keywords: Vec<String>,
    pub profile: WizardProfile,
}

/// Keywords associated with a goal. Unknown goals match only themselves.
#[must_use]
pub fn goal_keywords(goal: &str) -> Vec<String> {
    let goal = fold_case(goal.trim());
    let synonyms: &[&str] = match goal.as_str() {
        "muscle_gain" => &["muscle_gain", "muscle", "kas", "protein", "mass", "strength", "güç"],
        "weight_loss" => &["weight_loss", "fat_loss", "kilo", "diyet", "diet", "yağ yakım", "slim"],
        "endurance" => &["endurance", "dayanıklılık", "cardio", "kardiyo", "stamina"],
        "health" => &["health", "sağlık", "wellness", "vitamin", "bağışıklık", "immunity"],
        "recovery" => &["recovery", "toparlanma", "iyileşme", "sleep", "uyku"],
        "energy" => &["energy", "enerji", "pre_workout", "focus", "odak"],
        _ => return vec![goal],
    };
    synonyms.iter().map(|&s| s.to_owned()).collect()
}

/// Score a single bundle against a profile.
#[must_use]
pub fn score<T: WizardCandidate + ?Sized>(
    profile: &WizardProfile,
    keywords: &[String],
    bundle: &T,
) -> u32 {
    let tags: Vec<String> = bundle.tags().iter().map(|t| fold_case(t)).collect();
    let has_tag = |wanted: &str| tags.iter().any(|t| t == wanted);
    let mentions = |text: &str| {
        let text = fold_case(text);
        keywords.iter().any(|k| text.contains(k.as_str()))
    };

    let tag_hits = tags.iter().filter(|t| keywords.contains(*t)).count();
    let mut total = u32::try_from(tag_hits)
        .unwrap_or(u32::MAX)
        .saturating_mul(TAG_POINTS);

    if mentions(bundle.name()) {
        total += NAME_POINTS;
    }
    if bundle.description().is_some_and(mentions) {
        total += DESCRIPTION_POINTS;
    }
    if profile.age > 35 && has_tag("recovery") {
        total += CONTEXT_POINTS;
    }
    if profile.training_frequency >= 5 && has_tag("performance") {
        total += CONTEXT_POINTS;
    }

    total.min(MAX_SCORE)
}

/// Score and rank bundles.
///
/// Ties keep the input order. `match_percentage` is the best score, or
/// [`FALLBACK_MATCH_PERCENTAGE`] when nothing scored above zero.
#[must_use]
pub fn analyze<'a, T: WizardCandidate>(
    profile: &WizardProfile,
    bundles: &'a [T],
) -> WizardResult<&'a T> {
    let keywords = goal_keywords(&profile.goal);

    let mut scored: Vec<Recommendation<&T>> = bundles
        .iter()
        .map(|bundle| Recommendation {
            score: score(profile, &keywords, bundle),
            bundle,
        })
        .collect();
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(MAX_RECOMMENDATIONS);

    let best = scored.first().map_or(0, |r| r.score);
    let match_percentage = if best > 0 {
        best
    } else {
        FALLBACK_MATCH_PERCENTAGE
    };

    WizardResult {
        recommendations: scored,
        match_percentage,
        goal_keywords: keywords,
        profile: profile.clone(),
    }
}

/// Lowercase with the dotted capital I folded to a plain `i`.
fn fold_case(s: &str) -> String {
    s.replace('İ', "i").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bundle {
        name: &'static str,
        description: Option<&'static str>,
        tags: Vec<String>,
    }

    impl WizardCandidate for Bundle {
        fn name(&self) -> &str {
            self.name
        }

        fn description(&self) -> Option<&str> {
            self.description
        }

        fn tags(&self) -> &[String] {
            &self.tags
        }
    }

    fn bundle(name: &'static str, description: Option<&'static str>, tags: &[&str]) -> Bundle {
        Bundle {
            name,
            description,
            tags: tags.iter().map(|&t| t.to_owned()).collect(),
        }
    }

    fn profile(goal: &str, age: u32, training_frequency: u32) -> WizardProfile {
        WizardProfile {
            age,
            weight: 78.5,
            goal: goal.to_owned(),
            training_frequency,
            diet_type: "standard".to_owned(),
        }
    }

    #[test]
    fn test_no_match_falls_back_to_85() {
        let bundles = [
            bundle("Kış Paketi", Some("Soğuk günler için"), &["seasonal"]),
            bundle("Ofis Paketi", None, &["daily"]),
        ];
        let result = analyze(&profile("chess_mastery", 25, 1), &bundles);
        assert_eq!(result.match_percentage, FALLBACK_MATCH_PERCENTAGE);
        assert!(result.recommendations.iter().all(|r| r.score == 0));
        assert_eq!(result.goal_keywords, vec!["chess_mastery".to_owned()]);
    }

    #[test]
    fn test_tag_name_and_description_points() {
        let b = bundle(
            "Kas Geliştirme Paketi",
            Some("Yüksek protein desteği"),
            &["muscle"],
        );
        let p = profile("muscle_gain", 25, 3);
        assert_eq!(score(&p, &goal_keywords(&p.goal), &b), 30 + 10 + 5);
    }

    #[test]
    fn test_context_boosts() {
        let b = bundle("Gece Paketi", None, &["recovery", "performance"]);
        let p = profile("muscle_gain", 40, 6);
        assert_eq!(score(&p, &goal_keywords(&p.goal), &b), 20);

        let young = profile("muscle_gain", 35, 4);
        assert_eq!(score(&young, &goal_keywords(&young.goal), &b), 0);
    }

    #[test]
    fn test_score_is_capped() {
        let b = bundle(
            "Muscle Mass Protein Strength",
            Some("muscle"),
            &["muscle", "protein", "mass", "strength", "performance"],
        );
        let p = profile("muscle_gain", 50, 7);
        assert_eq!(score(&p, &goal_keywords(&p.goal), &b), MAX_SCORE);
    }

    #[test]
    fn test_top_five_sorted_descending_and_stable() {
        let bundles = [
            bundle("A", None, &[]),
            bundle("B", None, &["energy"]),
            bundle("C", None, &["energy", "focus"]),
            bundle("D", None, &["enerji"]),
            bundle("E", None, &[]),
            bundle("F", None, &[]),
            bundle("G", None, &["focus"]),
        ];
        let result = analyze(&profile("Energy", 20, 2), &bundles);

        let names: Vec<&str> = result.recommendations.iter().map(|r| r.bundle.name).collect();
        assert_eq!(names, vec!["C", "B", "D", "G", "A"]);
        assert_eq!(result.match_percentage, 60);
        assert!(
            result
                .recommendations
                .windows(2)
                .all(|w| w[0].score >= w[1].score)
        );
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let b = bundle("SAĞLIK SETİ", None, &["Vitamin"]);
        let p = profile("HEALTH", 30, 2);
        assert_eq!(score(&p, &goal_keywords(&p.goal), &b), 30);
    }
}
