//! Per-discipline rules: how a score turns into standings totals, whether draws exist,
//! and how ties are broken.

use crate::models::{Corner, Discipline, Mark, PointsScheme, Score, StandingRow, VictoryType};
use std::cmp::Ordering;

/// Standings rule for a match-based discipline.
pub trait ScoringRule: Sync {
    fn allows_draws(&self) -> bool;

    fn default_points(&self) -> PointsScheme {
        PointsScheme::default()
    }

    /// Score-for and score-against from one corner's point of view.
    /// None when the score has the wrong shape for this discipline.
    fn tally(&self, score: &Score, corner: Corner) -> Option<(u32, u32)>;

    /// Score stored for a match won without play.
    fn walkover_score(&self) -> Option<Score> {
        None
    }

    /// Total order over standing rows: `Less` ranks `a` ahead of `b`.
    fn compare(&self, a: &StandingRow, b: &StandingRow) -> Ordering {
        b.points
            .cmp(&a.points)
            .then_with(|| b.score_diff.cmp(&a.score_diff))
            .then_with(|| b.score_for.cmp(&a.score_for))
            .then_with(|| a.registration_order.cmp(&b.registration_order))
    }
}

/// Placement rule for best-of-N attempt disciplines.
pub trait PlacementRule: Sync {
    /// `Less` ranks `a` ahead of `b`.
    fn compare(&self, a: &Mark, b: &Mark) -> Ordering;
}

fn orient(blue: u32, white: u32, corner: Corner) -> (u32, u32) {
    match corner {
        Corner::Blue => (blue, white),
        Corner::White => (white, blue),
    }
}

/// Goals, baskets, touches.
pub struct PointsRule {
    pub draws: bool,
}

impl ScoringRule for PointsRule {
    fn allows_draws(&self) -> bool {
        self.draws
    }

    fn tally(&self, score: &Score, corner: Corner) -> Option<(u32, u32)> {
        match score {
            Score::Points { blue, white } => Some(orient(*blue, *white, corner)),
            Score::Sets { .. } | Score::Judged { .. } | Score::Technical { .. } => None,
        }
    }
}

/// Set-based sports count sets won; wins rank ahead of league points.
pub struct SetsRule;

impl ScoringRule for SetsRule {
    fn allows_draws(&self) -> bool {
        false
    }

    fn default_points(&self) -> PointsScheme {
        PointsScheme { win: 2, draw: 0, loss: 1 }
    }

    fn tally(&self, score: &Score, corner: Corner) -> Option<(u32, u32)> {
        match score {
            Score::Sets { sets } => {
                let blue = sets.iter().filter(|s| s.blue > s.white).count() as u32;
                let white = sets.iter().filter(|s| s.white > s.blue).count() as u32;
                Some(orient(blue, white, corner))
            }
            Score::Points { .. } | Score::Judged { .. } | Score::Technical { .. } => None,
        }
    }

    fn compare(&self, a: &StandingRow, b: &StandingRow) -> Ordering {
        b.wins
            .cmp(&a.wins)
            .then_with(|| b.points.cmp(&a.points))
            .then_with(|| b.score_diff.cmp(&a.score_diff))
            .then_with(|| b.score_for.cmp(&a.score_for))
            .then_with(|| a.registration_order.cmp(&b.registration_order))
    }
}

/// Kata/poomsae: accuracy plus presentation, in hundredths.
pub struct JudgedRule;

impl ScoringRule for JudgedRule {
    fn allows_draws(&self) -> bool {
        false
    }

    fn tally(&self, score: &Score, corner: Corner) -> Option<(u32, u32)> {
        match score {
            Score::Judged { blue, white } => {
                let (blue, white) = blue.total().zip(white.total())?;
                Some(orient(blue, white, corner))
            }
            Score::Points { .. } | Score::Sets { .. } | Score::Technical { .. } => None,
        }
    }
}

/// Combat sports: technical points, whatever the victory type.
pub struct TechnicalRule;

impl ScoringRule for TechnicalRule {
    fn allows_draws(&self) -> bool {
        false
    }

    fn tally(&self, score: &Score, corner: Corner) -> Option<(u32, u32)> {
        match score {
            Score::Technical { blue, white, .. } => Some(orient(*blue, *white, corner)),
            Score::Points { .. } | Score::Sets { .. } | Score::Judged { .. } => None,
        }
    }

    fn walkover_score(&self) -> Option<Score> {
        Some(Score::Technical {
            blue: 0,
            white: 0,
            victory: VictoryType::Walkover,
        })
    }
}

/// Heavier wins; equal weights go to whoever made it on the earlier attempt.
pub struct EarliestAttemptFirst;

impl PlacementRule for EarliestAttemptFirst {
    fn compare(&self, a: &Mark, b: &Mark) -> Ordering {
        b.weight_kg
            .cmp(&a.weight_kg)
            .then_with(|| a.attempt_number.cmp(&b.attempt_number))
    }
}

static FOOTBALL: PointsRule = PointsRule { draws: true };
static NO_DRAW_POINTS: PointsRule = PointsRule { draws: false };
static SETS: SetsRule = SetsRule;
static JUDGED: JudgedRule = JudgedRule;
static TECHNICAL: TechnicalRule = TechnicalRule;
static EARLIEST_ATTEMPT: EarliestAttemptFirst = EarliestAttemptFirst;

impl Discipline {
    pub fn scoring_rule(self) -> &'static dyn ScoringRule {
        match self {
            Discipline::Judo | Discipline::Wrestling | Discipline::Taekwondo => &TECHNICAL,
            Discipline::KarateKata => &JUDGED,
            Discipline::Football => &FOOTBALL,
            Discipline::Fencing | Discipline::Basketball | Discipline::Weightlifting => &NO_DRAW_POINTS,
            Discipline::Volleyball | Discipline::TableTennis => &SETS,
        }
    }

    /// None for match-based disciplines.
    pub fn placement_rule(self) -> Option<&'static dyn PlacementRule> {
        match self {
            Discipline::Weightlifting => Some(&EARLIEST_ATTEMPT),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{JudgedScore, SetScore};

    #[test]
    fn tally_is_oriented_by_corner() {
        let rule = Discipline::Football.scoring_rule();
        let score = Score::Points { blue: 3, white: 1 };
        assert_eq!(rule.tally(&score, Corner::Blue), Some((3, 1)));
        assert_eq!(rule.tally(&score, Corner::White), Some((1, 3)));
    }

    #[test]
    fn wrong_score_shape_is_insufficient_data() {
        let rule = Discipline::Judo.scoring_rule();
        assert_eq!(rule.tally(&Score::Points { blue: 1, white: 0 }, Corner::Blue), None);
        let technical = Score::Technical { blue: 10, white: 0, victory: VictoryType::Ippon };
        assert_eq!(rule.tally(&technical, Corner::White), Some((0, 10)));
    }

    #[test]
    fn sets_rule_counts_sets_won() {
        let rule = Discipline::Volleyball.scoring_rule();
        let score = Score::Sets {
            sets: vec![
                SetScore { blue: 25, white: 20 },
                SetScore { blue: 18, white: 25 },
                SetScore { blue: 25, white: 23 },
                SetScore { blue: 25, white: 10 },
            ],
        };
        assert_eq!(rule.tally(&score, Corner::Blue), Some((3, 1)));
    }

    #[test]
    fn judged_rule_adds_accuracy_and_presentation() {
        let rule = Discipline::KarateKata.scoring_rule();
        let score = Score::Judged {
            blue: JudgedScore { accuracy: 2520, presentation: 1680 },
            white: JudgedScore { accuracy: 2480, presentation: 1700 },
        };
        assert_eq!(rule.tally(&score, Corner::Blue), Some((4200, 4180)));
    }

    #[test]
    fn judged_total_that_does_not_fit_is_unusable() {
        let rule = Discipline::KarateKata.scoring_rule();
        let score = Score::Judged {
            blue: JudgedScore { accuracy: u32::MAX, presentation: 1 },
            white: JudgedScore { accuracy: 2480, presentation: 1700 },
        };
        assert_eq!(rule.tally(&score, Corner::White), None);
    }

    #[test]
    fn only_football_allows_draws() {
        assert!(Discipline::Football.scoring_rule().allows_draws());
        assert!(!Discipline::Basketball.scoring_rule().allows_draws());
        assert!(!Discipline::Judo.scoring_rule().allows_draws());
    }

    #[test]
    fn earliest_attempt_breaks_equal_weights() {
        let rule = Discipline::Weightlifting.placement_rule().unwrap();
        let first = Mark { weight_kg: 100, attempt_number: 1 };
        let second = Mark { weight_kg: 100, attempt_number: 2 };
        let heavier = Mark { weight_kg: 101, attempt_number: 3 };
        assert_eq!(rule.compare(&first, &second), Ordering::Less);
        assert_eq!(rule.compare(&heavier, &first), Ordering::Less);
        assert!(Discipline::Judo.placement_rule().is_none());
    }
}
