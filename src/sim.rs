use playoff_engine::GameResult;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

const LEAGUE_AVERAGE_POINTS: f64 = 112.0;
const SCORE_STD_DEV: f64 = 11.0;
/// Points added per unit of win-percentage difference from .500.
const STRENGTH_SCALE: f64 = 24.0;
const HOME_EDGE: f64 = 1.5;

const OVERTIME_AVERAGE_POINTS: f64 = 10.5;
const OVERTIME_STD_DEV: f64 = 3.0;
const MAX_OVERTIME_PERIODS: u8 = 6;

const MIN_SCORE: f64 = 60.0;
const MAX_SCORE: f64 = 170.0;

/// Seeded score generator. The same seed always replays the same games.
pub struct GameSimulator {
    rng: ChaCha8Rng,
}

impl GameSimulator {
    pub fn new(seed: u64) -> Self {
        Self { rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    /// Plays one game. Strengths are regular-season win percentages.
    pub fn play(&mut self, home_strength: f64, away_strength: f64) -> GameResult {
        let home_mean = LEAGUE_AVERAGE_POINTS + (home_strength - 0.5) * STRENGTH_SCALE + HOME_EDGE;
        let away_mean = LEAGUE_AVERAGE_POINTS + (away_strength - 0.5) * STRENGTH_SCALE - HOME_EDGE;

        let mut home = self.points(home_mean, SCORE_STD_DEV);
        let mut away = self.points(away_mean, SCORE_STD_DEV);
        let mut periods = 0u8;

        while home == away && periods < MAX_OVERTIME_PERIODS {
            periods += 1;
            home += self.overtime_points(home_strength);
            away += self.overtime_points(away_strength);
        }
        if home == away {
            // Nobody has ever needed a seventh overtime. Give it to the home side.
            home += 1;
        }

        GameResult::new(home, away).with_overtime(periods)
    }

    fn overtime_points(&mut self, strength: f64) -> u16 {
        let mean = OVERTIME_AVERAGE_POINTS + (strength - 0.5) * 2.0;
        let z: f64 = StandardNormal.sample(&mut self.rng);
        (mean + z * OVERTIME_STD_DEV).round().clamp(0.0, 30.0) as u16
    }

    fn points(&mut self, mean: f64, std_dev: f64) -> u16 {
        let z: f64 = StandardNormal.sample(&mut self.rng);
        (mean + z * std_dev).round().clamp(MIN_SCORE, MAX_SCORE) as u16
    }
}
