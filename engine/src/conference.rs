use crate::error::{PlayoffError, PlayoffResult};
use crate::series::PlayoffSeries;
use crate::{Conference, SeriesRound, StandingsEntry, TeamId};
use log::{debug, info};
use serde::{Deserialize, Serialize};

/// First-round pairings in bracket order. Adjacent slots feed the same
/// next-round series, so 1v8 meets 4v5 and 2v7 meets 3v6 until the
/// conference finals.
pub const FIRST_ROUND_BRACKET: [(u8, u8); 4] = [(1, 8), (4, 5), (3, 6), (2, 7)];

pub const PLAYOFF_SEEDS: u8 = 8;

/// Outcome of `ConferenceBracket::try_advance_round`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundAdvance {
    /// The current round is not finished, or the bracket is not seeded yet.
    Pending,
    /// The next round was built.
    Advanced(SeriesRound),
    /// The conference finals just finished.
    ChampionDecided(TeamId),
    /// Nothing left to do; the champion was already reported.
    Settled,
}

/// Single-elimination tree for one conference: First Round, Semis, Finals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConferenceBracket {
    season: u16,
    conference: Conference,
    /// Playoff seeds known so far, ordered by seed. Play-in winners enter as
    /// seeds 7 and 8 whatever their regular-season rank.
    seeds: Vec<StandingsEntry>,
    /// `rounds[0]` is the first round in `FIRST_ROUND_BRACKET` order.
    rounds: Vec<Vec<PlayoffSeries>>,
    champion_team_id: Option<TeamId>,
}

impl ConferenceBracket {
    pub fn new(season: u16, conference: Conference, seeds: impl IntoIterator<Item = StandingsEntry>) -> Self {
        let mut bracket = Self {
            season,
            conference,
            seeds: Vec::new(),
            rounds: Vec::new(),
            champion_team_id: None,
        };
        for entry in seeds {
            bracket.set_seed(entry);
        }
        bracket
    }

    pub fn conference(&self) -> Conference {
        self.conference
    }

    pub fn seeds(&self) -> &[StandingsEntry] {
        &self.seeds
    }

    pub fn seed(&self, seed: u8) -> Option<&StandingsEntry> {
        self.seeds.iter().find(|e| e.seed == seed)
    }

    pub fn entry(&self, team_id: &str) -> Option<&StandingsEntry> {
        self.seeds.iter().find(|e| e.team_id == team_id)
    }

    /// Place a team at a playoff seed, replacing whoever held it.
    /// Ignored once the first round exists.
    pub fn set_seed(&mut self, entry: StandingsEntry) {
        if self.is_seeded() || entry.seed == 0 || entry.seed > PLAYOFF_SEEDS {
            return;
        }
        self.seeds.retain(|e| e.seed != entry.seed);
        self.seeds.push(entry);
        self.seeds.sort_by_key(|e| e.seed);
    }

    pub fn is_seeded(&self) -> bool {
        !self.rounds.is_empty()
    }

    /// Build the first round from seeds 1-8. Does nothing if it already exists.
    pub fn seed_first_round(&mut self) -> PlayoffResult<()> {
        if self.is_seeded() {
            return Ok(());
        }
        let mut round = Vec::with_capacity(FIRST_ROUND_BRACKET.len());
        for (slot, (high, low)) in FIRST_ROUND_BRACKET.iter().enumerate() {
            let (Some(higher), Some(lower)) = (self.seed(*high), self.seed(*low)) else {
                return Err(PlayoffError::Prerequisite(format!(
                    "{} seeds {high} and {low} must be set before the first round",
                    self.conference.label()
                )));
            };
            round.push(PlayoffSeries::new(
                self.series_id(SeriesRound::FirstRound, slot),
                Some(self.conference),
                SeriesRound::FirstRound,
                (&higher.team_id, higher.seed),
                (&lower.team_id, lower.seed),
            ));
        }
        info!("{} first round seeded", self.conference.label());
        self.rounds.push(round);
        Ok(())
    }

    /// Latest round that has been built.
    pub fn current_round(&self) -> Option<SeriesRound> {
        match self.rounds.len() {
            0 => None,
            1 => Some(SeriesRound::FirstRound),
            2 => Some(SeriesRound::ConferenceSemis),
            _ => Some(SeriesRound::ConferenceFinals),
        }
    }

    pub fn round_series(&self, round: SeriesRound) -> &[PlayoffSeries] {
        round
            .conference_index()
            .and_then(|idx| self.rounds.get(idx))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn all_series(&self) -> impl Iterator<Item = &PlayoffSeries> {
        self.rounds.iter().flatten()
    }

    pub fn series(&self, series_id: &str) -> Option<&PlayoffSeries> {
        self.all_series().find(|s| s.id() == series_id)
    }

    pub(crate) fn series_mut(&mut self, series_id: &str) -> Option<&mut PlayoffSeries> {
        self.rounds.iter_mut().flatten().find(|s| s.id() == series_id)
    }

    /// True once every series of a built round has a winner.
    pub fn round_complete(&self, round: SeriesRound) -> bool {
        let series = self.round_series(round);
        !series.is_empty() && series.iter().all(PlayoffSeries::is_complete)
    }

    pub fn champion_team_id(&self) -> Option<&str> {
        self.champion_team_id.as_deref()
    }

    /// Build the next round once the current one is finished. Repeated calls
    /// change nothing until the newly built round finishes in turn.
    pub fn try_advance_round(&mut self) -> RoundAdvance {
        if self.champion_team_id.is_some() {
            return RoundAdvance::Settled;
        }
        let Some(current) = self.current_round() else {
            return RoundAdvance::Pending;
        };
        if !self.round_complete(current) {
            return RoundAdvance::Pending;
        }

        if current == SeriesRound::ConferenceFinals {
            let Some(champion) = self
                .round_series(current)
                .first()
                .and_then(|s| s.winner_team_id())
                .map(str::to_string)
            else {
                return RoundAdvance::Pending;
            };
            info!("{} champion: {champion}", self.conference.label());
            self.champion_team_id = Some(champion.clone());
            return RoundAdvance::ChampionDecided(champion);
        }

        let Some(next) = current.next() else {
            return RoundAdvance::Pending;
        };
        let finished = self.round_series(current);
        let mut round = Vec::with_capacity(finished.len() / 2);
        for (slot, pair) in finished.chunks(2).enumerate() {
            let [a, b] = pair else {
                return RoundAdvance::Pending;
            };
            let (Some(a_team), Some(b_team)) = (a.winner_team_id(), b.winner_team_id()) else {
                return RoundAdvance::Pending;
            };
            let a_seed = a.seed_of(a_team).unwrap_or(PLAYOFF_SEEDS);
            let b_seed = b.seed_of(b_team).unwrap_or(PLAYOFF_SEEDS);
            let (higher, lower) = if a_seed <= b_seed {
                ((a_team, a_seed), (b_team, b_seed))
            } else {
                ((b_team, b_seed), (a_team, a_seed))
            };
            round.push(PlayoffSeries::new(
                self.series_id(next, slot),
                Some(self.conference),
                next,
                higher,
                lower,
            ));
        }
        debug!("{} advancing to {}", self.conference.label(), next.label());
        self.rounds.push(round);
        RoundAdvance::Advanced(next)
    }

    /// Most recent series this team appears in.
    pub fn series_for_team(&self, team_id: &str) -> Option<&PlayoffSeries> {
        self.rounds
            .iter()
            .rev()
            .flatten()
            .find(|s| s.involves(team_id))
    }

    pub fn is_eliminated(&self, team_id: &str) -> bool {
        self.all_series().any(|s| s.loser_team_id() == Some(team_id))
    }

    pub fn involves(&self, team_id: &str) -> bool {
        self.entry(team_id).is_some()
    }

    pub(crate) fn check_integrity(&self) -> Result<(), String> {
        if let Some(first) = self.rounds.first() {
            if first.len() != FIRST_ROUND_BRACKET.len() {
                return Err(format!("{} first round has the wrong size", self.conference.label()));
            }
            for ((high, low), series) in FIRST_ROUND_BRACKET.iter().zip(first) {
                let seeded = (
                    self.seed(*high).map(|e| e.team_id.as_str()),
                    self.seed(*low).map(|e| e.team_id.as_str()),
                );
                if seeded != (Some(series.higher_seed_team_id()), Some(series.lower_seed_team_id())) {
                    return Err(format!(
                        "{} series {} does not match seeds {high} and {low}",
                        self.conference.label(),
                        series.id()
                    ));
                }
            }
        }
        for (idx, round) in self.rounds.iter().enumerate() {
            for series in round {
                series.check_integrity()?;
            }
            if idx == 0 {
                continue;
            }
            let feeders = &self.rounds[idx - 1];
            if feeders.len() != round.len() * 2 {
                return Err(format!("{} round {} has the wrong size", self.conference.label(), idx + 1));
            }
            for (slot, series) in round.iter().enumerate() {
                for feeder in &feeders[slot * 2..slot * 2 + 2] {
                    match feeder.winner_team_id() {
                        Some(winner) if series.involves(winner) => {}
                        _ => {
                            return Err(format!(
                                "{} series {} is not fed by its bracket half",
                                self.conference.label(),
                                series.id()
                            ));
                        }
                    }
                }
            }
        }
        if self.rounds.len() > 3 {
            return Err(format!("{} bracket has too many rounds", self.conference.label()));
        }
        let finals_winner = self
            .round_series(SeriesRound::ConferenceFinals)
            .first()
            .and_then(|s| s.winner_team_id());
        if self.champion_team_id() != finals_winner {
            return Err(format!(
                "{} champion is not the Conference Finals winner",
                self.conference.label()
            ));
        }
        Ok(())
    }

    fn series_id(&self, round: SeriesRound, slot: usize) -> String {
        format!("{}-{}-{}-{}", self.season, self.conference.code(), round.code(), slot + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::GameResult;

    fn seeded() -> ConferenceBracket {
        let teams = ["OKC", "HOU", "LAL", "DEN", "LAC", "MIN", "GSW", "MEM"];
        let entries = teams
            .iter()
            .enumerate()
            .map(|(i, id)| StandingsEntry::new(*id, i as u8 + 1, 60 - i as u16 * 2, 22 + i as u16 * 2));
        let mut bracket = ConferenceBracket::new(2025, Conference::Western, entries);
        bracket.seed_first_round().unwrap();
        bracket
    }

    /// Win four straight for `team_id`.
    fn finish(bracket: &mut ConferenceBracket, series_id: &str, team_id: &str) {
        let series = bracket.series_mut(series_id).unwrap();
        while !series.is_complete() {
            let n = series.next_game_number();
            let home = series.create_next_game(None).unwrap().home_team_id().to_string();
            let result = if home == team_id { GameResult::new(112, 101) } else { GameResult::new(101, 112) };
            series.record_game_result(n, result).unwrap();
        }
    }

    fn ids(round: &[PlayoffSeries]) -> Vec<String> {
        round.iter().map(|s| s.id().to_string()).collect()
    }

    #[test]
    fn first_round_pairs_by_seed() {
        let b = seeded();
        let pairs: Vec<(u8, u8)> = b
            .round_series(SeriesRound::FirstRound)
            .iter()
            .map(|s| (s.higher_seed(), s.lower_seed()))
            .collect();
        assert_eq!(pairs, vec![(1, 8), (4, 5), (3, 6), (2, 7)]);
        assert_eq!(b.current_round(), Some(SeriesRound::FirstRound));
        assert!(b.round_series(SeriesRound::ConferenceSemis).is_empty());
    }

    #[test]
    fn first_round_needs_all_eight_seeds() {
        let entries = (1..=6).map(|s| StandingsEntry::new(format!("T{s}"), s, 50, 32));
        let mut b = ConferenceBracket::new(2025, Conference::Eastern, entries);
        assert!(matches!(b.seed_first_round(), Err(PlayoffError::Prerequisite(_))));
        b.set_seed(StandingsEntry::new("T9", 7, 40, 42));
        b.set_seed(StandingsEntry::new("T8", 8, 40, 42));
        b.seed_first_round().unwrap();
        assert_eq!(b.round_series(SeriesRound::FirstRound)[3].lower_seed_team_id(), "T9");
    }

    #[test]
    fn second_round_preserves_bracket_halves() {
        let mut b = seeded();
        // Upsets everywhere except 1v8: 5 over 4, 6 over 3, 7 over 2.
        finish(&mut b, "2025-W-R1-1", "OKC");
        finish(&mut b, "2025-W-R1-2", "LAC");
        finish(&mut b, "2025-W-R1-3", "MIN");
        assert_eq!(b.try_advance_round(), RoundAdvance::Pending);
        finish(&mut b, "2025-W-R1-4", "GSW");

        assert_eq!(b.try_advance_round(), RoundAdvance::Advanced(SeriesRound::ConferenceSemis));
        let semis = b.round_series(SeriesRound::ConferenceSemis);
        let pairs: Vec<(&str, &str)> = semis
            .iter()
            .map(|s| (s.higher_seed_team_id(), s.lower_seed_team_id()))
            .collect();
        assert_eq!(pairs, vec![("OKC", "LAC"), ("MIN", "GSW")]);
        assert!(b.is_eliminated("DEN"));
        assert!(!b.is_eliminated("GSW"));
    }

    #[test]
    fn try_advance_round_is_idempotent() {
        let mut b = seeded();
        for (id, team) in [
            ("2025-W-R1-1", "OKC"),
            ("2025-W-R1-2", "DEN"),
            ("2025-W-R1-3", "LAL"),
            ("2025-W-R1-4", "HOU"),
        ] {
            finish(&mut b, id, team);
        }
        assert_eq!(b.try_advance_round(), RoundAdvance::Advanced(SeriesRound::ConferenceSemis));
        let snapshot = b.clone();
        assert_eq!(b.try_advance_round(), RoundAdvance::Pending);
        assert_eq!(b.try_advance_round(), RoundAdvance::Pending);
        assert_eq!(b, snapshot);
        assert_eq!(ids(b.round_series(SeriesRound::ConferenceSemis)), vec!["2025-W-R2-1", "2025-W-R2-2"]);

        finish(&mut b, "2025-W-R2-1", "DEN");
        finish(&mut b, "2025-W-R2-2", "HOU");
        assert_eq!(b.try_advance_round(), RoundAdvance::Advanced(SeriesRound::ConferenceFinals));
        let finals = &b.round_series(SeriesRound::ConferenceFinals)[0];
        assert_eq!(finals.higher_seed_team_id(), "HOU");
        assert_eq!(finals.lower_seed_team_id(), "DEN");

        finish(&mut b, "2025-W-CF-1", "DEN");
        assert_eq!(b.try_advance_round(), RoundAdvance::ChampionDecided("DEN".to_string()));
        assert_eq!(b.try_advance_round(), RoundAdvance::Settled);
        assert_eq!(b.champion_team_id(), Some("DEN"));
        assert_eq!(b.series_for_team("DEN").map(|s| s.id()), Some("2025-W-CF-1"));
        assert_eq!(b.series_for_team("OKC").map(|s| s.id()), Some("2025-W-R2-1"));
        assert!(b.check_integrity().is_ok());
    }

    #[test]
    fn integrity_ties_rounds_to_seeds_and_champion() {
        let mut b = seeded();
        assert!(b.check_integrity().is_ok());

        let mut reseeded = b.clone();
        reseeded.seeds.retain(|e| e.seed != 8);
        reseeded.seeds.push(StandingsEntry::new("SAC", 8, 40, 42));
        assert!(reseeded.check_integrity().is_err());

        b.champion_team_id = Some("OKC".into());
        assert!(b.check_integrity().is_err());
    }
}
