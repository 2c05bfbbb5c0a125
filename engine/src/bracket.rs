use crate::conference::{ConferenceBracket, PLAYOFF_SEEDS};
use crate::error::{PlayoffError, PlayoffResult};
use crate::play_in::{ConferencePlayInBracket, PlayInTournament};
use crate::series::PlayoffSeries;
use crate::{Conference, PlayoffPhase, SeriesRound, StandingsEntry, TeamId};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Seeds that take part in the play-in.
pub const PLAY_IN_SEEDS: [u8; 4] = [7, 8, 9, 10];

/// One season's tournament. A plain tree with no back-references, so it
/// serializes as is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayoffBracket {
    pub(crate) season: u16,
    pub(crate) phase: PlayoffPhase,
    /// Regular-season standings of every team that entered, seeds 1-10.
    pub(crate) eastern_standings: Vec<StandingsEntry>,
    pub(crate) western_standings: Vec<StandingsEntry>,
    pub(crate) play_in: Option<PlayInTournament>,
    pub(crate) eastern: ConferenceBracket,
    pub(crate) western: ConferenceBracket,
    pub(crate) finals: Option<PlayoffSeries>,
    pub(crate) champion_team_id: Option<TeamId>,
    pub(crate) finals_runner_up_team_id: Option<TeamId>,
}

impl PlayoffBracket {
    /// Validate standings and lay out both conferences. With the play-in,
    /// seeds 1-6 go straight into the bracket and 7-10 into the play-in;
    /// without it, seeds 1-8 are placed directly. The phase stays
    /// `NotStarted` until the controller opens the tournament.
    pub fn new(
        season: u16,
        eastern: &[StandingsEntry],
        western: &[StandingsEntry],
        play_in_enabled: bool,
    ) -> PlayoffResult<Self> {
        let required = if play_in_enabled { 10 } else { PLAYOFF_SEEDS };
        let east = validate_standings(Conference::Eastern, eastern, required)?;
        let west = validate_standings(Conference::Western, western, required)?;

        let mut seen = HashSet::new();
        for entry in east.iter().chain(west.iter()) {
            if !seen.insert(entry.team_id.as_str()) {
                return Err(PlayoffError::Initialization(format!(
                    "team {} appears in both conferences",
                    entry.team_id
                )));
            }
        }

        let direct = if play_in_enabled { 6 } else { PLAYOFF_SEEDS };
        let conference_bracket = |conference, entries: &[StandingsEntry]| {
            ConferenceBracket::new(
                season,
                conference,
                entries.iter().filter(|e| e.seed <= direct).cloned(),
            )
        };
        let play_in = play_in_enabled.then(|| PlayInTournament {
            eastern: play_in_bracket(season, Conference::Eastern, &east),
            western: play_in_bracket(season, Conference::Western, &west),
        });

        Ok(Self {
            season,
            phase: PlayoffPhase::NotStarted,
            eastern: conference_bracket(Conference::Eastern, &east),
            western: conference_bracket(Conference::Western, &west),
            eastern_standings: east,
            western_standings: west,
            play_in,
            finals: None,
            champion_team_id: None,
            finals_runner_up_team_id: None,
        })
    }

    pub fn season(&self) -> u16 {
        self.season
    }

    pub fn phase(&self) -> PlayoffPhase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == PlayoffPhase::Complete
    }

    pub fn play_in(&self) -> Option<&PlayInTournament> {
        self.play_in.as_ref()
    }

    pub fn conference(&self, conference: Conference) -> &ConferenceBracket {
        match conference {
            Conference::Eastern => &self.eastern,
            Conference::Western => &self.western,
        }
    }

    pub(crate) fn conference_mut(&mut self, conference: Conference) -> &mut ConferenceBracket {
        match conference {
            Conference::Eastern => &mut self.eastern,
            Conference::Western => &mut self.western,
        }
    }

    pub fn finals(&self) -> Option<&PlayoffSeries> {
        self.finals.as_ref()
    }

    pub fn champion_team_id(&self) -> Option<&str> {
        self.champion_team_id.as_deref()
    }

    pub fn finals_runner_up_team_id(&self) -> Option<&str> {
        self.finals_runner_up_team_id.as_deref()
    }

    pub fn standings(&self, conference: Conference) -> &[StandingsEntry] {
        match conference {
            Conference::Eastern => &self.eastern_standings,
            Conference::Western => &self.western_standings,
        }
    }

    /// Regular-season standing of a team, with its original seed.
    pub fn standing(&self, team_id: &str) -> Option<&StandingsEntry> {
        self.eastern_standings
            .iter()
            .chain(&self.western_standings)
            .find(|e| e.team_id == team_id)
    }

    pub fn conference_of(&self, team_id: &str) -> Option<Conference> {
        Conference::ALL
            .into_iter()
            .find(|c| self.standings(*c).iter().any(|e| e.team_id == team_id))
    }

    /// Every series built so far: East, West, then the Finals.
    pub fn all_series(&self) -> impl Iterator<Item = &PlayoffSeries> {
        self.eastern
            .all_series()
            .chain(self.western.all_series())
            .chain(self.finals.as_ref())
    }

    pub fn series(&self, series_id: &str) -> Option<&PlayoffSeries> {
        self.all_series().find(|s| s.id() == series_id)
    }

    pub(crate) fn series_mut(&mut self, series_id: &str) -> Option<&mut PlayoffSeries> {
        if let Some(finals) = self.finals.as_mut()
            && finals.id() == series_id
        {
            return Some(finals);
        }
        if let Some(series) = self.eastern.series_mut(series_id) {
            return Some(series);
        }
        self.western.series_mut(series_id)
    }

    /// Series that exist but have no winner yet.
    pub fn active_series(&self) -> Vec<&PlayoffSeries> {
        self.all_series().filter(|s| !s.is_complete()).collect()
    }

    /// The latest series a team has played or is playing.
    pub fn series_for_team(&self, team_id: &str) -> Option<&PlayoffSeries> {
        if let Some(finals) = &self.finals
            && finals.involves(team_id)
        {
            return Some(finals);
        }
        let conference = self.conference_of(team_id)?;
        self.conference(conference).series_for_team(team_id)
    }

    /// Alive is derived from bracket position alone: a team is out once it
    /// loses in the play-in or a series, or when it sits outside the field.
    pub fn is_team_alive(&self, team_id: &str) -> bool {
        let Some(entry) = self.standing(team_id) else {
            return false;
        };
        if self.phase == PlayoffPhase::NotStarted {
            return false;
        }
        match &self.play_in {
            Some(play_in) if play_in.is_eliminated(team_id) => return false,
            None if entry.seed > PLAYOFF_SEEDS => return false,
            _ => {}
        }
        !self.all_series().any(|s| s.loser_team_id() == Some(team_id))
    }

    /// Both conferences finished the series of `round`.
    pub(crate) fn round_complete(&self, round: SeriesRound) -> bool {
        self.eastern.round_complete(round) && self.western.round_complete(round)
    }

    /// Structural checks run on restored snapshots.
    pub(crate) fn check_integrity(&self) -> Result<(), String> {
        if let Some(play_in) = &self.play_in {
            for bracket in play_in.brackets() {
                bracket.check_integrity()?;
            }
        }
        self.eastern.check_integrity()?;
        self.western.check_integrity()?;
        if let Some(finals) = &self.finals {
            finals.check_integrity()?;
        }

        let phase = self.phase;
        if phase == PlayoffPhase::PlayIn && self.play_in.is_none() {
            return Err("play-in phase without a play-in bracket".into());
        }
        if let Some(play_in) = &self.play_in {
            if phase == PlayoffPhase::PlayIn && play_in.is_complete() {
                return Err("play-in is complete but the phase is still Play-In".into());
            }
            if phase >= PlayoffPhase::FirstRound && !play_in.is_complete() {
                return Err(format!("{} with an unfinished play-in", phase.label()));
            }
            for bracket in play_in.brackets() {
                let conference = bracket.conference();
                let winners = if bracket.is_complete() {
                    (bracket.seven_seed_team_id(), bracket.eight_seed_team_id())
                } else {
                    (None, None)
                };
                let seeded = self.conference(conference);
                let seeds = (
                    seeded.seed(7).map(|e| e.team_id.as_str()),
                    seeded.seed(PLAYOFF_SEEDS).map(|e| e.team_id.as_str()),
                );
                if seeds != winners {
                    return Err(format!(
                        "{} seeds 7 and 8 do not match the play-in winners",
                        conference.label()
                    ));
                }
            }
        }
        if phase >= PlayoffPhase::FirstRound && !(self.eastern.is_seeded() && self.western.is_seeded()) {
            return Err(format!("{} without a seeded first round", phase.label()));
        }
        if phase < PlayoffPhase::FirstRound && (self.eastern.is_seeded() || self.western.is_seeded()) {
            return Err(format!("first round seeded during {}", phase.label()));
        }
        if (phase >= PlayoffPhase::Finals) != self.finals.is_some() {
            return Err(format!("Finals series does not match phase {}", phase.label()));
        }
        if (phase == PlayoffPhase::Complete) != self.champion_team_id.is_some() {
            return Err(format!("champion does not match phase {}", phase.label()));
        }
        if let Some(round) = phase.series_round()
            && round != SeriesRound::Finals
        {
            for conference in Conference::ALL {
                if self.conference(conference).current_round() != Some(round) {
                    return Err(format!(
                        "{} bracket is not in the {}",
                        conference.label(),
                        round.label()
                    ));
                }
            }
        }
        if let Some(finals) = &self.finals {
            let (Some(east), Some(west)) = (self.eastern.champion_team_id(), self.western.champion_team_id())
            else {
                return Err("Finals started before both conference champions were crowned".into());
            };
            if !(finals.involves(east) && finals.involves(west)) {
                return Err("Finals are not between the two conference champions".into());
            }
        }
        if let Some(champion) = &self.champion_team_id
            && self.finals.as_ref().and_then(|f| f.winner_team_id()) != Some(champion.as_str())
        {
            return Err("champion did not win the Finals".into());
        }
        if self.finals_runner_up_team_id.as_deref() != self.finals.as_ref().and_then(|f| f.loser_team_id()) {
            return Err("runner-up did not lose the Finals".into());
        }
        Ok(())
    }
}

fn validate_standings(
    conference: Conference,
    entries: &[StandingsEntry],
    required: u8,
) -> PlayoffResult<Vec<StandingsEntry>> {
    let label = conference.label();
    if entries.len() < usize::from(required) {
        return Err(PlayoffError::Initialization(format!(
            "{label} needs at least {required} teams, got {}",
            entries.len()
        )));
    }
    let mut seeds = HashSet::new();
    let mut teams = HashSet::new();
    for entry in entries {
        if entry.team_id.trim().is_empty() {
            return Err(PlayoffError::Initialization(format!("{label} has a team without an id")));
        }
        if entry.seed == 0 {
            return Err(PlayoffError::Initialization(format!("{label} team {} has seed 0", entry.team_id)));
        }
        if !seeds.insert(entry.seed) {
            return Err(PlayoffError::Initialization(format!("{label} has duplicate seed {}", entry.seed)));
        }
        if !teams.insert(entry.team_id.as_str()) {
            return Err(PlayoffError::Initialization(format!(
                "{label} lists team {} twice",
                entry.team_id
            )));
        }
    }
    if let Some(missing) = (1..=required).find(|s| !seeds.contains(s)) {
        return Err(PlayoffError::Initialization(format!("{label} is missing seed {missing}")));
    }

    let mut field: Vec<StandingsEntry> =
        entries.iter().filter(|e| e.seed <= required).cloned().collect();
    field.sort_by_key(|e| e.seed);
    Ok(field)
}

fn play_in_bracket(season: u16, conference: Conference, field: &[StandingsEntry]) -> ConferencePlayInBracket {
    let id = |seed: u8| {
        field
            .iter()
            .find(|e| e.seed == seed)
            .map(|e| e.team_id.as_str())
            .unwrap_or_default()
    };
    let [s7, s8, s9, s10] = PLAY_IN_SEEDS;
    ConferencePlayInBracket::new(season, conference, [id(s7), id(s8), id(s9), id(s10)])
}
