use crate::sim::GameSimulator;
use crate::standings::{StandingsFile, TeamDirectory};
use anyhow::Context;
use log::{debug, info};
use playoff_engine::{
    Conference, GameResult, PlayoffConfig, PlayoffController, PlayoffObserver, PlayoffPhase, PlayoffSaveData,
    ScheduledGame,
};
use std::path::Path;

/// A game the simulator just played.
#[derive(Debug, Clone)]
pub struct PlayedGame {
    pub game: ScheduledGame,
    pub result: GameResult,
}

/// One tournament run: the controller, the simulator that feeds it and the
/// team names both are shown with.
pub struct Season {
    standings: StandingsFile,
    directory: TeamDirectory,
    controller: PlayoffController,
    simulator: GameSimulator,
}

impl Season {
    /// Builds an idle season. Call [`Season::start`] after subscribing.
    pub fn new(standings: StandingsFile, seed: u64, play_in_enabled: bool) -> Self {
        Self {
            directory: standings.directory(),
            controller: PlayoffController::new(PlayoffConfig { play_in_enabled }),
            simulator: GameSimulator::new(seed),
            standings,
        }
    }

    pub fn subscribe(&mut self, observer: impl PlayoffObserver + 'static) {
        self.controller.subscribe(observer);
    }

    /// Seeds a fresh bracket from the standings. Also used to restart; the
    /// simulator keeps its stream so a restart plays out differently.
    pub fn start(&mut self) -> anyhow::Result<()> {
        let season = self.standings.season;
        self.controller
            .initialize_playoffs(
                season,
                &self.standings.entries(Conference::Eastern),
                &self.standings.entries(Conference::Western),
            )
            .with_context(|| format!("could not seed the {season} playoffs"))?;
        Ok(())
    }

    pub fn controller(&self) -> &PlayoffController {
        &self.controller
    }

    pub fn directory(&self) -> &TeamDirectory {
        &self.directory
    }

    pub fn season(&self) -> u16 {
        self.controller.season().unwrap_or(self.standings.season)
    }

    pub fn phase(&self) -> PlayoffPhase {
        self.controller.phase()
    }

    /// Simulates and records the next game. `None` once nothing is left.
    pub fn play_next(&mut self) -> anyhow::Result<Option<PlayedGame>> {
        let Some(game) = self.controller.next_game() else {
            return Ok(None);
        };
        let result = self.simulator.play(
            self.directory.win_pct(&game.home_team_id),
            self.directory.win_pct(&game.away_team_id),
        );
        self.controller
            .record_result(&game.game_ref, result)
            .with_context(|| format!("recording {}", game.game_ref))?;
        debug!(
            "{} {} {}-{} {}",
            game.label, game.home_team_id, result.home_score, result.away_score, game.away_team_id
        );
        Ok(Some(PlayedGame { game, result }))
    }

    /// Plays until the phase changes. Returns the number of games played.
    pub fn finish_round(&mut self) -> anyhow::Result<usize> {
        let phase = self.phase();
        let mut played = 0;
        while self.phase() == phase && self.play_next()?.is_some() {
            played += 1;
        }
        info!("{} finished after {played} games", phase.label());
        Ok(played)
    }

    pub fn run_to_completion(&mut self) -> anyhow::Result<usize> {
        let mut played = 0;
        while self.play_next()?.is_some() {
            played += 1;
        }
        Ok(played)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        self.controller
            .create_save_data()
            .save_to_file(path)
            .with_context(|| format!("failed to save {}", path.display()))?;
        info!("saved playoffs to {}", path.display());
        Ok(())
    }

    /// Replaces the running tournament with the snapshot at `path`. The
    /// current one is kept if the snapshot is missing or invalid.
    pub fn load(&mut self, path: &Path) -> anyhow::Result<()> {
        let data = PlayoffSaveData::load_from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?;
        self.controller
            .restore_from_save(data)
            .with_context(|| format!("rejected snapshot {}", path.display()))?;
        Ok(())
    }

    /// Final standing line for every team, best seeds first.
    pub fn summary(&self) -> Vec<String> {
        Conference::ALL
            .into_iter()
            .flat_map(|conference| {
                self.standings.rows(conference).iter().map(move |row| (conference, row))
            })
            .filter_map(|(conference, row)| {
                let status = self.controller.team_status(&row.id, &self.directory)?;
                Some(format!("{} {:>2} {:<24} {status}", conference.code(), row.seed, row.name))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use playoff_engine::PlayoffEvent;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn season(seed: u64) -> Season {
        let mut season = Season::new(StandingsFile::load(None).unwrap(), seed, true);
        season.start().unwrap();
        season
    }

    #[test]
    fn headless_run_reaches_a_champion() {
        let mut season = season(2025);
        let played = season.run_to_completion().unwrap();
        // 6 play-in games plus 15 series of 4 to 7 games.
        assert!((66..=111).contains(&played), "played {played}");
        assert_eq!(season.phase(), PlayoffPhase::Complete);
        let bracket = season.controller().bracket().unwrap();
        assert!(bracket.champion_team_id().is_some());
        assert!(season.play_next().unwrap().is_none());
        assert_eq!(season.summary().len(), 20);
    }

    #[test]
    fn same_seed_crowns_the_same_champion() {
        let champion = |seed| {
            let mut s = season(seed);
            s.run_to_completion().unwrap();
            s.controller().bracket().and_then(|b| b.champion_team_id().map(str::to_string))
        };
        assert_eq!(champion(99), champion(99));
    }

    #[test]
    fn finish_round_stops_at_the_phase_change() {
        let mut season = season(1);
        assert_eq!(season.phase(), PlayoffPhase::PlayIn);
        assert_eq!(season.finish_round().unwrap(), 6);
        assert_eq!(season.phase(), PlayoffPhase::FirstRound);
        let played = season.finish_round().unwrap();
        assert!((32..=56).contains(&played));
        assert_eq!(season.phase(), PlayoffPhase::ConferenceSemis);
    }

    #[test]
    fn observers_see_every_game() {
        let mut season = Season::new(StandingsFile::load(None).unwrap(), 5, false);
        let games = Arc::new(Mutex::new(0usize));
        let counter = Arc::clone(&games);
        season.subscribe(move |event: &PlayoffEvent| {
            if matches!(event, PlayoffEvent::PlayoffGameCompleted { .. }) {
                *counter.lock().unwrap() += 1;
            }
        });
        season.start().unwrap();
        assert_eq!(season.phase(), PlayoffPhase::FirstRound);
        let played = season.run_to_completion().unwrap();
        assert_eq!(*games.lock().unwrap(), played);
    }

    #[test]
    fn save_and_load_resume_the_same_bracket() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("playoffs_2025.json");

        let mut first = season(3);
        first.finish_round().unwrap();
        first.play_next().unwrap();
        first.save(&path).unwrap();

        let mut second = season(4);
        second.load(&path).unwrap();
        assert_eq!(second.phase(), PlayoffPhase::FirstRound);
        assert_eq!(
            second.controller().create_save_data(),
            first.controller().create_save_data()
        );

        assert!(second.load(&dir.path().join("missing.json")).is_err());
        assert_eq!(second.phase(), PlayoffPhase::FirstRound);
    }

    #[test]
    fn restart_begins_a_new_tournament() {
        let mut season = season(8);
        season.run_to_completion().unwrap();
        season.start().unwrap();
        assert_eq!(season.phase(), PlayoffPhase::PlayIn);
        assert!(season.controller().is_active());
    }
}
