use crate::bracket::PlayoffBracket;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Bumped whenever the saved layout changes.
pub const SAVE_VERSION: u32 = 1;

#[derive(Debug)]
pub enum SnapshotError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    VersionMismatch { found: u32, expected: u32 },
    /// The data parsed but does not describe a reachable bracket.
    Invalid(String),
}

impl fmt::Display for SnapshotError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnapshotError::Io(err) => write!(f, "IO error: {err}"),
            SnapshotError::Parse(err) => write!(f, "Parse error: {err}"),
            SnapshotError::VersionMismatch { found, expected } => {
                write!(f, "Version mismatch: found {found}, expected {expected}")
            }
            SnapshotError::Invalid(msg) => write!(f, "Invalid snapshot: {msg}"),
        }
    }
}

impl std::error::Error for SnapshotError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SnapshotError::Io(err) => Some(err),
            SnapshotError::Parse(err) => Some(err),
            _ => None,
        }
    }
}

impl SnapshotError {
    /// A missing or unreadable file can be retried or replaced by a new
    /// tournament. Anything else means the snapshot itself is bad.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, SnapshotError::Io(_))
    }
}

impl From<std::io::Error> for SnapshotError {
    fn from(err: std::io::Error) -> Self {
        SnapshotError::Io(err)
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(err: serde_json::Error) -> Self {
        SnapshotError::Parse(err)
    }
}

/// Everything needed to resume a tournament exactly where it stopped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayoffSaveData {
    pub version: u32,
    pub season: u16,
    pub is_active: bool,
    pub play_in_enabled: bool,
    pub bracket: Option<PlayoffBracket>,
}

/// Only the version, read before the full structure so a newer layout
/// reports a mismatch instead of a parse error.
#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

impl PlayoffSaveData {
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, SnapshotError> {
        let probe: VersionProbe = serde_json::from_str(json)?;
        check_version(probe.version)?;
        let data: Self = serde_json::from_str(json)?;
        data.validate()?;
        Ok(data)
    }

    /// Write through a temporary file and rename, so a crash never leaves
    /// a half-written snapshot behind.
    pub fn save_to_file(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let json = self.to_json()?;
        let temp_path = path.with_extension("tmp");
        {
            let mut file = File::create(&temp_path)?;
            file.write_all(json.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, path)?;
        debug!("saved {} bytes to {}", json.len(), path.display());
        Ok(())
    }

    pub fn load_from_file(path: &Path) -> Result<Self, SnapshotError> {
        let json = fs::read_to_string(path)?;
        let data = Self::from_json(&json)?;
        debug!("loaded {} bytes from {}", json.len(), path.display());
        Ok(data)
    }

    /// Version, flag and structure checks.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        check_version(self.version)?;
        let Some(bracket) = &self.bracket else {
            if self.is_active {
                return Err(SnapshotError::Invalid("active snapshot without a bracket".into()));
            }
            return Ok(());
        };
        if bracket.season() != self.season {
            return Err(SnapshotError::Invalid(format!(
                "season {} does not match bracket season {}",
                self.season,
                bracket.season()
            )));
        }
        if self.is_active == bracket.is_complete() {
            return Err(SnapshotError::Invalid(format!(
                "active flag {} contradicts phase {}",
                self.is_active,
                bracket.phase().label()
            )));
        }
        if bracket.play_in().is_some() && !self.play_in_enabled {
            return Err(SnapshotError::Invalid("play-in bracket saved with the play-in disabled".into()));
        }
        bracket.check_integrity().map_err(SnapshotError::Invalid)
    }
}

fn check_version(found: u32) -> Result<(), SnapshotError> {
    if found != SAVE_VERSION {
        return Err(SnapshotError::VersionMismatch { found, expected: SAVE_VERSION });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{PlayoffConfig, PlayoffController};
    use crate::test_support::*;
    use crate::series::PlayoffSeries;
    use crate::{Conference, PlayInGameType, PlayoffPhase, SeriesRound};
    use tempfile::TempDir;

    /// Every team-level query, for comparing two controllers.
    fn query_fingerprint(c: &PlayoffController) -> Vec<(String, bool, Option<String>, Option<String>)> {
        let teams = east_standings().into_iter().chain(west_standings());
        teams
            .map(|entry| {
                let id = entry.team_id;
                (
                    id.clone(),
                    c.is_team_alive(&id),
                    c.team_status(&id, &names()),
                    c.series_for_team(&id).map(|s| s.status_string(&names())),
                )
            })
            .collect()
    }

    fn mid_tournament() -> PlayoffController {
        let mut c = started(PlayoffConfig::default());
        for _ in 0..6 {
            play_next_home_win(&mut c);
        }
        finish_round(&mut c, SeriesRound::FirstRound);
        // Leave the semis part way through.
        for _ in 0..5 {
            play_next_home_win(&mut c);
        }
        c
    }

    #[test]
    fn restore_reproduces_every_query() {
        let original = mid_tournament();
        assert_eq!(original.phase(), PlayoffPhase::ConferenceSemis);

        let json = original.create_save_data().to_json().unwrap();
        let mut restored = PlayoffController::default();
        restored.restore_from_save(PlayoffSaveData::from_json(&json).unwrap()).unwrap();

        assert_eq!(query_fingerprint(&restored), query_fingerprint(&original));
        assert_eq!(restored.next_game(), original.next_game());
        assert_eq!(restored.create_save_data(), original.create_save_data());

        // The restored controller keeps playing.
        play_to_completion(&mut restored);
        assert_eq!(restored.phase(), PlayoffPhase::Complete);
    }

    #[test]
    fn file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("playoffs_2025.json");
        let original = mid_tournament();

        original.create_save_data().save_to_file(&path).unwrap();
        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());

        let loaded = PlayoffSaveData::load_from_file(&path).unwrap();
        assert_eq!(loaded, original.create_save_data());
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let mut data = mid_tournament().create_save_data();
        data.version = SAVE_VERSION + 1;
        let json = data.to_json().unwrap();
        let err = PlayoffSaveData::from_json(&json).unwrap_err();
        assert!(matches!(err, SnapshotError::VersionMismatch { found: 2, expected: 1 }));

        let mut c = PlayoffController::default();
        assert!(c.restore_from_save(data).is_err());
        assert!(c.bracket().is_none());
    }

    #[test]
    fn tampered_snapshots_are_rejected_without_touching_state() {
        let mut c = started(PlayoffConfig::default());
        let before = c.create_save_data();

        let mut data = mid_tournament().create_save_data();
        if let Some(bracket) = data.bracket.as_mut() {
            bracket.champion_team_id = Some("BOS".into());
        }
        let err = c.restore_from_save(data).unwrap_err();
        assert!(matches!(err, SnapshotError::Invalid(_)));
        assert_eq!(c.create_save_data(), before);

        let mut data = mid_tournament().create_save_data();
        data.is_active = false;
        assert!(c.restore_from_save(data).is_err());

        let mut data = mid_tournament().create_save_data();
        data.season = 2024;
        assert!(c.restore_from_save(data).is_err());

        assert!(matches!(
            PlayoffSaveData::from_json("{\"version\": 1"),
            Err(SnapshotError::Parse(_))
        ));
    }

    fn at_finals() -> PlayoffController {
        let mut c = started(PlayoffConfig::default());
        while c.phase() != PlayoffPhase::Finals {
            play_next_home_win(&mut c).unwrap();
        }
        c
    }

    #[test]
    fn finished_play_in_left_in_play_in_phase_is_rejected() {
        let mut c = started(PlayoffConfig::default());
        for conference in Conference::ALL {
            for game_type in [PlayInGameType::SevenVsEight, PlayInGameType::NineVsTen] {
                c.record_play_in_result(conference, game_type, home_win()).unwrap();
            }
        }
        let before = c.create_save_data();

        // Deciders written straight into the save, so no cascade ever ran.
        let mut data = before.clone();
        let play_in = data.bracket.as_mut().and_then(|b| b.play_in.as_mut()).unwrap();
        for conference in Conference::ALL {
            play_in
                .conference_mut(conference)
                .record_game_result(PlayInGameType::EightSeedDecider, home_win())
                .unwrap();
        }
        assert!(play_in.is_complete());
        assert_eq!(data.bracket.as_ref().map(|b| b.phase()), Some(PlayoffPhase::PlayIn));

        let err = c.restore_from_save(data).unwrap_err();
        assert!(matches!(err, SnapshotError::Invalid(_)));
        assert_eq!(c.create_save_data(), before);
        assert!(c.next_game().is_some());
    }

    #[test]
    fn play_in_seeds_must_match_the_winners() {
        let mut c = started(PlayoffConfig::default());
        for game_type in [
            PlayInGameType::SevenVsEight,
            PlayInGameType::NineVsTen,
            PlayInGameType::EightSeedDecider,
        ] {
            c.record_play_in_result(Conference::Eastern, game_type, home_win()).unwrap();
        }
        assert_eq!(c.phase(), PlayoffPhase::PlayIn);
        let data = c.create_save_data();

        // ORL and ATL trade the 7 and 8 seeds in a hand-edited file.
        let mut value = serde_json::to_value(&data).unwrap();
        let seeds = &mut value["bracket"]["eastern"]["seeds"];
        assert_eq!(seeds[6]["team_id"], "ORL");
        assert_eq!(seeds[7]["team_id"], "ATL");
        seeds[6]["team_id"] = "ATL".into();
        seeds[7]["team_id"] = "ORL".into();
        let tampered: PlayoffSaveData = serde_json::from_value(value).unwrap();

        let mut restored = PlayoffController::default();
        let err = restored.restore_from_save(tampered).unwrap_err();
        assert!(matches!(err, SnapshotError::Invalid(msg) if msg.contains("play-in winners")));
        assert!(restored.bracket().is_none());

        // Half a play-in is a legal place to stop.
        restored.restore_from_save(data).unwrap();
        assert_eq!(restored.phase(), PlayoffPhase::PlayIn);
    }

    #[test]
    fn finals_must_pair_the_conference_champions() {
        let data = at_finals().create_save_data();
        let finals = data.bracket.as_ref().and_then(|b| b.finals()).unwrap();
        assert!(finals.involves("OKC") && finals.involves("CLE"));

        let mut tampered = data.clone();
        if let Some(bracket) = tampered.bracket.as_mut() {
            bracket.finals = Some(PlayoffSeries::new(
                "2025-F",
                None,
                SeriesRound::Finals,
                ("MIA", 10),
                ("DAL", 10),
            ));
        }
        let mut c = PlayoffController::default();
        let err = c.restore_from_save(tampered).unwrap_err();
        assert!(matches!(err, SnapshotError::Invalid(_)));
        assert!(c.bracket().is_none());

        c.restore_from_save(data).unwrap();
        assert!(c.is_team_alive("OKC"));
        assert!(!c.is_team_alive("MIA"));
    }

    #[test]
    fn conference_champion_must_win_the_conference_finals() {
        let data = at_finals().create_save_data();
        let mut value = serde_json::to_value(&data).unwrap();
        assert_eq!(value["bracket"]["western"]["champion_team_id"], "OKC");
        value["bracket"]["western"]["champion_team_id"] = "HOU".into();
        let tampered: PlayoffSaveData = serde_json::from_value(value).unwrap();

        let mut c = started(PlayoffConfig::default());
        let before = c.create_save_data();
        let err = c.restore_from_save(tampered).unwrap_err();
        assert!(matches!(err, SnapshotError::Invalid(msg) if msg.contains("Conference Finals")));
        assert_eq!(c.create_save_data(), before);
    }

    #[test]
    fn empty_controller_round_trips() {
        let c = PlayoffController::new(PlayoffConfig { play_in_enabled: false });
        let data = c.create_save_data();
        assert!(!data.is_active);
        let json = data.to_json().unwrap();
        let mut restored = PlayoffController::default();
        restored.restore_from_save(PlayoffSaveData::from_json(&json).unwrap()).unwrap();
        assert!(!restored.config().play_in_enabled);
        assert_eq!(restored.phase(), PlayoffPhase::NotStarted);
        assert!(!restored.is_team_alive(&east_standings()[0].team_id));
        assert!(restored.bracket().map(|b| b.conference(Conference::Eastern)).is_none());
    }

    #[test]
    fn io_errors_are_recoverable() {
        let dir = TempDir::new().unwrap();
        let err = PlayoffSaveData::load_from_file(&dir.path().join("missing.json")).unwrap_err();
        assert!(err.is_recoverable());
        assert!(!SnapshotError::Invalid("x".into()).is_recoverable());
    }
}
