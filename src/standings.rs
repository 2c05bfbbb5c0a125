use anyhow::{Context, bail};
use playoff_engine::{Conference, StandingsEntry, TeamId, TeamNames};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

const FALLBACK_STANDINGS_JSON: &str = include_str!("../standings_2025.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamRow {
    pub id: TeamId,
    pub name: String,
    pub abbrev: String,
    pub seed: u8,
    pub wins: u16,
    pub losses: u16,
}

impl TeamRow {
    fn entry(&self) -> StandingsEntry {
        StandingsEntry::new(self.id.clone(), self.seed, self.wins, self.losses)
    }
}

/// Final regular-season standings for both conferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandingsFile {
    pub season: u16,
    pub eastern: Vec<TeamRow>,
    pub western: Vec<TeamRow>,
}

impl StandingsFile {
    /// Reads `path` when given, otherwise the bundled 2025 standings.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Self::parse(FALLBACK_STANDINGS_JSON).context("embedded standings");
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read standings from {}", path.display()))?;
        Self::parse(&raw).with_context(|| format!("invalid standings in {}", path.display()))
    }

    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        let file: StandingsFile = serde_json::from_str(raw)?;
        if file.eastern.is_empty() || file.western.is_empty() {
            bail!("both conferences need at least one team");
        }
        Ok(file)
    }

    pub fn rows(&self, conference: Conference) -> &[TeamRow] {
        match conference {
            Conference::Eastern => &self.eastern,
            Conference::Western => &self.western,
        }
    }

    /// Standings entries sorted by seed. Seed validation is left to the
    /// engine, which rejects gaps and duplicates.
    pub fn entries(&self, conference: Conference) -> Vec<StandingsEntry> {
        let mut entries: Vec<StandingsEntry> =
            self.rows(conference).iter().map(TeamRow::entry).collect();
        entries.sort_by_key(|e| e.seed);
        entries
    }

    pub fn directory(&self) -> TeamDirectory {
        TeamDirectory {
            teams: self
                .eastern
                .iter()
                .chain(self.western.iter())
                .map(|row| (row.id.clone(), row.clone()))
                .collect(),
        }
    }
}

/// Team lookups by id, built from the standings file.
#[derive(Debug, Clone, Default)]
pub struct TeamDirectory {
    teams: HashMap<TeamId, TeamRow>,
}

impl TeamDirectory {
    pub fn abbrev(&self, team_id: &str) -> String {
        self.teams
            .get(team_id)
            .map(|t| t.abbrev.clone())
            .unwrap_or_else(|| team_id.to_uppercase())
    }

    /// Regular-season win percentage, 0.5 for unknown teams.
    pub fn win_pct(&self, team_id: &str) -> f64 {
        self.teams
            .get(team_id)
            .map(|t| t.entry().win_pct())
            .unwrap_or(0.5)
    }
}

impl TeamNames for TeamDirectory {
    fn display_name(&self, team_id: &str) -> String {
        self.teams
            .get(team_id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| team_id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_standings_parse() {
        let file = StandingsFile::load(None).unwrap();
        assert_eq!(file.season, 2025);
        assert_eq!(file.eastern.len(), 10);
        assert_eq!(file.western.len(), 10);

        let east = file.entries(Conference::Eastern);
        assert_eq!(east[0].team_id, "cle");
        assert_eq!(east[9].seed, 10);

        let dir = file.directory();
        assert_eq!(dir.display_name("okc"), "Oklahoma City Thunder");
        assert_eq!(dir.abbrev("gsw"), "GSW");
        assert!(dir.win_pct("okc") > dir.win_pct("dal"));
    }

    #[test]
    fn unknown_teams_fall_back_to_ids() {
        let dir = StandingsFile::load(None).unwrap().directory();
        assert_eq!(dir.display_name("sea"), "sea");
        assert_eq!(dir.abbrev("sea"), "SEA");
        assert_eq!(dir.win_pct("sea"), 0.5);
    }

    #[test]
    fn entries_are_sorted_by_seed() {
        let raw = r#"{
            "season": 2024,
            "eastern": [
                {"id": "b", "name": "B", "abbrev": "B", "seed": 2, "wins": 40, "losses": 42},
                {"id": "a", "name": "A", "abbrev": "A", "seed": 1, "wins": 50, "losses": 32}
            ],
            "western": [
                {"id": "c", "name": "C", "abbrev": "C", "seed": 1, "wins": 45, "losses": 37}
            ]
        }"#;
        let file = StandingsFile::parse(raw).unwrap();
        let seeds: Vec<u8> = file.entries(Conference::Eastern).iter().map(|e| e.seed).collect();
        assert_eq!(seeds, vec![1, 2]);
    }

    #[test]
    fn empty_conference_is_rejected() {
        let raw = r#"{"season": 2025, "eastern": [], "western": []}"#;
        assert!(StandingsFile::parse(raw).is_err());
        assert!(StandingsFile::load(Some(Path::new("/nonexistent/standings.json"))).is_err());
    }
}
