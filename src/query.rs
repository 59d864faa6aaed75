//! Filters over today's games and box scores.
//!
//! Everything here is a linear scan over one provider response; the only
//! I/O is [`find_player_line`], which walks today's box scores lazily.

use crate::provider::live::BoxScorePlayer;
use crate::provider::{Game, LiveGame, LiveProvider, ProviderError};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

pub const NO_PLAYER_STATS_MESSAGE: &str = "No stats found for the player today.";

/// Stats-API games where `team` is the home or visiting side, matched
/// against abbreviation or full name.
pub fn stats_team_games(games: &[Game], team: &str) -> Vec<Game> {
    let team = team.trim().to_lowercase();
    games
        .iter()
        .filter(|g| {
            [
                &g.home_team.abbreviation,
                &g.visitor_team.abbreviation,
                &g.home_team.full_name,
                &g.visitor_team.full_name,
            ]
            .iter()
            .any(|name| name.to_lowercase() == team)
        })
        .cloned()
        .collect()
}

/// Live games where `team` is either side, matched against tricode or team
/// name ("GSW", "warriors").
pub fn live_team_games(games: &[LiveGame], team: &str) -> Vec<LiveGame> {
    let team = team.trim().to_lowercase();
    games
        .iter()
        .filter(|g| {
            [
                &g.home_team.team_tricode,
                &g.away_team.team_tricode,
                &g.home_team.team_name,
                &g.away_team.team_name,
            ]
            .iter()
            .any(|name| name.to_lowercase() == team)
        })
        .cloned()
        .collect()
}

/// Live games involving any of the given league team ids.
pub fn games_for_team_ids(games: &[LiveGame], team_ids: &[u64]) -> Vec<LiveGame> {
    let ids: HashSet<u64> = team_ids.iter().copied().collect();
    games
        .iter()
        .filter(|g| ids.contains(&g.home_team.team_id) || ids.contains(&g.away_team.team_id))
        .cloned()
        .collect()
}

/// Live games involving any of the given tricodes. This is the newsletter
/// match; abbreviations are compared upper-cased.
pub fn games_for_abbreviations<S: AsRef<str>>(games: &[LiveGame], abbreviations: &[S]) -> Vec<LiveGame> {
    let wanted: HashSet<String> = abbreviations
        .iter()
        .map(|a| a.as_ref().trim().to_uppercase())
        .filter(|a| !a.is_empty())
        .collect();
    games
        .iter()
        .filter(|g| {
            wanted.contains(&g.home_team.team_tricode.to_uppercase())
                || wanted.contains(&g.away_team.team_tricode.to_uppercase())
        })
        .cloned()
        .collect()
}

/// Today's line for one player.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PlayerLine {
    pub name: String,
    pub starter: bool,
    pub points: u32,
    pub rebounds: u32,
    pub assists: u32,
    pub minutes: String,
}

impl From<&BoxScorePlayer> for PlayerLine {
    fn from(player: &BoxScorePlayer) -> Self {
        Self {
            name: player.name.clone(),
            starter: player.starter,
            points: player.statistics.points,
            rebounds: player.statistics.rebounds,
            assists: player.statistics.assists,
            minutes: player.statistics.minutes.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum PlayerSelector<'a> {
    Id(u64),
    /// Case-insensitive substring of the player's name
    Name(&'a str),
}

impl PlayerSelector<'_> {
    pub fn matches(&self, player: &BoxScorePlayer) -> bool {
        match self {
            PlayerSelector::Id(id) => player.person_id == *id,
            PlayerSelector::Name(name) => {
                let needle = name.trim().to_lowercase();
                !needle.is_empty() && player.name.to_lowercase().contains(&needle)
            }
        }
    }
}

/// Scan today's box scores game by game and return the first matching
/// player. Games whose box score is not published yet are skipped.
pub async fn find_player_line(
    live: &dyn LiveProvider,
    selector: PlayerSelector<'_>,
) -> Result<Option<PlayerLine>, ProviderError> {
    let games = live.scoreboard().await?;
    for game in &games {
        let boxscore = match live.boxscore(&game.game_id).await {
            Ok(boxscore) => boxscore,
            Err(ProviderError::NotFound(_)) | Err(ProviderError::Status { status: 403, .. }) => {
                debug!("No box score yet for game {}", game.game_id);
                continue;
            }
            Err(e) => return Err(e),
        };
        let found = boxscore
            .players()
            .find(|p| selector.matches(p))
            .map(PlayerLine::from);
        if found.is_some() {
            return Ok(found);
        }
    }
    Ok(None)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::provider::live::{BoxScore, BoxScorePlayer, BoxScoreTeam, PlayerStatistics};
    use crate::provider::{LiveGame, LiveTeam};

    pub fn live_team(id: u64, tricode: &str, city: &str, name: &str, score: u32) -> LiveTeam {
        LiveTeam {
            team_id: id,
            team_tricode: tricode.to_string(),
            team_city: city.to_string(),
            team_name: name.to_string(),
            score,
            ..Default::default()
        }
    }

    pub fn live_game(game_id: &str, home: LiveTeam, away: LiveTeam) -> LiveGame {
        LiveGame {
            game_id: game_id.to_string(),
            game_status: 3,
            game_status_text: "Final".to_string(),
            home_team: home,
            away_team: away,
            ..Default::default()
        }
    }

    /// LAL vs GSW, BOS vs NYK
    pub fn slate() -> Vec<LiveGame> {
        vec![
            live_game(
                "0022400001",
                live_team(1610612747, "LAL", "Los Angeles", "Lakers", 120),
                live_team(1610612744, "GSW", "Golden State", "Warriors", 115),
            ),
            live_game(
                "0022400002",
                live_team(1610612738, "BOS", "Boston", "Celtics", 101),
                live_team(1610612752, "NYK", "New York", "Knicks", 99),
            ),
        ]
    }

    pub fn player(id: u64, name: &str, starter: bool, points: u32) -> BoxScorePlayer {
        BoxScorePlayer {
            person_id: id,
            name: name.to_string(),
            starter,
            statistics: PlayerStatistics {
                points,
                rebounds: 7,
                assists: 5,
                minutes: "PT33M00.00S".to_string(),
            },
            ..Default::default()
        }
    }

    pub fn boxscore(game_id: &str, home: Vec<BoxScorePlayer>, away: Vec<BoxScorePlayer>) -> BoxScore {
        BoxScore {
            game_id: game_id.to_string(),
            home_team: BoxScoreTeam {
                players: home,
                ..Default::default()
            },
            away_team: BoxScoreTeam {
                players: away,
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;
    use crate::provider::live::BoxScore;
    use crate::provider::Team;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    fn stats_game(home: (&str, &str), visitor: (&str, &str)) -> Game {
        Game {
            home_team: Team {
                abbreviation: home.0.into(),
                full_name: home.1.into(),
                ..Default::default()
            },
            visitor_team: Team {
                abbreviation: visitor.0.into(),
                full_name: visitor.1.into(),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn stats_filter_matches_abbreviation_or_full_name_either_side() {
        let games = vec![
            stats_game(("LAL", "Los Angeles Lakers"), ("GSW", "Golden State Warriors")),
            stats_game(("BOS", "Boston Celtics"), ("NYK", "New York Knicks")),
        ];
        assert_eq!(stats_team_games(&games, "gsw").len(), 1);
        assert_eq!(stats_team_games(&games, "Boston Celtics").len(), 1);
        assert_eq!(stats_team_games(&games, "new york knicks")[0].home_team.abbreviation, "BOS");
        // equality, not substring
        assert!(stats_team_games(&games, "Lakers").is_empty());
        assert!(stats_team_games(&[], "Any Team").is_empty());
    }

    #[test]
    fn live_filter_matches_tricode_or_team_name() {
        let games = slate();
        assert_eq!(live_team_games(&games, "GSW")[0].game_id, "0022400001");
        assert_eq!(live_team_games(&games, "knicks")[0].game_id, "0022400002");
        assert!(live_team_games(&games, "XYZ").is_empty());
    }

    #[test]
    fn team_id_filter() {
        let games = slate();
        assert_eq!(games_for_team_ids(&games, &[1610612752]).len(), 1);
        assert_eq!(games_for_team_ids(&games, &[1610612752, 1610612747]).len(), 2);
        assert!(games_for_team_ids(&games, &[]).is_empty());
    }

    #[test]
    fn abbreviation_filter_keeps_game_order_and_ignores_blanks() {
        let games = slate();
        let matched = games_for_abbreviations(&games, &["nyk", "LAL", " "]);
        let ids: Vec<_> = matched.iter().map(|g| g.game_id.as_str()).collect();
        assert_eq!(ids, vec!["0022400001", "0022400002"]);
        assert!(games_for_abbreviations(&games, &["MIA".to_string()]).is_empty());
    }

    struct FakeLive {
        games: Vec<LiveGame>,
        boxscores: HashMap<String, BoxScore>,
        fetched: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LiveProvider for FakeLive {
        async fn scoreboard(&self) -> Result<Vec<LiveGame>, ProviderError> {
            Ok(self.games.clone())
        }

        async fn boxscore(&self, game_id: &str) -> Result<BoxScore, ProviderError> {
            self.fetched.lock().unwrap().push(game_id.to_string());
            self.boxscores
                .get(game_id)
                .cloned()
                .ok_or_else(|| ProviderError::NotFound("boxscore".into()))
        }
    }

    fn fake_live() -> FakeLive {
        let mut boxscores = HashMap::new();
        boxscores.insert(
            "0022400001".to_string(),
            boxscore(
                "0022400001",
                vec![player(2544, "LeBron James", true, 32)],
                vec![player(201939, "Stephen Curry", true, 34)],
            ),
        );
        // second game not published yet
        FakeLive {
            games: slate(),
            boxscores,
            fetched: Mutex::new(Vec::new()),
        }
    }

    #[tokio::test]
    async fn finds_player_by_id_in_away_team() {
        let live = fake_live();
        let line = find_player_line(&live, PlayerSelector::Id(201939)).await.unwrap().unwrap();
        assert_eq!(line.name, "Stephen Curry");
        assert_eq!(line.points, 34);
        assert!(line.starter);
    }

    #[tokio::test]
    async fn name_lookup_is_case_insensitive_substring_and_stops_at_first_match() {
        let live = fake_live();
        let line = find_player_line(&live, PlayerSelector::Name("lebron")).await.unwrap();
        assert_eq!(line.map(|l| l.name), Some("LeBron James".to_string()));
        assert_eq!(*live.fetched.lock().unwrap(), vec!["0022400001".to_string()]);
    }

    #[tokio::test]
    async fn unknown_player_skips_unpublished_boxscores_and_returns_none() {
        let live = fake_live();
        let line = find_player_line(&live, PlayerSelector::Id(1)).await;
        let line = tokio_test::assert_ok!(line);
        assert_eq!(line, None);
        assert_eq!(live.fetched.lock().unwrap().len(), 2);
    }

    #[test]
    fn blank_name_never_matches() {
        let p = player(1, "Anyone", false, 0);
        assert!(!PlayerSelector::Name("  ").matches(&p));
    }
}
