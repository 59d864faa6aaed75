//! Static directory of NBA franchises, keyed by the league's team ids (the
//! same ids the live feed reports as `teamId`).

use serde::Serialize;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct StaticTeam {
    pub id: u64,
    pub full_name: &'static str,
    pub abbreviation: &'static str,
    pub nickname: &'static str,
    pub city: &'static str,
    pub state: &'static str,
    pub year_founded: u16,
}

macro_rules! team {
    ($id:expr, $full:expr, $abbr:expr, $nick:expr, $city:expr, $state:expr, $year:expr) => {
        StaticTeam {
            id: $id,
            full_name: $full,
            abbreviation: $abbr,
            nickname: $nick,
            city: $city,
            state: $state,
            year_founded: $year,
        }
    };
}

pub static TEAMS: [StaticTeam; 30] = [
    team!(1610612737, "Atlanta Hawks", "ATL", "Hawks", "Atlanta", "Georgia", 1949),
    team!(1610612738, "Boston Celtics", "BOS", "Celtics", "Boston", "Massachusetts", 1946),
    team!(1610612739, "Cleveland Cavaliers", "CLE", "Cavaliers", "Cleveland", "Ohio", 1970),
    team!(1610612740, "New Orleans Pelicans", "NOP", "Pelicans", "New Orleans", "Louisiana", 2002),
    team!(1610612741, "Chicago Bulls", "CHI", "Bulls", "Chicago", "Illinois", 1966),
    team!(1610612742, "Dallas Mavericks", "DAL", "Mavericks", "Dallas", "Texas", 1980),
    team!(1610612743, "Denver Nuggets", "DEN", "Nuggets", "Denver", "Colorado", 1976),
    team!(1610612744, "Golden State Warriors", "GSW", "Warriors", "Golden State", "California", 1946),
    team!(1610612745, "Houston Rockets", "HOU", "Rockets", "Houston", "Texas", 1967),
    team!(1610612746, "Los Angeles Clippers", "LAC", "Clippers", "Los Angeles", "California", 1970),
    team!(1610612747, "Los Angeles Lakers", "LAL", "Lakers", "Los Angeles", "California", 1948),
    team!(1610612748, "Miami Heat", "MIA", "Heat", "Miami", "Florida", 1988),
    team!(1610612749, "Milwaukee Bucks", "MIL", "Bucks", "Milwaukee", "Wisconsin", 1968),
    team!(1610612750, "Minnesota Timberwolves", "MIN", "Timberwolves", "Minneapolis", "Minnesota", 1989),
    team!(1610612751, "Brooklyn Nets", "BKN", "Nets", "Brooklyn", "New York", 1976),
    team!(1610612752, "New York Knicks", "NYK", "Knicks", "New York", "New York", 1946),
    team!(1610612753, "Orlando Magic", "ORL", "Magic", "Orlando", "Florida", 1989),
    team!(1610612754, "Indiana Pacers", "IND", "Pacers", "Indianapolis", "Indiana", 1976),
    team!(1610612755, "Philadelphia 76ers", "PHI", "76ers", "Philadelphia", "Pennsylvania", 1949),
    team!(1610612756, "Phoenix Suns", "PHX", "Suns", "Phoenix", "Arizona", 1968),
    team!(1610612757, "Portland Trail Blazers", "POR", "Trail Blazers", "Portland", "Oregon", 1970),
    team!(1610612758, "Sacramento Kings", "SAC", "Kings", "Sacramento", "California", 1948),
    team!(1610612759, "San Antonio Spurs", "SAS", "Spurs", "San Antonio", "Texas", 1976),
    team!(1610612760, "Oklahoma City Thunder", "OKC", "Thunder", "Oklahoma City", "Oklahoma", 1967),
    team!(1610612761, "Toronto Raptors", "TOR", "Raptors", "Toronto", "Ontario", 1995),
    team!(1610612762, "Utah Jazz", "UTA", "Jazz", "Salt Lake City", "Utah", 1974),
    team!(1610612763, "Memphis Grizzlies", "MEM", "Grizzlies", "Memphis", "Tennessee", 1995),
    team!(1610612764, "Washington Wizards", "WAS", "Wizards", "Washington", "District of Columbia", 1961),
    team!(1610612765, "Detroit Pistons", "DET", "Pistons", "Detroit", "Michigan", 1948),
    team!(1610612766, "Charlotte Hornets", "CHA", "Hornets", "Charlotte", "North Carolina", 1988),
];

pub fn all() -> &'static [StaticTeam] {
    &TEAMS
}

/// Case-insensitive substring match on the full name ("lakers", "los angeles").
pub fn find_by_full_name(query: &str) -> Vec<StaticTeam> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    TEAMS
        .iter()
        .filter(|t| t.full_name.to_lowercase().contains(&needle))
        .copied()
        .collect()
}

pub fn find_by_abbreviation(abbreviation: &str) -> Option<StaticTeam> {
    let abbreviation = abbreviation.trim();
    TEAMS
        .iter()
        .find(|t| t.abbreviation.eq_ignore_ascii_case(abbreviation))
        .copied()
}

pub fn find_by_id(id: u64) -> Option<StaticTeam> {
    TEAMS.iter().find(|t| t.id == id).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn directory_has_unique_ids_and_abbreviations() {
        let ids: HashSet<_> = TEAMS.iter().map(|t| t.id).collect();
        let abbrs: HashSet<_> = TEAMS.iter().map(|t| t.abbreviation).collect();
        assert_eq!(ids.len(), 30);
        assert_eq!(abbrs.len(), 30);
    }

    #[test]
    fn full_name_search_is_partial_and_case_insensitive() {
        let la: Vec<_> = find_by_full_name("los angeles")
            .into_iter()
            .map(|t| t.abbreviation)
            .collect();
        assert_eq!(la, vec!["LAC", "LAL"]);
        assert_eq!(find_by_full_name("WARRIORS")[0].id, 1610612744);
        assert!(find_by_full_name("   ").is_empty());
        assert!(find_by_full_name("Seattle").is_empty());
    }

    #[test]
    fn lookups_by_abbreviation_and_id() {
        assert_eq!(find_by_abbreviation("gsw").map(|t| t.nickname), Some("Warriors"));
        assert_eq!(find_by_id(1610612747).map(|t| t.abbreviation), Some("LAL"));
        assert_eq!(find_by_id(42), None);
    }
}
