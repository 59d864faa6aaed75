//! Static directory of NBA players keyed by the league's person ids, the
//! `personId` the live box scores report. Search results from here feed
//! straight into the box-score lookups.
//!
//! This is a curated snapshot, not the full historical register.

use serde::Serialize;

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct StaticPlayer {
    pub id: u64,
    pub full_name: &'static str,
    pub first_name: &'static str,
    pub last_name: &'static str,
    pub is_active: bool,
}

macro_rules! player {
    ($id:expr, $first:expr, $last:expr, $active:expr) => {
        StaticPlayer {
            id: $id,
            full_name: concat!($first, " ", $last),
            first_name: $first,
            last_name: $last,
            is_active: $active,
        }
    };
}

pub static PLAYERS: &[StaticPlayer] = &[
    player!(2544, "LeBron", "James", true),
    player!(201939, "Stephen", "Curry", true),
    player!(203552, "Seth", "Curry", true),
    player!(201142, "Kevin", "Durant", true),
    player!(203507, "Giannis", "Antetokounmpo", true),
    player!(203999, "Nikola", "Jokic", true),
    player!(1629029, "Luka", "Doncic", true),
    player!(203954, "Joel", "Embiid", true),
    player!(1628369, "Jayson", "Tatum", true),
    player!(1627759, "Jaylen", "Brown", true),
    player!(203076, "Anthony", "Davis", true),
    player!(1630162, "Anthony", "Edwards", true),
    player!(203081, "Damian", "Lillard", true),
    player!(201935, "James", "Harden", true),
    player!(202695, "Kawhi", "Leonard", true),
    player!(202710, "Jimmy", "Butler", true),
    player!(1626164, "Devin", "Booker", true),
    player!(1628983, "Shai", "Gilgeous-Alexander", true),
    player!(1641705, "Victor", "Wembanyama", true),
    player!(1629630, "Ja", "Morant", true),
    player!(1629027, "Trae", "Young", true),
    player!(1628378, "Donovan", "Mitchell", true),
    player!(202681, "Kyrie", "Irving", true),
    player!(202331, "Paul", "George", true),
    player!(1629627, "Zion", "Williamson", true),
    player!(1630169, "Tyrese", "Haliburton", true),
    player!(202691, "Klay", "Thompson", true),
    player!(203110, "Draymond", "Green", true),
    player!(101108, "Chris", "Paul", true),
    player!(201566, "Russell", "Westbrook", true),
    player!(1628368, "De'Aaron", "Fox", true),
    player!(1626157, "Karl-Anthony", "Towns", true),
    player!(1628389, "Bam", "Adebayo", true),
    player!(1628973, "Jalen", "Brunson", true),
    player!(1627734, "Domantas", "Sabonis", true),
    player!(1631094, "Paolo", "Banchero", true),
    player!(977, "Kobe", "Bryant", false),
    player!(893, "Michael", "Jordan", false),
    player!(1495, "Tim", "Duncan", false),
    player!(1717, "Dirk", "Nowitzki", false),
    player!(708, "Kevin", "Garnett", false),
    player!(2548, "Dwyane", "Wade", false),
    player!(406, "Shaquille", "O'Neal", false),
    player!(947, "Allen", "Iverson", false),
    player!(77142, "Magic", "Johnson", false),
    player!(1449, "Larry", "Bird", false),
    player!(76003, "Kareem", "Abdul-Jabbar", false),
];

/// Case-insensitive substring match on the full name ("curry", "lebron j").
pub fn find_by_full_name(query: &str) -> Vec<StaticPlayer> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    PLAYERS
        .iter()
        .filter(|p| p.full_name.to_lowercase().contains(&needle))
        .copied()
        .collect()
}

pub fn find_by_id(id: u64) -> Option<StaticPlayer> {
    PLAYERS.iter().find(|p| p.id == id).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_are_unique() {
        let ids: HashSet<_> = PLAYERS.iter().map(|p| p.id).collect();
        assert_eq!(ids.len(), PLAYERS.len());
    }

    #[test]
    fn full_name_joins_first_and_last() {
        let curry = find_by_id(201939).unwrap();
        assert_eq!(curry.full_name, "Stephen Curry");
        assert_eq!(curry.last_name, "Curry");
        assert!(curry.is_active);
    }

    #[test]
    fn search_is_partial_and_case_insensitive() {
        let ids: Vec<_> = find_by_full_name("CURRY").into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![201939, 203552]);
        assert_eq!(find_by_full_name("kobe")[0].id, 977);
        assert!(!find_by_full_name("kobe")[0].is_active);
        assert!(find_by_full_name(" ").is_empty());
        assert!(find_by_full_name("Naismith").is_empty());
    }
}
