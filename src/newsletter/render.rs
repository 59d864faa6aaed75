//! HTML rendering of a day's games.

use crate::provider::live::{Leader, PeriodScore};
use crate::provider::{LiveGame, LiveTeam};
use chrono::NaiveDate;
use std::fmt::Write;

const TEMPLATE: &str = include_str!("../../templates/newsletter.html");

pub fn subject(date: NaiveDate) -> String {
    format!("NBA Newsletter - {}", date.format("%Y-%m-%d"))
}

/// Full HTML document for `date` listing `games` in the given order.
pub fn render(date: NaiveDate, games: &[LiveGame]) -> String {
    let mut body = String::new();
    if games.is_empty() {
        body.push_str("    <p class=\"empty\">No games scheduled today.</p>\n");
    }
    for game in games {
        render_game(&mut body, game);
    }

    TEMPLATE
        .replace("{{DATE}}", &date.format("%Y-%m-%d").to_string())
        .replace("{{GAMES}}", body.trim_end_matches('\n'))
}

fn render_game(out: &mut String, game: &LiveGame) {
    let away = &game.away_team;
    let home = &game.home_team;

    // writing into a String cannot fail
    let _ = writeln!(out, "    <div class=\"game\">");
    let _ = writeln!(
        out,
        "      <div class=\"matchup\">{} @ {}</div>",
        escape(&away.display_name()),
        escape(&home.display_name())
    );
    let _ = writeln!(
        out,
        "      <div class=\"score\">{} {} - {} {}</div>",
        escape(&away.team_tricode),
        away.score,
        home.score,
        escape(&home.team_tricode)
    );
    let _ = writeln!(
        out,
        "      <div class=\"status\">{}</div>",
        escape(game.game_status_text.trim())
    );

    if !away.periods.is_empty() || !home.periods.is_empty() {
        render_periods(out, away, home);
    }

    if let Some(leaders) = &game.game_leaders {
        let lines: Vec<String> = [(&leaders.away_leaders, away), (&leaders.home_leaders, home)]
            .into_iter()
            .filter(|(leader, _)| !leader.name.is_empty())
            .map(|(leader, team)| leader_line(leader, team))
            .collect();
        if !lines.is_empty() {
            let _ = writeln!(out, "      <ul class=\"leaders\">");
            for line in lines {
                let _ = writeln!(out, "        <li>{}</li>", line);
            }
            let _ = writeln!(out, "      </ul>");
        }
    }
    let _ = writeln!(out, "    </div>");
}

fn render_periods(out: &mut String, away: &LiveTeam, home: &LiveTeam) {
    let header = if away.periods.len() >= home.periods.len() {
        &away.periods
    } else {
        &home.periods
    };

    let _ = writeln!(out, "      <table class=\"periods\">");
    let _ = write!(out, "        <tr><th></th>");
    for period in header {
        let _ = write!(out, "<th>{}</th>", period_label(period));
    }
    let _ = writeln!(out, "<th>T</th></tr>");

    for team in [away, home] {
        let _ = write!(out, "        <tr><td>{}</td>", escape(&team.team_tricode));
        for (i, _) in header.iter().enumerate() {
            match team.periods.get(i) {
                Some(p) => {
                    let _ = write!(out, "<td>{}</td>", p.score);
                }
                None => out.push_str("<td></td>"),
            }
        }
        let _ = writeln!(out, "<td>{}</td></tr>", team.score);
    }
    let _ = writeln!(out, "      </table>");
}

fn period_label(period: &PeriodScore) -> String {
    if period.period_type.eq_ignore_ascii_case("OVERTIME") || period.period > 4 {
        let ot = period.period.saturating_sub(4);
        if ot <= 1 {
            "OT".to_string()
        } else {
            format!("OT{}", ot)
        }
    } else {
        format!("Q{}", period.period)
    }
}

fn leader_line(leader: &Leader, team: &LiveTeam) -> String {
    format!(
        "{} ({}): {} PTS, {} REB, {} AST",
        escape(&leader.name),
        escape(&team.team_tricode),
        leader.points,
        leader.rebounds,
        leader.assists
    )
}

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::live::GameLeaders;
    use crate::query::fixtures::slate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 5).unwrap()
    }

    fn period(n: u32, kind: &str, score: u32) -> PeriodScore {
        PeriodScore {
            period: n,
            period_type: kind.to_string(),
            score,
        }
    }

    #[test]
    fn subject_carries_the_date() {
        assert_eq!(subject(day()), "NBA Newsletter - 2025-01-05");
    }

    #[test]
    fn renders_every_game_with_scores_and_date() {
        let html = render(day(), &slate());
        assert!(html.contains("<title>NBA Newsletter - 2025-01-05</title>"));
        assert!(html.contains("Golden State Warriors @ Los Angeles Lakers"));
        assert!(html.contains("GSW 115 - 120 LAL"));
        assert!(html.contains("New York Knicks @ Boston Celtics"));
        assert_eq!(html.matches("<div class=\"game\">").count(), 2);
        assert!(!html.contains("{{"));
    }

    #[test]
    fn empty_slate_says_so() {
        let html = render(day(), &[]);
        assert!(html.contains("No games scheduled today."));
    }

    #[test]
    fn period_table_and_leaders() {
        let mut game = slate().remove(0);
        game.home_team.periods = vec![
            period(1, "REGULAR", 30),
            period(2, "REGULAR", 25),
            period(3, "REGULAR", 35),
            period(4, "REGULAR", 20),
            period(5, "OVERTIME", 10),
        ];
        game.away_team.periods = vec![period(1, "REGULAR", 28), period(2, "REGULAR", 27)];
        game.game_leaders = Some(GameLeaders {
            home_leaders: Leader {
                name: "LeBron James".into(),
                points: 32,
                rebounds: 8,
                assists: 10,
                ..Default::default()
            },
            away_leaders: Leader::default(),
        });

        let html = render(day(), &[game]);
        assert!(html.contains("<th>Q1</th><th>Q2</th><th>Q3</th><th>Q4</th><th>OT</th><th>T</th>"));
        assert!(html.contains("<tr><td>GSW</td><td>28</td><td>27</td><td></td><td></td><td></td><td>115</td></tr>"));
        assert!(html.contains("LeBron James (LAL): 32 PTS, 8 REB, 10 AST"));
        // unnamed leader is left out
        assert_eq!(html.matches("<li>").count(), 1);
    }

    #[test]
    fn provider_text_is_escaped() {
        let mut game = slate().remove(0);
        game.game_status_text = "<script>alert('x')</script>".into();
        let html = render(day(), &[game]);
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn overtime_labels() {
        assert_eq!(period_label(&period(5, "OVERTIME", 0)), "OT");
        assert_eq!(period_label(&period(6, "OVERTIME", 0)), "OT2");
        assert_eq!(period_label(&period(3, "REGULAR", 0)), "Q3");
    }
}
