// Plain-text rendering of finalized standings.

use statrs::distribution::{ContinuousCDF, Normal};

use crate::standings::FinalStandings;

/// Confidence level of the margins printed under the finish table
pub const CONFIDENCE: f64 = 0.95;

const NAME_WIDTH: usize = 24;
const POSITION_WIDTH: usize = 9;

/// Half-width of the normal-approximation confidence interval for a finish
/// probability `p` estimated from `seasons` simulated seasons.
pub fn margin_of_error(p: f64, seasons: u64, confidence: f64) -> f64 {
    let normal = Normal::new(0.0, 1.0).unwrap();
    let z = normal.inverse_cdf(0.5 + confidence / 2.0);
    z * (p * (1.0 - p) / seasons as f64).sqrt()
}

/// Both tables, averages first.
pub fn render(title: &str, standings: &FinalStandings) -> String {
    let mut out = render_averages(title, standings);
    out.push('\n');
    out.push_str(&render_finish_table(title, standings));
    out
}

/// Average season line per competitor, best first.
pub fn render_averages(title: &str, standings: &FinalStandings) -> String {
    let header = format!(
        "{:>3} | {:<name$} | {:>6} | {:>6} | {:>6} | {:>6} | {:>6} | {:>13} | {:>7} | {:>4}",
        "#",
        "Club",
        "Games",
        "Points",
        "Wins",
        "Draws",
        "Losses",
        "Goals",
        "Rating",
        "Mode",
        name = NAME_WIDTH
    );
    let rule = "=".repeat(header.len());

    let mut out = String::new();
    out.push_str(&format!(
        "{rule}\n{title} ({} simulated seasons)\n{rule}\n{header}\n{rule}\n",
        standings.seasons
    ));

    for (place, row) in standings.rows.iter().enumerate() {
        out.push_str(&format!(
            "{:>3} | {:<name$} | {:>6.2} | {:>6.2} | {:>6.2} | {:>6.2} | {:>6.2} | {:>13} | {:>7.1} | {:>4}\n",
            place + 1,
            truncate(&row.name, NAME_WIDTH),
            row.games,
            row.points,
            row.wins,
            row.draws,
            row.losses,
            format!("{:.2}:{:.2}", row.goals_for, row.goals_against),
            row.rating,
            row.likeliest_position(),
            name = NAME_WIDTH
        ));
    }
    out.push_str(&"-".repeat(header.len()));
    out.push('\n');
    out
}

/// Share of seasons each competitor finished in each position.
pub fn render_finish_table(title: &str, standings: &FinalStandings) -> String {
    let positions = standings.rows.first().map_or(0, |r| r.finish.len());

    let mut header = format!("{:<name$} |", "Club\\Position", name = NAME_WIDTH);
    for p in 1..=positions {
        header.push_str(&format!(" {:>width$} |", p, width = POSITION_WIDTH));
    }
    let rule = "=".repeat(header.len());

    let mut out = String::new();
    out.push_str(&format!("{rule}\n{title}: finish probabilities\n{rule}\n{header}\n"));
    out.push_str(&"-".repeat(header.len()));
    out.push('\n');

    for row in &standings.rows {
        let mut line = format!("{:<name$} |", truncate(&row.name, NAME_WIDTH), name = NAME_WIDTH);
        for share in &row.finish {
            line.push_str(&format!(
                " {:>width$} |",
                format!("{:.4}%", share * 100.0),
                width = POSITION_WIDTH
            ));
        }
        out.push_str(&line);
        out.push('\n');
    }

    let worst = margin_of_error(0.5, standings.seasons, CONFIDENCE);
    out.push_str(&format!(
        "{:.0}% margin of error: at most \u{b1}{:.4}% per cell\n",
        CONFIDENCE * 100.0,
        worst * 100.0
    ));
    out
}

fn truncate(name: &str, width: usize) -> String {
    name.chars().take(width).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::standings::StandingRow;

    fn standings() -> FinalStandings {
        let row = |name: &str, points: f64, finish: Vec<f64>| StandingRow {
            name: name.to_string(),
            games: 38.0,
            points,
            wins: points / 3.0,
            draws: 0.0,
            losses: 38.0 - points / 3.0,
            goals_for: 60.5,
            goals_against: 40.25,
            rating: 1850.0,
            placings: finish.iter().map(|f| (f * 100.0) as u64).collect(),
            finish,
        };
        FinalStandings {
            seasons: 100,
            rows: vec![
                row("Manchester City", 90.0, vec![0.75, 0.25]),
                row("Liverpool", 84.0, vec![0.25, 0.75]),
            ],
        }
    }

    #[test]
    fn test_margin_of_error() {
        let m = margin_of_error(0.5, 10_000, 0.95);
        assert!((m - 1.959964 * 0.005).abs() < 1e-6);
        assert_eq!(margin_of_error(0.0, 10_000, 0.95), 0.0);
        assert!(margin_of_error(0.5, 1_000_000, 0.95) < m);
    }

    #[test]
    fn test_render_averages() {
        let text = render_averages("Premier League", &standings());
        assert!(text.contains("Premier League (100 simulated seasons)"));
        assert!(text.contains("Manchester City"));
        assert!(text.contains("60.50:40.25"));
        let city = text.find("Manchester City").unwrap();
        let pool = text.find("Liverpool").unwrap();
        assert!(city < pool);
    }

    #[test]
    fn test_render_finish_table() {
        let text = render_finish_table("Premier League", &standings());
        assert!(text.contains("Club\\Position"));
        assert!(text.contains("75.0000%"));
        assert!(text.contains("25.0000%"));
        assert!(text.contains("95% margin of error"));
    }

    #[test]
    fn test_render_contains_both_tables() {
        let text = render("Premier League", &standings());
        assert!(text.contains("finish probabilities"));
        assert!(text.contains("Rating"));
    }
}
