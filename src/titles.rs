// =============================================================================
// titles.rs - MAKING CONTEST TITLES LOOK LIKE CONTEST TITLES
// =============================================================================
//
// Every provider has opinions about whitespace, and the aggregator sprinkles
// decorative glyphs in front of some titles. Before a contest reaches the
// receiver its title goes through `fix_title`, so the same contest reads the
// same no matter which loader in the chain found it.
// =============================================================================

use crate::models::{Contest, Platform};

/// Glyphs the aggregator likes to prefix AtCoder titles with.
const DECORATIVE_PREFIXES: &[char] = &['◉', '◎', '○', '●', '◓', '◑', '◒', '◐', '🔴', '⚪', '🟢'];

pub fn fix_title(platform: Platform, title: &str) -> String {
    let title = collapse_whitespace(title);
    match platform {
        Platform::AtCoder => title
            .trim_start_matches(|c: char| DECORATIVE_PREFIXES.contains(&c) || c.is_whitespace())
            .to_string(),
        Platform::Codeforces => drop_round_hash(&title),
        _ => title,
    }
}

pub fn fix_titles(platform: Platform, contests: Vec<Contest>) -> Vec<Contest> {
    contests
        .into_iter()
        .map(|mut contest| {
            contest.title = fix_title(platform, &contest.title);
            contest
        })
        .collect()
}

fn collapse_whitespace(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// "Codeforces Round #900 (Div. 2)" -> "Codeforces Round 900 (Div. 2)".
/// Codeforces dropped the hash; older sources did not.
fn drop_round_hash(title: &str) -> String {
    title.replace("Round #", "Round ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn test_whitespace_is_collapsed_everywhere() {
        assert_eq!(fix_title(Platform::Dmoj, "  DMOPC '24\t Contest  3 "), "DMOPC '24 Contest 3");
        assert_eq!(fix_title(Platform::Unknown, "Weekly\nChallenge"), "Weekly Challenge");
    }

    #[test]
    fn test_atcoder_decorations_are_stripped() {
        assert_eq!(
            fix_title(Platform::AtCoder, "◉ AtCoder Beginner Contest 350"),
            "AtCoder Beginner Contest 350"
        );
        assert_eq!(fix_title(Platform::AtCoder, "ARC 170"), "ARC 170");
    }

    #[test]
    fn test_codeforces_round_hash_is_dropped() {
        assert_eq!(
            fix_title(Platform::Codeforces, "Codeforces Round #900 (Div. 2)"),
            "Codeforces Round 900 (Div. 2)"
        );
        // only Codeforces gets this treatment
        assert_eq!(fix_title(Platform::Timus, "Round #1"), "Round #1");
    }

    #[test]
    fn test_fix_titles_keeps_everything_else() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let contest = Contest::new(Platform::AtCoder, "abc350", "◉  ABC 350 ", start, Duration::hours(2))
            .with_link("https://atcoder.jp/contests/abc350");
        let fixed = fix_titles(Platform::AtCoder, vec![contest.clone()]);
        assert_eq!(fixed[0].title, "ABC 350");
        assert_eq!(fixed[0].link, contest.link);
        assert_eq!(fixed[0].start_time, contest.start_time);
    }
}
