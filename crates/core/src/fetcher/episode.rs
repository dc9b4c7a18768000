//! Episode number extraction from release titles.

use once_cell::sync::Lazy;
use regex_lite::{Captures, Regex};

/// Largest batch we expand into individual episodes.
const MAX_BATCH_SIZE: u32 = 500;

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("episode pattern is valid")
}

/// `[01-12]`, ` 01~12 `, `【01-12 Fin】`
static BATCH: Lazy<Regex> = Lazy::new(|| {
    pattern(r"(?:^|[\[【(\s])(\d{1,4})[-~～](\d{1,4})(?:\s?(?i:fin|end))?(?:[\]】)\s]|$)")
});

/// `第12話`, `第12话`, `第12集`
static NUMBERED: Lazy<Regex> = Lazy::new(|| pattern(r"第\s*(\d{1,4}(?:\.\d+)?)\s*[話话集]"));

/// `S01E07`
static SEASON_EPISODE: Lazy<Regex> =
    Lazy::new(|| pattern(r"(?i)S\d{1,2}\s?E(\d{1,4}(?:\.\d+)?)"));

/// `EP07`, `E07`
static EP_PREFIX: Lazy<Regex> = Lazy::new(|| pattern(r"(?i)\bEP?\s?(\d{1,4}(?:\.\d+)?)\b"));

/// `[07]`, `[07v2]`, `【07】`
static BRACKETED: Lazy<Regex> =
    Lazy::new(|| pattern(r"[\[【]\s*(\d{1,4}(?:\.\d+)?)(?:v\d+)?\s*(?i:end|fin)?\s*[\]】]"));

/// `Show - 07 [1080p]`
static DASHED: Lazy<Regex> =
    Lazy::new(|| pattern(r"\s-\s*(\d{1,4}(?:\.\d+)?)(?:v\d+)?(?:[\s\[(（]|$)"));

/// Extract the episode numbers a release title refers to.
///
/// Batches expand to every episode in the range. Returns an empty list when
/// the title carries no recognisable episode number.
pub fn parse_episodes(title: &str) -> Vec<f64> {
    if let Some(batch) = parse_batch(title) {
        return batch;
    }

    [&*NUMBERED, &*SEASON_EPISODE, &*EP_PREFIX, &*BRACKETED, &*DASHED]
        .into_iter()
        .find_map(|re| re.captures_iter(title).find_map(|caps| single_episode(&caps)))
        .map(|episode| vec![episode])
        .unwrap_or_default()
}

fn parse_batch(title: &str) -> Option<Vec<f64>> {
    BATCH.captures_iter(title).find_map(|caps| {
        let start: u32 = caps.get(1)?.as_str().parse().ok()?;
        let end: u32 = caps.get(2)?.as_str().parse().ok()?;
        if start >= end || end - start > MAX_BATCH_SIZE || is_year(end) {
            return None;
        }
        Some((start..=end).map(f64::from).collect())
    })
}

fn single_episode(caps: &Captures<'_>) -> Option<f64> {
    let raw = caps.get(1)?.as_str();
    let episode: f64 = raw.parse().ok()?;
    if raw.len() == 4 && is_year(episode as u32) {
        return None;
    }
    Some(episode)
}

fn is_year(value: u32) -> bool {
    (1900..2100).contains(&value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashed_episode() {
        assert_eq!(
            parse_episodes("[SubsPlease] Sousou no Frieren - 05 (1080p) [ABCD1234].mkv"),
            vec![5.0]
        );
    }

    #[test]
    fn test_dashed_episode_after_number_in_name() {
        assert_eq!(parse_episodes("Mob Psycho 100 - 05 [720p]"), vec![5.0]);
    }

    #[test]
    fn test_bracketed_episode() {
        assert_eq!(parse_episodes("【喵萌奶茶屋】[葬送的芙莉莲][05][1080p]"), vec![5.0]);
        assert_eq!(parse_episodes("[Group] Show [07v2][720p]"), vec![7.0]);
    }

    #[test]
    fn test_bracketed_year_is_skipped() {
        assert_eq!(parse_episodes("[Group] Show [2023][05][1080p]"), vec![5.0]);
    }

    #[test]
    fn test_numbered_episode() {
        assert_eq!(parse_episodes("葬送的芙莉莲 第12話 1080p"), vec![12.0]);
        assert_eq!(parse_episodes("某番 第3集"), vec![3.0]);
    }

    #[test]
    fn test_season_episode() {
        assert_eq!(parse_episodes("Show.S01E07.1080p.WEB"), vec![7.0]);
    }

    #[test]
    fn test_ep_prefix() {
        assert_eq!(parse_episodes("Show EP07 1080p"), vec![7.0]);
    }

    #[test]
    fn test_special_episode() {
        assert_eq!(parse_episodes("[Group] Show - 12.5 [720p]"), vec![12.5]);
    }

    #[test]
    fn test_batch_expands() {
        let expected: Vec<f64> = (1..=12).map(f64::from).collect();
        assert_eq!(parse_episodes("[Group] Show [01-12][1080p]"), expected);
        assert_eq!(parse_episodes("[Group] Show [01~12 Fin][1080p]"), expected);
    }

    #[test]
    fn test_dash_with_spaces_is_not_a_batch() {
        assert_eq!(parse_episodes("Show 2 - 05 [1080p]"), vec![5.0]);
    }

    #[test]
    fn test_resolution_is_not_an_episode() {
        assert!(parse_episodes("[Group] Show Movie [1080p][BDRip]").is_empty());
    }

    #[test]
    fn test_no_episode() {
        assert!(parse_episodes("Completely unrelated title").is_empty());
    }
}
