//! Announcement classification for scraped episode details
//!
//! A season counts as announced once its first episode has a real title, or
//! when even a generic title comes with a release date that reads like a
//! concrete calendar date.

use seasonwatch_models::EpisodeInfo;

/// Marker IMDb uses for unnamed episode slots ("Episode #3.1")
const PLACEHOLDER_TITLE_MARKER: &str = "Episode #";

const MONTH_ABBREVIATIONS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

pub fn is_announced(info: &EpisodeInfo) -> bool {
    if info.title.is_empty() {
        return false;
    }

    !is_placeholder_title(&info.title) || has_specific_date(&info.release_date)
}

/// Case-sensitive check for the generic episode slot marker
pub fn is_placeholder_title(title: &str) -> bool {
    title.contains(PLACEHOLDER_TITLE_MARKER)
}

/// True when the rendered date names a month or contains a comma
/// ("Mar 4, 2025", "Tue, 2025"). A bare year or "TBA" is not specific.
pub fn has_specific_date(release_date: &str) -> bool {
    if release_date.is_empty() {
        return false;
    }

    let lowered = release_date.to_lowercase();
    if MONTH_ABBREVIATIONS.iter().any(|month| lowered.contains(month)) {
        return true;
    }

    lowered.contains(',')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(title: &str, release_date: &str) -> EpisodeInfo {
        EpisodeInfo::new(title, release_date)
    }

    #[test]
    fn test_classifier_truth_table() {
        assert!(!is_announced(&info("", "")));
        assert!(!is_announced(&info("Episode #3", "")));
        assert!(is_announced(&info("Episode #3", "March 4, 2025")));
        assert!(!is_announced(&info("Episode #3", "2025")));
        assert!(is_announced(&info("Pilot", "")));
        assert!(is_announced(&info("Pilot", "TBA")));
    }

    #[test]
    fn test_empty_title_is_never_announced() {
        assert!(!is_announced(&info("", "Mar 4, 2025")));
    }

    #[test]
    fn test_placeholder_marker_is_case_sensitive() {
        assert!(is_placeholder_title("S2.E1 ∙ Episode #2.1"));
        assert!(!is_placeholder_title("episode #2.1"));
        assert!(is_announced(&info("episode #2.1", "")));
    }

    #[test]
    fn test_has_specific_date() {
        assert!(!has_specific_date(""));
        assert!(!has_specific_date("2025"));
        assert!(!has_specific_date("TBA"));
        assert!(has_specific_date("Mar 2025"));
        assert!(has_specific_date("DEC 2025"));
        assert!(has_specific_date("Fri, 2025"));
        assert!(has_specific_date("1, 2"));
    }

    #[test]
    fn test_month_match_is_substring_based() {
        // "May" also matches inside words; the rule is literal substring matching
        assert!(has_specific_date("Mayday"));
        assert!(is_announced(&info("Episode #1.1", "Coming in Autumn, maybe")));
    }

    #[test]
    fn test_plot_flag_does_not_affect_classification() {
        let mut placeholder = info("Episode #1.1", "2026");
        placeholder.has_plot = true;
        assert!(!is_announced(&placeholder));
    }
}
