use crate::ZoneCategory;

/// Keyword rules in precedence order. The first rule with a matching
/// keyword decides the category, so a description mentioning both an
/// extended blue zone and a handicapped spot counts as extended blue.
const RULES: &[(&[&str], ZoneCategory)] = &[
    (&["erweiterte blaue zone"], ZoneCategory::ExtendedBlue),
    (
        &["weiss (bewirtschaftet)", "weisse zone"],
        ZoneCategory::WhiteManaged,
    ),
    (&["invalidenparkplatz"], ZoneCategory::Handicapped),
];

/// Categorize a zone by its free-text description.
pub fn classify(raw_description: &str) -> ZoneCategory {
    let description = raw_description.to_lowercase();

    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| description.contains(k)))
        .map_or(ZoneCategory::Unclassified, |(_, category)| *category)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_each_keyword_case_insensitively() {
        assert_eq!(
            classify("Erweiterte Blaue Zone, max. 10 Std."),
            ZoneCategory::ExtendedBlue
        );
        assert_eq!(classify("Weiss (bewirtschaftet)"), ZoneCategory::WhiteManaged);
        assert_eq!(classify("weisse Zone mit Parkuhr"), ZoneCategory::WhiteManaged);
        assert_eq!(classify("INVALIDENPARKPLATZ"), ZoneCategory::Handicapped);
    }

    #[test]
    fn earlier_rule_wins_on_overlap() {
        assert_eq!(
            classify("Erweiterte blaue Zone, 1 Invalidenparkplatz"),
            ZoneCategory::ExtendedBlue
        );
        assert_eq!(
            classify("Invalidenparkplatz in weisser Zone: weiss (bewirtschaftet)"),
            ZoneCategory::WhiteManaged
        );
    }

    #[test]
    fn unknown_or_empty_is_unclassified() {
        assert_eq!(classify(""), ZoneCategory::Unclassified);
        assert_eq!(classify("Blaue Zone"), ZoneCategory::Unclassified);
        assert_eq!(classify("Motorradparkplatz"), ZoneCategory::Unclassified);
    }

    #[test]
    fn classification_is_stable() {
        let text = "weisse zone, Invalidenparkplatz";
        assert_eq!(classify(text), classify(text));
    }
}
