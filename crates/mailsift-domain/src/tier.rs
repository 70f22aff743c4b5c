//! Tier module - coarse presentation buckets for priority scores

/// Presentation bucket derived from a priority score
///
/// `tier = min(score / 20, 4)`. Only used for highlighting, never for ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PriorityTier {
    /// Scores 0-19
    Minimal,

    /// Scores 20-39
    Low,

    /// Scores 40-59
    Medium,

    /// Scores 60-79
    High,

    /// Scores 80-100
    Critical,
}

impl PriorityTier {
    /// Bucket a score
    pub fn from_score(score: u8) -> Self {
        match (score / 20).min(4) {
            0 => PriorityTier::Minimal,
            1 => PriorityTier::Low,
            2 => PriorityTier::Medium,
            3 => PriorityTier::High,
            _ => PriorityTier::Critical,
        }
    }

    /// Numeric level 0-4
    pub fn level(&self) -> u8 {
        match self {
            PriorityTier::Minimal => 0,
            PriorityTier::Low => 1,
            PriorityTier::Medium => 2,
            PriorityTier::High => 3,
            PriorityTier::Critical => 4,
        }
    }

    /// Get the tier name as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            PriorityTier::Minimal => "minimal",
            PriorityTier::Low => "low",
            PriorityTier::Medium => "medium",
            PriorityTier::High => "high",
            PriorityTier::Critical => "critical",
        }
    }

    /// Marker class applied to highlighted nodes of this tier
    pub fn class_name(&self) -> &'static str {
        match self {
            PriorityTier::Minimal => "mailsift-priority-0",
            PriorityTier::Low => "mailsift-priority-1",
            PriorityTier::Medium => "mailsift-priority-2",
            PriorityTier::High => "mailsift-priority-3",
            PriorityTier::Critical => "mailsift-priority-4",
        }
    }

    /// All tiers, lowest first
    pub fn all() -> [PriorityTier; 5] {
        [
            PriorityTier::Minimal,
            PriorityTier::Low,
            PriorityTier::Medium,
            PriorityTier::High,
            PriorityTier::Critical,
        ]
    }

    /// Parse a tier from its name or level
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "minimal" | "0" => Some(PriorityTier::Minimal),
            "low" | "1" => Some(PriorityTier::Low),
            "medium" | "2" => Some(PriorityTier::Medium),
            "high" | "3" => Some(PriorityTier::High),
            "critical" | "4" => Some(PriorityTier::Critical),
            _ => None,
        }
    }
}

impl std::str::FromStr for PriorityTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("Invalid tier: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_bucket_edges() {
        assert_eq!(PriorityTier::from_score(0), PriorityTier::Minimal);
        assert_eq!(PriorityTier::from_score(19), PriorityTier::Minimal);
        assert_eq!(PriorityTier::from_score(20), PriorityTier::Low);
        assert_eq!(PriorityTier::from_score(59), PriorityTier::Medium);
        assert_eq!(PriorityTier::from_score(79), PriorityTier::High);
        assert_eq!(PriorityTier::from_score(80), PriorityTier::Critical);
        assert_eq!(PriorityTier::from_score(100), PriorityTier::Critical);
    }

    #[test]
    fn test_parse_round_trip() {
        for tier in PriorityTier::all() {
            assert_eq!(tier.as_str().parse::<PriorityTier>(), Ok(tier));
            assert_eq!(PriorityTier::parse(&tier.level().to_string()), Some(tier));
        }
        assert!("severe".parse::<PriorityTier>().is_err());
    }

    #[test]
    fn test_class_names_match_levels() {
        for tier in PriorityTier::all() {
            assert!(tier.class_name().ends_with(&tier.level().to_string()));
        }
    }

    proptest! {
        #[test]
        fn prop_level_is_clamped_score_over_twenty(score in 0u8..=255) {
            let expected = (score / 20).min(4);
            prop_assert_eq!(PriorityTier::from_score(score).level(), expected);
        }
    }
}
