//! Types for the survey registry.

/// Configuration for a [`SurveyRegistry`](super::SurveyRegistry).
#[derive(Debug, Clone)]
pub struct RegistryConfig {
    /// Maximum number of distinct surveys held. Registering a new id beyond
    /// this fails; nothing is ever dropped implicitly.
    pub capacity: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self { capacity: 1_000 }
    }
}

impl RegistryConfig {
    /// Creates a config with a custom capacity (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
        }
    }
}

/// Statistics about registry usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// Lookups that found a survey.
    pub hits: usize,
    /// Lookups that found nothing.
    pub misses: usize,
    /// Surveys inserted, including replacements.
    pub insertions: usize,
    /// Insertions that replaced a survey with the same id.
    pub replacements: usize,
    /// Insertions refused because the registry was full.
    pub rejections: usize,
}

impl RegistryStats {
    /// Returns the lookup hit rate as a percentage.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (self.hits as f64 / total as f64) * 100.0
        }
    }
}

impl std::fmt::Display for RegistryStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Survey Registry Statistics:")?;
        writeln!(f, "  Hits:            {}", self.hits)?;
        writeln!(f, "  Misses:          {}", self.misses)?;
        writeln!(f, "  Hit rate:        {:.1}%", self.hit_rate())?;
        writeln!(f, "  Insertions:      {}", self.insertions)?;
        writeln!(f, "  Replacements:    {}", self.replacements)?;
        writeln!(f, "  Rejections:      {}", self.rejections)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_stats() {
        let stats = RegistryStats {
            hits: 3,
            misses: 1,
            insertions: 2,
            replacements: 0,
            rejections: 1,
        };
        assert!((stats.hit_rate() - 75.0).abs() < 0.01);
        assert!(stats.to_string().contains("Hits:            3"));
        assert!(stats.to_string().contains("Rejections:      1"));
    }

    #[test]
    fn test_registry_stats_empty() {
        assert!((RegistryStats::default().hit_rate() - 0.0).abs() < 0.01);
    }

    #[test]
    fn test_capacity_floor() {
        assert_eq!(RegistryConfig::with_capacity(0).capacity, 1);
        assert_eq!(RegistryConfig::default().capacity, 1_000);
    }
}
