//! Organizational job-level hierarchy and requirement-range resolution.
//!
//! Levels form a fixed total order. A requirement such as "Worker - Team Leader"
//! expands to every level between the two endpoints, inclusive.

use std::collections::HashMap;
use std::fmt;
use std::sync::LazyLock;

/// A rank in the fixed seniority order, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum JobLevel {
    Worker,
    Staff,
    TeamLeader,
    SectionHead,
    AssistantDepartmentHead,
    DepartmentHead,
    AssistantPlantHead,
    PlantHead,
}

impl JobLevel {
    /// All levels in ascending order.
    pub const ALL: [JobLevel; 8] = [
        JobLevel::Worker,
        JobLevel::Staff,
        JobLevel::TeamLeader,
        JobLevel::SectionHead,
        JobLevel::AssistantDepartmentHead,
        JobLevel::DepartmentHead,
        JobLevel::AssistantPlantHead,
        JobLevel::PlantHead,
    ];

    /// Lower-case label, as the backend stores positions.
    pub fn label(self) -> &'static str {
        match self {
            JobLevel::Worker => "worker",
            JobLevel::Staff => "staff",
            JobLevel::TeamLeader => "team leader",
            JobLevel::SectionHead => "section head",
            JobLevel::AssistantDepartmentHead => "asisten departemen head",
            JobLevel::DepartmentHead => "departemen head",
            JobLevel::AssistantPlantHead => "asisten plant head",
            JobLevel::PlantHead => "plant head",
        }
    }

    /// Position in the hierarchy (0 = lowest).
    pub fn rank(self) -> usize {
        self as usize
    }

    /// Case-insensitive, whitespace-trimmed lookup by label.
    pub fn from_label(label: &str) -> Option<Self> {
        LEVEL_INDEX
            .get(label.trim().to_lowercase().as_str())
            .map(|&i| Self::ALL[i])
    }
}

impl fmt::Display for JobLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

static LEVEL_INDEX: LazyLock<HashMap<&'static str, usize>> = LazyLock::new(|| {
    JobLevel::ALL
        .iter()
        .enumerate()
        .map(|(i, level)| (level.label(), i))
        .collect()
});

/// Labels sent to the backend for an eligibility query. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequirement {
    labels: Vec<String>,
    range: bool,
}

impl ResolvedRequirement {
    /// Resolve a requirement expression.
    ///
    /// A "low - high" range with both endpoints known and low <= high yields the
    /// contiguous slice of levels. Anything else degrades to a single label holding
    /// the original text unchanged, which callers must match literally.
    pub fn resolve(requirement: &str) -> Self {
        let parts: Vec<String> = requirement
            .split('-')
            .map(|p| p.trim().to_lowercase())
            .collect();

        if parts.len() >= 2 {
            let start = LEVEL_INDEX.get(parts[0].as_str());
            let end = LEVEL_INDEX.get(parts[parts.len() - 1].as_str());
            if let (Some(&start), Some(&end)) = (start, end) {
                if start <= end {
                    return Self {
                        labels: JobLevel::ALL[start..=end]
                            .iter()
                            .map(|l| l.label().to_string())
                            .collect(),
                        range: true,
                    };
                }
            }
        }

        Self::literal(requirement)
    }

    fn literal(requirement: &str) -> Self {
        Self {
            labels: vec![requirement.to_string()],
            range: false,
        }
    }

    /// True when the expression expanded to a level range; false for the literal fallback.
    pub fn is_range(&self) -> bool {
        self.range
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn into_labels(self) -> Vec<String> {
        self.labels
    }

    /// Levels covered, empty for the literal fallback.
    pub fn levels(&self) -> Vec<JobLevel> {
        if !self.range {
            return Vec::new();
        }
        self.labels
            .iter()
            .filter_map(|l| JobLevel::from_label(l))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_range() {
        let r = ResolvedRequirement::resolve("Worker - Team Leader");
        assert!(r.is_range());
        assert_eq!(r.labels(), ["worker", "staff", "team leader"]);
        assert_eq!(
            r.levels(),
            vec![JobLevel::Worker, JobLevel::Staff, JobLevel::TeamLeader]
        );
    }

    #[test]
    fn test_resolve_every_valid_range_is_contiguous_slice() {
        for (i, low) in JobLevel::ALL.iter().enumerate() {
            for (j, high) in JobLevel::ALL.iter().enumerate().skip(i) {
                let expr = format!("  {} -{}", low.label().to_uppercase(), high.label());
                let r = ResolvedRequirement::resolve(&expr);
                let expected: Vec<&str> = JobLevel::ALL[i..=j].iter().map(|l| l.label()).collect();
                assert_eq!(r.labels(), expected.as_slice(), "expr {expr:?}");
            }
        }
    }

    #[test]
    fn test_resolve_single_level_range() {
        let r = ResolvedRequirement::resolve("Staff - staff");
        assert_eq!(r.labels(), ["staff"]);
        assert!(r.is_range());
    }

    #[test]
    fn test_resolve_unknown_keeps_original_text() {
        let r = ResolvedRequirement::resolve("Senior Engineer");
        assert!(!r.is_range());
        assert_eq!(r.labels(), ["Senior Engineer"]);
        assert!(r.levels().is_empty());
    }

    #[test]
    fn test_resolve_inverted_range_keeps_original_text() {
        let r = ResolvedRequirement::resolve("Plant Head - Worker");
        assert_eq!(r.labels(), ["Plant Head - Worker"]);
    }

    #[test]
    fn test_resolve_unknown_endpoint_keeps_original_text() {
        let r = ResolvedRequirement::resolve("Worker - Director");
        assert_eq!(r.labels(), ["Worker - Director"]);
    }

    #[test]
    fn test_resolve_single_known_level_is_literal() {
        // One segment is never expanded, even when it names a level.
        let r = ResolvedRequirement::resolve("Team Leader");
        assert!(!r.is_range());
        assert_eq!(r.labels(), ["Team Leader"]);
    }

    #[test]
    fn test_resolve_uses_first_and_last_segment() {
        let r = ResolvedRequirement::resolve("staff - anything - section head");
        assert_eq!(r.labels(), ["staff", "team leader", "section head"]);
    }

    #[test]
    fn test_resolve_empty_string() {
        let r = ResolvedRequirement::resolve("");
        assert_eq!(r.labels(), [""]);
    }

    #[test]
    fn test_from_label() {
        assert_eq!(
            JobLevel::from_label("  Asisten Plant Head "),
            Some(JobLevel::AssistantPlantHead)
        );
        assert_eq!(JobLevel::from_label("ceo"), None);
        assert!(JobLevel::Worker < JobLevel::PlantHead);
        assert_eq!(JobLevel::PlantHead.rank(), 7);
    }
}
