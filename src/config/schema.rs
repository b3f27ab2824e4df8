use crate::rewrite::RewriteOptions;
use globset::Glob;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Contents of `vitestify.toml`. Every section is optional.
#[derive(Debug, Deserialize, Serialize, Default, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct VitestifyConfig {
    pub discovery: DiscoveryConfig,
    pub rewrite: RewriteOptions,
    pub workers: WorkerConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct DiscoveryConfig {
    /// Globs a root-relative path must match.
    pub include: Vec<String>,
    /// Globs that remove an otherwise included path.
    pub exclude: Vec<String>,
    /// Regexes on the root-relative path that skip a file.
    pub skip_patterns: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            include: vec!["**/*.ts".to_string(), "**/*.tsx".to_string()],
            exclude: vec![
                "**/*.d.ts".to_string(),
                "**/build/**".to_string(),
                "**/dist/**".to_string(),
            ],
            skip_patterns: Vec::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct WorkerConfig {
    pub min: usize,
    pub max: usize,
    /// Paths buffered between discovery and the workers.
    pub queue_depth: usize,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            min: 2,
            max: 16,
            queue_depth: 256,
        }
    }
}

impl WorkerConfig {
    /// Worker count for this machine, or `requested` when given. Always at
    /// least one.
    pub fn resolve(&self, requested: Option<usize>) -> usize {
        match requested {
            Some(count) => count.max(1),
            None => {
                let available = std::thread::available_parallelism()
                    .map(|n| n.get())
                    .unwrap_or(self.min);
                available.clamp(self.min, self.max.max(self.min)).max(1)
            }
        }
    }
}

impl VitestifyConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Vec::new();

        if self.discovery.include.is_empty() {
            issues.push(ValidationIssue::EmptyList {
                field: "discovery.include",
            });
        }

        for (field, patterns) in [
            ("discovery.include", &self.discovery.include),
            ("discovery.exclude", &self.discovery.exclude),
        ] {
            for pattern in patterns {
                if let Err(err) = Glob::new(pattern) {
                    issues.push(ValidationIssue::InvalidGlob {
                        field,
                        pattern: pattern.clone(),
                        message: err.kind().to_string(),
                    });
                }
            }
        }

        for pattern in &self.discovery.skip_patterns {
            if let Err(err) = Regex::new(pattern) {
                issues.push(ValidationIssue::InvalidRegex {
                    pattern: pattern.clone(),
                    message: err.to_string(),
                });
            }
        }

        if self.workers.min == 0 {
            issues.push(ValidationIssue::InvalidRange {
                field: "workers.min",
                message: "must be at least 1".to_string(),
            });
        }
        if self.workers.min > self.workers.max {
            issues.push(ValidationIssue::InvalidRange {
                field: "workers.max",
                message: format!(
                    "{} is smaller than workers.min ({})",
                    self.workers.max, self.workers.min
                ),
            });
        }
        if self.workers.queue_depth == 0 {
            issues.push(ValidationIssue::InvalidRange {
                field: "workers.queue_depth",
                message: "must be at least 1".to_string(),
            });
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues })
        }
    }
}

#[derive(Debug, Clone)]
pub struct ValidationError {
    pub issues: Vec<ValidationIssue>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, issue) in self.issues.iter().enumerate() {
            if idx > 0 {
                writeln!(f)?;
            }
            write!(f, "{issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    EmptyList {
        field: &'static str,
    },
    InvalidGlob {
        field: &'static str,
        pattern: String,
        message: String,
    },
    InvalidRegex {
        pattern: String,
        message: String,
    },
    InvalidRange {
        field: &'static str,
        message: String,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::EmptyList { field } => write!(f, "'{field}' must not be empty"),
            ValidationIssue::InvalidGlob {
                field,
                pattern,
                message,
            } => write!(f, "invalid glob '{pattern}' in '{field}': {message}"),
            ValidationIssue::InvalidRegex { pattern, message } => {
                write!(f, "invalid regex '{pattern}' in 'discovery.skip_patterns': {message}")
            }
            ValidationIssue::InvalidRange { field, message } => {
                write!(f, "'{field}' {message}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(VitestifyConfig::default().validate().is_ok());
    }

    #[test]
    fn collects_every_issue() {
        let mut config = VitestifyConfig::default();
        config.discovery.include.clear();
        config.discovery.exclude.push("src/[".to_string());
        config.discovery.skip_patterns.push("(unclosed".to_string());
        config.workers.min = 8;
        config.workers.max = 4;

        let err = config.validate().unwrap_err();
        assert_eq!(err.issues.len(), 4);
        assert!(err.issues.iter().any(|issue| matches!(
            issue,
            ValidationIssue::InvalidGlob { field: "discovery.exclude", .. }
        )));
        assert!(err
            .issues
            .iter()
            .any(|issue| matches!(issue, ValidationIssue::InvalidRegex { .. })));
    }

    #[test]
    fn worker_resolution() {
        let workers = WorkerConfig {
            min: 3,
            max: 3,
            queue_depth: 1,
        };
        assert_eq!(workers.resolve(None), 3);
        assert_eq!(workers.resolve(Some(7)), 7);
        assert_eq!(workers.resolve(Some(0)), 1);
    }
}
