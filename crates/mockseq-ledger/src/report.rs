//! Human-readable summary of a sequence, produced by `verify`.

use std::fmt;

/// One declared step and whether it has been matched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepStatus {
    pub label: String,
    pub satisfied: bool,
}

/// Snapshot of a ledger: every declared step in declaration order.
///
/// Renders as:
///
/// ```text
/// Verification failed: Not all setups were matched:
/// - [OK]       'M(0)'
/// - [Expected] 'M(1)'
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VerificationReport {
    pub steps: Vec<StepStatus>,
}

impl VerificationReport {
    /// Build a report from the ledger's steps and cursor.
    pub fn from_steps(steps: &[String], cursor: usize) -> Self {
        Self {
            steps: steps
                .iter()
                .enumerate()
                .map(|(index, label)| StepStatus {
                    label: label.clone(),
                    satisfied: index < cursor,
                })
                .collect(),
        }
    }

    /// Returns `true` if every step was matched.
    pub fn is_complete(&self) -> bool {
        self.steps.iter().all(|s| s.satisfied)
    }

    /// Labels of the steps that are still pending.
    pub fn pending(&self) -> impl Iterator<Item = &str> {
        self.steps
            .iter()
            .filter(|s| !s.satisfied)
            .map(|s| s.label.as_str())
    }
}

impl fmt::Display for VerificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Verification failed: Not all setups were matched:")?;
        for step in &self.steps {
            let marker = if step.satisfied {
                "[OK]      "
            } else {
                "[Expected]"
            };
            writeln!(f, "- {marker} '{}'", step.label)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_ok_and_expected_lines_in_order() {
        let steps = vec!["M(0)".to_string(), "M(1)".to_string(), "M(2)".to_string()];
        let report = VerificationReport::from_steps(&steps, 1);

        assert_eq!(
            report.to_string(),
            "Verification failed: Not all setups were matched:\n\
             - [OK]       'M(0)'\n\
             - [Expected] 'M(1)'\n\
             - [Expected] 'M(2)'\n"
        );
    }

    #[test]
    fn pending_lists_unmatched_labels() {
        let steps = vec!["a".to_string(), "b".to_string()];
        let report = VerificationReport::from_steps(&steps, 1);
        assert!(!report.is_complete());
        assert_eq!(report.pending().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn empty_report_is_complete() {
        assert!(VerificationReport::from_steps(&[], 0).is_complete());
    }
}
