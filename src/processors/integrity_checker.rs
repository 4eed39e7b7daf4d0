use validator::Validate;

use crate::models::RawObservation;

/// Rows whose coordinates fall outside the globe. Reported only; the
/// transform itself never rejects a row for its bounds.
#[derive(Debug, Clone)]
pub struct CoordinateReport {
    pub total_records: usize,
    pub violations: Vec<CoordinateViolation>,
}

#[derive(Debug, Clone)]
pub struct CoordinateViolation {
    /// Zero-based data row, not counting the header
    pub row: usize,
    pub latitude: f64,
    pub longitude: f64,
    pub details: String,
}

pub struct IntegrityChecker;

impl IntegrityChecker {
    pub fn new() -> Self {
        Self
    }

    pub fn check_coordinates(&self, records: &[RawObservation]) -> CoordinateReport {
        let violations = records
            .iter()
            .enumerate()
            .filter_map(|(row, record)| {
                record.validate().err().map(|errors| CoordinateViolation {
                    row,
                    latitude: record.latitude,
                    longitude: record.longitude,
                    details: errors.to_string().replace('\n', "; "),
                })
            })
            .collect();

        CoordinateReport {
            total_records: records.len(),
            violations,
        }
    }

    pub fn generate_summary(&self, report: &CoordinateReport) -> String {
        let mut summary = String::new();

        summary.push_str("=== Coordinate Check Report ===\n");
        summary.push_str(&format!("Total Records: {}\n", report.total_records));
        summary.push_str(&format!(
            "Out of Bounds: {}\n",
            report.violations.len()
        ));

        if !report.violations.is_empty() {
            summary.push_str("\nTop 10 Violations:\n");
            for (i, violation) in report.violations.iter().take(10).enumerate() {
                summary.push_str(&format!(
                    "  {}. Row {} ({}, {}): {}\n",
                    i + 1,
                    violation.row,
                    violation.latitude,
                    violation.longitude,
                    violation.details
                ));
            }
        }

        summary
    }
}

impl Default for IntegrityChecker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::observation::fixtures::observation;

    #[test]
    fn test_out_of_bounds_rows_reported() {
        let records = vec![
            observation(34.5, -118.1, "T"),
            observation(91.2, -118.1, "T"),
            observation(10.0, 200.0, "A"),
        ];

        let checker = IntegrityChecker::new();
        let report = checker.check_coordinates(&records);

        assert_eq!(report.total_records, 3);
        let rows: Vec<usize> = report.violations.iter().map(|v| v.row).collect();
        assert_eq!(rows, vec![1, 2]);
        assert!(report.violations[0].details.contains("latitude"));

        let text = checker.generate_summary(&report);
        assert!(text.contains("Out of Bounds: 2"));
    }
}
