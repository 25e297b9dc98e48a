//! Grade-point scale and transcript statistics

use serde::{Deserialize, Serialize};

use super::GradeRecord;

/// Maps a 100-point score to its grade point on the 4.0 scale.
///
/// Thresholds follow the academic-affairs system's published table; a
/// failing score (below 60) earns no grade point.
pub fn grade_point_for(score: f64) -> f64 {
    match score {
        s if s >= 95.0 => 4.0,
        s if s >= 90.0 => 3.7,
        s if s >= 85.0 => 3.3,
        s if s >= 80.0 => 3.0,
        s if s >= 75.0 => 2.7,
        s if s >= 70.0 => 2.3,
        s if s >= 65.0 => 2.0,
        s if s >= 60.0 => 1.0,
        _ => 0.0,
    }
}

/// Aggregate transcript statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeStats {
    /// Number of examined courses
    pub total_courses: usize,
    /// Sum of credit values
    pub total_credits: f64,
    /// Credit-weighted grade-point average
    pub gpa: f64,
    /// Credit-weighted average score
    pub weighted_average: f64,
}

impl GradeStats {
    /// Computes credit-weighted GPA and average score over `records`.
    ///
    /// An empty transcript (or one whose credits sum to zero) yields
    /// zeroed statistics rather than a division error.
    pub fn compute(records: &[GradeRecord]) -> Self {
        let total_courses = records.len();
        let total_credits: f64 = records.iter().map(|r| r.credit).sum();

        if total_credits <= 0.0 {
            return Self {
                total_courses,
                total_credits: 0.0,
                gpa: 0.0,
                weighted_average: 0.0,
            };
        }

        let total_grade_points: f64 = records.iter().map(|r| r.credit * r.grade_point).sum();
        let total_weighted_score: f64 = records.iter().map(|r| r.credit * r.score).sum();

        Self {
            total_courses,
            total_credits,
            gpa: total_grade_points / total_credits,
            weighted_average: total_weighted_score / total_credits,
        }
    }
}
