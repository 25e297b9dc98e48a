//! Core data models for the academic-affairs assistant
//!
//! This module contains the data types exchanged with the backing service
//! and cached locally: student profiles, class schedules, and grade
//! records.

pub mod grades;
pub mod profile;
pub mod schedule;

pub use grades::{grade_point_for, GradeStats};
pub use profile::ProfileStore;
pub use schedule::ScheduleStore;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A student's basic profile as reported by the academic-affairs system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    /// Student number
    pub student_id: String,
    /// Full name
    pub student_name: String,
    /// College / department
    pub college: String,
    /// Major name
    pub major: String,
    /// Administrative class name
    pub class_name: String,
}

/// When during the week a course meets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CourseTime {
    /// Weekday, Monday = 1 through Sunday = 7
    pub weekday: u32,
    /// Class periods occupied within the day (1-based)
    pub periods: Vec<u32>,
    /// Start time, `HH:MM`
    pub start_time: String,
    /// End time, `HH:MM`
    pub end_time: String,
}

/// A single course occurrence on the schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Stable identifier within one schedule payload
    pub id: String,
    /// Course name
    pub name: String,
    /// Teacher name, if reported
    pub teacher: Option<String>,
    /// Classroom / location, if reported
    pub location: Option<String>,
    /// Credit value, if reported
    pub credits: Option<f64>,
    /// Academic weeks (1-based) in which the course meets
    pub weeks: Vec<u32>,
    /// Meeting time within the week
    pub time: CourseTime,
}

/// A week's class schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassTable {
    /// The date the schedule was queried for
    pub date: NaiveDate,
    /// Monday-anchored week identifier of that date
    pub week_id: String,
    /// Courses meeting during the week
    pub courses: Vec<Course>,
}

/// One examined course on the transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeRecord {
    /// Course name
    pub course_name: String,
    /// Semester label, e.g. `2024-2025-1`
    pub semester: String,
    /// Credit value
    pub credit: f64,
    /// Final score on the 100-point scale
    pub score: f64,
    /// Grade point on the 4.0 scale
    pub grade_point: f64,
    /// Course category (compulsory/elective), if reported
    pub course_type: Option<String>,
}

#[cfg(test)]
pub(crate) fn sample_course(id: &str, weekday: u32) -> Course {
    Course {
        id: id.to_string(),
        name: "Data Structures".to_string(),
        teacher: Some("Prof. Li".to_string()),
        location: Some("JXL-204".to_string()),
        credits: Some(3.0),
        weeks: (1..=16).collect(),
        time: CourseTime {
            weekday,
            periods: vec![1, 2],
            start_time: "08:00".to_string(),
            end_time: "09:40".to_string(),
        },
    }
}
