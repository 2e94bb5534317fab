//! Read models served by the course/student/teacher/grade endpoints.

use serde::{Deserialize, Serialize};

/// One page of a paged listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub total_pages: u32,
    pub content: Vec<T>,
}

pub type CourseListPage = Page<Course>;
pub type StudentListPage = Page<Student>;
pub type TeacherListPage = Page<Teacher>;
pub type GradeListPage = Page<CourseStudentGrades>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    pub name: String,
    pub school_year: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
    pub id: String,
    pub name: String,
    pub email: String,
}

/// Demographic record a student maintains about themselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInformation {
    pub id: String,
    pub sex: String,
    pub age: u32,
    pub address: String,
    pub family_size: String,
    pub parents_status: String,
    pub mother_education: i32,
    pub father_education: i32,
    pub mother_job: String,
    pub father_job: String,
    pub extra_curricular_activities: bool,
    pub romantic_relationship: bool,
    pub free_time: i32,
    pub go_out: i32,
    pub workday_alcohol: i32,
    pub weekend_alcohol: i32,
    pub health_status: i32,
}

/// Per-course study habits record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentCourseInformation {
    pub travel_time: i32,
    pub weekly_study_time: i32,
    pub failures: i32,
    pub extra_educational_support: bool,
    pub family_educational_support: bool,
    pub extra_paid_classes: bool,
    pub absences: i32,
}

/// Gradeable item within a course (exam, project, ...), weighted by
/// percentage of the final grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeItem {
    pub id: String,
    pub name: String,
    pub percentage: f64,
}

/// Composite key of a single grade entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentGradeId {
    pub student_id: String,
    pub grade_item_id: String,
    pub school_year: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentGrade {
    pub id: StudentGradeId,
    pub grade: f64,
}

/// All grades one student holds in a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseStudentGrades {
    pub student: Student,
    pub grades: Vec<StudentGrade>,
}

/// Predicted final grade for a student/course pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub prediction: f64,
}
