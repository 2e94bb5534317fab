//! `aula-models`: wire DTOs for the Aula academic management API.
//!
//! All request/response bodies are JSON with camelCase field names; these
//! types mirror the backend contract and carry no behavior.

pub mod auth;
pub mod catalog;

pub use auth::{AuthRequest, AuthResponse, RegisterRequest};
pub use catalog::{
    Course, CourseListPage, CourseStudentGrades, GradeItem, GradeListPage, Page, Prediction,
    Student, StudentCourseInformation, StudentGrade, StudentGradeId, StudentInformation,
    StudentListPage, Teacher, TeacherListPage,
};
