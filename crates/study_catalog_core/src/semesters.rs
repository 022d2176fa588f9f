//! crates/study_catalog_core/src/semesters.rs
//!
//! Static semester tables: which subjects are taught in which semester.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Term {
    Odd,
    Even,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SubjectInfo {
    pub code: &'static str,
    pub title: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterInfo {
    pub sem_no: u8,
    pub year: u8,
    pub term: Term,
    pub total_marks: Option<u32>,
    pub subjects: &'static [SubjectInfo],
}

const fn subject(code: &'static str, title: &'static str) -> SubjectInfo {
    SubjectInfo { code, title }
}

static SEMESTERS: [SemesterInfo; 8] = [
    SemesterInfo {
        sem_no: 1,
        year: 1,
        term: Term::Odd,
        total_marks: Some(675),
        subjects: &[
            subject("ENSH_101", "Engineering Mathematics I"),
            subject("ENCT_101", "Computer Programming"),
            subject("ENME_101", "Engineering Drawing"),
            subject("ENEX_101", "Fundamental of Electrical and Electronics Engineering"),
            subject("ENSH_102", "Engineering Physics"),
            subject("ENME_106", "Engineering Workshop"),
        ],
    },
    SemesterInfo {
        sem_no: 2,
        year: 1,
        term: Term::Even,
        total_marks: Some(800),
        subjects: &[
            subject("ENSH_151", "Engineering Mathematics II"),
            subject("ENCT_151", "Object Oriented Programming"),
            subject("ENEX_152", "Digital Logic"),
            subject("ENEX_151", "Electronic Device and Circuits"),
            subject("ENSH_153", "Engineering Chemistry"),
            subject("ENEE_154", "Electrical Circuits and Machines"),
        ],
    },
    SemesterInfo {
        sem_no: 3,
        year: 2,
        term: Term::Odd,
        total_marks: Some(775),
        subjects: &[
            subject("ENSH_201", "Engineering Mathematics III"),
            subject("ENSH_204", "Communication English"),
            subject("ENCT_201", "Computer Graphics and Visualization"),
            subject("ENCT_202", "Foundation of Data Science"),
            subject("ENCT_203", "Theory of Computation"),
            subject("ENEX_201", "Microprocessors"),
        ],
    },
    SemesterInfo {
        sem_no: 4,
        year: 2,
        term: Term::Even,
        total_marks: Some(800),
        subjects: &[
            subject("ENSH_252", "Numerical Methods"),
            subject("ENEX_252", "Instrumentation"),
            subject("ENEX_254", "Electromagnetics"),
            subject("ENCT_252", "Data Structure and Algorithm"),
            subject("ENCT_253", "Data Communication"),
            subject("ENCT_254", "Operating System"),
        ],
    },
    SemesterInfo {
        sem_no: 5,
        year: 3,
        term: Term::Odd,
        total_marks: Some(800),
        subjects: &[
            subject("ENSH_304", "Probability and Statistics"),
            subject("ENCT_301", "Database Management System"),
            subject("ENCT_302", "Web Application Programming"),
            subject("ENCT_303", "Computer Organization and Architecture"),
            subject("ENCT_304", "Computer Networks"),
            subject("ENCT_325-344", "Elective I"),
        ],
    },
    SemesterInfo {
        sem_no: 6,
        year: 3,
        term: Term::Even,
        total_marks: Some(675),
        subjects: &[
            subject("ENCE_356", "Engineering Economics"),
            subject("ENCT_351", "Artificial Intelligence"),
            subject("ENCT_352", "Software Engineering"),
            subject("ENCT_353", "Simulation and Modeling"),
            subject("ENCT_354", "Minor Project"),
            subject("ENCT_385-399", "Elective II"),
        ],
    },
    SemesterInfo {
        sem_no: 7,
        year: 4,
        term: Term::Odd,
        total_marks: Some(625),
        subjects: &[
            subject("ENEX_416", "Digital Signal Analysis and Processing"),
            subject("ENCT_411", "Distributed and Cloud Computing"),
            subject("ENCT_412", "ICT Project Management"),
            subject("ENEX_417", "Energy, Environment and Social Engineering"),
            subject("ENCT_435-444", "Elective III"),
            subject("ENCT_413", "Project I"),
        ],
    },
    SemesterInfo {
        sem_no: 8,
        year: 4,
        term: Term::Even,
        total_marks: Some(550),
        subjects: &[
            subject("ENCT_463", "Network and Cyber Security"),
            subject("ENCT_465-474", "Elective IV"),
            subject("ENCT_462", "Internship"),
            subject("ENCT_461", "Project II"),
        ],
    },
];

pub fn all() -> &'static [SemesterInfo] {
    &SEMESTERS
}

pub fn get(sem_no: u8) -> Option<&'static SemesterInfo> {
    SEMESTERS.iter().find(|s| s.sem_no == sem_no)
}

/// Looks a subject code up across every semester.
pub fn find_subject(code: &str) -> Option<(&'static SemesterInfo, &'static SubjectInfo)> {
    SEMESTERS.iter().find_map(|semester| {
        semester
            .subjects
            .iter()
            .find(|s| s.code == code)
            .map(|s| (semester, s))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use claims::{assert_none, assert_some};

    #[test]
    fn semesters_are_numbered_in_order() {
        let numbers: Vec<u8> = all().iter().map(|s| s.sem_no).collect();
        assert_eq!(numbers, (1..=8).collect::<Vec<u8>>());
        assert!(all().iter().all(|s| s.year == (s.sem_no + 1) / 2));
    }

    #[test]
    fn subject_codes_are_unique() {
        let mut codes: Vec<&str> = all()
            .iter()
            .flat_map(|s| s.subjects.iter().map(|subject| subject.code))
            .collect();
        let total = codes.len();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), total);
    }

    #[test]
    fn finds_subject_semester() {
        let (semester, subject) = assert_some!(find_subject("ENCT_202"));
        assert_eq!(semester.sem_no, 3);
        assert_eq!(subject.title, "Foundation of Data Science");
        assert_none!(find_subject("ENCT_999"));
        assert_none!(get(9));
    }
}
