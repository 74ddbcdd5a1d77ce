use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PerformanceLevel {
    #[serde(rename = "Outstanding")]
    Outstanding,
    #[serde(rename = "Very Satisfactory")]
    VerySatisfactory,
    #[serde(rename = "Satisfactory")]
    Satisfactory,
    #[serde(rename = "Fairly Satisfactory")]
    FairlySatisfactory,
    #[serde(rename = "Did Not Meet Expectations")]
    DidNotMeetExpectations,
    #[serde(rename = "N/A")]
    NotAvailable,
}

impl PerformanceLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            PerformanceLevel::Outstanding => "Outstanding",
            PerformanceLevel::VerySatisfactory => "Very Satisfactory",
            PerformanceLevel::Satisfactory => "Satisfactory",
            PerformanceLevel::FairlySatisfactory => "Fairly Satisfactory",
            PerformanceLevel::DidNotMeetExpectations => "Did Not Meet Expectations",
            PerformanceLevel::NotAvailable => "N/A",
        }
    }

    /// Display color used by the dashboard badges.
    pub fn color(&self) -> &'static str {
        match self {
            PerformanceLevel::Outstanding => "#10B981",
            PerformanceLevel::VerySatisfactory => "#3B82F6",
            PerformanceLevel::Satisfactory => "#8B5CF6",
            PerformanceLevel::FairlySatisfactory => "#F59E0B",
            PerformanceLevel::DidNotMeetExpectations => "#EF4444",
            PerformanceLevel::NotAvailable => "#9CA3AF",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubjectStanding {
    #[serde(rename = "Excelling")]
    Excelling,
    #[serde(rename = "Above Average")]
    AboveAverage,
    #[serde(rename = "Average")]
    Average,
    #[serde(rename = "At Risk")]
    AtRisk,
    #[serde(rename = "Critical")]
    Critical,
    #[serde(rename = "N/A")]
    NotAvailable,
}

impl SubjectStanding {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubjectStanding::Excelling => "Excelling",
            SubjectStanding::AboveAverage => "Above Average",
            SubjectStanding::Average => "Average",
            SubjectStanding::AtRisk => "At Risk",
            SubjectStanding::Critical => "Critical",
            SubjectStanding::NotAvailable => "N/A",
        }
    }
}

/// First matching band wins; a grade of 0 means no grade has been posted.
pub fn classify(current_grade: f64) -> (PerformanceLevel, SubjectStanding) {
    if current_grade >= 90.0 {
        (PerformanceLevel::Outstanding, SubjectStanding::Excelling)
    } else if current_grade >= 85.0 {
        (PerformanceLevel::VerySatisfactory, SubjectStanding::AboveAverage)
    } else if current_grade >= 80.0 {
        (PerformanceLevel::Satisfactory, SubjectStanding::Average)
    } else if current_grade >= 75.0 {
        (PerformanceLevel::FairlySatisfactory, SubjectStanding::AtRisk)
    } else if current_grade > 0.0 {
        (PerformanceLevel::DidNotMeetExpectations, SubjectStanding::Critical)
    } else {
        (PerformanceLevel::NotAvailable, SubjectStanding::NotAvailable)
    }
}
