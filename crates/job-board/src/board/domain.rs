use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a registered identity (job seeker, employer, or staff).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentityId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub i64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub i64);

/// Role recorded on a profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    JobSeeker,
    Employer,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::JobSeeker, Role::Employer];

    pub const fn label(self) -> &'static str {
        match self {
            Role::JobSeeker => "job_seeker",
            Role::Employer => "employer",
        }
    }

    pub const fn display(self) -> &'static str {
        match self {
            Role::JobSeeker => "Job Seeker",
            Role::Employer => "Employer",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.label() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmploymentType {
    #[default]
    FullTime,
    PartTime,
    Contract,
    Internship,
    Freelance,
}

impl EmploymentType {
    pub const ALL: [EmploymentType; 5] = [
        EmploymentType::FullTime,
        EmploymentType::PartTime,
        EmploymentType::Contract,
        EmploymentType::Internship,
        EmploymentType::Freelance,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            EmploymentType::FullTime => "full_time",
            EmploymentType::PartTime => "part_time",
            EmploymentType::Contract => "contract",
            EmploymentType::Internship => "internship",
            EmploymentType::Freelance => "freelance",
        }
    }

    pub const fn display(self) -> &'static str {
        match self {
            EmploymentType::FullTime => "Full Time",
            EmploymentType::PartTime => "Part Time",
            EmploymentType::Contract => "Contract",
            EmploymentType::Internship => "Internship",
            EmploymentType::Freelance => "Freelance",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.label() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkMode {
    Remote,
    #[default]
    Onsite,
    Hybrid,
}

impl WorkMode {
    pub const ALL: [WorkMode; 3] = [WorkMode::Remote, WorkMode::Onsite, WorkMode::Hybrid];

    pub const fn label(self) -> &'static str {
        match self {
            WorkMode::Remote => "remote",
            WorkMode::Onsite => "onsite",
            WorkMode::Hybrid => "hybrid",
        }
    }

    pub const fn display(self) -> &'static str {
        match self {
            WorkMode::Remote => "Remote",
            WorkMode::Onsite => "Onsite",
            WorkMode::Hybrid => "Hybrid",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|mode| mode.label() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
    #[default]
    Entry,
    Junior,
    Mid,
    Senior,
    Lead,
}

impl ExperienceLevel {
    pub const ALL: [ExperienceLevel; 5] = [
        ExperienceLevel::Entry,
        ExperienceLevel::Junior,
        ExperienceLevel::Mid,
        ExperienceLevel::Senior,
        ExperienceLevel::Lead,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "entry",
            ExperienceLevel::Junior => "junior",
            ExperienceLevel::Mid => "mid",
            ExperienceLevel::Senior => "senior",
            ExperienceLevel::Lead => "lead",
        }
    }

    pub const fn display(self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "0-1 years",
            ExperienceLevel::Junior => "1-3 years",
            ExperienceLevel::Mid => "3-5 years",
            ExperienceLevel::Senior => "5-8 years",
            ExperienceLevel::Lead => "8+ years",
        }
    }

    /// Compact form used by the REST serializers.
    pub const fn short_display(self) -> &'static str {
        match self {
            ExperienceLevel::Entry => "0-1 Yrs",
            ExperienceLevel::Junior => "1-3 Yrs",
            ExperienceLevel::Mid => "3-5 Yrs",
            ExperienceLevel::Senior => "5-8 Yrs",
            ExperienceLevel::Lead => "8+ Yrs",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.label() == value)
    }
}

/// Lifecycle label of an application. Any status may follow any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Reviewed,
    Shortlisted,
    Rejected,
    Hired,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 5] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Reviewed,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Hired,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Reviewed => "reviewed",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Hired => "hired",
        }
    }

    pub const fn display(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "Pending",
            ApplicationStatus::Reviewed => "Reviewed",
            ApplicationStatus::Shortlisted => "Shortlisted",
            ApplicationStatus::Rejected => "Rejected",
            ApplicationStatus::Hired => "Hired",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.label() == value)
    }
}

/// Wire value and human label, as offered to choice widgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub value: &'static str,
    pub label: &'static str,
}

pub fn status_choices() -> Vec<Choice> {
    ApplicationStatus::ALL
        .into_iter()
        .map(|status| Choice {
            value: status.label(),
            label: status.display(),
        })
        .collect()
}

/// A registered account. The password hash never leaves the repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub id: IdentityId,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub is_staff: bool,
    pub created_at: DateTime<Utc>,
}

/// One-to-one extension of an identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Profile {
    pub identity_id: IdentityId,
    pub role: Role,
    pub phone: String,
    pub location: String,
    pub bio: String,
    pub company_name: String,
    pub website: String,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn is_employer(&self) -> bool {
        self.role == Role::Employer
    }

    pub fn is_job_seeker(&self) -> bool {
        self.role == Role::JobSeeker
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Company {
    pub id: CompanyId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub slug: String,
}

/// A posting, hydrated with its company and category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Job {
    pub id: JobId,
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub responsibilities: String,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_currency: String,
    pub location: String,
    pub employment_type: EmploymentType,
    pub work_mode: WorkMode,
    pub experience_level: ExperienceLevel,
    pub skills_required: String,
    pub company: Company,
    pub category: Option<Category>,
    pub posted_by: IdentityId,
    pub is_active: bool,
    pub application_deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Job {
    pub fn skills_list(&self) -> Vec<String> {
        parse_skills(&self.skills_required)
    }

    pub fn salary_range(&self) -> String {
        match (positive(self.salary_min), positive(self.salary_max)) {
            (Some(min), Some(max)) => format!(
                "{} {} - {}",
                self.salary_currency,
                format_thousands(min),
                format_thousands(max)
            ),
            (Some(min), None) => format!("{} {}+", self.salary_currency, format_thousands(min)),
            _ => "Salary not specified".to_string(),
        }
    }

    pub fn is_owned_by(&self, identity: IdentityId) -> bool {
        self.posted_by == identity
    }
}

/// Zero salaries are treated as "not provided".
pub(crate) fn positive(value: Option<i64>) -> Option<i64> {
    value.filter(|amount| *amount != 0)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Application {
    pub id: ApplicationId,
    pub job_id: JobId,
    pub job_title: String,
    pub company_name: String,
    pub job_owner: IdentityId,
    pub applicant: IdentityId,
    pub applicant_username: String,
    pub cover_letter: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedJob {
    pub user: IdentityId,
    pub job: Job,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Testimonial {
    pub id: i64,
    pub name: String,
    pub position: String,
    pub company: String,
    pub content: String,
    pub rating: u8,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Faq {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub order: i64,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Split a comma-joined skills column, trimming each entry.
pub fn parse_skills(raw: &str) -> Vec<String> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(',').map(|skill| skill.trim().to_string()).collect()
}

/// Lowercase, collapse every run of non-alphanumerics into a single `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_dash = false;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else {
            pending_dash = true;
        }
    }
    slug
}

pub fn format_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skills_are_split_and_trimmed() {
        assert_eq!(
            parse_skills("Rust, Tokio ,SQL"),
            vec!["Rust".to_string(), "Tokio".to_string(), "SQL".to_string()]
        );
        assert!(parse_skills("").is_empty());
        assert_eq!(parse_skills("Go,,Redis"), vec!["Go", "", "Redis"]);
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("Software Engineering"), "software-engineering");
        assert_eq!(slugify("  Data & ML  "), "data-ml");
        assert_eq!(slugify("DevOps"), "devops");
    }

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(950), "950");
        assert_eq!(format_thousands(120000), "120,000");
        assert_eq!(format_thousands(1234567), "1,234,567");
        assert_eq!(format_thousands(-4500), "-4,500");
    }

    #[test]
    fn enum_labels_round_trip_through_parse() {
        for status in ApplicationStatus::ALL {
            assert_eq!(ApplicationStatus::parse(status.label()), Some(status));
        }
        assert_eq!(EmploymentType::parse("part_time"), Some(EmploymentType::PartTime));
        assert_eq!(WorkMode::parse("Remote"), None);
        assert_eq!(ExperienceLevel::Lead.short_display(), "8+ Yrs");
        assert_eq!(Role::parse("employer"), Some(Role::Employer));
    }
}
