use chrono::{Duration, NaiveDate};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, info};

use crate::board::domain::{
    Category, Company, EmploymentType, ExperienceLevel, Identity, Role, WorkMode,
};
use crate::board::password::hash_password;
use crate::board::repository::{
    BoardRepository, JobDraft, NewFaq, NewIdentity, NewTestimonial, ProfileDetails,
};

use super::SetupError;

const CATEGORIES_CSV: &str = include_str!("../../data/categories.csv");
const TESTIMONIALS_CSV: &str = include_str!("../../data/testimonials.csv");
const FAQS_CSV: &str = include_str!("../../data/faqs.csv");

/// Shared password of every sample account.
pub const SAMPLE_PASSWORD: &str = "password123";

pub const SAMPLE_EMPLOYERS: usize = 5;
pub const SAMPLE_JOB_SEEKERS: usize = 10;
pub const SAMPLE_JOBS: usize = 50;

const COMPANIES: [&str; 20] = [
    "Google", "Microsoft", "Apple", "Amazon", "Meta", "Netflix", "Tesla", "Uber", "Airbnb",
    "Stripe", "Spotify", "Twitter", "LinkedIn", "Adobe", "Salesforce", "Oracle", "IBM", "Intel",
    "NVIDIA", "PayPal",
];

const JOB_TITLES: [&str; 15] = [
    "Senior Software Engineer",
    "Frontend Developer",
    "Backend Developer",
    "Full Stack Developer",
    "Data Scientist",
    "Product Manager",
    "UX Designer",
    "DevOps Engineer",
    "Mobile Developer",
    "Machine Learning Engineer",
    "Software Architect",
    "Technical Lead",
    "QA Engineer",
    "Site Reliability Engineer",
    "Security Engineer",
];

const SKILL_SETS: [&str; 10] = [
    "Python,Django,PostgreSQL",
    "JavaScript,React,Node.js",
    "Java,Spring,MySQL",
    "Python,Machine Learning,TensorFlow",
    "AWS,Docker,Kubernetes",
    "React,TypeScript,GraphQL",
    "Swift,iOS,Xcode",
    "Android,Kotlin,Java",
    "Go,Microservices,Redis",
    "C++,Algorithms,System Design",
];

const JOB_LOCATIONS: [&str; 8] = [
    "New York, NY",
    "San Francisco, CA",
    "Seattle, WA",
    "Austin, TX",
    "Boston, MA",
    "London, UK",
    "Berlin, Germany",
    "Toronto, Canada",
];

const SEEKER_LOCATIONS: [&str; 5] = ["New York", "San Francisco", "London", "Berlin", "Toronto"];

const EMPLOYMENT_TYPES: [EmploymentType; 3] = [
    EmploymentType::FullTime,
    EmploymentType::PartTime,
    EmploymentType::Contract,
];

const EXPERIENCE_LEVELS: [ExperienceLevel; 4] = [
    ExperienceLevel::Entry,
    ExperienceLevel::Junior,
    ExperienceLevel::Mid,
    ExperienceLevel::Senior,
];

#[derive(Debug, Deserialize)]
struct CategoryRow {
    name: String,
    slug: String,
}

#[derive(Debug, Deserialize)]
struct TestimonialRow {
    name: String,
    position: String,
    company: String,
    content: String,
    rating: u8,
}

#[derive(Debug, Deserialize)]
struct FaqRow {
    question: String,
    answer: String,
    order: i64,
}

/// Rows created by one seeding run. Rows that already existed are not counted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub companies_created: usize,
    pub categories_created: usize,
    pub employers_created: usize,
    pub job_seekers_created: usize,
    pub jobs_created: usize,
    pub testimonials_created: usize,
    pub faqs_created: usize,
}

fn read_rows<T: DeserializeOwned>(raw: &str) -> Result<Vec<T>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());
    reader.deserialize().collect()
}

/// Hash the sample password at most once per run.
fn sample_hash(cache: &mut Option<String>) -> Result<String, SetupError> {
    if let Some(hash) = cache {
        return Ok(hash.clone());
    }
    let hash = hash_password(SAMPLE_PASSWORD)?;
    *cache = Some(hash.clone());
    Ok(hash)
}

/// Populate companies, categories, sample accounts, postings, testimonials,
/// and FAQs. Existing rows are left alone, so running twice is harmless.
/// Postings are only created for employers created by this run.
pub fn seed_sample_data<R>(repository: &R, today: NaiveDate) -> Result<SeedReport, SetupError>
where
    R: BoardRepository,
{
    let mut report = SeedReport::default();
    let mut password_hash = None;

    let mut companies: Vec<Company> = Vec::with_capacity(COMPANIES.len());
    for name in COMPANIES {
        let (company, created) = repository.ensure_company(name)?;
        if created {
            debug!(company = name, "created company");
            report.companies_created += 1;
        }
        companies.push(company);
    }

    let mut categories: Vec<Category> = Vec::new();
    for row in read_rows::<CategoryRow>(CATEGORIES_CSV)? {
        let (category, created) = repository.ensure_category(&row.name, &row.slug)?;
        if created {
            debug!(category = %row.name, "created category");
            report.categories_created += 1;
        }
        categories.push(category);
    }

    let mut employers: Vec<Identity> = Vec::new();
    for index in 0..SAMPLE_EMPLOYERS {
        let username = format!("employer{}", index + 1);
        if repository.username_taken(&username)? {
            continue;
        }
        let identity = repository.create_identity(NewIdentity {
            email: format!("{username}@example.com"),
            first_name: "Employer".to_string(),
            last_name: (index + 1).to_string(),
            password_hash: sample_hash(&mut password_hash)?,
            is_staff: false,
            role: Role::Employer,
            profile: ProfileDetails {
                company_name: COMPANIES[(index * 7) % COMPANIES.len()].to_string(),
                ..ProfileDetails::default()
            },
            username,
        })?;
        debug!(username = %identity.username, "created employer");
        report.employers_created += 1;
        employers.push(identity);
    }

    for index in 0..SAMPLE_JOB_SEEKERS {
        let username = format!("jobseeker{}", index + 1);
        if repository.username_taken(&username)? {
            continue;
        }
        let identity = repository.create_identity(NewIdentity {
            email: format!("{username}@example.com"),
            first_name: "Job".to_string(),
            last_name: format!("Seeker{}", index + 1),
            password_hash: sample_hash(&mut password_hash)?,
            is_staff: false,
            role: Role::JobSeeker,
            profile: ProfileDetails {
                location: SEEKER_LOCATIONS[index % SEEKER_LOCATIONS.len()].to_string(),
                bio: "Experienced professional looking for new opportunities in tech.".to_string(),
                ..ProfileDetails::default()
            },
            username,
        })?;
        debug!(username = %identity.username, "created job seeker");
        report.job_seekers_created += 1;
    }

    if !employers.is_empty() && !categories.is_empty() {
        for index in 0..SAMPLE_JOBS {
            let employer = &employers[index % employers.len()];
            let company = &companies[(index * 3) % companies.len()];
            let draft = sample_job(index, company, &categories[index % categories.len()], today);
            repository.insert_job(employer.id, &draft)?;
            debug!(title = %draft.title, company = %company.name, "created job");
            report.jobs_created += 1;
        }
    }

    for row in read_rows::<TestimonialRow>(TESTIMONIALS_CSV)? {
        let created = repository.ensure_testimonial(&NewTestimonial {
            name: row.name,
            position: row.position,
            company: row.company,
            content: row.content,
            rating: row.rating,
        })?;
        if created {
            report.testimonials_created += 1;
        }
    }

    for row in read_rows::<FaqRow>(FAQS_CSV)? {
        let created = repository.ensure_faq(&NewFaq {
            question: row.question,
            answer: row.answer,
            order: row.order,
        })?;
        if created {
            report.faqs_created += 1;
        }
    }

    info!(
        companies = report.companies_created,
        categories = report.categories_created,
        employers = report.employers_created,
        job_seekers = report.job_seekers_created,
        jobs = report.jobs_created,
        testimonials = report.testimonials_created,
        faqs = report.faqs_created,
        "sample data populated"
    );
    Ok(report)
}

/// Deterministic posting number `index`; values cycle through the fixture
/// tables so every filter has something to match.
fn sample_job(index: usize, company: &Company, category: &Category, today: NaiveDate) -> JobDraft {
    let title = JOB_TITLES[index % JOB_TITLES.len()];
    let spread = index as i64;

    JobDraft {
        title: title.to_string(),
        description: format!(
            "We are looking for a talented {} to join our team at {}. You will be working on \
             cutting-edge projects and collaborating with a world-class team.",
            title.to_lowercase(),
            company.name
        ),
        requirements: "• 3+ years of experience in relevant technologies\n\
                       • Strong problem-solving skills\n\
                       • Experience with agile development\n\
                       • Excellent communication skills"
            .to_string(),
        responsibilities: "• Design and develop high-quality software solutions\n\
                           • Collaborate with cross-functional teams\n\
                           • Participate in code reviews and technical discussions\n\
                           • Mentor junior developers"
            .to_string(),
        salary_min: Some(80_000 + (spread * 7_919) % 40_001),
        salary_max: Some(120_000 + (spread * 104_729) % 80_001),
        salary_currency: "USD".to_string(),
        location: JOB_LOCATIONS[index % JOB_LOCATIONS.len()].to_string(),
        employment_type: EMPLOYMENT_TYPES[index % EMPLOYMENT_TYPES.len()],
        work_mode: WorkMode::ALL[(index / 3) % WorkMode::ALL.len()],
        experience_level: EXPERIENCE_LEVELS[index % EXPERIENCE_LEVELS.len()],
        skills_required: SKILL_SETS[index % SKILL_SETS.len()].to_string(),
        company_id: company.id,
        category_id: Some(category.id),
        application_deadline: Some(today + Duration::days(30 + (spread * 13) % 61)),
    }
}
