use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    CategoryId, CompanyId, EmploymentType, ExperienceLevel, Role, WorkMode,
};
use super::password::validate_password;
use super::repository::{JobDraft, ProfileDetails};

const REQUIRED: &str = "This field is required.";

/// Field-keyed validation messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormErrors(BTreeMap<&'static str, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn fields(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.0.keys().copied()
    }

    pub fn into_result<T>(self, value: T) -> Result<T, FormErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields: Vec<&str> = self.fields().collect();
        write!(f, "invalid fields: {}", fields.join(", "))
    }
}

impl std::error::Error for FormErrors {}

fn required_text(
    errors: &mut FormErrors,
    field: &'static str,
    value: &str,
    max_len: Option<usize>,
) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.add(field, REQUIRED);
    } else {
        check_length(errors, field, trimmed, max_len);
    }
    trimmed.to_string()
}

fn optional_text(
    errors: &mut FormErrors,
    field: &'static str,
    value: &str,
    max_len: Option<usize>,
) -> String {
    let trimmed = value.trim();
    check_length(errors, field, trimmed, max_len);
    trimmed.to_string()
}

fn check_length(errors: &mut FormErrors, field: &'static str, value: &str, max: Option<usize>) {
    if let Some(max) = max {
        let length = value.chars().count();
        if length > max {
            errors.add(
                field,
                format!("Ensure this value has at most {max} characters (it has {length})."),
            );
        }
    }
}

fn choice<T: Default>(
    errors: &mut FormErrors,
    field: &'static str,
    raw: &str,
    parse: fn(&str) -> Option<T>,
) -> T {
    let raw = raw.trim();
    if raw.is_empty() {
        errors.add(field, REQUIRED);
        return T::default();
    }
    match parse(raw) {
        Some(value) => value,
        None => {
            errors.add(
                field,
                format!("Select a valid choice. {raw} is not one of the available choices."),
            );
            T::default()
        }
    }
}

/// Posting form shared by create and edit.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct JobForm {
    pub title: String,
    pub description: String,
    pub requirements: String,
    pub responsibilities: String,
    pub salary_min: Option<i64>,
    pub salary_max: Option<i64>,
    pub salary_currency: String,
    pub location: String,
    pub employment_type: String,
    pub work_mode: String,
    pub experience_level: String,
    pub skills_required: String,
    pub company: Option<i64>,
    pub category: Option<i64>,
    pub application_deadline: Option<String>,
}

impl JobForm {
    /// Field-level validation. Company and category existence is checked by
    /// the caller against storage.
    pub fn clean(&self) -> Result<JobDraft, FormErrors> {
        let mut errors = FormErrors::default();

        let title = required_text(&mut errors, "title", &self.title, Some(200));
        let description = required_text(&mut errors, "description", &self.description, None);
        let location = required_text(&mut errors, "location", &self.location, Some(120));
        let skills_required =
            optional_text(&mut errors, "skills_required", &self.skills_required, Some(500));

        let currency = self.salary_currency.trim();
        let salary_currency = if currency.is_empty() {
            "USD".to_string()
        } else {
            check_length(&mut errors, "salary_currency", currency, Some(10));
            currency.to_string()
        };

        let employment_type = choice(
            &mut errors,
            "employment_type",
            &self.employment_type,
            EmploymentType::parse,
        );
        let work_mode = choice(&mut errors, "work_mode", &self.work_mode, WorkMode::parse);
        let experience_level = choice(
            &mut errors,
            "experience_level",
            &self.experience_level,
            ExperienceLevel::parse,
        );

        let company_id = match self.company {
            Some(id) => CompanyId(id),
            None => {
                errors.add("company", REQUIRED);
                CompanyId(0)
            }
        };

        let application_deadline = match self.application_deadline.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(raw) => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.add("application_deadline", "Enter a valid date.");
                    None
                }
            },
        };

        errors.into_result(JobDraft {
            title,
            description,
            requirements: self.requirements.trim().to_string(),
            responsibilities: self.responsibilities.trim().to_string(),
            salary_min: self.salary_min,
            salary_max: self.salary_max,
            salary_currency,
            location,
            employment_type,
            work_mode,
            experience_level,
            skills_required,
            company_id,
            category_id: self.category.map(CategoryId),
            application_deadline,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ApplicationForm {
    pub cover_letter: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct StatusUpdateForm {
    pub status: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VisibilityForm {
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password1: String,
    pub password2: String,
    pub role: String,
}

/// Output of a valid registration form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub role: Role,
}

impl RegisterForm {
    pub fn clean(&self) -> Result<Registration, FormErrors> {
        let mut errors = FormErrors::default();

        let username = required_text(&mut errors, "username", &self.username, Some(150));
        if !username.is_empty()
            && !username
                .chars()
                .all(|ch| ch.is_alphanumeric() || "@.+-_".contains(ch))
        {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        let email = required_text(&mut errors, "email", &self.email, Some(254));
        if !email.is_empty() && !looks_like_email(&email) {
            errors.add("email", "Enter a valid email address.");
        }

        let first_name = required_text(&mut errors, "first_name", &self.first_name, Some(30));
        let last_name = required_text(&mut errors, "last_name", &self.last_name, Some(30));

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        } else {
            for problem in validate_password(&self.password1) {
                errors.add("password1", problem);
            }
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        } else if self.password1 != self.password2 {
            errors.add("password2", "The two password fields didn't match.");
        }

        let role = match Role::parse(self.role.trim()) {
            Some(role) => role,
            None if self.role.trim().is_empty() => {
                errors.add("role", REQUIRED);
                Role::default()
            }
            None => {
                errors.add(
                    "role",
                    format!(
                        "Select a valid choice. {} is not one of the available choices.",
                        self.role.trim()
                    ),
                );
                Role::default()
            }
        };

        errors.into_result(Registration {
            username,
            email,
            first_name,
            last_name,
            password: self.password1.clone(),
            role,
        })
    }
}

fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
        }
        None => false,
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ProfileForm {
    pub phone: String,
    pub location: String,
    pub bio: String,
    pub company_name: String,
    pub website: String,
}

impl ProfileForm {
    pub fn clean(&self) -> Result<ProfileDetails, FormErrors> {
        let mut errors = FormErrors::default();
        let phone = optional_text(&mut errors, "phone", &self.phone, Some(15));
        let location = optional_text(&mut errors, "location", &self.location, Some(100));
        let company_name =
            optional_text(&mut errors, "company_name", &self.company_name, Some(200));
        let website = optional_text(&mut errors, "website", &self.website, Some(200));
        if !website.is_empty()
            && !(website.starts_with("http://") || website.starts_with("https://"))
        {
            errors.add("website", "Enter a valid URL.");
        }

        errors.into_result(ProfileDetails {
            phone,
            location,
            bio: self.bio.trim().to_string(),
            company_name,
            website,
        })
    }
}
