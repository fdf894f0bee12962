use std::sync::OnceLock;

use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand_core::{OsRng, RngCore};
use serde::Serialize;

const COMMON_PASSWORDS: &[&str] = &[
    "password", "123456", "12345678", "qwerty", "abc123", "monkey", "1234567", "letmein",
    "trustno1", "dragon", "baseball", "iloveyou", "master", "sunshine", "ashley", "bailey",
    "passw0rd", "shadow", "123123", "654321", "superman", "qazwsx", "michael", "football",
    "password1", "welcome", "jesus", "ninja",
];

const ASCENDING_RUNS: &str = "abcdefghijklmnopqrstuvwxyz";
const DIGIT_RUNS: &str = "0123456789";

/// Minimum requirements enforced at registration. Empty means acceptable.
pub fn validate_password(password: &str) -> Vec<String> {
    let mut problems = Vec::new();
    if password.chars().count() < 8 {
        problems.push("Password must be at least 8 characters long".to_string());
    }
    if !password.chars().any(|ch| ch.is_ascii_lowercase()) {
        problems.push("Password must contain at least one lowercase letter".to_string());
    }
    if !password.chars().any(|ch| ch.is_ascii_uppercase()) {
        problems.push("Password must contain at least one uppercase letter".to_string());
    }
    if !password.chars().any(|ch| ch.is_ascii_digit()) {
        problems.push("Password must contain at least one number".to_string());
    }
    if !password.chars().any(|ch| !ch.is_ascii_alphanumeric()) {
        problems.push("Password must contain at least one special character".to_string());
    }
    problems
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthLevel {
    None,
    Weak,
    Medium,
    Strong,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PasswordStrength {
    pub score: u8,
    pub strength: StrengthLevel,
    pub feedback: Vec<&'static str>,
}

/// Score a password out of 100 with actionable feedback.
pub fn password_strength(password: &str) -> PasswordStrength {
    if password.is_empty() {
        return PasswordStrength {
            score: 0,
            strength: StrengthLevel::None,
            feedback: Vec::new(),
        };
    }

    let mut score = 0u8;
    let mut feedback = Vec::new();
    let length = password.chars().count();

    if length >= 8 {
        score += 10;
    } else {
        feedback.push("Use at least 8 characters");
    }
    if length >= 12 {
        score += 10;
    }
    if length >= 16 {
        score += 10;
    }

    let checks: [(bool, &'static str); 4] = [
        (
            password.chars().any(|ch| ch.is_ascii_lowercase()),
            "Add lowercase letters",
        ),
        (
            password.chars().any(|ch| ch.is_ascii_uppercase()),
            "Add uppercase letters",
        ),
        (password.chars().any(|ch| ch.is_ascii_digit()), "Add numbers"),
        (
            password.chars().any(|ch| !ch.is_ascii_alphanumeric()),
            "Add special characters (!@#$%^&*)",
        ),
    ];
    for (passed, hint) in checks {
        if passed {
            score += 10;
        } else {
            feedback.push(hint);
        }
    }

    let lowered = password.to_lowercase();
    if has_ascending_run(&lowered) {
        feedback.push("Avoid sequential characters");
    } else {
        score += 10;
    }
    if has_repeated_run(password) {
        feedback.push("Avoid repeated characters");
    } else {
        score += 10;
    }
    if COMMON_PASSWORDS.iter().any(|common| lowered.contains(common)) {
        feedback.push("Avoid common passwords");
    } else {
        score += 10;
    }

    let strength = match score {
        0..=39 => StrengthLevel::Weak,
        40..=69 => StrengthLevel::Medium,
        _ => StrengthLevel::Strong,
    };

    PasswordStrength {
        score,
        strength,
        feedback,
    }
}

fn has_ascending_run(lowered: &str) -> bool {
    let chars: Vec<char> = lowered.chars().collect();
    chars.windows(3).any(|window| {
        let triple: String = window.iter().collect();
        ASCENDING_RUNS.contains(&triple) || DIGIT_RUNS.contains(&triple)
    })
}

fn has_repeated_run(password: &str) -> bool {
    let chars: Vec<char> = password.chars().collect();
    chars
        .windows(3)
        .any(|window| window[0] == window[1] && window[1] == window[2])
}

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

static DECOY_HASH: OnceLock<Option<String>> = OnceLock::new();

fn decoy_hash() -> Option<&'static str> {
    DECOY_HASH
        .get_or_init(|| hash_password("decoy#Unmatched0").ok())
        .as_deref()
}

/// Spend one argon2 verification on a login for an unknown username.
/// Unknown usernames and wrong passwords are rejected after the same work.
pub fn verify_unknown_user(password: &str) {
    if let Some(hash) = decoy_hash() {
        let _ = verify_password(password, hash);
    }
}

/// Opaque bearer token handed out at registration and login.
pub fn new_session_token() -> String {
    let mut buf = [0u8; 32];
    OsRng.fill_bytes(&mut buf);
    format!("tok_{}", URL_SAFE_NO_PAD.encode(buf))
}
