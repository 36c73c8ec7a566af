//! Registration and login rules.

use std::collections::BTreeMap;

use chrono::Utc;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::User;
use crate::traits::{AuthProvider, Email, UserRepo};

pub const PASSWORD_MIN_CHARS: usize = 8;
const USERNAME_CHARS: std::ops::RangeInclusive<usize> = 3..=64;
const EMAIL_CHARS: std::ops::RangeInclusive<usize> = 4..=128;

/// The sign-up form as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

/// Per-field messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<&'static str, Vec<String>>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_default().push(message.into());
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error("registration rejected")]
    Rejected(FieldErrors),
    #[error(transparent)]
    App(#[from] AppError),
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// The username used when the form leaves it blank: the email's local part,
/// padded or cut to fit the username length limits.
fn username_from_email(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default();
    if local.chars().count() < *USERNAME_CHARS.start() {
        format!("user-{local}")
    } else {
        local.chars().take(*USERNAME_CHARS.end()).collect()
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && !domain.is_empty() && !domain.contains('@'),
        None => false,
    }
}

/// Checks the form without touching storage.
pub fn validate_registration(form: &Registration) -> FieldErrors {
    let mut errors = FieldErrors::default();
    let email = normalize_email(&form.email);

    if email.is_empty() {
        errors.add("email", "Cannot be blank");
    } else if !is_plausible_email(&email) || !EMAIL_CHARS.contains(&email.chars().count()) {
        errors.add("email", "Must be a valid email address");
    }

    let username = form.username.trim();
    if !username.is_empty() && !USERNAME_CHARS.contains(&username.chars().count()) {
        errors.add("username", "Must be between 3 and 64 characters");
    }

    if form.password.chars().count() < PASSWORD_MIN_CHARS {
        errors.add(
            "password",
            format!("Must contain at least {PASSWORD_MIN_CHARS} characters"),
        );
    }
    if form.password != form.confirm_password {
        errors.add("confirm_password", "Does not match password");
    }

    errors
}

/// Creates an account after validating the form and checking that the
/// email and username are free.
pub async fn register(
    users: &dyn UserRepo,
    auth: &dyn AuthProvider,
    form: Registration,
) -> std::result::Result<User, RegisterError> {
    let mut errors = validate_registration(&form);
    if !errors.is_empty() {
        return Err(RegisterError::Rejected(errors));
    }

    let email = normalize_email(&form.email);
    let username = match form.username.trim() {
        "" => username_from_email(&email),
        given => given.to_string(),
    };

    if users.find_user_by_email(&email).await?.is_some() {
        errors.add("email", "An account with this email already exists");
    }
    if users.find_user_by_username(&username).await?.is_some() {
        errors.add("username", "Username is already taken");
    }
    if !errors.is_empty() {
        return Err(RegisterError::Rejected(errors));
    }

    let now = Utc::now();
    let user = User {
        id: Uuid::now_v7(),
        username,
        email,
        password: auth.hash_password(&form.password)?,
        created_at: now,
        updated_at: now,
    };
    users.create_user(user.clone()).await?;
    tracing::info!(user_id = %user.id, username = %user.username, "user registered");

    Ok(user)
}

/// Resolves email + password to a user. Unknown emails and wrong passwords
/// are indistinguishable to the caller.
pub async fn authenticate(
    users: &dyn UserRepo,
    auth: &dyn AuthProvider,
    email: &str,
    password: &str,
) -> Result<User> {
    let rejected = || AppError::Unauthorized("Invalid email or password".into());

    let user = users
        .find_user_by_email(&normalize_email(email))
        .await?
        .ok_or_else(rejected)?;
    if !auth.verify_password(password, &user.password) {
        return Err(rejected());
    }
    Ok(user)
}

pub fn welcome_email(user: &User, app_name: &str, root_url: &str) -> Email {
    Email {
        to: user.email.clone(),
        subject: format!("Welcome to {app_name}"),
        text_body: format!(
            "Hi {},\n\nYour {app_name} account is ready. Report your first issue at {root_url}\n",
            user.username
        ),
    }
}
