//! Administrator bootstrap for the `create-admin` subcommand.
//!
//! Prompts for whatever was not passed on the command line.

use dialoguer::{Input, Password};
use rth_map_auth::AuthConfig;
use rth_map_database::{DbPool, admins};
use rth_map_database_models::{AdminRole, AdminRow, NewAdmin};
use thiserror::Error;

use crate::handlers::accounts::{
    MAX_USERNAME_LEN, MIN_PASSWORD_LEN, MIN_USERNAME_LEN, username_len_ok,
};

/// Errors from the `create-admin` flow.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),

    #[error(transparent)]
    Database(#[from] rth_map_database::DbError),

    #[error(transparent)]
    Auth(#[from] rth_map_auth::AuthError),

    #[error("{0}")]
    Validation(String),
}

/// Account details gathered from flags and prompts.
#[derive(Debug, Clone)]
pub struct AdminInput {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub role: AdminRole,
}

/// Fills in a missing username or password by prompting.
///
/// # Errors
///
/// Returns [`BootstrapError::Prompt`] if the terminal cannot be read.
pub fn prompt_missing(
    username: Option<String>,
    password: Option<String>,
    email: Option<String>,
    role: AdminRole,
) -> Result<AdminInput, BootstrapError> {
    println!("RTH Map administrator setup");
    println!();

    let username = match username {
        Some(username) => username,
        None => Input::<String>::new().with_prompt("Username").interact_text()?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords do not match")
            .interact()?,
    };

    Ok(AdminInput {
        username,
        password,
        email,
        role,
    })
}

/// Validates `input`, hashes the password, and stores the account.
///
/// # Errors
///
/// Returns [`BootstrapError::Validation`] for a username outside the
/// allowed length or a short password, and [`BootstrapError::Database`] if the username is taken.
pub fn create_admin(
    pool: &DbPool,
    auth: &AuthConfig,
    input: AdminInput,
) -> Result<AdminRow, BootstrapError> {
    let username = input.username.trim().to_string();

    if !username_len_ok(&username) {
        return Err(BootstrapError::Validation(format!(
            "Username must be {MIN_USERNAME_LEN} to {MAX_USERNAME_LEN} characters"
        )));
    }
    if input.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(BootstrapError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let password_hash = rth_map_auth::hash_password(&input.password, auth.bcrypt_cost)?;

    let mut conn = pool.acquire()?;
    Ok(admins::insert(
        &mut conn,
        NewAdmin {
            username,
            password_hash,
            email: input.email,
            role: input.role,
        },
    )?)
}

/// Enables or disables the account named `username`.
///
/// Disabled accounts cannot log in and their existing tokens stop
/// working.
///
/// # Errors
///
/// Returns [`BootstrapError::Validation`] if no such account exists.
pub fn set_admin_active(
    pool: &DbPool,
    username: &str,
    active: bool,
) -> Result<AdminRow, BootstrapError> {
    let conn = pool.acquire()?;
    let mut admin = admins::find_by_username(&conn, username)?.ok_or_else(|| {
        BootstrapError::Validation(format!("No administrator named '{}'", username.trim()))
    })?;

    admins::set_active(&conn, &admin.id, active)?;
    admin.is_active = active;

    log::info!(
        "{} account '{}'",
        if active { "Enabled" } else { "Disabled" },
        admin.username
    );
    Ok(admin)
}
