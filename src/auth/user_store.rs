//! User Storage
//! Mission: Securely store and manage mentor/mentee accounts with SQLite

use crate::auth::models::{User, UserRole};
use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::info;
use uuid::Uuid;

/// Fields supplied at signup, before hashing
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub branch: String,
    pub section: String,
    pub registration_number: String,
    pub role: UserRole,
}

/// User storage with SQLite backend.
///
/// One table with a role discriminant; emails are unique per role, so the
/// same address may hold both a mentor and a mentee account.
pub struct UserStore {
    db_path: String,
}

impl UserStore {
    /// Create a new user store and initialize database
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    /// Initialize database schema
    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                full_name TEXT NOT NULL,
                email TEXT NOT NULL,
                branch TEXT NOT NULL,
                section TEXT NOT NULL,
                registration_number TEXT NOT NULL,
                password_hash TEXT NOT NULL,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL,
                UNIQUE(email, role)
            )",
            [],
        )?;

        Ok(())
    }

    /// Create a new user with a bcrypt-hashed password
    pub fn create_user(&self, new_user: NewUser, password: &str) -> Result<User> {
        let password_hash = hash(password, DEFAULT_COST).context("Failed to hash password")?;

        let user = User {
            id: Uuid::new_v4(),
            full_name: new_user.full_name,
            email: new_user.email,
            branch: new_user.branch,
            section: new_user.section,
            registration_number: new_user.registration_number,
            password_hash,
            role: new_user.role,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO users (id, full_name, email, branch, section, registration_number,
                                password_hash, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                user.id.to_string(),
                user.full_name,
                user.email,
                user.branch,
                user.section,
                user.registration_number,
                user.password_hash,
                user.role.as_str(),
                user.created_at,
            ],
        )
        .context("Failed to insert user")?;

        info!("Created {}: {}", user.role.as_str(), user.email);

        Ok(user)
    }

    /// Get user by email within a role
    pub fn find_by_email(&self, email: &str, role: UserRole) -> Result<Option<User>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, full_name, email, branch, section, registration_number,
                    password_hash, role, created_at
             FROM users WHERE email = ?1 AND role = ?2",
        )?;

        let user_result = stmt.query_row(params![email, role.as_str()], user_from_row);

        match user_result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Look up a mentor by id
    pub fn find_mentor(&self, id: &Uuid) -> Result<Option<User>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, full_name, email, branch, section, registration_number,
                    password_hash, role, created_at
             FROM users WHERE id = ?1 AND role = 'mentor'",
        )?;

        let user_result = stmt.query_row(params![id.to_string()], user_from_row);

        match user_result {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// List all mentor records for the directory
    pub fn list_mentors(&self) -> Result<Vec<User>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, full_name, email, branch, section, registration_number,
                    password_hash, role, created_at
             FROM users WHERE role = 'mentor' ORDER BY full_name",
        )?;

        let mentors = stmt
            .query_map([], user_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(mentors)
    }

    /// Check credentials. Returns None for both an unknown email and a wrong
    /// password so the two failures are indistinguishable to callers.
    pub fn authenticate(
        &self,
        email: &str,
        role: UserRole,
        password: &str,
    ) -> Result<Option<User>> {
        let Some(user) = self.find_by_email(email, role)? else {
            return Ok(None);
        };

        let valid = verify(password, &user.password_hash).context("Failed to verify password")?;
        Ok(valid.then_some(user))
    }
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let id_str: String = row.get(0)?;
    let id = Uuid::parse_str(&id_str).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })?;

    let role_str: String = row.get(7)?;
    let role = UserRole::from_str(&role_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            7,
            rusqlite::types::Type::Text,
            format!("unknown role: {role_str}").into(),
        )
    })?;

    Ok(User {
        id,
        full_name: row.get(1)?,
        email: row.get(2)?,
        branch: row.get(3)?,
        section: row.get(4)?,
        registration_number: row.get(5)?,
        password_hash: row.get(6)?,
        role,
        created_at: row.get(8)?,
    })
}
