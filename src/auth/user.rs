//! Registered users and the `user` table.

use std::fmt::Display;

use rusqlite::{Connection, Row, ToSql};
use serde::{Deserialize, Serialize};

use crate::{
    Error,
    auth::{Email, PasswordHash},
};

/// The row ID of a user. Every owned record carries one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserID(i64);

impl UserID {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Display for UserID {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A user's display name, trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserName(String);

impl UserName {
    /// # Errors
    ///
    /// Returns an [Error::EmptyUserName] if `name` is empty or only whitespace.
    pub fn new(name: &str) -> Result<Self, Error> {
        match name.trim() {
            "" => Err(Error::EmptyUserName),
            name => Ok(Self(name.to_owned())),
        }
    }

    pub fn new_unchecked(name: &str) -> Self {
        Self(name.to_owned())
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for UserName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A registered user.
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: UserID,
    /// Shown on the profile page.
    pub name: UserName,
    /// What the user logs in with. Unique regardless of case.
    pub email: Email,
    pub password_hash: PasswordHash,
}

/// # Errors
///
/// Returns an error if the SQL query fails.
pub fn create_user_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS user (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE COLLATE NOCASE,
            password TEXT NOT NULL
        );",
    )
}

/// Store a new user.
///
/// # Errors
///
/// Returns an [Error::DuplicateEmail] if `email` is already registered in any
/// case, or an [Error::SqlError] for other database errors.
pub fn create_user(
    name: UserName,
    email: Email,
    password_hash: PasswordHash,
    connection: &Connection,
) -> Result<User, Error> {
    let id = connection
        .prepare("INSERT INTO user (name, email, password) VALUES (?1, ?2, ?3) RETURNING id")?
        .query_row(
            (name.as_ref(), email.as_ref(), password_hash.as_ref()),
            |row| row.get(0).map(UserID::new),
        )?;

    Ok(User {
        id,
        name,
        email,
        password_hash,
    })
}

fn get_user_where(
    condition: &str,
    value: &dyn ToSql,
    connection: &Connection,
) -> Result<User, Error> {
    connection
        .prepare(&format!(
            "SELECT id, name, email, password FROM user WHERE {condition}"
        ))?
        .query_row([value], map_row)
        .map_err(Error::from)
}

/// # Errors
///
/// Returns an [Error::NotFound] if no user has `user_id`.
pub fn get_user_by_id(user_id: UserID, connection: &Connection) -> Result<User, Error> {
    get_user_where("id = ?1", &user_id.as_i64(), connection)
}

/// The user registered with `email`, ignoring case.
///
/// # Errors
///
/// Returns an [Error::NotFound] if no user has registered with `email`.
pub fn get_user_by_email(email: &Email, connection: &Connection) -> Result<User, Error> {
    get_user_where("email = ?1", &email.as_ref(), connection)
}

fn map_row(row: &Row) -> Result<User, rusqlite::Error> {
    let name: String = row.get("name")?;
    let email: String = row.get("email")?;
    let password_hash: String = row.get("password")?;

    Ok(User {
        id: UserID::new(row.get("id")?),
        name: UserName::new_unchecked(&name),
        email: Email::new_unchecked(&email),
        password_hash: PasswordHash::new_unchecked(&password_hash),
    })
}
