//! Database operations for categories.

use rusqlite::{Connection, Row};

use crate::{
    Error,
    category::{Category, CategoryName},
};

/// The categories every new database starts with.
pub const DEFAULT_CATEGORIES: [(&str, &str); 5] = [
    ("Food", "Groceries, restaurants and takeaways"),
    ("Transport", "Public transport, fuel and parking"),
    ("Entertainment", "Movies, games and going out"),
    ("Utilities", "Power, water, internet and phone"),
    ("Health", "Doctor visits, pharmacy and fitness"),
];

/// Create a category and return it with its generated ID.
///
/// # Errors
///
/// Returns an [Error::DuplicateCategoryName] if a category with the same name,
/// ignoring case, already exists.
pub fn insert_category(
    name: CategoryName,
    description: &str,
    connection: &Connection,
) -> Result<Category, Error> {
    let result = connection.execute(
        "INSERT INTO category (name, description) VALUES (?1, ?2);",
        (name.as_ref(), description.trim()),
    );

    match result {
        Ok(_) => {}
        // Code 2067 occurs when a UNIQUE constraint failed.
        Err(rusqlite::Error::SqliteFailure(sql_error, Some(ref desc)))
            if sql_error.extended_code == 2067 && desc.contains("category.name") =>
        {
            return Err(Error::DuplicateCategoryName(name.to_string()));
        }
        Err(error) => return Err(error.into()),
    }

    let id = connection.last_insert_rowid();

    Ok(Category {
        id,
        name,
        description: description.trim().to_owned(),
    })
}

/// Retrieve all categories ordered alphabetically by name.
pub fn get_all_categories(connection: &Connection) -> Result<Vec<Category>, Error> {
    connection
        .prepare("SELECT id, name, description FROM category ORDER BY name COLLATE NOCASE ASC;")?
        .query_map([], map_row)?
        .map(|maybe_category| maybe_category.map_err(|error| error.into()))
        .collect()
}

/// Insert [DEFAULT_CATEGORIES], skipping any that already exist.
pub fn seed_default_categories(connection: &Connection) -> Result<(), rusqlite::Error> {
    let mut statement =
        connection.prepare("INSERT OR IGNORE INTO category (name, description) VALUES (?1, ?2);")?;

    for (name, description) in DEFAULT_CATEGORIES {
        statement.execute((name, description))?;
    }

    Ok(())
}

/// Initialize the category table.
pub fn create_category_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS category (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL UNIQUE COLLATE NOCASE,
            description TEXT NOT NULL DEFAULT ''
        );",
        (),
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Category, rusqlite::Error> {
    let id = row.get(0)?;
    let raw_name: String = row.get(1)?;
    let description = row.get(2)?;

    Ok(Category {
        id,
        name: CategoryName::new_unchecked(&raw_name),
        description,
    })
}
