//! Database operations for rewards.

use rusqlite::{Connection, Row, params_from_iter, types::Value};

use crate::{
    Error,
    auth::UserID,
    reward::{NewReward, Reward, RewardSource},
    store::RewardQuery,
};

/// Record a reward and return it with its generated ID.
///
/// # Errors
///
/// Returns an [Error::DuplicateRewardSource] if the owner already has a
/// reward from the same source.
pub fn insert_reward(reward: NewReward, connection: &Connection) -> Result<Reward, Error> {
    connection.execute(
        "INSERT INTO reward (user_id, source_key, points, title, description, granted_date)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        (
            reward.owner.as_i64(),
            reward.source.as_ref().map(RewardSource::key),
            reward.points,
            &reward.title,
            &reward.description,
            reward.granted_date,
        ),
    )?;

    let id = connection.last_insert_rowid();

    Ok(reward.into_reward(id))
}

/// Query a user's rewards, most recent first.
pub fn query_rewards(query: &RewardQuery, connection: &Connection) -> Result<Vec<Reward>, Error> {
    let mut query_string = "SELECT id, user_id, source_key, points, title, description, granted_date
        FROM reward WHERE user_id = ?1"
        .to_owned();
    let mut query_parameters = vec![Value::Integer(query.owner.as_i64())];

    if let Some(source) = &query.source {
        query_string.push_str(" AND source_key = ?2");
        query_parameters.push(Value::Text(source.key()));
    }

    query_string.push_str(" ORDER BY granted_date DESC, id DESC");

    connection
        .prepare(&query_string)?
        .query_map(params_from_iter(query_parameters.iter()), map_row)?
        .map(|maybe_reward| maybe_reward.map_err(Error::from))
        .collect()
}

/// Initialize the reward table and the index that allows one reward per source.
pub fn create_reward_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS reward (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            source_key TEXT,
            points INTEGER NOT NULL,
            title TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL DEFAULT '',
            granted_date TEXT NOT NULL,
            FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
        );

        CREATE UNIQUE INDEX IF NOT EXISTS idx_reward_source ON reward(user_id, source_key);",
    )?;

    Ok(())
}

fn map_row(row: &Row) -> Result<Reward, rusqlite::Error> {
    let source_key: Option<String> = row.get(2)?;

    Ok(Reward {
        id: row.get(0)?,
        owner: UserID::new(row.get(1)?),
        source: source_key.as_deref().and_then(RewardSource::parse),
        points: row.get(3)?,
        title: row.get(4)?,
        description: row.get(5)?,
        granted_date: row.get(6)?,
    })
}
