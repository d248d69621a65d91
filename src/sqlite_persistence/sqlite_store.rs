use super::{Column, ForeignKey, SqlType, Table, VersionedSchema, BASE_DB_VERSION, DEFAULT_TIMESTAMP};
use crate::interaction::{AggregateCounts, InsertOutcome, InteractionStore, View};
use crate::music::{Music, MusicStore, NewMusic};
use crate::sqlite_column;
use crate::user::{AuthTokenValue, UserStore};
use anyhow::{bail, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

const USER_FOREIGN_KEY: ForeignKey = ForeignKey {
    foreign_table: "user",
    foreign_column: "id",
};

const MUSIC_FOREIGN_KEY: ForeignKey = ForeignKey {
    foreign_table: "music",
    foreign_column: "id",
};

/// V 0
const USER_TABLE_V_0: Table = Table {
    name: "user",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("handle", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_user_handle", "handle")],
    unique_constraints: &[],
};

const AUTH_TOKEN_TABLE_V_0: Table = Table {
    name: "auth_token",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FOREIGN_KEY)
        ),
        sqlite_column!("value", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_auth_token_value", "value")],
    unique_constraints: &[],
};

const MUSIC_TABLE_V_0: Table = Table {
    name: "music",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("album", &SqlType::Text, non_null = true),
        sqlite_column!("artist", &SqlType::Text, non_null = true),
        sqlite_column!("listen_link", &SqlType::Text),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_music_title", "title")],
    unique_constraints: &[],
};

/// V 1
const MENTION_TABLE_V_1: Table = Table {
    name: "mention",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FOREIGN_KEY)
        ),
        sqlite_column!(
            "music_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&MUSIC_FOREIGN_KEY)
        ),
        sqlite_column!(
            "mentioned",
            &SqlType::Integer,
            non_null = true,
            check = Some("mentioned IN (0, 1)")
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_mention_music_id", "music_id")],
    unique_constraints: &[&["user_id", "music_id"]],
};

const RATING_TABLE_V_1: Table = Table {
    name: "rating",
    columns: &[
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&USER_FOREIGN_KEY)
        ),
        sqlite_column!(
            "music_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&MUSIC_FOREIGN_KEY)
        ),
        sqlite_column!(
            "rating",
            &SqlType::Integer,
            non_null = true,
            check = Some("rating BETWEEN 1 AND 10")
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
        sqlite_column!("updated", &SqlType::Integer),
    ],
    indices: &[("idx_rating_music_id", "music_id")],
    unique_constraints: &[&["user_id", "music_id"]],
};

/// V 2
const LISTEN_CLICK_TABLE_V_2: Table = Table {
    name: "listen_click",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!(
            "user_id",
            &SqlType::Integer,
            foreign_key = Some(&USER_FOREIGN_KEY)
        ),
        sqlite_column!(
            "music_id",
            &SqlType::Integer,
            non_null = true,
            foreign_key = Some(&MUSIC_FOREIGN_KEY)
        ),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_listen_click_music_id", "music_id")],
    unique_constraints: &[],
};

pub const VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 0,
        tables: &[USER_TABLE_V_0, AUTH_TOKEN_TABLE_V_0, MUSIC_TABLE_V_0],
        migration: None,
    },
    VersionedSchema {
        version: 1,
        tables: &[
            USER_TABLE_V_0,
            AUTH_TOKEN_TABLE_V_0,
            MUSIC_TABLE_V_0,
            MENTION_TABLE_V_1,
            RATING_TABLE_V_1,
        ],
        migration: Some(|conn: &Connection| {
            MENTION_TABLE_V_1.create(conn)?;
            RATING_TABLE_V_1.create(conn)?;
            Ok(())
        }),
    },
    VersionedSchema {
        version: 2,
        tables: &[
            USER_TABLE_V_0,
            AUTH_TOKEN_TABLE_V_0,
            MUSIC_TABLE_V_0,
            MENTION_TABLE_V_1,
            RATING_TABLE_V_1,
            LISTEN_CLICK_TABLE_V_2,
        ],
        migration: Some(|conn: &Connection| {
            LISTEN_CLICK_TABLE_V_2.create(conn)?;
            Ok(())
        }),
    },
];

/// Catalog, interactions and identities in one sqlite file.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    pub fn new<T: AsRef<Path>>(db_path: T) -> Result<Self> {
        let db_path = db_path.as_ref();
        let conn = if db_path.exists() {
            Connection::open_with_flags(
                db_path,
                rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                    | rusqlite::OpenFlags::SQLITE_OPEN_URI
                    | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
            )
            .with_context(|| format!("Failed to open database {:?}", db_path))?
        } else {
            info!("Creating new database at {:?}", db_path);
            let conn = Connection::open(db_path)
                .with_context(|| format!("Failed to create database {:?}", db_path))?;
            VERSIONED_SCHEMAS
                .last()
                .context("No schema declared")?
                .create(&conn)?;
            conn
        };
        conn.execute("PRAGMA foreign_keys = ON;", [])?;

        let db_version = conn
            .query_row("PRAGMA user_version;", [], |row| row.get::<usize, i64>(0))
            .context("Failed to read database version")?
            - BASE_DB_VERSION as i64;

        if db_version < 0 {
            bail!(
                "Database version {} is too old, does not contain base db version {}",
                db_version,
                BASE_DB_VERSION
            );
        }
        let version = db_version as usize;
        if version >= VERSIONED_SCHEMAS.len() {
            bail!("Database version {} is too new", version);
        }
        VERSIONED_SCHEMAS[version].validate(&conn)?;

        Self::migrate_if_needed(&conn, version)?;

        Ok(SqliteStore {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn migrate_if_needed(conn: &Connection, version: usize) -> Result<()> {
        let mut latest_from = version;
        for schema in VERSIONED_SCHEMAS.iter().skip(version + 1) {
            if let Some(migration_fn) = schema.migration {
                info!(
                    "Migrating db from version {} to {}",
                    latest_from, schema.version
                );
                migration_fn(conn)?;
                latest_from = schema.version;
            }
        }
        conn.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + latest_from),
            [],
        )?;
        Ok(())
    }

    fn count(conn: &Connection, sql: &str, music_id: usize) -> Result<u64> {
        let count = conn
            .query_row(sql, params![music_id as i64], |row| row.get::<_, i64>(0))
            .with_context(|| format!("Failed to count for music {}", music_id))?;
        Ok(count as u64)
    }

    fn read_aggregate_counts(conn: &Connection, music_id: usize) -> Result<AggregateCounts> {
        Ok(AggregateCounts {
            not_heard_before_count: Self::count(conn, COUNT_NOT_HEARD_BEFORE_SQL, music_id)?,
            heard_not_rated_count: Self::count(conn, COUNT_HEARD_NOT_RATED_SQL, music_id)?,
            rating_count: Self::count(conn, COUNT_RATINGS_SQL, music_id)?,
            rating_sum_total: Self::count(conn, SUM_RATINGS_SQL, music_id)?,
        })
    }
}

const COUNT_NOT_HEARD_BEFORE_SQL: &str =
    "SELECT COUNT(*) FROM mention WHERE music_id = ?1 AND mentioned = 0";
const COUNT_HEARD_NOT_RATED_SQL: &str = "SELECT COUNT(*) FROM mention m \
     WHERE m.music_id = ?1 AND m.mentioned = 1 AND NOT EXISTS \
     (SELECT 1 FROM rating r WHERE r.user_id = m.user_id AND r.music_id = m.music_id)";
const COUNT_RATINGS_SQL: &str = "SELECT COUNT(*) FROM rating WHERE music_id = ?1";
const SUM_RATINGS_SQL: &str = "SELECT COALESCE(SUM(rating), 0) FROM rating WHERE music_id = ?1";

const COUNT_LISTEN_CLICKS_SQL: &str = "SELECT COUNT(*) FROM listen_click WHERE music_id = ?1";

const MUSIC_COLUMNS: &str = "id, title, album, artist, listen_link";

fn music_from_row(row: &Row) -> rusqlite::Result<Music> {
    Ok(Music {
        id: row.get::<_, i64>(0)? as usize,
        title: row.get(1)?,
        album: row.get(2)?,
        artist: row.get(3)?,
        listen_link: row.get(4)?,
    })
}

impl MusicStore for SqliteStore {
    fn list_all_music(&self) -> Result<Vec<Music>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM {} ORDER BY id",
            MUSIC_COLUMNS, MUSIC_TABLE_V_0.name
        ))?;
        let music = stmt
            .query_map([], music_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(music)
    }

    fn get_music(&self, music_id: usize) -> Result<Option<Music>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            &format!(
                "SELECT {} FROM {} WHERE id = ?1",
                MUSIC_COLUMNS, MUSIC_TABLE_V_0.name
            ),
            params![music_id as i64],
            music_from_row,
        )
        .optional()
        .with_context(|| format!("Failed to get music {}", music_id))
    }

    fn get_music_by_title(&self, title: &str) -> Result<Option<Music>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            &format!(
                "SELECT {} FROM {} WHERE title = ?1 COLLATE NOCASE ORDER BY id LIMIT 1",
                MUSIC_COLUMNS, MUSIC_TABLE_V_0.name
            ),
            params![title],
            music_from_row,
        )
        .optional()
        .with_context(|| format!("Failed to get music titled {}", title))
    }

    fn music_exists(&self, title: &str, artist: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            &format!(
                "SELECT COUNT(*) FROM {} WHERE title = ?1 COLLATE NOCASE AND artist = ?2 COLLATE NOCASE",
                MUSIC_TABLE_V_0.name
            ),
            params![title, artist],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn add_music(&self, music: NewMusic) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (title, album, artist, listen_link) VALUES (?1, ?2, ?3, ?4)",
                MUSIC_TABLE_V_0.name
            ),
            params![music.title, music.album, music.artist, music.listen_link],
        )
        .with_context(|| format!("Failed to add music {}", music.title))?;
        Ok(conn.last_insert_rowid() as usize)
    }
}

impl InteractionStore for SqliteStore {
    fn count_not_heard_before(&self, music_id: usize) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        Self::count(&conn, COUNT_NOT_HEARD_BEFORE_SQL, music_id)
    }

    fn count_heard_not_rated(&self, music_id: usize) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        Self::count(&conn, COUNT_HEARD_NOT_RATED_SQL, music_id)
    }

    fn count_ratings(&self, music_id: usize) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        Self::count(&conn, COUNT_RATINGS_SQL, music_id)
    }

    fn sum_ratings(&self, music_id: usize) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        Self::count(&conn, SUM_RATINGS_SQL, music_id)
    }

    /// The four reads share one lock acquisition, so they see the same data.
    fn aggregate_counts(&self, music_id: usize) -> Result<AggregateCounts> {
        let conn = self.conn.lock().unwrap();
        Self::read_aggregate_counts(&conn, music_id)
    }

    fn get_mention(&self, user_id: usize, music_id: usize) -> Result<Option<bool>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            &format!(
                "SELECT mentioned FROM {} WHERE user_id = ?1 AND music_id = ?2",
                MENTION_TABLE_V_1.name
            ),
            params![user_id as i64, music_id as i64],
            |row| row.get::<_, bool>(0),
        )
        .optional()
        .with_context(|| format!("Failed to get mention of user {}", user_id))
    }

    fn insert_mention(
        &self,
        user_id: usize,
        music_id: usize,
        mentioned: bool,
    ) -> Result<InsertOutcome> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn
            .execute(
                &format!(
                    "INSERT INTO {} (user_id, music_id, mentioned) VALUES (?1, ?2, ?3) \
                     ON CONFLICT (user_id, music_id) DO NOTHING",
                    MENTION_TABLE_V_1.name
                ),
                params![user_id as i64, music_id as i64, mentioned],
            )
            .with_context(|| {
                format!(
                    "Failed to insert mention of user {} for music {}",
                    user_id, music_id
                )
            })?;
        Ok(if inserted == 0 {
            InsertOutcome::Conflict
        } else {
            InsertOutcome::Inserted
        })
    }

    fn get_rating(&self, user_id: usize, music_id: usize) -> Result<Option<u8>> {
        let conn = self.conn.lock().unwrap();
        let rating = conn
            .query_row(
                &format!(
                    "SELECT rating FROM {} WHERE user_id = ?1 AND music_id = ?2",
                    RATING_TABLE_V_1.name
                ),
                params![user_id as i64, music_id as i64],
                |row| row.get::<_, i64>(0),
            )
            .optional()
            .with_context(|| format!("Failed to get rating of user {}", user_id))?;
        Ok(rating.map(|r| r as u8))
    }

    fn insert_rating(&self, user_id: usize, music_id: usize, rating: u8) -> Result<InsertOutcome> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn
            .execute(
                &format!(
                    "INSERT INTO {} (user_id, music_id, rating) VALUES (?1, ?2, ?3) \
                     ON CONFLICT (user_id, music_id) DO NOTHING",
                    RATING_TABLE_V_1.name
                ),
                params![user_id as i64, music_id as i64, rating as i64],
            )
            .with_context(|| {
                format!(
                    "Failed to insert rating of user {} for music {}",
                    user_id, music_id
                )
            })?;
        Ok(if inserted == 0 {
            InsertOutcome::Conflict
        } else {
            InsertOutcome::Inserted
        })
    }

    fn update_rating(&self, user_id: usize, music_id: usize, rating: u8) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        let updated = conn.execute(
            &format!(
                "UPDATE {} SET rating = ?3, updated = {} WHERE user_id = ?1 AND music_id = ?2",
                RATING_TABLE_V_1.name, DEFAULT_TIMESTAMP
            ),
            params![user_id as i64, music_id as i64, rating as i64],
        )?;
        if updated == 0 {
            bail!(
                "No rating of user {} for music {} to update",
                user_id,
                music_id
            );
        }
        Ok(())
    }

    fn list_music_by_view(&self, user_id: usize, view: View) -> Result<Vec<usize>> {
        let sql = match view {
            View::All => "SELECT id FROM music ORDER BY id",
            View::NotRated => {
                "SELECT id FROM music WHERE id NOT IN \
                 (SELECT music_id FROM rating WHERE user_id = ?1) ORDER BY id"
            }
            View::NotMentioned => {
                "SELECT id FROM music WHERE id NOT IN \
                 (SELECT music_id FROM mention WHERE user_id = ?1) ORDER BY id"
            }
            View::NotHeardBefore => {
                "SELECT music_id FROM mention WHERE user_id = ?1 AND mentioned = 0 \
                 ORDER BY music_id"
            }
        };
        debug!("Listing music for user {} in view {:?}", user_id, view);

        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(sql)?;
        let ids = if view == View::All {
            stmt.query_map([], |row| row.get::<_, i64>(0))?
                .collect::<Result<Vec<_>, _>>()?
        } else {
            stmt.query_map(params![user_id as i64], |row| row.get::<_, i64>(0))?
                .collect::<Result<Vec<_>, _>>()?
        };
        Ok(ids.into_iter().map(|id| id as usize).collect())
    }

    fn record_listen_click(&self, user_id: Option<usize>, music_id: usize) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (user_id, music_id) VALUES (?1, ?2)",
                LISTEN_CLICK_TABLE_V_2.name
            ),
            params![user_id.map(|id| id as i64), music_id as i64],
        )
        .with_context(|| format!("Failed to record listen click for music {}", music_id))?;
        Ok(())
    }

    fn count_listen_clicks(&self, music_id: usize) -> Result<u64> {
        let conn = self.conn.lock().unwrap();
        Self::count(&conn, COUNT_LISTEN_CLICKS_SQL, music_id)
    }
}

impl UserStore for SqliteStore {
    fn create_user(&self, user_handle: &str) -> Result<usize> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!("INSERT INTO {} (handle) VALUES (?1)", USER_TABLE_V_0.name),
            params![user_handle],
        )
        .with_context(|| format!("Failed to create user {}", user_handle))?;
        Ok(conn.last_insert_rowid() as usize)
    }

    fn get_user_id(&self, user_handle: &str) -> Result<Option<usize>> {
        let conn = self.conn.lock().unwrap();
        let id = conn
            .query_row(
                &format!("SELECT id FROM {} WHERE handle = ?1", USER_TABLE_V_0.name),
                params![user_handle],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id.map(|id| id as usize))
    }

    fn add_auth_token(&self, user_id: usize, token: &AuthTokenValue) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            &format!(
                "INSERT INTO {} (user_id, value) VALUES (?1, ?2)",
                AUTH_TOKEN_TABLE_V_0.name
            ),
            params![user_id as i64, token.0],
        )
        .with_context(|| format!("Failed to add auth token for user {}", user_id))?;
        Ok(())
    }

    fn get_user_id_for_token(&self, token: &AuthTokenValue) -> Result<Option<usize>> {
        let conn = self.conn.lock().unwrap();
        let id = conn
            .query_row(
                &format!(
                    "SELECT user_id FROM {} WHERE value = ?1",
                    AUTH_TOKEN_TABLE_V_0.name
                ),
                params![token.0],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(id.map(|id| id as usize))
    }
}
