//! Wish-list store
//!
//! A single SQLite file holding one flat table. The store is wiped and
//! reloaded from the seed list every time the server boots; after that it is
//! only read.

use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::info;

use crate::error::Result;

/// One wish-list entry
///
/// Field order is the serialization order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WishItem {
    pub name: String,
    pub description: String,
}

impl WishItem {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

const SEED: [(&str, &str); 7] = [
    ("天定山滑雪", "在天定山滑雪场享受滑雪乐趣"),
    ("南湖公园钓鱼", "在南湖公园进行休闲钓鱼活动"),
    ("南溪湿地公园搭帐篷露营", "在南溪湿地公园搭帐篷露营，亲近自然"),
    ("伪满皇宫博物院参观", "参观伪满皇宫博物院，了解历史"),
    (
        "长春动植物园看雪饼猴",
        "在长春动植物园观看网红【雪饼猴】和西游主题演出",
    ),
    ("夜游新民大街", "夜晚游览新民大街，欣赏城市夜景"),
    ("净月潭看蓝冰", "在净月潭观看蓝冰奇景"),
];

/// The seed list loaded at boot
pub fn default_wishes() -> Vec<WishItem> {
    SEED.iter()
        .map(|(name, description)| WishItem::new(*name, *description))
        .collect()
}

/// SQLite-backed wish-list table
///
/// `rusqlite::Connection` is not `Sync`, so it sits behind a `Mutex`; the
/// same lock makes reset-and-reload exclusive with respect to readers.
pub struct WishListStore {
    path: Option<PathBuf>,
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for WishListStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WishListStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl WishListStore {
    /// Open or create the store file
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        Self::init_schema(&conn)?;
        Ok(Self {
            path: Some(path.to_path_buf()),
            conn: Mutex::new(conn),
        })
    }

    /// Store that lives only as long as the process
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self {
            path: None,
            conn: Mutex::new(conn),
        })
    }

    /// Open the file and load the default seed list, discarding prior rows
    pub fn init(path: impl AsRef<Path>) -> Result<Self> {
        let store = Self::open(path)?;
        let count = store.reset_and_seed(&default_wishes())?;
        info!(
            "Wish-list store initialized with {} items at {}",
            count,
            store.location()
        );
        Ok(store)
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS wish_list (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL,
                description TEXT NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clear the table and insert `items`, atomically
    pub fn reset_and_seed(&self, items: &[WishItem]) -> Result<usize> {
        let mut conn = self.conn();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM wish_list", [])?;
        {
            let mut insert =
                tx.prepare("INSERT INTO wish_list (name, description) VALUES (?1, ?2)")?;
            for item in items {
                insert.execute(params![item.name, item.description])?;
            }
        }
        tx.commit()?;
        Ok(items.len())
    }

    /// Case-sensitive substring match over name or description
    ///
    /// An empty query returns every item. Results keep insertion order.
    pub fn query(&self, query: &str) -> Result<Vec<WishItem>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT name, description FROM wish_list
             WHERE ?1 = '' OR instr(name, ?1) > 0 OR instr(description, ?1) > 0
             ORDER BY id",
        )?;
        let rows = stmt.query_map(params![query], |row| {
            Ok(WishItem {
                name: row.get(0)?,
                description: row.get(1)?,
            })
        })?;
        let items = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(items)
    }

    /// Number of stored items
    pub fn len(&self) -> Result<usize> {
        let conn = self.conn();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM wish_list", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Human-readable location for logs
    pub fn location(&self) -> String {
        match &self.path {
            Some(path) => std::fs::canonicalize(path)
                .unwrap_or_else(|_| path.clone())
                .display()
                .to_string(),
            None => ":memory:".to_string(),
        }
    }
}
