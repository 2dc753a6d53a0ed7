//! Table layout of the work store.
//!
//! ```text
//! generations(gen PK, created_ts)
//! individuals(gen, idx, chromosome, status, fitness, claimed_ts, done_ts; PK(gen, idx))
//! ```
//!
//! Timestamps are unix seconds. `fitness`, `claimed_ts` and `done_ts` stay
//! NULL until the corresponding transition happens.

use rusqlite::Connection;

const CREATE_TABLES: &str = "
CREATE TABLE IF NOT EXISTS generations (
    gen INTEGER PRIMARY KEY,
    created_ts INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS individuals (
    gen INTEGER NOT NULL,
    idx INTEGER NOT NULL,
    chromosome BLOB NOT NULL,
    status TEXT NOT NULL DEFAULT 'pending',
    fitness REAL,
    claimed_ts INTEGER,
    done_ts INTEGER,
    PRIMARY KEY (gen, idx)
);
CREATE INDEX IF NOT EXISTS idx_individuals_status ON individuals(status);
";

pub(crate) fn init(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(CREATE_TABLES)
}
