pub const SCHEMA: &str = r#"
-- The workspace state tree, serialized as JSON. At most one row.
CREATE TABLE IF NOT EXISTS snapshots (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    format_version INTEGER NOT NULL,
    state TEXT NOT NULL,
    saved_at TEXT NOT NULL
);
"#;
