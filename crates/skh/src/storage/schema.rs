//! `SQLite` schema definitions for skh.
//!
//! Each entry in [`MIGRATIONS`] is one versioned script. Scripts are applied
//! in order, once each, by [`super::migrations`].

/// SQL statement to create the migration tracking table.
pub const CREATE_MIGRATIONS_TABLE: &str = r"
CREATE TABLE IF NOT EXISTS schema_migrations (
    version INTEGER NOT NULL PRIMARY KEY
)
";

/// Version 1: officers, settings singleton, letters and their items.
pub const V1_INITIAL: &str = r"
CREATE TABLE IF NOT EXISTS petugas (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nama TEXT NOT NULL,
    pangkat TEXT NOT NULL DEFAULT '',
    nrp TEXT NOT NULL DEFAULT '',
    jabatan TEXT NOT NULL DEFAULT '',
    tipe TEXT NOT NULL CHECK (tipe IN ('Pejabat', 'Penerima'))
);

CREATE TABLE IF NOT EXISTS pengaturan (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    kop_surat_1 TEXT NOT NULL DEFAULT '',
    kop_surat_2 TEXT NOT NULL DEFAULT '',
    kop_surat_3 TEXT NOT NULL DEFAULT '',
    logo_path TEXT,
    format_nomor_surat TEXT NOT NULL DEFAULT 'SKH/{NO}/{BLN_ROMAWI}/{THN}',
    last_nomor_surat INTEGER NOT NULL DEFAULT 0,
    pejabat_id INTEGER REFERENCES petugas(id) ON DELETE SET NULL,
    penerima_id INTEGER REFERENCES petugas(id) ON DELETE SET NULL
);

INSERT OR IGNORE INTO pengaturan (id) VALUES (1);

CREATE TABLE IF NOT EXISTS surat (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    nomor_surat TEXT NOT NULL UNIQUE,
    tanggal_surat TEXT NOT NULL,
    pelapor_nama TEXT NOT NULL,
    pelapor_ttl TEXT NOT NULL DEFAULT '',
    pelapor_agama TEXT NOT NULL DEFAULT '',
    pelapor_kelamin TEXT NOT NULL DEFAULT '',
    pelapor_pekerjaan TEXT NOT NULL DEFAULT '',
    pelapor_alamat TEXT NOT NULL DEFAULT '',
    lokasi_hilang TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS barang (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    surat_id INTEGER NOT NULL REFERENCES surat(id) ON DELETE CASCADE,
    jenis_barang TEXT NOT NULL,
    data TEXT NOT NULL DEFAULT ''
);
";

/// Version 2: track the year the counter belongs to.
pub const V2_COUNTER_YEAR: &str = r"
ALTER TABLE pengaturan ADD COLUMN last_nomor_year INTEGER NOT NULL DEFAULT 0;
";

/// Version 3: region and office name for the printed letter, lookup indexes.
pub const V3_PRINT_FIELDS: &str = r"
ALTER TABLE pengaturan ADD COLUMN wilayah TEXT NOT NULL DEFAULT '';
ALTER TABLE pengaturan ADD COLUMN nama_kantor TEXT NOT NULL DEFAULT '';

CREATE INDEX IF NOT EXISTS idx_surat_tanggal ON surat(tanggal_surat);
CREATE INDEX IF NOT EXISTS idx_barang_surat ON barang(surat_id);
CREATE INDEX IF NOT EXISTS idx_barang_jenis ON barang(jenis_barang);
CREATE INDEX IF NOT EXISTS idx_petugas_tipe ON petugas(tipe);
";

/// A versioned migration script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Migration {
    /// Monotonic version number.
    pub version: i32,
    /// Short name for logs.
    pub name: &'static str,
    /// The SQL batch to execute.
    pub sql: &'static str,
}

/// All migrations in application order.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial",
        sql: V1_INITIAL,
    },
    Migration {
        version: 2,
        name: "counter_year",
        sql: V2_COUNTER_YEAR,
    },
    Migration {
        version: 3,
        name: "print_fields",
        sql: V3_PRINT_FIELDS,
    },
];
