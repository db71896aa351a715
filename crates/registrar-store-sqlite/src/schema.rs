//! SQL schema for the registrar SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS students (
    student_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    code          TEXT NOT NULL UNIQUE,
    national_id   TEXT NOT NULL,
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    course        TEXT NOT NULL,
    email         TEXT NOT NULL,
    enrollment    TEXT NOT NULL DEFAULT 'not_enrolled',  -- | 'enrolled'
    registered_at TEXT NOT NULL                          -- RFC 3339 UTC
);

-- Reference data; seeded on first start, never written by the application.
CREATE TABLE IF NOT EXISTS subjects (
    subject_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    course      TEXT NOT NULL,
    description TEXT
);

CREATE TABLE IF NOT EXISTS proformas (
    proforma_id    INTEGER PRIMARY KEY AUTOINCREMENT,
    number         TEXT NOT NULL UNIQUE,
    student_id     INTEGER NOT NULL REFERENCES students(student_id),
    student_code   TEXT NOT NULL,
    course         TEXT NOT NULL,
    amount         TEXT NOT NULL,                       -- decimal, scale 2
    generated_at   TEXT NOT NULL,
    state          TEXT NOT NULL DEFAULT 'pending',     -- | 'paid'
    receipt_number TEXT,
    paid_at        TEXT
);

-- At most one pending proforma per student.
CREATE UNIQUE INDEX IF NOT EXISTS proformas_one_pending_idx
    ON proformas(student_id) WHERE state = 'pending';

-- Line items are written together with their proforma and never edited.
CREATE TABLE IF NOT EXISTS proforma_subjects (
    line_id      INTEGER PRIMARY KEY AUTOINCREMENT,
    proforma_id  INTEGER NOT NULL REFERENCES proformas(proforma_id),
    subject_id   INTEGER NOT NULL REFERENCES subjects(subject_id),
    subject_name TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS subjects_course_idx          ON subjects(course);
CREATE INDEX IF NOT EXISTS proforma_subjects_parent_idx ON proforma_subjects(proforma_id);

PRAGMA user_version = 1;
";

/// Default catalog: `(name, course, description)`.
pub const SEED_SUBJECTS: &[(&str, &str, &str)] = &[
  ("Matemáticas I", "Primer Curso", "Fundamentos de álgebra y cálculo"),
  ("Lenguaje y Comunicación", "Primer Curso", "Gramática y redacción"),
  ("Ciencias Naturales", "Primer Curso", "Biología y química básica"),
  ("Estudios Sociales", "Primer Curso", "Historia y geografía"),
  ("Inglés Básico", "Primer Curso", "Inglés nivel principiante"),
  ("Matemáticas II", "Segundo Curso", "Geometría y trigonometría"),
  ("Literatura", "Segundo Curso", "Análisis literario"),
  ("Física", "Segundo Curso", "Mecánica y termodinámica"),
  ("Química", "Segundo Curso", "Química orgánica e inorgánica"),
  ("Inglés Intermedio", "Segundo Curso", "Inglés nivel intermedio"),
  ("Cálculo Avanzado", "Tercer Curso", "Cálculo diferencial e integral"),
  ("Programación", "Tercer Curso", "Fundamentos de programación"),
  ("Física Avanzada", "Tercer Curso", "Electromagnetismo y óptica"),
  ("Estadística", "Tercer Curso", "Probabilidad y estadística"),
  ("Inglés Avanzado", "Tercer Curso", "Inglés nivel avanzado"),
];
