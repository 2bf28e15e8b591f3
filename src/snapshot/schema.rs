//! The snapshot's SQL schema.
//!
//! Transcribed from the `SQL_CREATE_STATEMENTS` block in
//! `examples/original_source/modules/cppscanner/indexer/snapshotwriter.cpp`,
//! including its `GENERATED ALWAYS AS (...) VIRTUAL` boolean columns (SQLite
//! supports virtual generated columns directly, so these translate as-is).
//! Bit positions referenced here match the `static_assert`s guarding the
//! original against flag-enum drift; see [`crate::symbol`] and
//! [`crate::reference`] for the Rust-side constants they must stay in sync
//! with.

pub const SCHEMA_VERSION: i64 = 1;

pub const CREATE_STATEMENTS: &str = r#"
CREATE TABLE IF NOT EXISTS info (
  key   TEXT PRIMARY KEY,
  value TEXT
);

CREATE TABLE IF NOT EXISTS accessSpecifier (
  value INTEGER PRIMARY KEY,
  name  TEXT
);

CREATE TABLE IF NOT EXISTS file (
  id      INTEGER PRIMARY KEY,
  path    TEXT UNIQUE NOT NULL,
  content TEXT,
  sha1    TEXT,
  indexed INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS include (
  file_id          INTEGER NOT NULL,
  line             INTEGER NOT NULL,
  included_file_id INTEGER NOT NULL,
  UNIQUE(file_id, line)
);

CREATE TABLE IF NOT EXISTS symbolKind (
  id   INTEGER PRIMARY KEY,
  name TEXT
);

CREATE TABLE IF NOT EXISTS symbol (
  id            INTEGER PRIMARY KEY,
  kind          INTEGER NOT NULL,
  parent        INTEGER,
  name          TEXT NOT NULL,
  flags         INTEGER NOT NULL DEFAULT 0,
  isLocal       INTEGER GENERATED ALWAYS AS (flags & 1 != 0) VIRTUAL,
  isFromProject INTEGER GENERATED ALWAYS AS (flags & 2 != 0) VIRTUAL,
  isProtected   INTEGER GENERATED ALWAYS AS (flags & 4 != 0) VIRTUAL,
  isPrivate     INTEGER GENERATED ALWAYS AS (flags & 8 != 0) VIRTUAL
);

CREATE TABLE IF NOT EXISTS macroInfo (
  id         INTEGER PRIMARY KEY REFERENCES symbol(id),
  definition TEXT
);

CREATE VIEW IF NOT EXISTS macroRecord AS
  SELECT symbol.id, symbol.name, symbol.flags, macroInfo.definition,
         (symbol.flags & 32 != 0) AS isUsedAsHeaderGuard,
         (symbol.flags & 64 != 0) AS isFunctionLike
  FROM symbol JOIN macroInfo ON symbol.id = macroInfo.id
  WHERE symbol.kind = 4;

CREATE TABLE IF NOT EXISTS namespaceAliasInfo (
  id    INTEGER PRIMARY KEY REFERENCES symbol(id),
  value TEXT
);

CREATE VIEW IF NOT EXISTS namespaceAliasRecord AS
  SELECT symbol.id, symbol.name, namespaceAliasInfo.value
  FROM symbol JOIN namespaceAliasInfo ON symbol.id = namespaceAliasInfo.id
  WHERE symbol.kind = 3;

CREATE TABLE IF NOT EXISTS enumInfo (
  id           INTEGER PRIMARY KEY REFERENCES symbol(id),
  integerType  TEXT
);

CREATE VIEW IF NOT EXISTS enumRecord AS
  SELECT symbol.id, symbol.name, enumInfo.integerType,
         (symbol.kind = 28) AS isScoped
  FROM symbol JOIN enumInfo ON symbol.id = enumInfo.id
  WHERE symbol.kind IN (5, 28);

CREATE TABLE IF NOT EXISTS enumConstantInfo (
  id         INTEGER PRIMARY KEY REFERENCES symbol(id),
  value      INTEGER,
  expression TEXT
);

CREATE VIEW IF NOT EXISTS enumConstantRecord AS
  SELECT symbol.id, symbol.name, enumConstantInfo.value, enumConstantInfo.expression
  FROM symbol JOIN enumConstantInfo ON symbol.id = enumConstantInfo.id
  WHERE symbol.kind = 14;

CREATE TABLE IF NOT EXISTS functionInfo (
  id         INTEGER PRIMARY KEY REFERENCES symbol(id),
  returnType TEXT
);

CREATE VIEW IF NOT EXISTS functionRecord AS
  SELECT symbol.id, symbol.name, symbol.flags, functionInfo.returnType,
         (symbol.flags & 32 != 0)     AS isInline,
         (symbol.flags & 64 != 0)     AS isStatic,
         (symbol.flags & 128 != 0)    AS isConstexpr,
         (symbol.flags & 256 != 0)    AS isConsteval,
         (symbol.flags & 512 != 0)    AS isNoexcept,
         (symbol.flags & 1024 != 0)   AS isDefault,
         (symbol.flags & 2048 != 0)   AS isDelete,
         (symbol.flags & 4096 != 0)   AS isConst,
         (symbol.flags & 8192 != 0)   AS isVirtual,
         (symbol.flags & 16384 != 0)  AS isPure,
         (symbol.flags & 32768 != 0)  AS isOverride,
         (symbol.flags & 65536 != 0)  AS isFinal,
         (symbol.flags & 131072 != 0) AS isExplicit
  FROM symbol JOIN functionInfo ON symbol.id = functionInfo.id
  WHERE symbol.kind BETWEEN 18 AND 24 OR symbol.kind = 11 OR symbol.kind = 29;

CREATE TABLE IF NOT EXISTS parameterInfo (
  id             INTEGER PRIMARY KEY REFERENCES symbol(id),
  parameterIndex INTEGER,
  type           TEXT,
  defaultValue   TEXT
);

CREATE VIEW IF NOT EXISTS parameterRecord AS
  SELECT symbol.id, symbol.name, parameterInfo.parameterIndex, parameterInfo.type, parameterInfo.defaultValue
  FROM symbol JOIN parameterInfo ON symbol.id = parameterInfo.id
  WHERE symbol.kind = 22;

CREATE TABLE IF NOT EXISTS variableInfo (
  id   INTEGER PRIMARY KEY REFERENCES symbol(id),
  type TEXT,
  init TEXT
);

CREATE VIEW IF NOT EXISTS variableRecord AS
  SELECT symbol.id, symbol.name, symbol.flags, variableInfo.type, variableInfo.init,
         (symbol.flags & 32 != 0)  AS isConst,
         (symbol.flags & 64 != 0)  AS isConstexpr,
         (symbol.flags & 128 != 0) AS isStatic,
         (symbol.flags & 256 != 0) AS isMutable,
         (symbol.flags & 512 != 0) AS isThreadLocal,
         (symbol.flags & 1024 != 0) AS isInline
  FROM symbol JOIN variableInfo ON symbol.id = variableInfo.id
  WHERE symbol.kind IN (12, 13, 18);

CREATE TABLE IF NOT EXISTS symbolReference (
  symbol_id         INTEGER NOT NULL,
  file_id           INTEGER NOT NULL,
  line              INTEGER NOT NULL,
  col               INTEGER NOT NULL,
  parent_symbol_id  INTEGER,
  flags             INTEGER NOT NULL DEFAULT 0,
  isDeclaration     INTEGER GENERATED ALWAYS AS (flags & 1 != 0)   VIRTUAL,
  isDefinition      INTEGER GENERATED ALWAYS AS (flags & 2 != 0)   VIRTUAL,
  isRead            INTEGER GENERATED ALWAYS AS (flags & 4 != 0)   VIRTUAL,
  isWrite           INTEGER GENERATED ALWAYS AS (flags & 8 != 0)   VIRTUAL,
  isCall            INTEGER GENERATED ALWAYS AS (flags & 16 != 0)  VIRTUAL,
  isDynamic         INTEGER GENERATED ALWAYS AS (flags & 32 != 0)  VIRTUAL,
  isAddressOf       INTEGER GENERATED ALWAYS AS (flags & 64 != 0)  VIRTUAL,
  isImplicit        INTEGER GENERATED ALWAYS AS (flags & 128 != 0) VIRTUAL,
  UNIQUE(symbol_id, file_id, line, col, flags)
);

CREATE VIEW IF NOT EXISTS symbolDefinition AS
  SELECT * FROM symbolReference WHERE isDefinition = 1;

CREATE TABLE IF NOT EXISTS symbolDeclaration (
  symbol_id      INTEGER NOT NULL,
  file_id        INTEGER NOT NULL,
  startPosition  INTEGER NOT NULL,
  endPosition    INTEGER NOT NULL,
  isDefinition   INTEGER NOT NULL DEFAULT 0,
  startLine      INTEGER GENERATED ALWAYS AS (startPosition >> 12) VIRTUAL,
  startColumn    INTEGER GENERATED ALWAYS AS (startPosition & 4095) VIRTUAL,
  endLine        INTEGER GENERATED ALWAYS AS (endPosition >> 12) VIRTUAL,
  endColumn      INTEGER GENERATED ALWAYS AS (endPosition & 4095) VIRTUAL,
  PRIMARY KEY (symbol_id, file_id, startPosition)
);

CREATE TABLE IF NOT EXISTS baseOf (
  baseClassID    INTEGER NOT NULL,
  derivedClassID INTEGER NOT NULL,
  access         INTEGER NOT NULL,
  UNIQUE(baseClassID, derivedClassID)
);

CREATE TABLE IF NOT EXISTS override (
  overrideMethodID INTEGER PRIMARY KEY,
  baseMethodID     INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS diagnosticLevel (
  value INTEGER PRIMARY KEY,
  name  TEXT
);

CREATE TABLE IF NOT EXISTS diagnostic (
  level   INTEGER NOT NULL,
  fileID  INTEGER,
  line    INTEGER,
  column  INTEGER,
  message TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS argumentPassedByReference (
  file_id INTEGER NOT NULL,
  line    INTEGER NOT NULL,
  column  INTEGER NOT NULL,
  UNIQUE(file_id, line, column)
);
"#;

pub const ACCESS_SPECIFIER_ROWS: &[(i64, &str)] = &[
    (0, "Invalid"),
    (1, "Public"),
    (2, "Protected"),
    (3, "Private"),
];

pub const DIAGNOSTIC_LEVEL_ROWS: &[(i64, &str)] = &[
    (0, "Ignored"),
    (1, "Note"),
    (2, "Remark"),
    (3, "Warning"),
    (4, "Error"),
    (5, "Fatal"),
];
