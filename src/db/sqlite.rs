use anyhow::{bail, Context, Result};
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension, Row, ToSql};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema_gen::{generate_create_table, generate_indexes};
use crate::model::{
    BaseStats, Breeding, Category, EggGroup, PokedexEntry, Pokemon, Training,
};
use crate::parser::{parse_junction_rows, parse_record, ParsedRow};
use crate::schema::{
    TableSchema, ABILITIES_POKE_GROUP, BASE_STATS, BREEDING_EGG_GROUP, BREEDING_STATS,
    POKEDEX_ENTRIES, POKEMONS, TRAINING_STATS, TYPES_POKE_GROUP,
};

const BATCH_SIZE: usize = 1000;

const POKEMON_COLUMNS: &str = "p.id, p.name, p.national_id, p.height, p.weight, p.species, \
     p.main_type_id, p.second_type_id, p.ability_id, p.hidden_ability_id";

/// An open connection to the reference database.
///
/// The connection is closed when the value is dropped.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database at `db_path`
    pub fn open(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        let conn = Connection::open(db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;
        debug!("Opened database {:?}", db_path);

        Self::configure(conn)
    }

    /// Open a fresh database, removing any existing file and its WAL
    /// sidecars first
    pub fn recreate(db_path: &Path) -> Result<Self> {
        for path in [
            db_path.to_path_buf(),
            sidecar_path(db_path, "-wal"),
            sidecar_path(db_path, "-shm"),
        ] {
            if path.exists() {
                std::fs::remove_file(&path)
                    .with_context(|| format!("Failed to remove existing database: {:?}", path))?;
            }
        }
        Self::open(db_path)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Failed to open in-memory database")?;
        Self::configure(conn)
    }

    fn configure(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        Ok(Self { conn })
    }

    /// Underlying connection, for ad-hoc queries
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Create all tables for the given schemas
    pub fn create_tables(&self, schemas: &[&TableSchema]) -> Result<()> {
        info!("Creating {} tables...", schemas.len());

        for schema in schemas {
            let sql = generate_create_table(schema);
            self.conn
                .execute(&sql, [])
                .with_context(|| format!("Failed to create table: {}", schema.name))?;

            for index_sql in generate_indexes(schema) {
                self.conn
                    .execute(&index_sql, [])
                    .with_context(|| format!("Failed to create index for: {}", schema.name))?;
            }
        }

        Ok(())
    }

    /// Names of the tables present in the database
    pub fn table_names(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(names)
    }

    /// Import data from the table's JSONL file in `input_dir`
    pub fn import_table(&mut self, schema: &TableSchema, input_dir: &Path) -> Result<u64> {
        let file_path = input_dir.join(schema.source_file);

        if !file_path.exists() {
            warn!("{}: skipped (file not found: {:?})", schema.name, file_path);
            return Ok(0);
        }

        let file = File::open(&file_path)
            .with_context(|| format!("Failed to open: {:?}", file_path))?;
        let reader = BufReader::new(file);

        let columns = schema.column_names();
        let insert_sql = insert_statement(schema, &columns);

        let tx = self.conn.transaction()?;
        let mut count: u64 = 0;
        let mut batch: Vec<ParsedRow> = Vec::with_capacity(BATCH_SIZE);

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.context("Failed to read line")?;
            if line.trim().is_empty() {
                continue;
            }

            let parsed = if schema.array_source.is_some() {
                parse_junction_rows(&line, schema)
            } else {
                parse_record(&line, schema).map(|row| vec![row])
            };
            let rows = parsed.with_context(|| {
                format!("Failed to parse record {} in {}", line_no + 1, schema.source_file)
            })?;

            batch.extend(rows);

            if batch.len() >= BATCH_SIZE {
                insert_batch(&tx, &insert_sql, &columns, &batch)
                    .with_context(|| format!("Failed to insert into {}", schema.name))?;
                count += batch.len() as u64;
                batch.clear();
            }
        }

        // Insert remaining batch
        if !batch.is_empty() {
            insert_batch(&tx, &insert_sql, &columns, &batch)
                .with_context(|| format!("Failed to insert into {}", schema.name))?;
            count += batch.len() as u64;
        }

        tx.commit()?;
        info!("{}: {} records", schema.name, count);

        Ok(count)
    }

    // -------------------------------------------------------------------------
    // Typed inserts
    // -------------------------------------------------------------------------

    /// Insert a lookup record and store its assigned id
    pub fn insert_category<C: Category>(&self, category: &mut C) -> Result<i64> {
        insert_category_into(&self.conn, category)
    }

    /// Insert lookup records in a single transaction
    pub fn insert_categories<C: Category>(&mut self, categories: &mut [C]) -> Result<()> {
        let tx = self.conn.transaction()?;
        for category in categories.iter_mut() {
            insert_category_into(&tx, category)?;
        }
        tx.commit()?;

        info!("Inserted {} rows into {}", categories.len(), C::table().name);
        Ok(())
    }

    pub fn insert_pokemon(&self, pokemon: &mut Pokemon) -> Result<i64> {
        let id = insert_values(
            &self.conn,
            &POKEMONS,
            &[
                ("id", &pokemon.id),
                ("name", &pokemon.name),
                ("national_id", &pokemon.national_id),
                ("height", &pokemon.height),
                ("weight", &pokemon.weight),
                ("species", &pokemon.species),
                ("main_type_id", &pokemon.main_type_id),
                ("second_type_id", &pokemon.second_type_id),
                ("ability_id", &pokemon.ability_id),
                ("hidden_ability_id", &pokemon.hidden_ability_id),
            ],
        )?;
        pokemon.id = Some(id);
        Ok(id)
    }

    pub fn insert_base_stats(&self, stats: &mut BaseStats) -> Result<i64> {
        let id = insert_values(
            &self.conn,
            &BASE_STATS,
            &[
                ("id", &stats.id),
                ("pokemon_id", &stats.pokemon_id),
                ("hp", &stats.hp),
                ("attack", &stats.attack),
                ("defense", &stats.defense),
                ("sp_atk", &stats.sp_atk),
                ("sp_def", &stats.sp_def),
                ("speed", &stats.speed),
            ],
        )?;
        stats.id = Some(id);
        Ok(id)
    }

    pub fn insert_training(&self, training: &mut Training) -> Result<i64> {
        let id = insert_values(
            &self.conn,
            &TRAINING_STATS,
            &[
                ("id", &training.id),
                ("pokemon_id", &training.pokemon_id),
                ("base_exp", &training.base_exp),
                ("catch_rate", &training.catch_rate),
                ("friendship_id", &training.friendship_id),
                ("growth_rate_id", &training.growth_rate_id),
            ],
        )?;
        training.id = Some(id);
        Ok(id)
    }

    pub fn insert_breeding(&self, breeding: &mut Breeding) -> Result<i64> {
        let id = insert_values(
            &self.conn,
            &BREEDING_STATS,
            &[
                ("id", &breeding.id),
                ("pokemon_id", &breeding.pokemon_id),
                ("genderless", &breeding.genderless),
                ("male", &breeding.male),
                ("female", &breeding.female),
            ],
        )?;
        breeding.id = Some(id);
        Ok(id)
    }

    pub fn insert_pokedex_entry(&self, entry: &mut PokedexEntry) -> Result<i64> {
        let id = insert_values(
            &self.conn,
            &POKEDEX_ENTRIES,
            &[
                ("id", &entry.id),
                ("pokemon_id", &entry.pokemon_id),
                ("pokemon_game_id", &entry.pokemon_game_id),
                ("description", &entry.description),
            ],
        )?;
        entry.id = Some(id);
        Ok(id)
    }

    // -------------------------------------------------------------------------
    // Associations
    // -------------------------------------------------------------------------

    pub fn link_type(&self, pokemon_id: i64, type_id: i64) -> Result<()> {
        insert_values(
            &self.conn,
            &TYPES_POKE_GROUP,
            &[("pokemon_id", &pokemon_id), ("type_id", &type_id)],
        )?;
        Ok(())
    }

    pub fn link_ability(&self, pokemon_id: i64, ability_id: i64) -> Result<()> {
        insert_values(
            &self.conn,
            &ABILITIES_POKE_GROUP,
            &[("pokemon_id", &pokemon_id), ("ability_id", &ability_id)],
        )?;
        Ok(())
    }

    pub fn link_egg_group(&self, breeding_id: i64, egg_group_id: i64) -> Result<()> {
        insert_values(
            &self.conn,
            &BREEDING_EGG_GROUP,
            &[("breeding_id", &breeding_id), ("egg_group_id", &egg_group_id)],
        )?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    /// All rows of a lookup table, ordered by id
    pub fn categories<C: Category>(&self) -> Result<Vec<C>> {
        let sql = format!("SELECT id, name FROM {} ORDER BY id", C::table().name);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| Ok(C::with_id(row.get(0)?, row.get(1)?)))?
            .collect::<rusqlite::Result<Vec<C>>>()?;
        Ok(rows)
    }

    pub fn pokemon_by_national_id(&self, national_id: u32) -> Result<Option<Pokemon>> {
        let sql = format!("SELECT {} FROM pokemons p WHERE p.national_id = ?1", POKEMON_COLUMNS);
        let pokemon = self
            .conn
            .query_row(&sql, params![national_id], pokemon_from_row)
            .optional()?;
        Ok(pokemon)
    }

    pub fn base_stats_for(&self, pokemon_id: i64) -> Result<Option<BaseStats>> {
        let stats = self
            .conn
            .query_row(
                "SELECT id, pokemon_id, hp, attack, defense, sp_atk, sp_def, speed
                 FROM base_stats WHERE pokemon_id = ?1",
                params![pokemon_id],
                |row| {
                    Ok(BaseStats {
                        id: row.get(0)?,
                        pokemon_id: row.get(1)?,
                        hp: row.get(2)?,
                        attack: row.get(3)?,
                        defense: row.get(4)?,
                        sp_atk: row.get(5)?,
                        sp_def: row.get(6)?,
                        speed: row.get(7)?,
                    })
                },
            )
            .optional()?;
        Ok(stats)
    }

    /// Creatures linked to a type, ordered by national id
    pub fn pokemon_with_type(&self, type_id: i64) -> Result<Vec<Pokemon>> {
        let sql = format!(
            "SELECT {} FROM pokemons p
             JOIN types_poke_group g ON g.pokemon_id = p.id
             WHERE g.type_id = ?1
             ORDER BY p.national_id",
            POKEMON_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params![type_id], pokemon_from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn egg_groups_for(&self, breeding_id: i64) -> Result<Vec<EggGroup>> {
        let mut stmt = self.conn.prepare(
            "SELECT e.id, e.name FROM egg_groups e
             JOIN breeding_egg_group b ON b.egg_group_id = e.id
             WHERE b.breeding_id = ?1
             ORDER BY e.id",
        )?;
        let rows = stmt
            .query_map(params![breeding_id], |row| {
                Ok(EggGroup::with_id(row.get(0)?, row.get(1)?))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn pokedex_entries_for(&self, pokemon_id: i64) -> Result<Vec<PokedexEntry>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, pokemon_id, pokemon_game_id, description
             FROM pokedex_entries WHERE pokemon_id = ?1
             ORDER BY pokemon_game_id",
        )?;
        let rows = stmt
            .query_map(params![pokemon_id], |row| {
                Ok(PokedexEntry {
                    id: row.get(0)?,
                    pokemon_id: row.get(1)?,
                    pokemon_game_id: row.get(2)?,
                    description: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
    }

    /// Creatures without a base-stat record. Empty when the tables are absent.
    pub fn integrity_report(&self) -> Result<Vec<String>> {
        let tables = self.table_names()?;
        if !tables.iter().any(|t| t == POKEMONS.name) || !tables.iter().any(|t| t == BASE_STATS.name)
        {
            return Ok(Vec::new());
        }

        let mut stmt = self.conn.prepare(
            "SELECT p.national_id, p.name FROM pokemons p
             LEFT JOIN base_stats b ON b.pokemon_id = p.id
             WHERE b.id IS NULL
             ORDER BY p.national_id",
        )?;
        let problems = stmt
            .query_map([], |row| {
                let national_id: i64 = row.get(0)?;
                let name: String = row.get(1)?;
                Ok(format!("#{} {} has no base stats", national_id, name))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(problems)
    }

    /// Finalize the database after a bulk load
    pub fn finalize(self) -> Result<()> {
        info!("Finalizing database...");
        self.conn.execute_batch("PRAGMA optimize;")?;
        Ok(())
    }
}

/// True when the error chain contains a SQLite constraint violation
/// (UNIQUE, CHECK, NOT NULL or FOREIGN KEY)
pub fn is_constraint_violation(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<rusqlite::Error>(),
            Some(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation
        )
    })
}

/// `<db_path><suffix>`, the naming SQLite uses for `-wal` and `-shm` files
fn sidecar_path(db_path: &Path, suffix: &str) -> PathBuf {
    let mut name = db_path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

fn insert_statement(schema: &TableSchema, columns: &[&str]) -> String {
    let placeholders: Vec<&str> = columns.iter().map(|_| "?").collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        schema.name,
        columns.join(", "),
        placeholders.join(", ")
    )
}

/// Insert one row and return its rowid
fn insert_values(
    conn: &Connection,
    schema: &TableSchema,
    values: &[(&str, &dyn ToSql)],
) -> Result<i64> {
    let columns: Vec<&str> = values.iter().map(|(column, _)| *column).collect();
    let sql = insert_statement(schema, &columns);

    let mut stmt = conn
        .prepare_cached(&sql)
        .with_context(|| format!("Failed to insert into {}", schema.name))?;
    stmt.execute(params_from_iter(values.iter().map(|(_, value)| *value)))
        .with_context(|| format!("Failed to insert into {}", schema.name))?;

    Ok(conn.last_insert_rowid())
}

fn insert_category_into<C: Category>(conn: &Connection, category: &mut C) -> Result<i64> {
    let id = insert_values(
        conn,
        C::table(),
        &[("id", &category.id()), ("name", &category.name())],
    )?;
    category.set_id(id);
    debug!("Inserted {} (id {})", category, id);
    Ok(id)
}

fn pokemon_from_row(row: &Row) -> rusqlite::Result<Pokemon> {
    Ok(Pokemon {
        id: row.get(0)?,
        name: row.get(1)?,
        national_id: row.get(2)?,
        height: row.get(3)?,
        weight: row.get(4)?,
        species: row.get(5)?,
        main_type_id: row.get(6)?,
        second_type_id: row.get(7)?,
        ability_id: row.get(8)?,
        hidden_ability_id: row.get(9)?,
    })
}

/// Insert a batch of rows into the database
fn insert_batch(
    tx: &rusqlite::Transaction,
    sql: &str,
    columns: &[&str],
    batch: &[ParsedRow],
) -> Result<()> {
    let mut stmt = tx.prepare_cached(sql)?;

    for row in batch {
        for (idx, col_name) in columns.iter().enumerate() {
            row.get(col_name).bind_to(idx + 1, &mut stmt)?;
        }
        stmt.raw_execute()?;
    }

    Ok(())
}

/// Build a fresh database from a directory of JSONL files
pub fn import_reference_data(
    input_dir: &Path,
    output_db: &Path,
    tables: Vec<&TableSchema>,
) -> Result<u64> {
    if !input_dir.is_dir() {
        bail!("Input directory not found: {:?}", input_dir);
    }

    let mut db = Database::recreate(output_db)?;

    // Create all tables first
    db.create_tables(&tables)?;

    let mut total_records: u64 = 0;
    for schema in &tables {
        total_records += db.import_table(schema, input_dir)?;
    }

    let problems = db.integrity_report()?;
    if !problems.is_empty() {
        for problem in &problems {
            warn!("{}", problem);
        }
        bail!("{} creature(s) failed the integrity check", problems.len());
    }

    db.finalize()?;

    Ok(total_records)
}
