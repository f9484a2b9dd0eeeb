//! Table schema definitions for the Pokemon reference dataset

use super::types::*;

/// Surrogate key column shared by every entity table
const ID: Column = Column::new("id", ColumnType::Integer);

/// Unique short name shared by the lookup tables
const SHORT_NAME: Column = Column::required("name", ColumnType::Text).max_len(20);

const NAME_UNIQUE: &[Index] = &[Index::unique(&["name"])];

// =============================================================================
// Lookup Tables (no FK dependencies)
// =============================================================================

pub static TYPES: TableSchema = TableSchema {
    name: "types",
    source_file: "types.jsonl",
    primary_key: PrimaryKey::Surrogate,
    columns: &[ID, SHORT_NAME],
    foreign_keys: &[],
    indexes: NAME_UNIQUE,
    checks: &[],
    child_tables: &[],
    array_source: None,
};

pub static ABILITIES: TableSchema = TableSchema {
    name: "abilities",
    source_file: "abilities.jsonl",
    primary_key: PrimaryKey::Surrogate,
    columns: &[ID, Column::required("name", ColumnType::Text).max_len(50)],
    foreign_keys: &[],
    indexes: NAME_UNIQUE,
    checks: &[],
    child_tables: &[],
    array_source: None,
};

pub static FRIENDSHIP_CATEGORIES: TableSchema = TableSchema {
    name: "friendship_categories",
    source_file: "friendship_categories.jsonl",
    primary_key: PrimaryKey::Surrogate,
    columns: &[ID, SHORT_NAME],
    foreign_keys: &[],
    indexes: NAME_UNIQUE,
    checks: &[],
    child_tables: &[],
    array_source: None,
};

pub static GROWTH_RATE_CATEGORIES: TableSchema = TableSchema {
    name: "growth_rate_categories",
    source_file: "growth_rate_categories.jsonl",
    primary_key: PrimaryKey::Surrogate,
    columns: &[ID, SHORT_NAME],
    foreign_keys: &[],
    indexes: NAME_UNIQUE,
    checks: &[],
    child_tables: &[],
    array_source: None,
};

pub static EGG_GROUPS: TableSchema = TableSchema {
    name: "egg_groups",
    source_file: "egg_groups.jsonl",
    primary_key: PrimaryKey::Surrogate,
    columns: &[ID, SHORT_NAME],
    foreign_keys: &[],
    indexes: NAME_UNIQUE,
    checks: &[],
    child_tables: &[],
    array_source: None,
};

pub static POKEMON_GAMES: TableSchema = TableSchema {
    name: "pokemon_games",
    source_file: "pokemon_games.jsonl",
    primary_key: PrimaryKey::Surrogate,
    columns: &[ID, SHORT_NAME],
    foreign_keys: &[],
    indexes: NAME_UNIQUE,
    checks: &[],
    child_tables: &[],
    array_source: None,
};

// =============================================================================
// Creatures
// =============================================================================

pub static POKEMONS: TableSchema = TableSchema {
    name: "pokemons",
    source_file: "pokemons.jsonl",
    primary_key: PrimaryKey::Surrogate,
    columns: &[
        ID,
        Column::required("name", ColumnType::Text).max_len(150),
        Column::required("national_id", ColumnType::Integer).between(0, U32_MAX),
        Column::required("height", ColumnType::Real).non_negative(),
        Column::required("weight", ColumnType::Real).non_negative(),
        Column::required("species", ColumnType::Text).max_len(70),
        Column::required("main_type_id", ColumnType::Integer),
        Column::new("second_type_id", ColumnType::Integer),
        Column::new("ability_id", ColumnType::Integer),
        Column::new("hidden_ability_id", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("main_type_id", "types"),
        ForeignKey::new("second_type_id", "types"),
        ForeignKey::new("ability_id", "abilities"),
        ForeignKey::new("hidden_ability_id", "abilities"),
    ],
    indexes: &[Index::unique(&["national_id"]), Index::on(&["name"])],
    checks: &[],
    child_tables: &["types_poke_group", "abilities_poke_group"],
    array_source: None,
};

// =============================================================================
// Per-creature records
// =============================================================================

const U32_MAX: i64 = u32::MAX as i64;

/// Base stats are stored as `u16` on [`crate::model::BaseStats`]
const fn stat(name: &'static str) -> Column {
    Column::required(name, ColumnType::Integer).between(0, u16::MAX as i64)
}

pub static BASE_STATS: TableSchema = TableSchema {
    name: "base_stats",
    source_file: "base_stats.jsonl",
    primary_key: PrimaryKey::Surrogate,
    columns: &[
        ID,
        Column::required("pokemon_id", ColumnType::Integer),
        stat("hp"),
        stat("attack"),
        stat("defense"),
        stat("sp_atk"),
        stat("sp_def"),
        stat("speed"),
    ],
    foreign_keys: &[ForeignKey::new("pokemon_id", "pokemons")],
    indexes: &[Index::unique(&["pokemon_id"])],
    checks: &[],
    child_tables: &[],
    array_source: None,
};

pub static TRAINING_STATS: TableSchema = TableSchema {
    name: "training_stats",
    source_file: "training_stats.jsonl",
    primary_key: PrimaryKey::Surrogate,
    columns: &[
        ID,
        Column::required("pokemon_id", ColumnType::Integer),
        Column::required("base_exp", ColumnType::Integer).between(0, U32_MAX),
        Column::required("catch_rate", ColumnType::Real).non_negative(),
        Column::new("friendship_id", ColumnType::Integer),
        Column::new("growth_rate_id", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("pokemon_id", "pokemons"),
        ForeignKey::new("friendship_id", "friendship_categories"),
        ForeignKey::new("growth_rate_id", "growth_rate_categories"),
    ],
    indexes: &[Index::unique(&["pokemon_id"])],
    checks: &[],
    child_tables: &[],
    array_source: None,
};

pub static BREEDING_STATS: TableSchema = TableSchema {
    name: "breeding_stats",
    source_file: "breeding_stats.jsonl",
    primary_key: PrimaryKey::Surrogate,
    columns: &[
        ID,
        Column::required("pokemon_id", ColumnType::Integer),
        Column::required("genderless", ColumnType::Boolean).default_value("0"),
        Column::new("male", ColumnType::Real).between(0, 100),
        Column::new("female", ColumnType::Real).between(0, 100),
    ],
    foreign_keys: &[ForeignKey::new("pokemon_id", "pokemons")],
    indexes: &[Index::unique(&["pokemon_id"])],
    checks: &[
        "(male IS NULL) = (female IS NULL)",
        "male IS NULL OR abs(male + female - 100) < 0.01",
        "genderless = 0 OR male IS NULL",
    ],
    child_tables: &["breeding_egg_group"],
    array_source: None,
};

pub static POKEDEX_ENTRIES: TableSchema = TableSchema {
    name: "pokedex_entries",
    source_file: "pokedex_entries.jsonl",
    primary_key: PrimaryKey::Surrogate,
    columns: &[
        ID,
        Column::required("pokemon_id", ColumnType::Integer),
        Column::required("pokemon_game_id", ColumnType::Integer),
        Column::required("description", ColumnType::Text),
    ],
    foreign_keys: &[
        ForeignKey::new("pokemon_id", "pokemons"),
        ForeignKey::new("pokemon_game_id", "pokemon_games"),
    ],
    indexes: &[Index::unique(&["pokemon_id", "pokemon_game_id"])],
    checks: &[],
    child_tables: &[],
    array_source: None,
};

// =============================================================================
// Association Tables
// =============================================================================

pub static TYPES_POKE_GROUP: TableSchema = TableSchema {
    name: "types_poke_group",
    source_file: "pokemons.jsonl",
    primary_key: PrimaryKey::Composite(&["pokemon_id", "type_id"]),
    columns: &[
        Column::required("pokemon_id", ColumnType::Integer),
        Column::required("type_id", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("pokemon_id", "pokemons"),
        ForeignKey::new("type_id", "types"),
    ],
    indexes: &[],
    checks: &[],
    child_tables: &[],
    array_source: Some(ArraySource::SimpleIntArray {
        array_field: "type_ids",
        parent_id_column: "pokemon_id",
        value_column: "type_id",
    }),
};

pub static ABILITIES_POKE_GROUP: TableSchema = TableSchema {
    name: "abilities_poke_group",
    source_file: "pokemons.jsonl",
    primary_key: PrimaryKey::Composite(&["pokemon_id", "ability_id"]),
    columns: &[
        Column::required("pokemon_id", ColumnType::Integer),
        Column::required("ability_id", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("pokemon_id", "pokemons"),
        ForeignKey::new("ability_id", "abilities"),
    ],
    indexes: &[],
    checks: &[],
    child_tables: &[],
    array_source: Some(ArraySource::SimpleIntArray {
        array_field: "ability_ids",
        parent_id_column: "pokemon_id",
        value_column: "ability_id",
    }),
};

pub static BREEDING_EGG_GROUP: TableSchema = TableSchema {
    name: "breeding_egg_group",
    source_file: "breeding_stats.jsonl",
    primary_key: PrimaryKey::Composite(&["breeding_id", "egg_group_id"]),
    columns: &[
        Column::required("breeding_id", ColumnType::Integer),
        Column::required("egg_group_id", ColumnType::Integer),
    ],
    foreign_keys: &[
        ForeignKey::new("breeding_id", "breeding_stats"),
        ForeignKey::new("egg_group_id", "egg_groups"),
    ],
    indexes: &[],
    checks: &[],
    child_tables: &[],
    array_source: Some(ArraySource::SimpleIntArray {
        array_field: "egg_group_ids",
        parent_id_column: "breeding_id",
        value_column: "egg_group_id",
    }),
};

// =============================================================================
// Schema Registry
// =============================================================================

/// All table schemas in dependency order
pub static ALL_TABLES: &[&TableSchema] = &[
    // Wave 1: No dependencies
    &TYPES,
    &ABILITIES,
    &FRIENDSHIP_CATEGORIES,
    &GROWTH_RATE_CATEGORIES,
    &EGG_GROUPS,
    &POKEMON_GAMES,
    // Wave 2: creatures
    &POKEMONS,
    // Wave 3: per-creature records
    &BASE_STATS,
    &TRAINING_STATS,
    &BREEDING_STATS,
    &POKEDEX_ENTRIES,
    // Association tables
    &TYPES_POKE_GROUP,
    &ABILITIES_POKE_GROUP,
    &BREEDING_EGG_GROUP,
];

/// Get table schema by name
pub fn get_table(name: &str) -> Option<&'static TableSchema> {
    ALL_TABLES.iter().find(|t| t.name == name).copied()
}

/// Get all table names
pub fn table_names() -> Vec<&'static str> {
    ALL_TABLES.iter().map(|t| t.name).collect()
}
