//! Plain record types for every entity in the dataset.
//!
//! Records carry an `id` that is `None` until the row has been inserted.
//! Table layout lives in [`crate::schema`]; these structs only hold values.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::schema::{
    TableSchema, ABILITIES, EGG_GROUPS, FRIENDSHIP_CATEGORIES, GROWTH_RATE_CATEGORIES,
    POKEMON_GAMES, TYPES,
};

/// An entity identified by a human-readable name.
///
/// `Display` for named entities renders `"<EntityName>: <name>"`.
pub trait Named {
    const ENTITY: &'static str;

    fn name(&self) -> &str;
}

/// A lookup entity stored as `(id, name)` in its own table.
pub trait Category: Named + fmt::Display + Sized {
    fn table() -> &'static TableSchema;

    fn with_id(id: i64, name: String) -> Self;

    fn id(&self) -> Option<i64>;

    fn set_id(&mut self, id: i64);
}

macro_rules! named_display {
    ($ty:ident) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}: {}", <Self as Named>::ENTITY, self.name())
            }
        }
    };
}

macro_rules! category {
    ($(#[$meta:meta])* $ty:ident, $table:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub struct $ty {
            pub id: Option<i64>,
            pub name: String,
        }

        impl $ty {
            pub fn new(name: impl Into<String>) -> Self {
                Self {
                    id: None,
                    name: name.into(),
                }
            }
        }

        impl Named for $ty {
            const ENTITY: &'static str = stringify!($ty);

            fn name(&self) -> &str {
                &self.name
            }
        }

        impl Category for $ty {
            fn table() -> &'static TableSchema {
                &$table
            }

            fn with_id(id: i64, name: String) -> Self {
                Self { id: Some(id), name }
            }

            fn id(&self) -> Option<i64> {
                self.id
            }

            fn set_id(&mut self, id: i64) {
                self.id = Some(id);
            }
        }

        named_display!($ty);
    };
}

category!(
    /// Elemental type (Grass, Fire, ...)
    PokemonType,
    TYPES
);
category!(Ability, ABILITIES);
category!(
    /// Friendship category of a training record
    FriendshipCategory,
    FRIENDSHIP_CATEGORIES
);
category!(
    /// Experience growth-rate category (Slow, Medium, Fast, ...)
    GrowthRate,
    GROWTH_RATE_CATEGORIES
);
category!(EggGroup, EGG_GROUPS);
category!(
    /// Game edition a pokedex entry belongs to
    PokemonGame,
    POKEMON_GAMES
);

/// A species entry in the national dex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pokemon {
    pub id: Option<i64>,
    pub name: String,
    pub national_id: u32,
    /// Meters, one decimal
    pub height: f64,
    /// Kilograms, one decimal
    pub weight: f64,
    pub species: String,
    pub main_type_id: i64,
    pub second_type_id: Option<i64>,
    pub ability_id: Option<i64>,
    pub hidden_ability_id: Option<i64>,
}

impl Named for Pokemon {
    const ENTITY: &'static str = "Pokemon";

    fn name(&self) -> &str {
        &self.name
    }
}

named_display!(Pokemon);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseStats {
    pub id: Option<i64>,
    pub pokemon_id: i64,
    pub hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub sp_atk: u16,
    pub sp_def: u16,
    pub speed: u16,
}

impl BaseStats {
    pub fn total(&self) -> u32 {
        [
            self.hp,
            self.attack,
            self.defense,
            self.sp_atk,
            self.sp_def,
            self.speed,
        ]
        .iter()
        .map(|&s| u32::from(s))
        .sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Training {
    pub id: Option<i64>,
    pub pokemon_id: i64,
    pub base_exp: u32,
    pub catch_rate: f64,
    pub friendship_id: Option<i64>,
    pub growth_rate_id: Option<i64>,
}

/// Gender ratios are percentages; both are `None` for genderless species.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breeding {
    pub id: Option<i64>,
    pub pokemon_id: i64,
    pub genderless: bool,
    pub male: Option<f64>,
    pub female: Option<f64>,
}

impl Breeding {
    pub fn genderless(pokemon_id: i64) -> Self {
        Self {
            id: None,
            pokemon_id,
            genderless: true,
            male: None,
            female: None,
        }
    }

    /// Female ratio is derived as `100 - male`.
    pub fn with_male_ratio(pokemon_id: i64, male: f64) -> Self {
        Self {
            id: None,
            pokemon_id,
            genderless: false,
            male: Some(male),
            female: Some(100.0 - male),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PokedexEntry {
    pub id: Option<i64>,
    pub pokemon_id: i64,
    pub pokemon_game_id: i64,
    pub description: String,
}
