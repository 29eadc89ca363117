pub mod config;
pub mod directory;
pub mod error;
pub mod fetch;
pub mod highlight;
pub mod ingest;
pub mod record;
pub mod render;
pub mod session;
pub mod storage;
pub mod store;

pub use config::Config;
pub use directory::{MonsterEntry, list_monsters, search};
pub use error::StatblockError;
pub use fetch::{Fetch, HttpFetcher, MapFetcher};
pub use highlight::highlight;
pub use ingest::{Statblock, apply_edit, ingest, ingest_custom};
pub use record::{BasicValue, Entry, StatblockRecord};
pub use render::{Layout, RenderOptions, render_card, render_page};
pub use session::Session;
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{Provenance, StatblockStore};

/// The six ability scores, in the positional order of a statblock's `stats`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ability {
    Str,
    Dex,
    Con,
    Int,
    Wis,
    Cha,
}

impl Ability {
    pub const ALL: [Ability; 6] = [
        Ability::Str,
        Ability::Dex,
        Ability::Con,
        Ability::Int,
        Ability::Wis,
        Ability::Cha,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Ability::Str => "STR",
            Ability::Dex => "DEX",
            Ability::Con => "CON",
            Ability::Int => "INT",
            Ability::Wis => "WIS",
            Ability::Cha => "CHA",
        }
    }
}

/// D&D ability modifier = floor((score - 10) / 2) for integer scores.
/// Saturates at the ends of the `i64` range instead of overflowing.
pub fn ability_mod(score: i64) -> i64 {
    // `div_euclid` with positive divisor matches mathematical floor division.
    score.saturating_sub(10).div_euclid(2)
}

/// Signed modifier text; non-negative values always carry a leading `+`.
pub fn format_modifier(modifier: i64) -> String {
    if modifier >= 0 {
        format!("+{}", modifier)
    } else {
        format!("-{}", modifier.unsigned_abs())
    }
}
