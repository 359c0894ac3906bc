//! Command implementations for the lexis CLI

mod favorite;
mod lookup;

pub use favorite::execute as add_favorite;
pub use lookup::execute as lookup_word;
