pub mod film;
pub mod user;
pub mod watch_history;

pub use film::{CastMember, Film, GenreTag};
pub use user::{Preference, User};
pub use watch_history::WatchHistoryEntry;
