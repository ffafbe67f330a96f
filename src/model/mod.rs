mod episode;
mod podcast;

pub use episode::{EpisodeRecord, UNTITLED_EPISODE, parse_timestamp};
pub use podcast::{DEFAULT_LANGUAGE, Owner, PodcastMetadata, Profile, UNTITLED_PODCAST};
