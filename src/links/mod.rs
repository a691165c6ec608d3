//! # Links Module
//!
//! Turns the operator's link list into video IDs.
//!
//! - [`load_links`] / [`parse_links`] read the link source file, one URL per
//!   line, tolerating comments, quotes and trailing commas so a list pasted
//!   from source code works unchanged.
//! - [`extract_video_id`] resolves a single link to its YouTube video ID.

mod extract;
mod source;

pub use extract::SHORT_LINK_HOST;
pub use extract::YOUTUBE_HOSTS;
pub use extract::extract_video_id;
pub use source::LinkSourceError;
pub use source::load_links;
pub use source::parse_links;
