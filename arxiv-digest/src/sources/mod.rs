pub mod arxiv_feed;

pub use arxiv_feed::ArxivFeedSource;
