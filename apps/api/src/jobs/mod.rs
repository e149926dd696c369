// Job listing ingestion: fetch a job page, extract the posting, normalize its description.

pub mod extractor;
pub mod fetch;
pub mod handlers;
pub mod normalize;
