//! Feed ingestion: fetch RSS/Atom feeds, classify each item and publish it
//! as a signed `article.created` webhook event.

pub mod classify;
pub mod config;
pub mod feed;
pub mod pipeline;
pub mod webhook;
