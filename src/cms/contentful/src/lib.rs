/* src/cms/contentful/src/lib.rs */

mod client;
pub mod links;

pub use client::ContentfulSource;
