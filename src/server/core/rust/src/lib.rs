/* src/server/core/rust/src/lib.rs */

pub mod blocks;
pub mod config;
pub mod entry;
pub mod errors;
pub mod layout;
pub mod link;
pub mod live;
pub mod locale;
pub mod negotiate;
pub mod page;
pub mod personalize;
pub mod routing;
pub mod server;
pub mod source;

// Re-exports for ergonomic use
pub use blocks::{Block, BlockKind, Display, ResolvedPage, Resolver};
pub use config::SiteConfig;
pub use entry::{Asset, Entry};
pub use errors::VitrineError;
pub use layout::{ComposedFrame, FrameConfig, Slot, Slots, StyleTokens, compose, compose_entry};
pub use link::Links;
pub use live::{EntryPatch, PatchStore, merge_entry, merge_tree};
pub use locale::{LocaleRegistry, RegistryCache, switch_locale_path};
pub use negotiate::{NegotiationInput, negotiate, negotiate_request, parse_accept_language};
pub use page::{Article, PageKind, PageRequest, load_page};
pub use personalize::{Baseline, Experience, PinnedVariants, Personalizer, experiences_of};
pub use routing::{BypassMatcher, RouteOutcome, decide, decide_without_registry};
pub use server::{SiteParts, SiteServer};
pub use source::{
  BoxFuture, BoxStream, ContentSource, EntryQuery, MemorySource, PatchStream,
  fetch_entries_or_empty,
};
