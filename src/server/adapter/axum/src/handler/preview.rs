/* src/server/adapter/axum/src/handler/preview.rs */

//! Live preview: authoring tools post entry patches; previewed pages subscribe over SSE and
//! receive the re-rendered block for each patched entry.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use axum::Json;
use axum::extract::{Query, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use vitrine_engine::{RenderOptions, render_block};
use vitrine_server::{
  Entry, EntryPatch, Links, PatchStore, PatchStream, Personalizer, Resolver, VitrineError,
};

use super::{AppState, parse_pins};
use crate::error::AxumError;

const EVENT_CAPACITY: usize = 256;
const MAX_SNAPSHOTS: usize = 64;

/// Patch store, previewed-page snapshots and the patch fan-out.
pub(crate) struct PreviewHub {
  patches: RwLock<PatchStore>,
  /// Latest fetched tree per `(locale, root entry id)`, stamped with its retain order.
  snapshots: RwLock<HashMap<(String, String), (u64, Entry)>>,
  retained: AtomicU64,
  events: broadcast::Sender<EntryPatch>,
}

impl PreviewHub {
  pub(crate) fn new() -> Self {
    let (events, _) = broadcast::channel(EVENT_CAPACITY);
    Self {
      patches: RwLock::default(),
      snapshots: RwLock::default(),
      retained: AtomicU64::new(0),
      events,
    }
  }

  pub(crate) fn patches(&self) -> RwLockReadGuard<'_, PatchStore> {
    self.patches.read().unwrap_or_else(PoisonError::into_inner)
  }

  /// Take before fetching a preview tree; see [`PreviewHub::retain`].
  pub(crate) fn mark(&self) -> u64 {
    self.patches().mark()
  }

  /// Keep the snapshot a preview page was rendered from, for subtree re-rendering.
  /// Patches that arrived before `mark` are already part of the fresh tree and are dropped.
  pub(crate) fn retain(&self, locale: &str, root: &Entry, mark: u64) {
    let evicted =
      self.patches.write().unwrap_or_else(PoisonError::into_inner).evict_superseded(root, mark);
    if evicted > 0 {
      tracing::debug!(root = root.id(), evicted, "fresh fetch superseded preview patches");
    }

    let stamp = self.retained.fetch_add(1, Ordering::Relaxed);
    let mut snapshots = self.snapshots.write().unwrap_or_else(PoisonError::into_inner);
    let key = (locale.to_string(), root.id().to_string());
    if !snapshots.contains_key(&key) && snapshots.len() >= MAX_SNAPSHOTS {
      let oldest = snapshots.iter().min_by_key(|(_, (at, _))| *at).map(|(k, _)| k.clone());
      if let Some(oldest) = oldest {
        snapshots.remove(&oldest);
      }
    }
    snapshots.insert(key, (stamp, root.clone()));
  }

  fn snapshot(&self, locale: &str, root_id: &str) -> Option<Entry> {
    let snapshots = self.snapshots.read().unwrap_or_else(PoisonError::into_inner);
    snapshots.get(&(locale.to_string(), root_id.to_string())).map(|(_, entry)| entry.clone())
  }

  /// Record a patch (last one per entry id wins) and notify subscribers.
  pub(crate) fn apply(&self, patch: EntryPatch) {
    self.patches.write().unwrap_or_else(PoisonError::into_inner).apply(patch.clone());
    if self.events.send(patch).is_err() {
      tracing::debug!("patch stored, no preview subscribers");
    }
  }

  /// Forget every pending patch, returning how many there were.
  pub(crate) fn discard(&self) -> usize {
    let mut patches = self.patches.write().unwrap_or_else(PoisonError::into_inner);
    let count = patches.len();
    patches.clear();
    count
  }

  pub(crate) fn subscribe(&self) -> PatchStream {
    let stream = BroadcastStream::new(self.events.subscribe()).filter_map(|msg| match msg {
      Ok(patch) => Some(patch),
      Err(BroadcastStreamRecvError::Lagged(n)) => {
        tracing::warn!(skipped = n, "preview subscriber lagged, patches dropped");
        None
      }
    });
    Box::pin(stream)
  }
}

pub(super) async fn handle_patch(
  State(state): State<Arc<AppState>>,
  body: axum::body::Bytes,
) -> Result<Json<serde_json::Value>, AxumError> {
  let patch: EntryPatch =
    serde_json::from_slice(&body).map_err(|e| VitrineError::validation(e.to_string()))?;
  if patch.entry_id.trim().is_empty() {
    return Err(VitrineError::validation("entryId must not be empty").into());
  }
  tracing::debug!(entry = %patch.entry_id, fields = patch.fields.len(), "preview patch");
  let entry_id = patch.entry_id.clone();
  state.preview.apply(patch);
  Ok(Json(serde_json::json!({ "ok": true, "entryId": entry_id })))
}

/// Drop all pending patches, e.g. after the author discards a draft.
pub(super) async fn handle_discard(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
  let discarded = state.preview.discard();
  tracing::debug!(discarded, "preview patches discarded");
  Json(serde_json::json!({ "ok": true, "discarded": discarded }))
}

#[derive(Debug, serde::Deserialize)]
pub(super) struct EventsQuery {
  entry: String,
  locale: Option<String>,
  /// Same `experienceId:variant` pins as the previewed page.
  pin: Option<String>,
}

pub(super) async fn handle_events(
  State(state): State<Arc<AppState>>,
  Query(query): Query<EventsQuery>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>>, AxumError> {
  let registry = state.parts.registry().await.map_err(AxumError::api)?;
  let locale = query.locale.unwrap_or_else(|| registry.default_locale().to_string());
  if !registry.contains(&locale) {
    return Err(VitrineError::validation(format!("unknown locale \"{locale}\"")).into());
  }
  let links = Links::new(&state.parts.config.site).for_locale(&locale, &registry);
  let pins = parse_pins(query.pin.as_deref());
  let root_id = query.entry;

  let updates = state.preview.subscribe();
  let stream = updates.filter_map(move |patch| {
    let personalizer: &dyn Personalizer =
      if pins.is_empty() { state.parts.personalizer.as_ref() } else { &pins };
    let update = UpdateTarget { locale: &locale, root_id: &root_id, links: &links, personalizer };
    render_update(&state.preview, &update, &patch.entry_id).map(Ok::<_, Infallible>)
  });
  Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// The previewed page an SSE subscriber is watching.
struct UpdateTarget<'a> {
  locale: &'a str,
  root_id: &'a str,
  links: &'a Links,
  personalizer: &'a dyn Personalizer,
}

/// The SSE event for one patched entry, `None` when it is not part of the previewed page.
/// A patch to the page root itself asks the client to reload.
fn render_update(hub: &PreviewHub, target: &UpdateTarget<'_>, patched: &str) -> Option<Event> {
  let snapshot = hub.snapshot(target.locale, target.root_id)?;
  if patched == target.root_id {
    return Some(Event::default().event("reload").data("{}"));
  }

  let patches = hub.patches();
  let resolver = Resolver::new(&patches, target.personalizer, target.links);
  let block = resolver.resolve_subtree(&snapshot, patched)?;
  let entry_id = block.entry_id()?.to_string();
  let html = render_block(&block, RenderOptions { dev_badges: true });
  let payload = serde_json::json!({ "entryId": entry_id, "html": html });
  Some(Event::default().event("block").data(payload.to_string()))
}
