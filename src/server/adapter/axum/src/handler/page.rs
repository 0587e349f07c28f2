/* src/server/adapter/axum/src/handler/page.rs */

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::Uri;
use axum::response::Html;
use vitrine_engine::{
  Document, LocaleLink, PageData, RenderOptions, render_article, render_document, render_landing,
};
use vitrine_server::routing::{PathState, classify};
use vitrine_server::{
  Article, Links, PageKind, PageRequest, PatchStore, Personalizer, PinnedVariants,
  Resolver, VitrineError, load_page, switch_locale_path,
};

use super::{AppState, parse_pins};
use crate::error::AxumError;

#[derive(Debug, Default, serde::Deserialize)]
pub(super) struct PageQuery {
  preview: Option<String>,
  /// Authoring override, `experienceId:variant` pairs separated by commas.
  pin: Option<String>,
}

impl PageQuery {
  fn preview(&self) -> bool {
    self.preview.as_deref().is_some_and(|v| !matches!(v, "false" | "0"))
  }

  fn pins(&self) -> PinnedVariants {
    parse_pins(self.pin.as_deref())
  }
}

pub(super) async fn handle_page(
  State(state): State<Arc<AppState>>,
  uri: Uri,
  Query(query): Query<PageQuery>,
) -> Result<Html<String>, AxumError> {
  let parts = &state.parts;
  let registry = parts.registry().await.map_err(AxumError::page)?;
  let path = uri.path();
  let PathState::HasLocalePrefix { locale, rest } = classify(path, &registry) else {
    return Err(AxumError::page(VitrineError::not_found(format!("no locale segment in {path}"))));
  };

  let site = &parts.config.site;
  let kind = PageKind::from_path(rest, site)
    .ok_or_else(|| VitrineError::not_found(format!("no page at {path}")))
    .map_err(AxumError::page_in(locale))?;
  let preview = query.preview();
  let request = PageRequest { kind, locale: locale.to_string(), preview };
  let mark = state.preview.mark();
  let entry =
    load_page(parts.source.as_ref(), site, &request).await.map_err(AxumError::page_in(locale))?;
  let links = Links::new(site).for_locale(locale, &registry);

  let (title, body) = match request.kind {
    PageKind::BlogPost(_) => {
      let article = Article::from_entry(&entry, &links);
      (article.title.clone(), render_article(&article))
    }
    PageKind::Home | PageKind::Landing(_) | PageKind::BlogIndex => {
      let pins = query.pins();
      let personalizer: &dyn Personalizer =
        if preview && !pins.is_empty() { &pins } else { parts.personalizer.as_ref() };
      let page = if preview {
        state.preview.retain(locale, &entry, mark);
        let patches = state.preview.patches();
        Resolver::new(&patches, personalizer, &links).resolve(&entry)
      } else {
        Resolver::new(&PatchStore::new(), personalizer, &links).resolve(&entry)
      };
      (page.title.clone(), render_landing(&page, RenderOptions { dev_badges: preview }))
    }
  };

  let locale_links = registry
    .locales()
    .iter()
    .map(|code| LocaleLink {
      code: code.clone(),
      href: switch_locale_path(path, code, &registry),
      current: code == locale,
    })
    .collect();
  let doc = Document {
    locale: locale.to_string(),
    title: title.unwrap_or_else(|| site.name.clone()),
    site_name: site.name.clone(),
    body,
    locale_links,
    data: Some(PageData { entry_id: entry.id().to_string(), locale: locale.to_string(), preview }),
  };
  Ok(Html(render_document(&doc)))
}
