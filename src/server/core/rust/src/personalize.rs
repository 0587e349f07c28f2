/* src/server/core/rust/src/personalize.rs */

//! Personalization overlay. Entries may reference experiences (`nt_experiences`); when any of
//! them is well-formed the resolver hands rendering to a [`Personalizer`], passing the default
//! renderer along so the engine can fall back to the baseline.

use std::collections::HashMap;

use serde_json::Value;

use crate::blocks::Block;
use crate::entry::Entry;

pub const EXPERIENCES_FIELD: &str = "nt_experiences";
pub const EXPERIENCE_CONTENT_TYPE: &str = "nt_experience";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperienceKind {
  Personalization,
  Experiment,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Experience {
  pub id: String,
  pub name: Option<String>,
  pub kind: ExperienceKind,
  pub audience: Option<String>,
  /// Share of traffic that enters the experience, `0.0..=1.0`.
  pub traffic: f64,
  config: Value,
  variants: Vec<Entry>,
}

impl Experience {
  /// Map an experience entry; `None` when it is not a well-formed experience.
  pub fn from_entry(entry: &Entry) -> Option<Self> {
    if entry.content_type() != Some(EXPERIENCE_CONTENT_TYPE) {
      return None;
    }
    let kind = match entry.str_field("nt_type")? {
      "nt_personalization" => ExperienceKind::Personalization,
      "nt_experiment" => ExperienceKind::Experiment,
      _ => return None,
    };
    let config = entry.field("nt_config").cloned().unwrap_or(Value::Null);
    let traffic = config.get("traffic").and_then(Value::as_f64).unwrap_or(1.0).clamp(0.0, 1.0);
    let audience = entry
      .entry_field("nt_audience")
      .and_then(|a| a.str_field("nt_audience_id").map(String::from));

    Some(Self {
      id: entry.id().to_string(),
      name: entry.str_field("nt_name").map(String::from),
      kind,
      audience,
      traffic,
      config,
      variants: entry.entries_field("nt_variants"),
    })
  }

  /// Variants for `baseline_id`, in order; `None` marks a hidden variant (render the baseline).
  ///
  /// With a component mapping in the config only the variants mapped to this baseline are
  /// returned; without one every attached variant entry applies.
  pub fn variants_for(&self, baseline_id: &str) -> Vec<Option<&Entry>> {
    let components = self.config.get("components").and_then(Value::as_array);
    let Some(components) = components else {
      return self.variants.iter().map(Some).collect();
    };

    let component = components.iter().find(|c| {
      c.get("baseline").and_then(|b| b.get("id")).and_then(Value::as_str) == Some(baseline_id)
    });
    let Some(mapped) = component.and_then(|c| c.get("variants")).and_then(Value::as_array) else {
      return Vec::new();
    };

    mapped
      .iter()
      .map(|v| {
        if v.get("hidden").and_then(Value::as_bool).unwrap_or(false) {
          return None;
        }
        let id = v.get("id").and_then(Value::as_str)?;
        self.variants.iter().find(|e| e.id() == id)
      })
      .collect()
  }
}

/// Well-formed experiences attached to `entry`. Malformed items are skipped with a warning.
pub fn experiences_of(entry: &Entry) -> Vec<Experience> {
  let raw = entry.entries_field(EXPERIENCES_FIELD);
  raw
    .iter()
    .filter_map(|e| {
      let mapped = Experience::from_entry(e);
      if mapped.is_none() {
        tracing::warn!(entry = entry.id(), experience = e.id(), "ignoring malformed experience");
      }
      mapped
    })
    .collect()
}

/// Renders one of an entry's variants. `render` is the default renderer; calling it with the
/// baseline entry is always a valid answer.
pub trait Personalizer: Send + Sync {
  fn personalize(
    &self,
    baseline: &Entry,
    experiences: &[Experience],
    render: &dyn Fn(&Entry) -> Block,
  ) -> Block;
}

/// Always renders the baseline; the client-side engine swaps variants after hydration.
#[derive(Debug, Clone, Copy, Default)]
pub struct Baseline;

impl Personalizer for Baseline {
  fn personalize(
    &self,
    baseline: &Entry,
    _experiences: &[Experience],
    render: &dyn Fn(&Entry) -> Block,
  ) -> Block {
    render(baseline)
  }
}

/// Authoring preview: pin experiences to a variant index (0 = baseline, n = n-th variant).
#[derive(Debug, Clone, Default)]
pub struct PinnedVariants {
  pins: HashMap<String, usize>,
}

impl PinnedVariants {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn pin(mut self, experience_id: impl Into<String>, variant: usize) -> Self {
    self.pins.insert(experience_id.into(), variant);
    self
  }

  pub fn is_empty(&self) -> bool {
    self.pins.is_empty()
  }
}

impl Personalizer for PinnedVariants {
  fn personalize(
    &self,
    baseline: &Entry,
    experiences: &[Experience],
    render: &dyn Fn(&Entry) -> Block,
  ) -> Block {
    for experience in experiences {
      let Some(&index) = self.pins.get(&experience.id) else {
        continue;
      };
      if index == 0 {
        return render(baseline);
      }
      let variants = experience.variants_for(baseline.id());
      return match variants.get(index - 1) {
        Some(Some(variant)) => render(variant),
        // Hidden or out-of-range variant: baseline
        _ => render(baseline),
      };
    }
    render(baseline)
  }
}
