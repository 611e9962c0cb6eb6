//! Protected augment classification
//!
//! Decides whether an existing augment is valuable enough to require the
//! actor's confirmation before it is overwritten. Rules, first hit wins:
//! 1. An option id is on the protected list
//! 2. An option grants a skill or carries a trigger (when enabled)
//! 3. An option's description mentions a whitelisted stat keyword
//!
//! Unknown templates count as "not protected". Classification never fails.

use crate::config::ProtectPolicy;
use crate::engine::OptionCatalog;
use crate::types::{OptionId, Variation};
use indexmap::IndexSet;
use std::sync::Arc;

/// Why an augment is protected
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtectReason {
    /// Option id is explicitly listed
    Listed(OptionId),
    /// Option grants a skill
    Skill(OptionId),
    /// Option carries a chance trigger
    Trigger(OptionId),
    /// Option description mentions a stat keyword
    Keyword {
        /// Matching option
        option: OptionId,
        /// Keyword found
        keyword: String,
    },
}

/// Classification result for an item's variation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Both slots empty
    Unaugmented,
    /// Augmented, nothing worth protecting
    Plain,
    /// Augmented and protected
    Protected(ProtectReason),
}

impl Classification {
    /// Whether confirmation is warranted
    #[inline]
    #[must_use]
    pub fn is_protected(&self) -> bool {
        matches!(self, Self::Protected(_))
    }
}

/// Protected augment classifier
pub struct Classifier {
    listed: IndexSet<OptionId>,
    skill_or_trigger: bool,
    keywords: Vec<String>,
    catalog: Arc<dyn OptionCatalog>,
}

impl Classifier {
    /// Create classifier from policy and option data
    #[must_use]
    pub fn new(policy: &ProtectPolicy, catalog: Arc<dyn OptionCatalog>) -> Self {
        Self {
            listed: policy.option_ids.clone(),
            skill_or_trigger: policy.skill_or_trigger,
            keywords: policy
                .stat_keywords
                .iter()
                .map(|k| k.to_uppercase())
                .collect(),
            catalog,
        }
    }

    /// Classify an item's current variation
    #[must_use]
    pub fn classify(&self, variation: Variation) -> Classification {
        let options = variation.options();
        if options.is_empty() {
            return Classification::Unaugmented;
        }
        match self.reason(&options) {
            Some(reason) => Classification::Protected(reason),
            None => Classification::Plain,
        }
    }

    /// Whether any of the given non-zero options is protected
    #[must_use]
    pub fn is_protected(&self, options: &[OptionId]) -> bool {
        self.reason(options).is_some()
    }

    fn reason(&self, options: &[OptionId]) -> Option<ProtectReason> {
        let options: Vec<OptionId> = options.iter().copied().filter(|o| o.0 != 0).collect();

        if let Some(id) = options.iter().find(|id| self.listed.contains(*id)) {
            return Some(ProtectReason::Listed(*id));
        }

        for option in options {
            let Some(traits) = self.catalog.traits(option) else {
                tracing::debug!(%option, "No template for option, treating as plain");
                continue;
            };

            if self.skill_or_trigger {
                if traits.has_skills() {
                    return Some(ProtectReason::Skill(option));
                }
                if traits.has_triggers() {
                    return Some(ProtectReason::Trigger(option));
                }
            }

            if !self.keywords.is_empty() {
                let text = traits.description.to_uppercase();
                if let Some(keyword) = self.keywords.iter().find(|k| text.contains(k.as_str())) {
                    return Some(ProtectReason::Keyword {
                        option,
                        keyword: keyword.clone(),
                    });
                }
            }
        }

        None
    }
}

impl std::fmt::Debug for Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("listed", &self.listed)
            .field("skill_or_trigger", &self.skill_or_trigger)
            .field("keywords", &self.keywords)
            .finish_non_exhaustive()
    }
}
