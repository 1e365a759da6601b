//! Filtering a snapshot by free-text term, category, and tags.
//!
//! All predicates are combined with AND. Results borrow from the snapshot
//! and keep its order. Nothing here fails: predicates that match nothing
//! produce an empty result.

use crate::index::{Fragment, Prompt, PromptIndex};

/// An immutable set of filter predicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    term: String,
    needle: String,
    category: Option<String>,
    tags: Vec<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive literal substring to look for.
    #[must_use]
    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = term.into();
        self.needle = self.term.to_lowercase();
        self
    }

    /// Only prompts in exactly this category.
    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Only prompts carrying `tag`. Repeated calls require every tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        let tag = tag.into();
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    #[must_use]
    pub fn with_tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        tags.into_iter().fold(self, |query, tag| query.with_tag(tag))
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// True when no predicate is active.
    pub fn is_empty(&self) -> bool {
        self.term.is_empty() && self.category.is_none() && self.tags.is_empty()
    }

    pub fn matches_prompt(&self, prompt: &Prompt) -> bool {
        self.term_matches([prompt.name(), prompt.description(), prompt.body.as_str()])
            && self.category_matches(prompt)
            && self.tags_match(prompt)
    }

    /// Fragments are filtered by term only.
    pub fn matches_fragment(&self, fragment: &Fragment) -> bool {
        self.term_matches([fragment.name.as_str(), fragment.content.as_str()])
    }

    fn term_matches<'a>(&self, fields: impl IntoIterator<Item = &'a str>) -> bool {
        self.needle.is_empty()
            || fields
                .into_iter()
                .any(|field| field.to_lowercase().contains(&self.needle))
    }

    fn category_matches(&self, prompt: &Prompt) -> bool {
        match &self.category {
            None => true,
            Some(category) => prompt.category().as_deref() == Some(category.as_str()),
        }
    }

    fn tags_match(&self, prompt: &Prompt) -> bool {
        if self.tags.is_empty() {
            return true;
        }
        let tags = prompt.tags();
        self.tags
            .iter()
            .all(|tag| tags.iter().any(|t| t.as_ref() == tag.as_str()))
    }
}

/// Prompts in `index` matching `query`, in snapshot order.
pub fn filter_prompts<'a>(index: &'a PromptIndex, query: &Query) -> Vec<&'a Prompt> {
    index
        .prompts
        .iter()
        .filter(|p| query.matches_prompt(p))
        .collect()
}

/// Fragments in `index` matching `query`, in snapshot order.
pub fn filter_fragments<'a>(index: &'a PromptIndex, query: &Query) -> Vec<&'a Fragment> {
    index
        .fragments
        .iter()
        .filter(|f| query.matches_fragment(f))
        .collect()
}
