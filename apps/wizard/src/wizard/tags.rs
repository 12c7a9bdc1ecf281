use crate::wizard::WizardEvent;

/// Ordered, duplicate-free list of free-text skill tags.
///
/// Matching is exact and case-sensitive: `Rust` and `rust` are two tags.
#[derive(Debug, Clone, Default)]
pub struct TagListManager {
    tags: Vec<String>,
}

impl TagListManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Trims `text` and appends it. Returns a render event, or `None` when the
    /// trimmed text is empty or already present.
    pub fn add(&mut self, text: &str) -> Option<WizardEvent> {
        let tag = text.trim();
        if tag.is_empty() || self.contains(tag) {
            return None;
        }
        self.tags.push(tag.to_string());
        Some(self.render())
    }

    /// Removes the first exact match. The render event carries the full
    /// remaining list so the view redraws instead of patching by index.
    pub fn remove(&mut self, text: &str) -> Option<WizardEvent> {
        let idx = self.tags.iter().position(|t| t == text)?;
        self.tags.remove(idx);
        Some(self.render())
    }

    pub fn contains(&self, text: &str) -> bool {
        self.tags.iter().any(|t| t == text)
    }

    pub fn items(&self) -> &[String] {
        &self.tags
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    fn render(&self) -> WizardEvent {
        WizardEvent::TagsRendered(self.tags.clone())
    }
}
