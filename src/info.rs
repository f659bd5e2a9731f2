//! Info card for the selected region.

use std::fmt;

use crate::region::{Region, RegionId, RegionRegistry};

pub const PLACEHOLDER_TITLE: &str = "Interactive Human Body";
pub const PLACEHOLDER_BODY: &str = "Click on any part of the body to learn more about it.";

/// Text shown in the side panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoCard {
    pub region: Option<RegionId>,
    pub title: String,
    pub description: String,
    pub functions: Vec<String>,
}

impl InfoCard {
    /// Card shown when nothing is selected.
    pub fn placeholder() -> Self {
        Self {
            region: None,
            title: PLACEHOLDER_TITLE.to_string(),
            description: PLACEHOLDER_BODY.to_string(),
            functions: Vec::new(),
        }
    }

    pub fn for_region(region: &Region) -> Self {
        Self {
            region: Some(region.id),
            title: region.label.clone(),
            description: region.description.clone(),
            functions: region.functions.clone(),
        }
    }

    /// Card for the current selection; the placeholder when `selected` is none.
    ///
    /// # Panics
    ///
    /// Panics if `selected` names a region missing from the registry.
    pub fn for_selection(registry: &RegionRegistry, selected: Option<RegionId>) -> Self {
        match selected {
            Some(id) => {
                let region = registry
                    .lookup(id)
                    .unwrap_or_else(|| panic!("selected region '{id}' missing from the registry"));
                Self::for_region(region)
            }
            None => Self::placeholder(),
        }
    }

    /// Whether the card has a close button (only for a selected region).
    pub fn is_closable(&self) -> bool {
        self.region.is_some()
    }
}

impl fmt::Display for InfoCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        write!(f, "{}", self.description)?;
        if !self.functions.is_empty() {
            write!(f, "\n\nFunctions:")?;
            for function in &self.functions {
                write!(f, "\n  - {function}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder() {
        let card = InfoCard::for_selection(&RegionRegistry::builtin(), None);
        assert_eq!(card, InfoCard::placeholder());
        assert_eq!(card.title, "Interactive Human Body");
        assert!(!card.is_closable());
        assert_eq!(
            card.to_string(),
            "Interactive Human Body\nClick on any part of the body to learn more about it."
        );
    }

    #[test]
    fn test_region_card() {
        let registry = RegionRegistry::builtin();
        let card = InfoCard::for_selection(&registry, Some(RegionId::Head));
        assert_eq!(card.title, "Head");
        assert!(card.is_closable());
        assert!(!card.functions.is_empty());
        let text = card.to_string();
        assert!(text.starts_with("Head\n"));
        assert!(text.contains("Functions:"));
        assert!(text.contains("  - Houses the brain"));
    }

    #[test]
    fn test_every_region_has_content() {
        let registry = RegionRegistry::builtin();
        for id in RegionId::ALL {
            let card = InfoCard::for_selection(&registry, Some(id));
            assert!(!card.description.is_empty(), "{id} has no description");
            assert!(!card.functions.is_empty(), "{id} has no functions");
        }
    }
}
