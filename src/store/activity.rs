//! Per-category loading/error sub-states.

use std::collections::BTreeMap;

use serde::Serialize;

/// Loading flag and last error for one action category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Activity {
    pub loading: bool,
    pub error: Option<String>,
}

/// Named sub-states of one domain, keyed by its category enum.
///
/// Categories never share a flag: a slow balance fetch does not hold the
/// apply button's spinner, and a failed apply does not hide the balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Activities<C: Ord>(BTreeMap<C, Activity>);

impl<C: Ord> Default for Activities<C> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<C: Ord + Copy> Activities<C> {
    pub fn get(&self, category: C) -> Activity {
        self.0.get(&category).cloned().unwrap_or_default()
    }

    pub fn is_loading(&self, category: C) -> bool {
        self.0.get(&category).is_some_and(|a| a.loading)
    }

    pub fn error(&self, category: C) -> Option<&str> {
        self.0.get(&category).and_then(|a| a.error.as_deref())
    }

    /// True while any category of the domain is in flight.
    pub fn any_loading(&self) -> bool {
        self.0.values().any(|a| a.loading)
    }

    /// First error across categories, in category order.
    pub fn first_error(&self) -> Option<&str> {
        self.0.values().find_map(|a| a.error.as_deref())
    }

    /// Marks `category` in flight and clears its previous error.
    pub fn start(&mut self, category: C) {
        self.0.insert(
            category,
            Activity {
                loading: true,
                error: None,
            },
        );
    }

    pub fn succeed(&mut self, category: C) {
        self.0.insert(category, Activity::default());
    }

    pub fn fail(&mut self, category: C, message: String) {
        self.0.insert(
            category,
            Activity {
                loading: false,
                error: Some(message),
            },
        );
    }

    /// Forgets `category` entirely.
    pub fn clear(&mut self, category: C) {
        self.0.remove(&category);
    }

    /// Ends the in-flight state without touching the error.
    pub fn settle(&mut self, category: C) {
        if let Some(activity) = self.0.get_mut(&category) {
            activity.loading = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    enum Kind {
        Fetch,
        Save,
    }

    #[test]
    fn test_categories_are_independent() {
        let mut activities = Activities::default();
        activities.start(Kind::Fetch);
        activities.fail(Kind::Save, "boom".to_string());

        assert!(activities.is_loading(Kind::Fetch));
        assert!(!activities.is_loading(Kind::Save));
        assert_eq!(activities.error(Kind::Save), Some("boom"));
        assert_eq!(activities.error(Kind::Fetch), None);

        activities.succeed(Kind::Fetch);
        assert!(!activities.any_loading());
        assert_eq!(activities.first_error(), Some("boom"));
    }

    #[test]
    fn test_start_clears_previous_error() {
        let mut activities = Activities::default();
        activities.fail(Kind::Save, "boom".to_string());
        activities.start(Kind::Save);
        assert_eq!(activities.get(Kind::Save).error, None);

        activities.settle(Kind::Save);
        assert_eq!(activities.get(Kind::Save), Activity::default());
    }
}
