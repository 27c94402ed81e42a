use {
    crate::classifier::Classifier,
    std::{collections::HashMap, fmt, sync::Arc},
};

/// Classifiers keyed by model id.
///
/// Filled once at startup, then shared read-only (usually behind an `Arc`)
/// by every request.
#[derive(Default)]
pub struct Registry {
    classifiers: HashMap<String, Arc<dyn Classifier>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: impl Into<String>, classifier: Arc<dyn Classifier>) {
        self.classifiers.insert(id.into(), classifier);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn Classifier>> {
        self.classifiers.get(id).cloned()
    }

    /// Registered ids, sorted.
    pub fn list(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.classifiers.keys().map(|s| s.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.classifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classifiers.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("classifiers", &self.list())
            .finish()
    }
}
