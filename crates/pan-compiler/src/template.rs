use crate::statement::Statement;
use std::sync::Arc;

/// Everything needed to build one object: its name and the statements of
/// the object template followed by everything it includes, in order.
///
/// Included statement lists are shared between objects through `Arc`.
#[derive(Debug, Clone)]
pub struct ObjectTemplate {
    name: String,
    sections: Vec<Arc<[Statement]>>,
}

impl ObjectTemplate {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sections: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a statement list shared with other templates.
    pub fn include(mut self, section: Arc<[Statement]>) -> Self {
        self.sections.push(section);
        self
    }

    pub fn statement(mut self, statement: Statement) -> Self {
        self.sections.push(Arc::from(vec![statement]));
        self
    }

    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.sections.iter().flat_map(|section| section.iter())
    }
}
