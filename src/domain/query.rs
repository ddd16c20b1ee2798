//! Recipe browsing modes
//!
//! The recipe list is either searched by a query string or ranked by how
//! well each recipe matches the kitchen. Typing a query always leaves
//! suggestion mode; asking for suggestions clears the query.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryMode {
    #[default]
    Search,
    Suggesting,
}

/// Current query string and mode
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct RecipeQuery {
    mode: QueryMode,
    text: String,
}

impl RecipeQuery {
    pub fn search(text: impl Into<String>) -> Self {
        Self {
            mode: QueryMode::Search,
            text: text.into(),
        }
    }

    pub fn suggesting() -> Self {
        Self {
            mode: QueryMode::Suggesting,
            text: String::new(),
        }
    }

    pub fn mode(&self) -> QueryMode {
        self.mode
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_suggesting(&self) -> bool {
        self.mode == QueryMode::Suggesting
    }

    /// Any query text, empty or not, returns to search mode
    pub fn set_query(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.mode = QueryMode::Search;
    }

    pub fn suggest(&mut self) {
        self.text.clear();
        self.mode = QueryMode::Suggesting;
    }

    pub fn clear_suggestions(&mut self) {
        self.text.clear();
        self.mode = QueryMode::Search;
    }
}
