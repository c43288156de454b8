use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Publication flag of an article. Stored and serialized as a boolean,
/// `true` meaning active.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(from = "bool", into = "bool")]
pub enum ArticleStatus {
    #[default]
    Active,
    Inactive,
}

impl From<bool> for ArticleStatus {
    fn from(active: bool) -> Self {
        if active {
            Self::Active
        } else {
            Self::Inactive
        }
    }
}

impl From<ArticleStatus> for bool {
    fn from(status: ArticleStatus) -> Self {
        matches!(status, ArticleStatus::Active)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ProjectRef {
    pub id: String,
    pub name: String,
}

/// An article as listed on a page. `id` is empty until the backend assigns one.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub content: String,
    pub status: ArticleStatus,
    #[serde(default)]
    pub projects: Vec<ProjectRef>,
}

/// Create/update payload. Compared by value in the save pipeline.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct ArticleDraft {
    pub title: String,
    pub content: String,
}

impl ArticleDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// One page of the article list. `count` covers every page, `data` only this one.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Page {
    pub count: u64,
    pub data: Vec<Article>,
}

impl Page {
    pub fn find(&self, id: &str) -> Option<&Article> {
        self.data.iter().find(|article| article.id == id)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ArticleListPagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for ArticleListPagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 10,
        }
    }
}

/// Row shape of the `articles` table
#[derive(Debug, FromRow)]
pub struct ArticleRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub status: bool,
}

#[derive(Debug, FromRow)]
pub struct ProjectRow {
    pub id: i64,
    pub name: String,
}
