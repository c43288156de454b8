//! In-memory article list kept in step with single-item backend results.
//!
//! Every operation builds the complete next [`Page`] and swaps it in, so a
//! reader never sees a half-applied mutation.

use crate::model::{Article, ArticleDraft, ArticleStatus, Page};

/// What a confirmed write did on the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveResult {
    Created { id: String, draft: ArticleDraft },
    Updated { id: String, draft: ArticleDraft },
}

#[derive(Debug, Clone, Default)]
pub struct ListStore {
    page: Page,
}

impl ListStore {
    pub fn new(page: Page) -> Self {
        Self { page }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Wholesale replacement after a list fetch.
    pub fn replace(&mut self, page: Page) {
        self.page = page;
    }

    /// Returns `false` when an update targets an article not on this page.
    pub fn apply_save_result(&mut self, result: &SaveResult) -> bool {
        match result {
            SaveResult::Updated { id, draft } => self.patch(id, |article| Article {
                title: draft.title.clone(),
                content: draft.content.clone(),
                ..article.clone()
            }),
            SaveResult::Created { id, draft } => {
                let mut data = self.page.data.clone();
                data.push(Article {
                    id: id.clone(),
                    title: draft.title.clone(),
                    content: draft.content.clone(),
                    status: ArticleStatus::Active,
                    projects: Vec::new(),
                });
                self.page = Page {
                    count: self.page.count + 1,
                    data,
                };
                true
            }
        }
    }

    pub fn apply_status_change(&mut self, id: &str, status: ArticleStatus) -> bool {
        self.patch(id, |article| Article {
            status,
            ..article.clone()
        })
    }

    /// Drops the article from the current page. `count` is left as is.
    pub fn apply_deletion(&mut self, id: &str) -> bool {
        if self.page.find(id).is_none() {
            return false;
        }
        self.page = Page {
            count: self.page.count,
            data: self
                .page
                .data
                .iter()
                .filter(|article| article.id != id)
                .cloned()
                .collect(),
        };
        true
    }

    fn patch<F>(&mut self, id: &str, f: F) -> bool
    where
        F: Fn(&Article) -> Article,
    {
        if self.page.find(id).is_none() {
            return false;
        }
        self.page = Page {
            count: self.page.count,
            data: self
                .page
                .data
                .iter()
                .map(|article| if article.id == id { f(article) } else { article.clone() })
                .collect(),
        };
        true
    }
}
