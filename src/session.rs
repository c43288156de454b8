use crate::model::{ArticleDraft, Page};

/// The article currently loaded in the editor.
///
/// `article_id` is `Some` exactly when saving updates an existing article.
/// `revision` moves on every load or clear, so a write dispatched from an
/// older session can tell it no longer owns the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorSession {
    article_id: Option<String>,
    pub title: String,
    pub content: String,
    revision: u64,
}

impl EditorSession {
    pub fn article_id(&self) -> Option<&str> {
        self.article_id.as_deref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_new(&self) -> bool {
        self.article_id.is_none()
    }

    /// Loads `id` from `page`. Returns the loaded content, or `None` when
    /// the article is not on the page and the session was left alone.
    pub fn load(&mut self, page: &Page, id: &str) -> Option<&str> {
        let article = page.find(id)?;
        *self = Self {
            article_id: non_empty(&article.id),
            title: article.title.clone(),
            content: article.content.clone(),
            revision: self.revision + 1,
        };
        Some(&self.content)
    }

    pub fn clear(&mut self) {
        *self = Self {
            revision: self.revision + 1,
            ..Self::default()
        };
    }

    /// Takes over the id of a freshly created article, unless the editor has
    /// moved on since the create was dispatched.
    pub fn adopt_created(&mut self, revision: u64, id: &str) -> bool {
        if self.revision != revision || self.article_id.is_some() {
            return false;
        }
        self.article_id = non_empty(id);
        self.article_id.is_some()
    }

    /// Draft for the save stream, `None` while title or content is empty.
    pub fn draft(&self) -> Option<ArticleDraft> {
        if self.title.is_empty() || self.content.is_empty() {
            return None;
        }
        Some(ArticleDraft::new(self.title.clone(), self.content.clone()))
    }
}

fn non_empty(id: &str) -> Option<String> {
    (!id.is_empty()).then(|| id.to_string())
}
