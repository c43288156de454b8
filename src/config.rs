use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::model::ArticleListPagination;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://articles.db";
pub const DEFAULT_SAVE_DEBOUNCE: Duration = Duration::from_millis(200);

mod consts {
    use lazy_static::lazy_static;
    use std::env;

    lazy_static! {
        pub(crate) static ref DATABASE_URL: Option<String> = env::var("DATABASE_URL").ok();
        pub(crate) static ref SAVE_DEBOUNCE_MS: Option<String> =
            env::var("SAVE_DEBOUNCE_MS").ok();
        pub(crate) static ref ARTICLES_PAGE: Option<String> = env::var("ARTICLES_PAGE").ok();
        pub(crate) static ref ARTICLES_PER_PAGE: Option<String> =
            env::var("ARTICLES_PER_PAGE").ok();
    }
}

/// Runtime settings of the editor.
#[derive(Debug, Clone)]
pub struct EditorConfig {
    pub database_url: String,
    /// Quiet period a save intent has to survive before it is written
    pub save_debounce: Duration,
    pub pagination: ArticleListPagination,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.into(),
            save_debounce: DEFAULT_SAVE_DEBOUNCE,
            pagination: ArticleListPagination::default(),
        }
    }
}

impl EditorConfig {
    /// Reads `DATABASE_URL`, `SAVE_DEBOUNCE_MS`, `ARTICLES_PAGE` and
    /// `ARTICLES_PER_PAGE`, keeping the default for anything unset or invalid.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let debounce_ms = parse_or(
            "SAVE_DEBOUNCE_MS",
            consts::SAVE_DEBOUNCE_MS.as_deref(),
            defaults.save_debounce.as_millis() as u64,
        );
        let page = parse_or(
            "ARTICLES_PAGE",
            consts::ARTICLES_PAGE.as_deref(),
            defaults.pagination.page,
        );
        let per_page = parse_or(
            "ARTICLES_PER_PAGE",
            consts::ARTICLES_PER_PAGE.as_deref(),
            defaults.pagination.per_page,
        );

        Self {
            database_url: consts::DATABASE_URL
                .clone()
                .unwrap_or(defaults.database_url),
            save_debounce: Duration::from_millis(debounce_ms),
            pagination: ArticleListPagination {
                page: page.max(1),
                per_page: per_page.max(1),
            },
        }
    }

    pub fn with_save_debounce(mut self, save_debounce: Duration) -> Self {
        self.save_debounce = save_debounce;
        self
    }
}

fn parse_or<T>(name: &str, raw: Option<&str>, default: T) -> T
where
    T: FromStr + Copy + std::fmt::Display,
{
    match raw.map(str::trim) {
        None | Some("") => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid {} value {:?}, using {}", name, raw, default);
            default
        }),
    }
}

/// Log filter for the binary, `RUST_LOG` wins when set.
pub fn log_filter() -> String {
    env::var("RUST_LOG").unwrap_or_else(|_| "uc_blog_editor=debug".into())
}
