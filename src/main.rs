//! Terminal front end for the article editor.
//!
//! Reads one command per line from stdin:
//! ```text
//! list | json | refresh | new | edit <id> | title <text> | content <text>
//! append <text> | preview | save | delete <id> | status <id> on|off
//! project <id> <name> | yes | no | quit
//! ```

use std::sync::Arc;

use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio_stream::{wrappers::LinesStream, StreamExt};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use uc_blog_editor::config;
use uc_blog_editor::terminal::{BufferSurface, PromptDialog, StdoutNotifier};
use uc_blog_editor::{
    ArticleStatus, Collaborators, EditingSurface, EditorConfig, EditorError, ListController, Page,
    SqliteBackend,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config::log_filter()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), EditorError> {
    let config = EditorConfig::from_env();
    tracing::debug!("{:?}", config);

    let backend = Arc::new(SqliteBackend::connect(&config.database_url, config.pagination).await?);
    let surface = Arc::new(BufferSurface::default());
    let controller = ListController::new(
        &config,
        Collaborators {
            backend: backend.clone(),
            surface: surface.clone(),
            notifier: Arc::new(StdoutNotifier),
            dialog: Arc::new(PromptDialog::default()),
        },
    );

    controller.refresh().await?;
    render(&controller.page().await);

    let mut pages = controller.subscribe();
    let mut lines = LinesStream::new(BufReader::new(io::stdin()).lines());

    loop {
        tokio::select! {
            changed = pages.changed() => {
                if changed.is_err() {
                    break;
                }
                let page = pages.borrow_and_update().clone();
                render(&page);
            }
            line = lines.next() => {
                let Some(line) = line else { break };
                let line = match line {
                    Ok(line) => line,
                    Err(e) => {
                        tracing::error!("Failed to read stdin: {}", e);
                        break;
                    }
                };
                if !handle(&controller, &backend, &surface, line.trim()).await {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Returns `false` when the user asked to quit.
async fn handle(
    controller: &ListController,
    backend: &SqliteBackend,
    surface: &BufferSurface,
    line: &str,
) -> bool {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match command {
        "" => {}
        "quit" | "exit" => return false,
        "list" => render(&controller.page().await),
        "json" => match serde_json::to_string_pretty(&controller.page().await) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!("Failed to serialize page: {}", e),
        },
        "refresh" => {
            if let Err(e) = controller.refresh().await {
                println!("[Error] {e}");
            }
        }
        "new" => controller.clear().await,
        "edit" => {
            if !controller.load_for_edit(rest).await {
                println!("No article {rest} on this page");
            }
        }
        "title" => controller.set_title(rest).await,
        "content" => surface.set_content(rest),
        "append" => surface.append_line(rest),
        "preview" => println!("{}", surface.preview()),
        // validation failures are already shown as a warning
        "save" => {
            let _ = controller.save().await;
        }
        "delete" => controller.request_delete(rest).await,
        "status" => match rest.split_once(' ') {
            Some((id, "on")) => controller.request_status_change(id, ArticleStatus::Active).await,
            Some((id, "off")) => {
                controller
                    .request_status_change(id, ArticleStatus::Inactive)
                    .await
            }
            _ => println!("usage: status <id> on|off"),
        },
        "project" => match rest.split_once(' ') {
            Some((id, name)) => match backend.add_project(id, name.trim()).await {
                Ok(true) => {
                    if let Err(e) = controller.refresh().await {
                        println!("[Error] {e}");
                    }
                }
                Ok(false) => println!("No article {id}"),
                Err(e) => println!("[Error] {e}"),
            },
            None => println!("usage: project <id> <name>"),
        },
        "yes" => {
            if controller.confirm().await.is_none() {
                println!("Nothing to confirm");
            }
        }
        "no" => {
            controller.cancel().await;
        }
        other => println!("Unknown command: {other}"),
    }
    true
}

fn render(page: &Page) {
    println!("{} articles", page.count);
    for article in &page.data {
        let status = match article.status {
            ArticleStatus::Active => "active",
            ArticleStatus::Inactive => "inactive",
        };
        let projects: Vec<_> = article.projects.iter().map(|p| p.name.as_str()).collect();
        println!(
            "  [{}] {} ({}) {}",
            article.id,
            article.title,
            status,
            projects.join(", ")
        );
    }
}
