//! Line-terminal stand-ins for the editor widgets.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

use pulldown_cmark::{html, Options, Parser};

use crate::backend::{ConfirmationDialog, EditingSurface, NotificationSink};
use crate::error::EditorError;

/// Markdown body being edited.
#[derive(Debug, Default)]
pub struct BufferSurface {
    buffer: Mutex<String>,
}

impl BufferSurface {
    pub fn append_line(&self, line: &str) {
        let mut buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        if !buffer.is_empty() {
            buffer.push('\n');
        }
        buffer.push_str(line);
    }

    /// Renders the buffer as HTML, the way the blog will show it.
    pub fn preview(&self) -> String {
        let buffer = self.buffer.lock().unwrap_or_else(PoisonError::into_inner);
        let parser = Parser::new_ext(&buffer, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH);
        let mut out = String::with_capacity(buffer.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}

impl EditingSurface for BufferSurface {
    fn content(&self) -> String {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_content(&self, content: &str) {
        *self.buffer.lock().unwrap_or_else(PoisonError::into_inner) = content.to_string();
    }

    fn clear(&self) {
        self.buffer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[derive(Debug, Default)]
pub struct StdoutNotifier;

impl NotificationSink for StdoutNotifier {
    fn success(&self, message: &str, title: &str) {
        tracing::info!("{}: {}", title, message);
        println!("[{title}] {message}");
    }

    fn warning(&self, message: &str, title: &str) {
        tracing::warn!("{}: {}", title, message);
        println!("[{title}] {message}");
    }

    fn error(&self, err: &EditorError) {
        tracing::error!("{}", err);
        println!("[Error] {err}");
    }
}

/// Prints the prompt and waits for a `yes` or `no` command.
#[derive(Debug, Default)]
pub struct PromptDialog {
    visible: AtomicBool,
}

impl PromptDialog {
    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }
}

impl ConfirmationDialog for PromptDialog {
    fn show(&self, prompt: &str) {
        self.visible.store(true, Ordering::SeqCst);
        println!("{prompt} [yes/no]");
    }

    fn hide(&self) {
        self.visible.store(false, Ordering::SeqCst);
    }
}
