use tokio::sync::broadcast::{self, error::RecvError};

use super::{Mode, Phase, Toast, ToastEvent};

const BAR_WIDTH: usize = 20;

/// Something that draws toasts from board events.
pub trait ToastView {
    fn apply(&mut self, event: &ToastEvent);
}

/// Feeds every event from `events` into `view` until the board goes away.
pub async fn follow<V: ToastView>(mut events: broadcast::Receiver<ToastEvent>, view: &mut V) {
    loop {
        match events.recv().await {
            Ok(event) => view.apply(&event),
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Toast view fell behind");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// One-line text rendering, e.g. `[##########----------]  50% Uploading`.
pub fn render_line(toast: &Toast) -> String {
    let bar = match toast.mode {
        Mode::Indeterminate => "~".repeat(BAR_WIDTH),
        Mode::Determinate => {
            let filled = (((toast.percent / 100.0) * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);
            format!("{}{}", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
        }
    };

    let marker = match toast.phase {
        Phase::InProgress => "",
        Phase::Succeeded => " ✓",
        Phase::Failed => " ✗",
    };

    match toast.mode {
        Mode::Indeterminate => format!("[{bar}] {}{marker}", toast.label),
        Mode::Determinate => format!("[{bar}] {:>4} {}{marker}", toast.percent_text(), toast.label),
    }
}

/// Keeps rendered lines for every live toast. The host list is created on the
/// first toast and stays around afterwards.
#[derive(Debug, Default)]
pub struct TextView {
    host: Option<Vec<(String, String)>>,
}

impl TextView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_host(&self) -> bool {
        self.host.is_some()
    }

    pub fn line(&self, id: &str) -> Option<&str> {
        self.host
            .as_ref()?
            .iter()
            .find(|(toast_id, _)| toast_id == id)
            .map(|(_, line)| line.as_str())
    }

    pub fn lines(&self) -> Vec<&str> {
        self.host
            .iter()
            .flatten()
            .map(|(_, line)| line.as_str())
            .collect()
    }
}

impl ToastView for TextView {
    fn apply(&mut self, event: &ToastEvent) {
        match event {
            ToastEvent::Shown(toast) => {
                let host = self.host.get_or_insert_with(Vec::new);
                host.retain(|(id, _)| id != &toast.id);
                host.push((toast.id.clone(), render_line(toast)));
            }
            ToastEvent::Updated(toast) | ToastEvent::Completed(toast) => {
                if let Some(entry) = self
                    .host
                    .iter_mut()
                    .flatten()
                    .find(|(id, _)| id == &toast.id)
                {
                    entry.1 = render_line(toast);
                }
            }
            ToastEvent::Removed(id) => {
                if let Some(host) = self.host.as_mut() {
                    host.retain(|(toast_id, _)| toast_id != id);
                }
            }
        }
    }
}
