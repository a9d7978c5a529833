//! Progress toasts as plain state.
//!
//! [`ToastBoard`] owns every visible toast and publishes a [`ToastEvent`] for
//! each change. Rendering lives elsewhere (see [`render`]) and only follows
//! the event stream.

pub mod render;

use chrono::Utc;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::broadcast;

pub const DEFAULT_LABEL: &str = "Working…";
pub const DEFAULT_AUTOHIDE: Duration = Duration::from_millis(1500);
const EVENT_CAPACITY: usize = 64;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Determinate,
    Indeterminate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    InProgress,
    Succeeded,
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        !matches!(self, Phase::InProgress)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Toast {
    pub id: String,
    pub label: String,
    pub percent: f64,
    pub mode: Mode,
    pub phase: Phase,
}

impl Toast {
    /// Bar width, e.g. `"33.5%"`.
    pub fn width(&self) -> String {
        format!("{}%", self.percent)
    }

    /// Rounded percentage shown next to the bar, e.g. `"34%"`.
    pub fn percent_text(&self) -> String {
        format!("{}%", self.percent.round() as u8)
    }
}

#[derive(Clone, Debug)]
pub struct ShowOptions {
    pub id: Option<String>,
    pub label: String,
    pub determinate: bool,
}

impl Default for ShowOptions {
    fn default() -> Self {
        Self {
            id: None,
            label: DEFAULT_LABEL.to_string(),
            determinate: true,
        }
    }
}

impl ShowOptions {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn indeterminate(mut self) -> Self {
        self.determinate = false;
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ToastEvent {
    Shown(Toast),
    Updated(Toast),
    Completed(Toast),
    Removed(String),
}

struct Entry {
    generation: u64,
    toast: Toast,
}

struct Inner {
    toasts: Vec<Entry>,
    next_generation: u64,
    events: broadcast::Sender<ToastEvent>,
}

impl Inner {
    fn find_mut(&mut self, id: &str) -> Option<&mut Entry> {
        self.toasts.iter_mut().find(|e| e.toast.id == id)
    }
}

/// Cloneable handle to the set of live toasts.
#[derive(Clone)]
pub struct ToastBoard {
    inner: Arc<Mutex<Inner>>,
}

impl Default for ToastBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl ToastBoard {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        ToastBoard {
            inner: Arc::new(Mutex::new(Inner {
                toasts: Vec::new(),
                next_generation: 0,
                events,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ToastEvent> {
        self.lock().events.subscribe()
    }

    pub fn show(&self, options: ShowOptions) -> String {
        let mut inner = self.lock();
        let id = match options.id {
            Some(id) => id,
            None => fresh_id(&inner.toasts),
        };

        let toast = Toast {
            id: id.clone(),
            label: options.label,
            percent: 0.0,
            mode: if options.determinate { Mode::Determinate } else { Mode::Indeterminate },
            phase: Phase::InProgress,
        };

        // A repeated id replaces the earlier toast.
        let generation = inner.next_generation;
        inner.next_generation += 1;
        inner.toasts.retain(|e| e.toast.id != id);
        inner.toasts.push(Entry {
            generation,
            toast: toast.clone(),
        });
        let _ = inner.events.send(ToastEvent::Shown(toast));
        id
    }

    /// Moves a running toast to `percent`. Unknown or finished ids are ignored.
    pub fn update(&self, id: &str, percent: f64, label: Option<&str>) {
        let mut inner = self.lock();
        let Some(Entry { toast, .. }) = inner.find_mut(id) else {
            return;
        };
        if toast.phase.is_terminal() {
            return;
        }

        toast.percent = clamp_percent(percent);
        toast.mode = Mode::Determinate;
        if let Some(label) = label {
            toast.label = label.to_string();
        }

        let snapshot = toast.clone();
        let _ = inner.events.send(ToastEvent::Updated(snapshot));
    }

    pub fn complete(&self, id: &str, success: bool) {
        self.complete_after(id, success, DEFAULT_AUTOHIDE);
    }

    /// Finishes a toast and schedules its removal after `autohide`.
    pub fn complete_after(&self, id: &str, success: bool, autohide: Duration) {
        let generation = {
            let mut inner = self.lock();
            let Some(Entry { generation, toast }) = inner.find_mut(id) else {
                return;
            };
            if toast.phase.is_terminal() {
                return;
            }

            toast.percent = 100.0;
            toast.mode = Mode::Determinate;
            toast.phase = if success { Phase::Succeeded } else { Phase::Failed };

            let snapshot = toast.clone();
            let generation = *generation;
            let _ = inner.events.send(ToastEvent::Completed(snapshot));
            generation
        };

        self.schedule_removal(id.to_string(), generation, autohide);
    }

    /// The timer only removes the toast it was started for; a toast shown
    /// again under the same id is left alone.
    fn schedule_removal(&self, id: String, generation: u64, delay: Duration) {
        let board = self.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::time::sleep(delay).await;
                    board.remove_finished(&id, generation);
                });
            }
            Err(_) => {
                std::thread::spawn(move || {
                    std::thread::sleep(delay);
                    board.remove_finished(&id, generation);
                });
            }
        }
    }

    /// Drops a toast right away. Returns whether it was still present.
    pub fn remove(&self, id: &str) -> bool {
        self.remove_where(id, |_| true)
    }

    fn remove_finished(&self, id: &str, generation: u64) {
        self.remove_where(id, |e| e.generation == generation && e.toast.phase.is_terminal());
    }

    fn remove_where(&self, id: &str, pred: impl Fn(&Entry) -> bool) -> bool {
        let mut inner = self.lock();
        let before = inner.toasts.len();
        inner.toasts.retain(|e| e.toast.id != id || !pred(e));
        let removed = inner.toasts.len() != before;
        if removed {
            let _ = inner.events.send(ToastEvent::Removed(id.to_string()));
        }
        removed
    }

    pub fn get(&self, id: &str) -> Option<Toast> {
        self.lock()
            .toasts
            .iter()
            .find(|e| e.toast.id == id)
            .map(|e| e.toast.clone())
    }

    /// Live toasts in the order they were shown.
    pub fn toasts(&self) -> Vec<Toast> {
        self.lock().toasts.iter().map(|e| e.toast.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().toasts.is_empty()
    }
}

fn clamp_percent(percent: f64) -> f64 {
    if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 100.0) }
}

fn fresh_id(existing: &[Entry]) -> String {
    let base = format!("toast-{}", Utc::now().timestamp_millis());
    let taken = |candidate: &str| existing.iter().any(|e| e.toast.id == candidate);
    if !taken(&base) {
        return base;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}
