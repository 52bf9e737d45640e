use gloo_timers::callback::Timeout;
use leptos::prelude::*;

const TOAST_LIFETIME_MS: u32 = 4_000;
const MAX_VISIBLE_TOASTS: usize = 4;
const ERROR_ACCENT: &str = "#f26d6d";

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub id: u64,
    pub message: String,
}

/// Ordered toast stack, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToastQueue {
    next_id: u64,
    items: Vec<Toast>,
}

impl ToastQueue {
    /// Append a toast and return its id. The oldest toasts are dropped once
    /// the stack is full.
    pub fn push(&mut self, message: impl Into<String>) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.items.push(Toast {
            id,
            message: message.into(),
        });
        if self.items.len() > MAX_VISIBLE_TOASTS {
            let overflow = self.items.len() - MAX_VISIBLE_TOASTS;
            self.items.drain(..overflow);
        }
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|t| t.id != id);
    }

    pub fn items(&self) -> &[Toast] {
        &self.items
    }
}

/// Handle to the page's toast layer, shared through context.
#[derive(Clone, Copy)]
pub struct Toasts(RwSignal<ToastQueue>);

impl Default for Toasts {
    fn default() -> Self {
        Self::new()
    }
}

impl Toasts {
    pub fn new() -> Self {
        Self(RwSignal::new(ToastQueue::default()))
    }

    /// Show an error toast that disappears on its own after a few seconds.
    pub fn error(&self, message: &str) {
        let mut id = 0;
        self.0.update(|q| id = q.push(message));
        self.schedule_dismiss(id);
    }

    pub fn dismiss(&self, id: u64) {
        // The timer can outlive the page's reactive owner.
        let _ = self.0.try_update(|q| q.dismiss(id));
    }

    fn schedule_dismiss(&self, id: u64) {
        let toasts = *self;
        Timeout::new(TOAST_LIFETIME_MS, move || toasts.dismiss(id)).forget();
    }
}

/// Fixed stack of notifications in the top-right corner. Click to dismiss.
#[component]
pub fn ToastHost() -> impl IntoView {
    let toasts: Toasts = expect_context();

    view! {
        <div style="position: fixed; top: 16px; right: 16px; z-index: 200; display: flex; flex-direction: column; gap: 8px; max-width: 320px;">
            <For
                each=move || toasts.0.with(|q| q.items().to_vec())
                key=|toast| toast.id
                children=move |toast| {
                    let id = toast.id;
                    view! {
                        <div
                            role="alert"
                            style=format!(
                                "background: #101728; color: #e2e6f0; border: 1px solid #1f2a44; border-left: 3px solid {}; border-radius: 10px; padding: 10px 14px; font-size: 0.85rem; box-shadow: 0 6px 20px rgba(0,0,0,0.45); cursor: pointer;",
                                ERROR_ACCENT,
                            )
                            on:click=move |_| toasts.dismiss(id)
                        >
                            {toast.message}
                        </div>
                    }
                }
            />
        </div>
    }
}
