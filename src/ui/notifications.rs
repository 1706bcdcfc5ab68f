//! Toast notifications
//!
//! Presents errors and confirmations. Session errors are mirrored here
//! automatically; pages push their own messages through [`Notifications`].

use std::collections::VecDeque;

use leptos::prelude::*;

use crate::ui::auth::use_session;

/// Maximum number of notifications to show at once
const MAX_NOTIFICATIONS: usize = 5;

/// Auto-dismiss delay
#[cfg_attr(not(feature = "hydrate"), allow(dead_code))]
const AUTO_DISMISS_MS: u32 = 5000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
}

/// Bounded FIFO of visible notices
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoticeQueue {
    items: VecDeque<Notice>,
    next_id: u64,
}

impl NoticeQueue {
    /// Add a notice, dropping the oldest past the limit. Returns its id.
    pub fn push(&mut self, kind: NoticeKind, message: impl Into<String>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.items.push_back(Notice {
            id,
            kind,
            message: message.into(),
        });
        while self.items.len() > MAX_NOTIFICATIONS {
            self.items.pop_front();
        }
        id
    }

    pub fn dismiss(&mut self, id: u64) {
        self.items.retain(|n| n.id != id);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Handle to the app-wide notice queue
#[derive(Clone, Copy)]
pub struct Notifications {
    queue: RwSignal<NoticeQueue>,
}

impl Notifications {
    pub fn new() -> Self {
        Self {
            queue: RwSignal::new(NoticeQueue::default()),
        }
    }

    pub fn notify(&self, kind: NoticeKind, message: impl Into<String>) {
        let message = message.into();
        let mut id = 0;
        self.queue.update(|q| id = q.push(kind, message));

        #[cfg(feature = "hydrate")]
        {
            use gloo_timers::future::TimeoutFuture;
            use leptos::task::spawn_local;

            let queue = self.queue;
            spawn_local(async move {
                TimeoutFuture::new(AUTO_DISMISS_MS).await;
                queue.update(|q| q.dismiss(id));
            });
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = id;
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(NoticeKind::Error, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(NoticeKind::Success, message);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(NoticeKind::Info, message);
    }

    pub fn dismiss(&self, id: u64) {
        self.queue.update(|q| q.dismiss(id));
    }
}

impl Default for Notifications {
    fn default() -> Self {
        Self::new()
    }
}

pub fn provide_notifications() -> Notifications {
    let notifications = Notifications::new();
    provide_context(notifications);
    notifications
}

pub fn use_notifications() -> Notifications {
    expect_context::<Notifications>()
}

/// Toast container; also turns session errors into toasts
#[component]
pub fn Toasts() -> impl IntoView {
    let notifications = use_notifications();
    let session = use_session().session;

    Effect::new(move |_| {
        if let Some(message) = session.error() {
            notifications.error(message);
            session.clear_error();
        }
    });

    let queue = notifications.queue;

    view! {
        <div class="fixed top-4 right-4 z-50 flex flex-col gap-2 max-w-sm">
            {move || {
                queue.with(|q| q.iter().cloned().collect::<Vec<_>>())
                    .into_iter()
                    .map(|notice| {
                        let id = notice.id;
                        let class = match notice.kind {
                            NoticeKind::Success => "bg-green-50 border-green-300 text-green-800",
                            NoticeKind::Error => "bg-red-50 border-red-300 text-red-800",
                            NoticeKind::Info => "bg-blue-50 border-blue-300 text-blue-800",
                        };
                        view! {
                            <div class=format!("flex items-start gap-3 p-4 rounded-lg border shadow-lg whitespace-pre-line {}", class)>
                                <p class="flex-1 text-sm">{notice.message}</p>
                                <button
                                    class="text-sm opacity-60 hover:opacity-100"
                                    on:click=move |_| notifications.dismiss(id)
                                >
                                    "×"
                                </button>
                            </div>
                        }
                    })
                    .collect_view()
            }}
        </div>
    }
}
