//! Deduplicated asynchronous resource loading
//!
//! Each name maps to one task that is pending, loaded or failed. Loading a
//! name that already has a task never fetches again; every caller shares the
//! same outcome. The pending and error counts are derived from the task set.
//!
//! Fetching is delegated to a [`Fetch`] implementation which reports back
//! through a [`Completion`], possibly before `fetch` even returns. Results are
//! consumed on the same thread, so tasks are `Rc<RefCell<..>>`.

use std::cell::RefCell;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use crate::error::GameError;

/// Source of raw resources, e.g. decoded images
pub trait Fetch<T> {
    /// Begin fetching `url` and finish through `completion`
    fn fetch(&self, url: &str, completion: Completion<T>);
}

type LoadedCallback<T> = Box<dyn FnOnce(Rc<T>)>;

enum TaskState<T> {
    Pending {
        wakers: Vec<Waker>,
        callbacks: Vec<LoadedCallback<T>>,
    },
    Loaded(Rc<T>),
    Failed(String),
}

type Task<T> = Rc<RefCell<TaskState<T>>>;

fn pending_task<T>() -> Task<T> {
    Rc::new(RefCell::new(TaskState::Pending {
        wakers: Vec::new(),
        callbacks: Vec::new(),
    }))
}

/// One-shot reply slot handed to a fetcher.
///
/// Dropping it without resolving fails the load.
pub struct Completion<T> {
    name: String,
    task: Option<Task<T>>,
}

impl<T> Completion<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resolve(mut self, value: T) {
        self.finish(Ok(value));
    }

    pub fn reject(mut self, reason: impl Into<String>) {
        self.finish(Err(reason.into()));
    }

    fn finish(&mut self, outcome: Result<T, String>) {
        let Some(task) = self.task.take() else {
            return;
        };

        let (wakers, callbacks, loaded) = {
            let mut state = task.borrow_mut();
            let (wakers, callbacks) = match &mut *state {
                TaskState::Pending { wakers, callbacks } => {
                    (std::mem::take(wakers), std::mem::take(callbacks))
                }
                // already settled through `set`
                _ => return,
            };
            let loaded = match outcome {
                Ok(value) => {
                    let value = Rc::new(value);
                    *state = TaskState::Loaded(value.clone());
                    log::debug!("Resource {} loaded", self.name);
                    Some(value)
                }
                Err(reason) => {
                    log::error!("Resource {} failed to load: {}", self.name, reason);
                    *state = TaskState::Failed(reason);
                    None
                }
            };
            (wakers, callbacks, loaded)
        };

        if let Some(value) = loaded {
            for callback in callbacks {
                callback(value.clone());
            }
        }
        for waker in wakers {
            waker.wake();
        }
    }
}

impl<T> Drop for Completion<T> {
    fn drop(&mut self) {
        if self.task.is_some() {
            self.finish(Err("fetch abandoned".to_string()));
        }
    }
}

/// Future for one named load; resolves to the shared value or the failure
pub struct LoadHandle<T> {
    name: String,
    task: Task<T>,
}

impl<T> LoadHandle<T> {
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> Future for LoadHandle<T> {
    type Output = Result<Rc<T>, GameError>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut state = self.task.borrow_mut();
        match &mut *state {
            TaskState::Loaded(value) => Poll::Ready(Ok(value.clone())),
            TaskState::Failed(reason) => Poll::Ready(Err(GameError::ResourceFailed {
                name: self.name.clone(),
                reason: reason.clone(),
            })),
            TaskState::Pending { wakers, .. } => {
                if !wakers.iter().any(|w| w.will_wake(cx.waker())) {
                    wakers.push(cx.waker().clone());
                }
                Poll::Pending
            }
        }
    }
}

pub struct ResourceLoader<T> {
    fetcher: Box<dyn Fetch<T>>,
    tasks: RefCell<HashMap<String, Task<T>>>,
}

impl<T: 'static> ResourceLoader<T> {
    pub fn new(fetcher: impl Fetch<T> + 'static) -> Self {
        Self {
            fetcher: Box::new(fetcher),
            tasks: RefCell::new(HashMap::new()),
        }
    }

    /// Load `name` from `url` unless a task for `name` already exists.
    ///
    /// A failed name stays failed until it is unloaded.
    pub fn load(&self, name: &str, url: &str) -> LoadHandle<T> {
        let task = {
            let mut tasks = self.tasks.borrow_mut();
            if let Some(task) = tasks.get(name) {
                return LoadHandle {
                    name: name.to_string(),
                    task: task.clone(),
                };
            }
            let task = pending_task();
            tasks.insert(name.to_string(), task.clone());
            task
        };

        log::debug!(
            "Requesting resource {} from {} ({} pending)",
            name,
            url,
            self.pending_count()
        );

        // the map borrow is released; the fetcher may complete synchronously
        self.fetcher.fetch(
            url,
            Completion {
                name: name.to_string(),
                task: Some(task.clone()),
            },
        );

        LoadHandle {
            name: name.to_string(),
            task,
        }
    }

    /// Fire-and-forget load; `on_loaded` runs once the value is available.
    /// Failures only show up in `error_count`.
    pub fn request_load(&self, name: &str, url: &str, on_loaded: impl FnOnce(Rc<T>) + 'static) {
        let handle = self.load(name, url);

        let ready = {
            let mut state = handle.task.borrow_mut();
            match &mut *state {
                TaskState::Pending { callbacks, .. } => {
                    callbacks.push(Box::new(on_loaded));
                    return;
                }
                TaskState::Loaded(value) => value.clone(),
                TaskState::Failed(_) => return,
            }
        };
        on_loaded(ready);
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// The loaded value, if any
    pub fn find(&self, name: &str) -> Option<Rc<T>> {
        let tasks = self.tasks.borrow();
        let state = tasks.get(name)?.borrow();
        match &*state {
            TaskState::Loaded(value) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn get(&self, name: &str) -> Result<Rc<T>, GameError> {
        self.find(name)
            .ok_or_else(|| GameError::ResourceNotLoaded(name.to_string()))
    }

    /// Insert an already available value under `name`, replacing any task
    pub fn set(&self, name: &str, value: T) {
        let task = Rc::new(RefCell::new(TaskState::Loaded(Rc::new(value))));
        self.tasks.borrow_mut().insert(name.to_string(), task);
    }

    pub fn unload(&self, name: &str) {
        if self.tasks.borrow_mut().remove(name).is_none() {
            log::warn!("Could not find resource {} when unloading", name);
        }
    }

    /// Distinct names still waiting on their fetch
    pub fn pending_count(&self) -> usize {
        self.count(|state| matches!(state, TaskState::Pending { .. }))
    }

    /// Distinct names whose fetch failed
    pub fn error_count(&self) -> usize {
        self.count(|state| matches!(state, TaskState::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&TaskState<T>) -> bool) -> usize {
        self.tasks
            .borrow()
            .values()
            .filter(|task| pred(&task.borrow()))
            .count()
    }
}
