//! # fetchvisor
//!
//! **Fetchvisor** is a headless dispatch runtime for periodic background
//! work. An application registers a pair of callback identifiers; when the
//! platform scheduler fires a task while no live execution environment
//! exists, the runtime lazily launches exactly one background context, holds
//! dispatch requests until that context signals readiness, then delivers
//! every request to the registered client callback - in order, exactly once
//! each.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   scheduler worker threads (one per firing task)
//!     on_fire(taskId) / on_deadline(taskId)
//!            │
//!            ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  HeadlessDispatcher (single critical section)                     │
//! │  - Phase: Cold → Launching → Ready                                │
//! │  - pending: FIFO queue of DispatchRequest                         │
//! │  - ReadyListeners (broadcast-once)                                │
//! │  - Bus (broadcast events)                                         │
//! └──────┬───────────────────────────────┬────────────────────────────┘
//!        │ cold start                    │ deliver (unbounded send)
//!        ▼                               ▼
//! ┌──────────────────┐    ┌─────────────────────────────────────────┐
//! │ RegistrationStore│    │  ExecutionContext (spawned, singleton)  │
//! │ (bootstrapId,    │    │  1. bootstrap.run(handle)               │
//! │  clientId) pair  │    │       └► handle.notify_initialized()   │
//! │ atomic save/load │    │  2. loop: resolve client callback,      │
//! └──────────────────┘    │     client.on_event(TaskEvent)          │
//!                         └──────────────────┬──────────────────────┘
//!                                            │ Initialized signal
//!                                            ▼
//!                              dispatcher.acknowledge()
//!                    drains the queue, fires ready-listeners once
//! ```
//!
//! ### Lifecycle
//! ```text
//! register(bootstrapId, clientId) ──► RegistrationStore (atomic, policy-checked)
//!
//! scheduler fires taskId:
//!   ├─ Ready     ─► build {clientId, taskId, timeout}, send into context
//!   ├─ Launching ─► enqueue (idempotent launch, FIFO preserved)
//!   └─ Cold      ─► enqueue, load registration, launch context
//!        │
//!        ├─ resolution failure ─► finish(taskId), reset to Cold (retryable)
//!        └─ context up ─► bootstrap runs ─► Initialized ─► drain queue
//! ```
//!
//! Failures on the dispatch path never escape as panics: every discarded
//! request is paired with a `finish(task_id)` call toward the scheduler so
//! the platform-held wake resource is released.
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use fetchvisor::{
//!     BootstrapCallback, CallbackResolver, ClientCallback, Config, ContextHandle,
//!     HeadlessDispatcher, MemoryStore, SchedulerHooks, TaskEvent,
//! };
//!
//! struct Bootstrap;
//!
//! #[async_trait]
//! impl BootstrapCallback for Bootstrap {
//!     async fn run(&self, handle: ContextHandle) {
//!         // wire application channels here, then:
//!         handle.notify_initialized();
//!     }
//! }
//!
//! struct Client;
//!
//! #[async_trait]
//! impl ClientCallback for Client {
//!     async fn on_event(&self, event: TaskEvent) {
//!         println!("fetch event: {} (timeout={})", event.task_id, event.timed_out);
//!     }
//! }
//!
//! struct Resolver;
//!
//! impl CallbackResolver for Resolver {
//!     fn resolve_bootstrap(&self, id: i64) -> Option<Arc<dyn BootstrapCallback>> {
//!         (id == 100).then(|| Arc::new(Bootstrap) as Arc<dyn BootstrapCallback>)
//!     }
//!     fn resolve_client(&self, id: i64) -> Option<Arc<dyn ClientCallback>> {
//!         (id == 200).then(|| Arc::new(Client) as Arc<dyn ClientCallback>)
//!     }
//! }
//!
//! struct Platform;
//!
//! #[async_trait]
//! impl SchedulerHooks for Platform {
//!     async fn finish(&self, task_id: &str) {
//!         println!("finished {task_id}");
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let dispatcher = HeadlessDispatcher::new(
//!         Config::default(),
//!         Arc::new(MemoryStore::new()),
//!         Arc::new(Resolver),
//!         Arc::new(Platform),
//!     );
//!
//!     dispatcher.registrar().register(100, 200).await.unwrap();
//!     dispatcher.on_fire("flutter_background_fetch").await;
//! }
//! ```

mod config;
mod context;
mod dispatch;
mod error;
mod events;
mod observers;
mod scheduler;
mod store;

// ---- Public re-exports ----

pub use config::Config;
pub use context::{
    BootstrapCallback, CallbackResolver, ClientCallback, ContextHandle, ExecutionContext, TaskEvent,
};
pub use dispatch::{DispatchRequest, HeadlessDispatcher, Phase};
pub use error::{DispatchError, StoreError};
pub use events::{Bus, Event, EventKind};
pub use observers::{Subscribe, spawn_listener};
pub use scheduler::SchedulerHooks;
pub use store::{
    JsonFileStore, MemoryStore, Registrar, RegistrationPolicy, RegistrationRecord,
    RegistrationStore,
};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use observers::LogWriter;
