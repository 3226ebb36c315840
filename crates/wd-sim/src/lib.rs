//! `wd-sim` — the single-writer simulation engine.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                         |
//! |--------------|------------------------------------------------------------------|
//! | [`engine`]   | `Engine` (agent registry, create/apply/tick), `TickReport`       |
//! | [`event`]    | `Command`, `CommandKind`, the internal event queue entries       |
//! | [`service`]  | `EngineService` (engine/ticker/publisher threads), `EngineHandle`|
//! | [`error`]    | `SimError`, `SimResult<T>`                                       |
//!
//! # One tick
//!
//! ```text
//! ① Sweep    — every enabled agent advances by walking_speed × tick period;
//!              stranded agents retry planning and stay put.
//!              (parallel with the `parallel` feature)
//! ② Snapshot — every agent's (id, lat, lon), paused ones included, sorted
//!              by id, taken while the engine still holds the registry.
//! ③ Publish  — the snapshot goes to the position sink as one batch on the
//!              publisher thread, off the registry.
//! ```
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                 |
//! |------------|--------------------------------------------------------|
//! | `parallel` | Runs the sweep on Rayon's thread pool.                 |
//! | `fx-hash`  | Uses FxHash for the agent registry.                    |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use wd_core::{AgentId, SimConfig};
//! use wd_output::MemorySink;
//! use wd_sim::{Engine, EngineService, TickMode};
//!
//! let engine  = Engine::new(Arc::new(graph), SimConfig::default())?;
//! let service = EngineService::start(engine, Arc::new(MemorySink::new()), TickMode::Periodic)?;
//! let handle  = service.handle();
//! handle.create(AgentId::new("alice")?)?;
//! ```

pub mod engine;
pub mod error;
pub mod event;
pub mod service;


pub use engine::{Engine, TickReport};
pub use error::{SimError, SimResult};
pub use event::{Command, CommandKind};
pub use service::{EngineHandle, EngineService, TickMode};
