//! Batched parallel permission-change engine
//!
//! One traversal producer classifies entries and feeds a shared queue;
//! N workers batch paths by mode string and flush each batch as a
//! single change invocation.
//!
//! # Architecture
//!
//! ```text
//!                  ┌──────────────────────────┐
//!                  │     Traversal driver     │
//!                  │  walk targets, classify  │
//!                  └────────────┬─────────────┘
//!                               │ WorkItem (File / DirSelf / Terminate)
//!                               ▼
//!                  ┌──────────────────────────┐
//!                  │        Work queue        │
//!                  │   (crossbeam unbounded)  │
//!                  └────────────┬─────────────┘
//!        ┌──────────────────────┼──────────────────────┐
//!        │                      │                      │
//!  ┌─────▼─────┐          ┌─────▼─────┐          ┌─────▼─────┐
//!  │  Worker 1 │          │  Worker 2 │          │  Worker N │
//!  │  batches  │          │  batches  │          │  batches  │
//!  └─────┬─────┘          └─────┬─────┘          └─────┬─────┘
//!        │ chgrp/chmod          │ per full batch       │
//!        ▼                      ▼                      ▼
//!                       ChangeExecutor → OS
//! ```

pub mod pool;
pub mod queue;
pub mod traversal;
pub mod worker;

pub use pool::{ChangePool, RunResult};
pub use queue::{WorkItem, WorkQueue};
pub use worker::Worker;
