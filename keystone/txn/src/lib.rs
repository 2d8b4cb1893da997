//! Transactional command-execution layer for keystone.
//!
//! Implements Percolator-style multi-version, multi-key transactions on top
//! of the ordered byte-key substrate exposed by `keystone-storage`. Clients
//! submit timestamped requests; this layer enforces snapshot isolation,
//! detects write-write conflicts, and drives a two-phase-commit protocol
//! whose cross-key atomicity hinges on a designated primary key.
//!
//! The entry point is [`Scheduler`], which executes one [`Command`] at a
//! time per overlapping key set: latches are acquired over the command's
//! declared keys, a snapshot is taken, the command logic runs against the
//! multi-version column families, and the resulting write batch is applied
//! atomically before the latches are released.

pub mod codec;
pub mod commands;
pub mod config;
pub mod error;
pub mod latch;
pub mod lock;
pub mod reader;
pub mod scheduler;
pub mod txn;
pub mod write;

pub use commands::{Command, CommandResponse};
pub use config::SchedulerConfig;
pub use error::{TxnError, TxnResult};
pub use lock::{Lock, LockInfo, LockKind};
pub use scheduler::Scheduler;
pub use write::{WriteKind, WriteRecord};
