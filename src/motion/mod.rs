//! Random cursor motion: the target generator and the background worker
//! thread that applies its output to the real cursor.

pub mod generator;
pub mod worker;

pub use generator::{next_move, NextMove};
pub use worker::WorkerHandle;
