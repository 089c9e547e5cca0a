//! Integration tests for the `Backend` trait via `MemoryBackend`, covering
//! the branch/turn bookkeeping rows the per-family unit tests don't exercise.

mod backend;
