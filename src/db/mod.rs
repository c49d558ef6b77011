// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Storage for the mock upstream API.

pub mod fixtures;
pub mod memory;

pub use memory::MemoryDb;
