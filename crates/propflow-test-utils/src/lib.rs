// SPDX-FileCopyrightText: 2026 Propflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared test doubles for the Propflow lead engine.

pub mod mock_channel;

pub use mock_channel::MockChannel;
