// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telemetry adapter trait for anonymous usage events.

use async_trait::async_trait;

use crate::traits::adapter::PluginAdapter;
use crate::types::TelemetryEvent;

/// Sink for usage events emitted by the memory façade.
///
/// Capture is fire-and-forget: implementations must not fail the caller.
#[async_trait]
pub trait TelemetryAdapter: PluginAdapter {
    /// Records a single event.
    async fn capture(&self, event: TelemetryEvent);
}
