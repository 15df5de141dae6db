// SPDX-FileCopyrightText: 2026 Memora Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in telemetry adapters. Neither sends anything off the host.

use async_trait::async_trait;
use memora_core::traits::{PluginAdapter, TelemetryAdapter};
use memora_core::types::{AdapterType, TelemetryEvent};
use tracing::debug;

/// Discards every event. The default.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopTelemetry;

impl PluginAdapter for NoopTelemetry {
    fn name(&self) -> &str {
        "noop"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Telemetry
    }
}

#[async_trait]
impl TelemetryAdapter for NoopTelemetry {
    async fn capture(&self, _event: TelemetryEvent) {}
}

/// Emits each event as a `tracing` debug event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetry;

impl PluginAdapter for TracingTelemetry {
    fn name(&self) -> &str {
        "tracing"
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Telemetry
    }
}

#[async_trait]
impl TelemetryAdapter for TracingTelemetry {
    async fn capture(&self, event: TelemetryEvent) {
        let properties = serde_json::Value::Object(event.properties);
        debug!(event = %event.name, %properties, "telemetry event");
    }
}
