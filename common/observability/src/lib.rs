use prometheus::{Encoder, IntCounter, Registry, TextEncoder};
use tracing_subscriber::EnvFilter;

#[derive(Clone)]
pub struct InventoryMetrics {
    pub registry: Registry,
    pub items_created: IntCounter,
    pub items_updated: IntCounter,
    pub items_deleted: IntCounter,
    pub restocks: IntCounter,
    pub restocks_refused: IntCounter,
    pub bulk_delete_blocked: IntCounter,
}

impl InventoryMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let items_created = IntCounter::new(
            "inventory_items_created_total",
            "Inventory items created",
        ).unwrap();
        let items_updated = IntCounter::new(
            "inventory_items_updated_total",
            "Inventory items updated (including restocks)",
        ).unwrap();
        let items_deleted = IntCounter::new(
            "inventory_items_deleted_total",
            "Inventory items deleted",
        ).unwrap();
        let restocks = IntCounter::new(
            "inventory_restocks_total",
            "Restock actions applied",
        ).unwrap();
        let restocks_refused = IntCounter::new(
            "inventory_restocks_refused_total",
            "Restock actions refused because quantity exceeded the restock level",
        ).unwrap();
        let bulk_delete_blocked = IntCounter::new(
            "inventory_bulk_delete_blocked_total",
            "Delete-all requests ignored outside test mode",
        ).unwrap();
        let _ = registry.register(Box::new(items_created.clone()));
        let _ = registry.register(Box::new(items_updated.clone()));
        let _ = registry.register(Box::new(items_deleted.clone()));
        let _ = registry.register(Box::new(restocks.clone()));
        let _ = registry.register(Box::new(restocks_refused.clone()));
        let _ = registry.register(Box::new(bulk_delete_blocked.clone()));
        InventoryMetrics { registry, items_created, items_updated, items_deleted, restocks, restocks_refused, bulk_delete_blocked }
    }

    /// Text exposition of this registry followed by the process-wide default registry.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut families = self.registry.gather();
        families.extend(prometheus::gather());
        let mut buf = Vec::new();
        encoder.encode(&families, &mut buf)?;
        Ok(String::from_utf8_lossy(&buf).to_string())
    }
}

impl Default for InventoryMetrics {
    fn default() -> Self { Self::new() }
}

/// Install the global tracing subscriber.
///
/// Filter comes from `RUST_LOG` (default `info`). `LOG_FORMAT=json` switches to JSON lines.
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
