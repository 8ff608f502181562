//! Config tokens: `refresh` and show-limit tokens.

use tracing::info;

use super::ConfigOutcome;
use crate::dispatcher::Scanner;

impl Scanner {
    /// Re-queries the lookup for the last scanned SKU.
    pub(crate) fn refresh_last(&self) -> ConfigOutcome {
        let sku = self.last_sku.clone();

        match &sku {
            Some(sku) => {
                self.enqueue(sku, true);
                info!(sku = %sku, "Forced enrichment queued");
                self.sink.on_info(&format!("refreshing {}", sku));
            }
            None => self.sink.on_warning("nothing scanned yet to refresh"),
        }

        ConfigOutcome::Refreshed { sku }
    }

    pub(crate) fn set_show_limit(&mut self, limit: u32) -> ConfigOutcome {
        self.show_limit = limit;
        info!(limit, "Show limit changed");
        ConfigOutcome::ShowLimitChanged { limit }
    }
}
