//! # StockScan Console Entry Point
//!
//! Reads one scanned token per line from stdin. Barcode scanners in
//! keyboard-wedge mode type the code followed by Enter, so pointing one at
//! this terminal is enough.
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load configuration (`$STOCKSCAN_CONFIG` or the platform path)
//! 3. Open the database and spawn the enrichment worker
//! 4. Scan until `exit` or end of input

use std::process::ExitCode;

use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    stockscan_lib::init_tracing();

    match stockscan_lib::run(None).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(code = %e.code(), error = %e, "StockScan failed");
            eprintln!("error [{}]: {}", e.code(), e);
            ExitCode::FAILURE
        }
    }
}
