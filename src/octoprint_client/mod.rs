pub mod client;
pub mod decoder;
pub mod models;

use client::ClientError;

/// The printer queries the monitor loop needs on each tick.
#[allow(async_fn_in_trait)]
pub trait PrinterApi {
    async fn is_printer_connected(&self) -> Result<bool, ClientError>;
    async fn get_printer_status(&self) -> Result<String, ClientError>;
    async fn get_print_progress(&self) -> Result<u8, ClientError>;
    async fn get_print_time_left(&self) -> Result<u64, ClientError>;
    async fn get_file_printing(&self) -> Result<String, ClientError>;
}
