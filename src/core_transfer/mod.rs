// Data-channel payloads: file bytes in both directions and directory listings.

pub mod ascii;
pub mod error;
pub mod listing;
pub mod transfer;

pub use error::TransferError;
pub use listing::ListFormat;
pub use transfer::{
    execute_transfer, execute_transfer_tracked, TransferRequest, TransferSettings, TransferType,
};
