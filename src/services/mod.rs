pub mod transfer;

pub use transfer::{CreateTransfer, TransferOutcome, TransferPage, TransferService};
