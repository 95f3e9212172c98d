//! Blockchain tools: state reads and transfer submission.

mod balance;
mod transfer;

pub use balance::ChainBalanceTool;
pub use transfer::ChainTransferTool;
