mod client;
mod tree;

pub use client::StoreClient;
pub use tree::decode_history;
