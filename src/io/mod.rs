pub mod client;
pub mod fasta;
pub mod server;
pub mod wire;
