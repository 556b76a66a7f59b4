pub mod disabled;
pub mod ollama;
pub mod remote;
