mod dto;
pub mod http_backend;

pub use http_backend::{HttpInterviewBackend, map_http_error};
