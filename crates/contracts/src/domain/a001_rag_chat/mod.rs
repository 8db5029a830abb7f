pub mod aggregate;
pub mod dto;
