pub mod api;
pub mod entities;
pub mod repository;
pub mod service;
