//! DTOs da API
//!
//! Este módulo contém os tipos de request e response da API HTTP.

pub mod inutilizacao_dto;
