//! Общие DTO между backend и клиентами импорта номенклатуры закупок

pub mod domain;
pub mod usecases;
