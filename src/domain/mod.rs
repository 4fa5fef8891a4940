//! Domain layer: entities, store traits, and click reconciliation.

pub mod click_event;
pub mod click_worker;
pub mod entities;
pub mod repositories;
