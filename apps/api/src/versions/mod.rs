// Resume version families: one root plus flat duplicates, at most one master.
// Handlers stay thin; every rule lives in lifecycle / family / diff / merge.

pub mod diff;
pub mod family;
pub mod handlers;
pub mod lifecycle;
pub mod merge;
pub mod naming;
