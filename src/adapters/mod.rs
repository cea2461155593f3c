// Adapters layer: rendering and export for callers outside the model.

pub mod report;
