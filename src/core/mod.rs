pub mod engine;
pub mod financing;
pub mod normalizer;
pub mod operating;
pub mod projection;
pub mod shares;
