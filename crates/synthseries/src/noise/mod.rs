//! Noise factors - random jitter applied after every other factor

pub mod white;

pub use white::WhiteNoise;
