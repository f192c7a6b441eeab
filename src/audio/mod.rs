pub mod analysis;
pub mod decode;
pub mod features;
pub mod frames;
pub mod onset;
pub mod resample;
