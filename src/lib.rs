pub mod acg;
pub mod astro_math;
pub mod astrocarta;
pub mod astrocarta_errors;
pub mod constants;
pub mod ephemeris;
pub mod oob;
pub mod params;
pub mod paran;
pub mod positions;
pub mod ref_system;
pub mod scoring;
pub mod sda;
pub mod time;
pub mod transforms;
pub mod zenith;
