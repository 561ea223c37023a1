pub mod dp_mean;
pub mod filter;
pub mod histogram;
pub mod materialize;
pub mod mean;
