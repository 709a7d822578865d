pub mod config;
pub mod distribution;
pub mod metric;
pub mod morph;
pub mod polarity;
pub mod record;
