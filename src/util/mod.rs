pub mod locale;
pub mod unicode;
