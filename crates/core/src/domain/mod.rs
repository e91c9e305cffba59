pub mod forecast;
pub mod risk;
