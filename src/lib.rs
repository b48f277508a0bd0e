pub mod assemble;
pub mod business_form;
pub mod config;
pub mod errors;
pub mod fetch;
pub mod fields;
pub mod model;
pub mod parser;
pub mod pipeline;
pub mod store;
pub mod xlsx;
