pub mod page;
pub mod rest;
