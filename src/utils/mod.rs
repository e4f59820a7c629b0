pub mod email;
pub mod pagination;
pub mod validation;
