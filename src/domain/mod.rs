// Domain layer - Trim range, history and the types they share

pub mod errors;
pub mod history;
pub mod model;
pub mod rules;
