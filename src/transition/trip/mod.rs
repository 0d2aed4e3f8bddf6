pub mod entity;

#[cfg(test)]
mod test;

pub use entity::*;
