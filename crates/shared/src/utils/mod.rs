pub mod jwt;
pub mod resolvers;
pub mod tests_utils;
