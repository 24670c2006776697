pub mod activity;
pub mod health;
pub mod permissions;
pub mod roles;
pub mod users;

#[cfg(test)]
pub(crate) mod tests;
