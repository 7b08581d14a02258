pub mod folders;
pub mod tasks;
