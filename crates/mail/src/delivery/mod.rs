//! External delivery channels for task mail.

pub mod email;
