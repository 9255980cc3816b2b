pub mod credentials;
pub mod middleware;
pub mod session;
