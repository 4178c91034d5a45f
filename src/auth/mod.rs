pub mod jwt;
pub mod middleware;
pub mod oauth;
pub mod password;
pub mod session;
pub mod tokens;
