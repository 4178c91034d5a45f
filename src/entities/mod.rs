pub mod account;
pub mod movie;
pub mod movie_watch_time;
pub mod password_reset_token;
pub mod profil;
pub mod refresh_token;
pub mod two_factor_confirmation;
pub mod two_factor_token;
pub mod user;
pub mod verification_token;
