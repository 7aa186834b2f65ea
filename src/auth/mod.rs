mod middleware;
mod password;
mod token;

pub use middleware::{AuthError, RequireSession, TOKEN_HEADER};
pub use password::CredentialHasher;
pub use token::{
    IssuedToken, digest_token, generate_reset_code, generate_session_token, parse_token,
};
