/// Authentication and session core
///
/// Password hashing, stateless access tokens, stateful refresh tokens, and
/// the session manager that ties them together.

mod bearer;
mod claims;
mod jwt;
mod password;
mod refresh_token;
pub mod session;

pub use bearer::{api_key, bearer_token};
pub use claims::{Claims, ACCESS_TOKEN_ISSUER};
pub use jwt::{mint_access_token, verify_access_token};
pub use password::{hash_password, verify_password};
pub use refresh_token::{
    generate_refresh_token, resolve_refresh_token, revoke_refresh_token, save_refresh_token,
};
