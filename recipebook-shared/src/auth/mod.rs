/// Request identity and authorization
///
/// Token issuance belongs to the external identity provider. This module
/// validates the bearer tokens it issues and answers the one authorization
/// question the domain has: may this user modify this recipe?
///
/// # Modules
///
/// - [`jwt`]: HS256 token validation (and minting for tools and tests)
/// - [`middleware`]: `AuthContext` / `Viewer` request extensions
/// - [`authorization`]: author-or-administrator check

pub mod authorization;
pub mod jwt;
pub mod middleware;
