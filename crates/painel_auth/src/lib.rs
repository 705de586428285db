//! Painel auth: authorization gate, admin registry and identity-provider seam.
mod admin;
mod allowlist;
mod cache;
mod gate;
mod identity;
pub mod messages;
mod store;

pub use admin::AdminRegistry;
pub use allowlist::{is_admin_listed, is_listed, normalize_email, ADMIN_EMAILS, AUTHORIZED_EMAILS};
pub use cache::{AuthCache, CachedDecision};
pub use gate::AuthorizationGate;
pub use identity::{
    AuthService, AuthenticatedUser, IdentityError, IdentityProvider, IdentitySettings,
    ProviderUser, RestIdentityProvider, SignInError,
};
pub use store::{
    AdministratorRecord, AuthorizedEmailRecord, DirectoryStore, RestDirectoryStore, StoreError,
    StoreSettings,
};
