/// Compiled allow-list of emails permitted to use the application.
///
/// Entries must be lowercase. The remote `authorized_emails` collection is
/// supposed to mirror this list; nothing enforces that, so the list is the
/// fast path and the collection covers emails added at runtime.
pub const AUTHORIZED_EMAILS: &[&str] = &[
    "user@example.com",
    "admin@example.com",
    "operador@painel.example",
    "suporte@painel.example",
];

/// Compiled seed of administrator emails. These must also be authorized.
/// Reconciled into the `admin_users` collection by [`crate::AdminRegistry::bootstrap`].
pub const ADMIN_EMAILS: &[&str] = &[
    "admin@example.com",
    "suporte@painel.example",
];

/// Canonical key form for all email comparisons: trimmed and lowercased.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn is_listed(email: &str) -> bool {
    let normalized = normalize_email(email);
    !normalized.is_empty() && AUTHORIZED_EMAILS.contains(&normalized.as_str())
}

pub fn is_admin_listed(email: &str) -> bool {
    let normalized = normalize_email(email);
    !normalized.is_empty() && ADMIN_EMAILS.contains(&normalized.as_str())
}
