//! User-facing authentication messages.

pub const EMAIL_NOT_AUTHORIZED: &str = "Email não autorizado a acessar o aplicativo";
pub const INVALID_CREDENTIALS: &str = "Credenciais inválidas, verifique seu email e senha";
pub const ACCOUNT_DISABLED: &str = "Esta conta foi desativada";
pub const TOO_MANY_ATTEMPTS: &str = "Muitas tentativas de login, tente novamente mais tarde";
pub const GENERIC_ERROR: &str = "Ocorreu um erro durante a autenticação, tente novamente";
